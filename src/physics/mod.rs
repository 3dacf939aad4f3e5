//! # 中子物理模块
//!
//! 单位换算、元素数据、化学式解析、截面与透射计算。
//!
//! ## 子模块
//! - `units`: 能量/波长/速度/TOF 换算
//! - `elements`: 元素与同位素数据库
//! - `formula`: 化学式解析
//! - `engine`: 物理引擎接口与内置共振引擎
//! - `beam`: 束流谱加权透射率
//!
//! ## 依赖关系
//! - 被 `session/`, `plot/`, `commands/` 使用
//! - 使用 `models/`

pub mod beam;
pub mod elements;
pub mod engine;
pub mod formula;
pub mod units;
