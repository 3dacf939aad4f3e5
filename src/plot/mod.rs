//! # 绘图模块
//!
//! 将校验后的输入组装为曲线数据，并渲染或导出。
//!
//! ## 子模块
//! - `assembler`: 能量网格、引擎调用、衰减与 x 列推导、粒度筛选
//! - `render`: 图表生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `session/graph.rs`, `commands/compute.rs` 使用
//! - 使用 `physics/`, `session/validator.rs`

pub mod assembler;
pub mod export;
pub mod render;

pub use assembler::PlotData;
