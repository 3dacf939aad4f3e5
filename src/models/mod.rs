//! # 数据模型模块
//!
//! 定义能量范围表、样品表、同位素比例表与绘图请求的数据模型。
//!
//! ## 依赖关系
//! - 被 `session/`, `plot/` 和 `commands/` 使用
//! - 子模块: cell, range, sample, isotope, plot_request

pub mod cell;
pub mod isotope;
pub mod plot_request;
pub mod range;
pub mod sample;

pub use cell::{Cell, Coerced};
pub use isotope::{IsotopeKey, IsotopeOverride, IsotopeTable};
pub use plot_request::{Granularity, PlotRequest, Scale, TimeUnit, XAxis, YAxis};
pub use range::{Endpoint, RangeEntry, RangeField, RangeRow};
pub use sample::{LayerField, SampleLayer, SampleRow};
