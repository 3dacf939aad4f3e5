//! # resokit - 中子共振成像工具箱
//!
//! 设计中子共振成像实验：同步能量/波长/飞行时间范围，描述多层样品，
//! 计算透射率、衰减与截面曲线并绘图或导出。
//!
//! ## 子命令
//! - `range`   - 同步并显示能量范围表
//! - `stack`   - 校验样品层并输出组成报告
//! - `compute` - 计算共振曲线，输出图像或数据（支持批量）
//! - `beam`    - 束流谱加权的总透射率
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── session/   (会话、事件与更新阶段)
//!   │     ├── plot/      (曲线组装、渲染与导出)
//!   │     ├── physics/   (单位换算、元素数据、共振引擎)
//!   │     ├── models/    (表格数据模型)
//!   │     └── batch/     (批量并行计算)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod physics;
mod plot;
mod session;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        if let error::ResoError::Validation(errors) = &e {
            for err in errors {
                utils::output::print_field_error(err);
            }
            utils::output::print_error("Input validation failed");
        } else {
            utils::output::print_error(&format!("{}", e));
        }
        std::process::exit(1);
    }
}
