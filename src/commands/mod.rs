//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。每个命令先建立一个会话：
//! 会话文件的事件先重放，命令行参数随后重放并覆盖。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `session/`, `plot/`, `physics/`, `utils/`
//! - 子模块: range, stack, compute, beam

pub mod beam;
pub mod compute;
pub mod range;
pub mod stack;

use crate::cli::compute::PlotArgs;
use crate::cli::input::InputArgs;
use crate::cli::Commands;
use crate::error::{ResoError, Result};
use crate::session::{Event, EventReport, Session, SessionConfig, ValidatedInput};
use crate::utils::output;

use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Range(args) => range::execute(args),
        Commands::Stack(args) => stack::execute(args),
        Commands::Compute(args) => compute::execute(args),
        Commands::Beam(args) => beam::execute(args),
    }
}

// ─────────────────────────────────────────────────────────────
// 会话构建
// ─────────────────────────────────────────────────────────────

/// 建立会话：默认表格 → 会话文件 → 命令行参数 → 绘图请求
pub fn build_session(
    session_file: Option<&Path>,
    input: &InputArgs,
    plot: Option<&PlotArgs>,
) -> Result<(Session, Vec<EventReport>)> {
    let mut session = Session::default();
    let mut reports = Vec::new();

    if let Some(path) = session_file {
        if !path.is_file() {
            return Err(ResoError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        reports.extend(SessionConfig::load(path)?.apply(&mut session)?);
    }

    reports.extend(input.to_config().apply(&mut session)?);

    if let Some(request) = plot.and_then(|p| p.apply_to(session.plot_request())) {
        reports.push(session.apply(Event::SetPlotRequest(request))?);
    }

    Ok((session, reports))
}

/// 打印事件处理中的警告：被丢弃的范围编辑与越界编辑
pub fn print_reports(reports: &[EventReport]) {
    for report in reports {
        for edit in &report.discarded_edits {
            output::print_warning(&format!(
                "Ignored range.{}.{} edit: a higher-precedence range field was edited too",
                edit.field, edit.endpoint
            ));
        }
        if let Some(err) = &report.edit_error {
            output::print_field_error(err);
        }
    }
}

/// 会话中没有任何字段错误时返回校验后的输入
pub fn require_valid(session: &Session) -> Result<&ValidatedInput> {
    let errors = session.errors();
    if !errors.is_empty() {
        return Err(ResoError::Validation(errors));
    }
    session
        .validated()
        .ok_or_else(|| ResoError::Other("session has no validated input".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::input::parse_layer;
    use crate::models::YAxis;

    #[test]
    fn test_default_session_is_valid() {
        let (session, reports) = build_session(None, &InputArgs::default(), None).unwrap();
        assert!(reports.is_empty());
        let input = require_valid(&session).unwrap();
        assert_eq!(input.layers.len(), 1);
    }

    #[test]
    fn test_flags_override_defaults() {
        let input = InputArgs {
            layers: vec![parse_layer("AgCl:0.5").unwrap()],
            ..Default::default()
        };
        let plot = PlotArgs {
            y_axis: Some(YAxis::Transmission),
            ..Default::default()
        };
        let (session, _) = build_session(None, &input, Some(&plot)).unwrap();
        assert_eq!(session.plot_request().y_axis, YAxis::Transmission);

        match require_valid(&session) {
            Err(ResoError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.field == "layer[1].density"));
            }
            other => panic!("expected density error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_session_file() {
        let result = build_session(Some(Path::new("no/such/session.json")), &InputArgs::default(), None);
        assert!(matches!(result, Err(ResoError::FileNotFound { .. })));
    }
}
