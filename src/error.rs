//! # 统一错误处理模块
//!
//! 定义 resokit 的所有错误类型，使用 `thiserror` 派生。
//!
//! 两个层次：
//! - `FieldError`: 表格字段级别的输入错误（会话内部收集，不致命）
//! - `ResoError`: 命令级别的错误（I/O、解析、绘图等）
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::fmt;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────
// 字段错误
// ─────────────────────────────────────────────────────────────

/// 字段错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 非数值或缺失
    InputFormat,
    /// 违反领域约束（缺少密度、能量上下限相等、同位素比例之和不为 1）
    DomainConstraint,
    /// 单位换算失败（如距离非正）
    Conversion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InputFormat => write!(f, "INPUT ERROR"),
            ErrorKind::DomainConstraint => write!(f, "CONSTRAINT ERROR"),
            ErrorKind::Conversion => write!(f, "CONVERSION ERROR"),
        }
    }
}

/// 带字段标签的错误信息，显示在出错字段旁
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {field}: {message}")]
pub struct FieldError {
    /// 字段标签，如 `layer[1].density`
    pub field: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn input_format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ErrorKind::InputFormat,
            message: message.into(),
        }
    }

    pub fn domain(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ErrorKind::DomainConstraint,
            message: message.into(),
        }
    }

    pub fn conversion(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ErrorKind::Conversion,
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────
// 命令级错误
// ─────────────────────────────────────────────────────────────

/// resokit 统一错误类型
#[derive(Error, Debug)]
pub enum ResoError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid chemical formula '{formula}': {reason}")]
    InvalidFormula { formula: String, reason: String },

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    // ─────────────────────────────────────────────────────────────
    // 输入校验错误
    // ─────────────────────────────────────────────────────────────
    #[error("Input validation failed:\n{}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Field(#[from] FieldError),

    // ─────────────────────────────────────────────────────────────
    // 计算与绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("Physics engine failed: {0}")]
    EngineError(String),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ResoError>;
