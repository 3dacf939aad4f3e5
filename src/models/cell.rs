//! # 表格单元格
//!
//! 用户输入的单元格：数值或自由文本。只在校验边界处强制转换为数值。
//!
//! ## 依赖关系
//! - 被 `models/sample.rs`, `models/isotope.rs`, `session/validator.rs` 使用

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单元格值
///
/// 会话文件中 `0.5` 与 `"0.5"` 都可接受，空字符串视为缺失。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

/// 单元格强制转换结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Missing,
    Value(f64),
    NotNumeric,
}

impl Cell {
    pub fn blank() -> Self {
        Cell::Text(String::new())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(s) if s.trim().is_empty())
    }

    /// 强制转换为数值
    pub fn coerce(&self) -> Coerced {
        match self {
            Cell::Number(v) if v.is_finite() => Coerced::Value(*v),
            Cell::Number(_) => Coerced::NotNumeric,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Coerced::Missing
                } else {
                    match s.parse::<f64>() {
                        Ok(v) if v.is_finite() => Coerced::Value(v),
                        _ => Coerced::NotNumeric,
                    }
                }
            }
        }
    }

    /// 数值（缺失或非数值返回 None）
    pub fn as_f64(&self) -> Option<f64> {
        match self.coerce() {
            Coerced::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::blank()
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce() {
        assert_eq!(Cell::from(0.5).coerce(), Coerced::Value(0.5));
        assert_eq!(Cell::from(" 2.5 ").coerce(), Coerced::Value(2.5));
        assert_eq!(Cell::from("").coerce(), Coerced::Missing);
        assert_eq!(Cell::from("   ").coerce(), Coerced::Missing);
        assert_eq!(Cell::from("abc").coerce(), Coerced::NotNumeric);
        assert_eq!(Cell::from("inf").coerce(), Coerced::NotNumeric);
    }

    #[test]
    fn test_deserialize_untagged() {
        let cells: Vec<Cell> = serde_json::from_str(r#"[0.5, "1.2", ""]"#).unwrap();
        assert_eq!(cells[0], Cell::Number(0.5));
        assert_eq!(cells[1].as_f64(), Some(1.2));
        assert!(cells[2].is_blank());
    }
}
