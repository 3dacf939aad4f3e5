//! # 化学式解析
//!
//! 将 `AgCl`, `H2O`, `Ca(OH)2`, `Gd2.5Fe` 之类的化学式解析为 (元素, 原子数) 列表。
//!
//! 支持：
//! - 一或两字母元素符号（首字母大写）
//! - 整数或小数计数
//! - 任意层嵌套括号及其倍数
//!
//! 同一元素多次出现时合并，保留首次出现的顺序。
//!
//! ## 依赖关系
//! - 被 `session/validator.rs`, `physics/engine.rs` 使用
//! - 使用 `physics/elements.rs` 检查元素是否已知

use crate::error::{ResoError, Result};
use crate::physics::elements::get_element;
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]?|\(|\)|\d+(?:\.\d+)?|\.\d+").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Element(String),
    Open,
    Close,
    Number(f64),
}

/// 解析后的化学式
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// 原始文本（已去除首尾空白）
    pub text: String,
    /// (元素符号, 原子数)，按首次出现排序
    pub components: Vec<(String, f64)>,
}

impl Formula {
    /// 是否为单一元素（如 `Ag`, `W2`）
    pub fn is_single_element(&self) -> bool {
        self.components.len() == 1
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(s, _)| s.as_str())
    }

    /// 元素原子数
    pub fn count_of(&self, symbol: &str) -> Option<f64> {
        self.components
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, c)| *c)
    }

    /// 总原子数
    pub fn total_atoms(&self) -> f64 {
        self.components.iter().map(|(_, c)| c).sum()
    }
}

fn tokenize(formula: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut expected = 0;

    for m in TOKEN_RE.find_iter(formula) {
        if m.start() != expected {
            return Err(ResoError::InvalidFormula {
                formula: formula.to_string(),
                reason: format!("unexpected character at position {}", expected + 1),
            });
        }
        expected = m.end();

        let text = m.as_str();
        let token = match text {
            "(" => Token::Open,
            ")" => Token::Close,
            _ if text.starts_with(|c: char| c.is_ascii_uppercase()) => {
                Token::Element(text.to_string())
            }
            _ => Token::Number(text.parse().map_err(|_| ResoError::InvalidFormula {
                formula: formula.to_string(),
                reason: format!("invalid count '{}'", text),
            })?),
        };
        tokens.push(token);
    }

    if expected != formula.len() {
        return Err(ResoError::InvalidFormula {
            formula: formula.to_string(),
            reason: format!("unexpected character at position {}", expected + 1),
        });
    }

    Ok(tokens)
}

/// 解析化学式
///
/// 空式、括号不匹配、非法字符、零计数与未知元素都会返回错误。
pub fn parse_formula(formula: &str) -> Result<Formula> {
    let text = formula.trim();
    if text.is_empty() {
        return Err(ResoError::InvalidFormula {
            formula: formula.to_string(),
            reason: "formula is empty".to_string(),
        });
    }

    let invalid = |reason: &str| ResoError::InvalidFormula {
        formula: text.to_string(),
        reason: reason.to_string(),
    };

    let tokens = tokenize(text)?;
    let mut stack: Vec<Vec<(String, f64)>> = vec![Vec::new()];
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Element(symbol) => {
                if get_element(symbol).is_none() {
                    return Err(ResoError::UnknownElement(symbol.clone()));
                }
                let mut count = 1.0;
                if let Some(Token::Number(n)) = tokens.get(i + 1) {
                    count = *n;
                    i += 1;
                }
                if count <= 0.0 {
                    return Err(invalid("atom counts must be positive"));
                }
                if let Some(group) = stack.last_mut() {
                    group.push((symbol.clone(), count));
                }
            }
            Token::Open => stack.push(Vec::new()),
            Token::Close => {
                if stack.len() < 2 {
                    return Err(invalid("unbalanced ')'"));
                }
                let group = stack.pop().unwrap_or_default();
                if group.is_empty() {
                    return Err(invalid("empty parentheses"));
                }
                let mut multiplier = 1.0;
                if let Some(Token::Number(n)) = tokens.get(i + 1) {
                    multiplier = *n;
                    i += 1;
                }
                if multiplier <= 0.0 {
                    return Err(invalid("group multipliers must be positive"));
                }
                if let Some(parent) = stack.last_mut() {
                    parent.extend(group.into_iter().map(|(s, c)| (s, c * multiplier)));
                }
            }
            Token::Number(_) => return Err(invalid("count without a preceding element")),
        }
        i += 1;
    }

    if stack.len() != 1 {
        return Err(invalid("unbalanced '('"));
    }

    // 合并重复元素
    let mut components: Vec<(String, f64)> = Vec::new();
    for (symbol, count) in stack.pop().unwrap_or_default() {
        match components.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, c)) => *c += count,
            None => components.push((symbol, count)),
        }
    }

    Ok(Formula {
        text: text.to_string(),
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_element() {
        let f = parse_formula(" Ag ").unwrap();
        assert_eq!(f.text, "Ag");
        assert!(f.is_single_element());
        assert_eq!(f.count_of("Ag"), Some(1.0));
    }

    #[test]
    fn test_compound_with_groups() {
        let f = parse_formula("Ca(OH)2").unwrap();
        assert_eq!(
            f.components,
            vec![
                ("Ca".to_string(), 1.0),
                ("O".to_string(), 2.0),
                ("H".to_string(), 2.0)
            ]
        );
        assert!((f.total_atoms() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_duplicates_merge_and_decimals() {
        let f = parse_formula("CH3CH2OH").unwrap();
        assert_eq!(f.count_of("C"), Some(2.0));
        assert_eq!(f.count_of("H"), Some(6.0));

        let g = parse_formula("Gd2.5Fe").unwrap();
        assert_eq!(g.count_of("Gd"), Some(2.5));
    }

    #[test]
    fn test_invalid_formulas() {
        assert!(parse_formula("").is_err());
        assert!(parse_formula("ag").is_err(), "lowercase start must be rejected");
        assert!(parse_formula("Ag)").is_err());
        assert!(parse_formula("(Ag").is_err());
        assert!(parse_formula("2Ag").is_err());
        assert!(parse_formula("Ag0").is_err());
        assert!(matches!(
            parse_formula("Xx"),
            Err(ResoError::UnknownElement(s)) if s == "Xx"
        ));
    }
}
