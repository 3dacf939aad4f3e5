//! # stack 子命令实现
//!
//! 校验样品层并输出每层的组成报告：
//! 厚度、密度（是否为标准密度）、摩尔质量，以及每个元素的
//! 原子比例、原子数密度与所用同位素比例。
//!
//! ## 依赖关系
//! - 使用 `cli/stack.rs` 定义的 StackArgs
//! - 使用 `session/` 校验输入
//! - 使用 `physics/engine.rs` 的 StackLayer 计算密度

use super::{build_session, print_reports, require_valid};
use crate::cli::stack::StackArgs;
use crate::error::Result;
use crate::models::SampleLayer;
use crate::physics::engine::StackLayer;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 元素行
#[derive(Debug, Clone, Tabled)]
struct ElementRow {
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Atoms")]
    atoms: String,
    #[tabled(rename = "N (atoms/cm³)")]
    number_density: String,
    #[tabled(rename = "Isotopes")]
    isotopes: String,
}

/// 执行样品层报告
pub fn execute(args: StackArgs) -> Result<()> {
    output::print_header("Sample Stack");

    let (session, reports) = build_session(args.session.as_deref(), &args.input, None)?;
    print_reports(&reports);

    let input = require_valid(&session)?;

    output::print_info(&format!(
        "{} layer(s), isotope ratios: {}",
        input.layers.len(),
        if session.manual_isotopes() { "manual" } else { "natural" }
    ));

    for (i, (layer, stack)) in input.layers.iter().zip(&input.stack).enumerate() {
        print_layer(i, layer, stack)?;
    }

    output::print_success("Sample stack is valid");
    Ok(())
}

fn print_layer(index: usize, layer: &SampleLayer, stack: &StackLayer) -> Result<()> {
    output::print_separator();
    output::print_info(&format!("Layer {}: {}", index + 1, layer.formula.text));
    output::print_info(&format!("  Thickness: {} mm", stack.thickness_mm));
    output::print_info(&format!(
        "  Density: {} g/cm³{}",
        stack.density_g_cm3,
        if layer.uses_standard_density() { " (standard)" } else { "" }
    ));
    output::print_info(&format!("  Molar mass: {:.4} g/mol", stack.molar_mass()?));

    let rows = element_rows(stack)?;
    println!("{}", Table::new(&rows));
    Ok(())
}

fn element_rows(stack: &StackLayer) -> Result<Vec<ElementRow>> {
    stack
        .formula
        .components
        .iter()
        .map(|(element, count)| {
            let isotopes = stack
                .ratios_of(element)
                .map(|r| {
                    r.isotopes
                        .iter()
                        .map(|(iso, ratio)| format!("{} {:.4}", iso, ratio))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            Ok(ElementRow {
                element: element.clone(),
                atoms: format!("{}", count),
                number_density: format!("{:.4e}", stack.number_density(element)?),
                isotopes,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::formula::parse_formula;

    #[test]
    fn test_element_rows() {
        let stack = StackLayer::natural(parse_formula("AgCl").unwrap(), 0.5, 5.56).unwrap();
        let rows = element_rows(&stack).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].element, "Ag");
        assert_eq!(rows[0].atoms, "1");
        assert!(rows[0].isotopes.contains("107-Ag"));
        assert!(rows[1].isotopes.contains("35-Cl"));
    }
}
