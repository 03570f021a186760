//! `input.endian = e` / `input.bit_order = e` become [`SpecifyOrder`].

use bgn_ir::{extract_config, Ast, ExtractMode, NodeId, OrderType, SpecifyOrder};

use crate::rewrite::{mark_builtin, rewrite_statements};

#[tracing::instrument(level = "trace", skip_all)]
pub fn replace_specify_order(ast: &mut Ast, root: NodeId) {
    rewrite_statements(ast, root, |ast, stmt| {
        let desc = extract_config(ast, stmt, ExtractMode::Assign)?;
        let order_type = match desc.name.as_str() {
            "input.endian" => OrderType::Byte,
            "input.bit_order" => OrderType::Bit,
            _ => return None,
        };
        let member = ast.get::<bgn_ir::MemberAccess>(desc.target)?.member;
        mark_builtin(ast, member);
        let loc = ast.loc(stmt);
        Some(ast.alloc(
            loc,
            SpecifyOrder {
                base: Some(stmt),
                order_type,
                order: *desc.arguments.first()?,
                order_value: None,
            },
        ))
    });
}
