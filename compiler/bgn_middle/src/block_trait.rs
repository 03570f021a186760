//! What each block does, summarized as [`BlockTrait`] flags.
//!
//! Traits of an `if`, `match` or `for` body are folded into the enclosing
//! block as well as kept on the body itself. Nested formats, states and
//! functions are summarized on their own.

use bgn_ir::{
    ArrayType, Assert, Ast, Binary, BinaryOp, BlockTrait, Enum, EnumType, ExplicitError, Field,
    FieldArgument, Format, IOMethod, IOOperation, Ident, IdentType, IdentUsage, If, IndentBlock,
    Index, IntType, Loop, Match, MatchBranch, MemberAccess, NodeId, NodeKind, ScopedStatement,
    SpecifyOrder, State, StructType,
};

/// Sets `block_traits` on every block under `root`. Run after
/// [`analyze_layout`](crate::analyze_layout).
#[tracing::instrument(level = "trace", skip_all)]
pub fn analyze_block_trait(ast: &mut Ast, root: NodeId) {
    let blocks: Vec<NodeId> = ast
        .descendants(root)
        .into_iter()
        .filter(|&id| ast.is::<IndentBlock>(id))
        .collect();
    for block in blocks {
        let traits = block_traits(ast, block);
        if let Some(b) = ast.get_mut::<IndentBlock>(block) {
            b.block_traits = traits;
        }
    }
}

fn block_traits(ast: &Ast, block: NodeId) -> BlockTrait {
    let Some(b) = ast.get::<IndentBlock>(block) else {
        return BlockTrait::empty();
    };
    let mut traits = b
        .elements
        .iter()
        .fold(BlockTrait::empty(), |acc, &stmt| acc | statement(ast, stmt));
    let unaligned = b
        .struct_type
        .and_then(|st| ast.get::<StructType>(st))
        .and_then(|st| st.layout.bit_alignment.remainder())
        .is_some_and(|rem| rem != 0);
    if unaligned {
        traits |= BlockTrait::BIT_STREAM;
    }
    traits
}

/// Traits a nested body passes up to its enclosing block.
fn nested(ast: &Ast, body: NodeId) -> BlockTrait {
    let traits = match ast.kind(body) {
        NodeKind::IndentBlock(_) => block_traits(ast, body),
        NodeKind::ScopedStatement(ScopedStatement { statement: stmt, .. }) => statement(ast, *stmt),
        _ => statement(ast, body),
    };
    traits - BlockTrait::BIT_STREAM
}

fn statement(ast: &Ast, stmt: NodeId) -> BlockTrait {
    bgn_stack::ensure_sufficient_stack(|| match ast.kind(stmt) {
        NodeKind::Field(f) => field(ast, f),
        NodeKind::Loop(Loop { init, cond, step, body, .. }) => {
            let header = [*init, *cond, *step]
                .into_iter()
                .flatten()
                .fold(BlockTrait::empty(), |acc, e| acc | expr(ast, e));
            BlockTrait::FOR_LOOP | header | nested(ast, *body)
        }
        NodeKind::If(If { cond, then, els, .. }) => {
            let mut traits = BlockTrait::CONDITIONAL | expr(ast, *cond) | nested(ast, *then);
            if let Some(els) = els {
                traits |= nested(ast, *els);
            }
            traits
        }
        NodeKind::Match(Match { cond, branches, .. }) => {
            let mut traits = BlockTrait::CONDITIONAL;
            if let Some(cond) = cond {
                traits |= expr(ast, *cond);
            }
            for branch in branches {
                if let Some(b) = ast.get::<MatchBranch>(*branch) {
                    traits |= expr(ast, b.cond) | nested(ast, b.then);
                }
            }
            traits
        }
        NodeKind::Assert(Assert { cond }) => BlockTrait::ASSERTION | expr(ast, *cond),
        NodeKind::ExplicitError(ExplicitError { arguments, .. }) => arguments
            .iter()
            .fold(BlockTrait::EXPLICIT_ERROR, |acc, &a| acc | expr(ast, a)),
        NodeKind::Binary(Binary { op, left, right }) if op.is_assign() => {
            let target = match op {
                BinaryOp::DefineAssign | BinaryOp::ConstAssign => BlockTrait::LOCAL_VARIABLE,
                _ if reads_state_variable(ast, *left) => BlockTrait::WRITE_STATE,
                _ => BlockTrait::empty(),
            };
            target | expr(ast, *right)
        }
        NodeKind::SpecifyOrder(SpecifyOrder { order_value: None, .. }) => BlockTrait::DYNAMIC_ORDER,
        NodeKind::Format(_) | NodeKind::State(_) | NodeKind::Function(_) | NodeKind::Enum(_) => {
            BlockTrait::empty()
        }
        _ => expr(ast, stmt),
    })
}

fn field(ast: &Ast, f: &Field) -> BlockTrait {
    let mut traits = field_type(ast, f.field_type);
    if let Some(args) = f.arguments.and_then(|a| ast.get::<FieldArgument>(a)) {
        if !args.arguments.is_empty() {
            traits |= BlockTrait::MAGIC_VALUE;
        }
        if args.peek_value.is_some_and(|v| v != 0) {
            traits |= BlockTrait::STATIC_PEEK;
        }
    }
    traits
}

fn field_type(ast: &Ast, ty: NodeId) -> BlockTrait {
    match ast.kind(ty) {
        &NodeKind::IntType(IntType { bit_size, .. }) => {
            let mut traits = BlockTrait::FIXED_PRIMITIVE;
            if bit_size % 8 != 0 {
                traits |= BlockTrait::BIT_FIELD;
            } else if !matches!(bit_size, 8 | 16 | 32 | 64) {
                traits |= BlockTrait::UNCOMMON_SIZE;
            }
            traits
        }
        NodeKind::FloatType(_) | NodeKind::BoolType => BlockTrait::FIXED_PRIMITIVE,
        NodeKind::StrLiteralType(_) => BlockTrait::MAGIC_VALUE,
        NodeKind::ArrayType(ArrayType { element_type, length_value, .. }) => {
            let shape = if length_value.is_some() {
                BlockTrait::FIXED_ARRAY
            } else {
                BlockTrait::VARIABLE_ARRAY
            };
            shape | field_type(ast, *element_type)
        }
        NodeKind::IdentType(IdentType { base: Some(base), .. }) => match ast.kind(*base) {
            NodeKind::Format(Format { .. }) | NodeKind::State(State { .. }) => BlockTrait::STRUCT,
            NodeKind::Enum(_) => enumeration(ast, *base),
            _ => BlockTrait::empty(),
        },
        NodeKind::EnumType(EnumType { base: Some(e) }) => enumeration(ast, *e),
        NodeKind::StructType(_) | NodeKind::StructUnionType(_) => BlockTrait::STRUCT,
        _ => BlockTrait::empty(),
    }
}

fn enumeration(ast: &Ast, e: NodeId) -> BlockTrait {
    match ast.get::<Enum>(e).and_then(|e| e.base_type) {
        Some(base) => field_type(ast, base),
        None => BlockTrait::DESCRIPTION_ONLY,
    }
}

/// Input access and state reads anywhere in an expression.
fn expr(ast: &Ast, e: NodeId) -> BlockTrait {
    ast.descendants(e)
        .into_iter()
        .fold(BlockTrait::empty(), |acc, id| match ast.kind(id) {
            NodeKind::IOOperation(IOOperation { method, .. }) => acc | io(*method),
            NodeKind::Ident(_) if is_state_variable(ast, id) => acc | BlockTrait::READ_STATE,
            _ => acc,
        })
}

fn io(method: IOMethod) -> BlockTrait {
    match method {
        IOMethod::InputBackward => BlockTrait::BACKWARD_INPUT,
        IOMethod::InputPeek => BlockTrait::STATIC_PEEK,
        IOMethod::InputGet | IOMethod::OutputPut => BlockTrait::PROCEDURAL,
        _ => BlockTrait::empty(),
    }
}

/// `s`, `s.x` or `s[i].x` where `s` is a state variable.
fn reads_state_variable(ast: &Ast, mut target: NodeId) -> bool {
    loop {
        target = match ast.kind(target) {
            NodeKind::MemberAccess(MemberAccess { target, .. }) => *target,
            NodeKind::Index(Index { expr, .. }) => *expr,
            NodeKind::Ident(_) => return is_state_variable(ast, target),
            _ => return false,
        };
    }
}

fn is_state_variable(ast: &Ast, ident: NodeId) -> bool {
    let Some(i) = ast.get::<Ident>(ident) else {
        return false;
    };
    if i.usage != IdentUsage::Reference {
        return false;
    }
    let def = ast.definition_ident(ident);
    ast.get::<Ident>(def)
        .and_then(|d| d.base)
        .and_then(|f| ast.get::<Field>(f))
        .is_some_and(|f| f.is_state_variable)
}
