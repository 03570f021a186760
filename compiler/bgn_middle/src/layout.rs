//! Wire shape of composite types: which format structs embed themselves,
//! and the bit size and alignment of every struct, union and array.
//!
//! A struct's shape comes from its block's statements, in order. A field
//! contributes its type and a `match` that declares fields contributes its
//! struct union. An `if` or `for` that declares fields makes the struct
//! opaque: its size and alignment depend on values only known while
//! decoding.

use bgn_ir::{
    ArrayType, Ast, BitAlignment, Enum, EnumType, Field, FloatType, Format, IdentType, If,
    IndentBlock, IntType, Loop, Match, MatchBranch, NodeId, NodeKind, Program, ScopedStatement,
    State, StrLiteral, StrLiteralType, StructType, StructUnionType, TypeLayout,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// One statement's contribution to the shape of a struct.
#[derive(Copy, Clone)]
enum Part {
    Type(NodeId),
    Opaque,
}

/// Statements of the block each struct type describes.
struct Blocks(FxHashMap<NodeId, Vec<NodeId>>);

impl Blocks {
    fn collect(ast: &Ast, root: NodeId) -> Self {
        let mut map = FxHashMap::default();
        for id in ast.descendants(root) {
            let (struct_type, elements) = match ast.kind(id) {
                NodeKind::Program(Program { struct_type, elements, .. })
                | NodeKind::IndentBlock(IndentBlock { struct_type, elements, .. }) => {
                    (*struct_type, elements.clone())
                }
                NodeKind::ScopedStatement(ScopedStatement { struct_type, statement, .. }) => {
                    (*struct_type, vec![*statement])
                }
                _ => continue,
            };
            if let Some(st) = struct_type {
                map.insert(st, elements);
            }
        }
        Self(map)
    }

    /// Statements behind `st`. A union member struct reads its match
    /// branch's body.
    fn statements(&self, ast: &Ast, st: NodeId) -> Vec<NodeId> {
        if let Some(elements) = self.0.get(&st) {
            return elements.clone();
        }
        let branch = ast
            .get::<StructType>(st)
            .and_then(|s| s.base)
            .and_then(|b| ast.get::<MatchBranch>(b));
        match branch.map(|b| ast.kind(b.then)) {
            Some(NodeKind::IndentBlock(block)) => block.elements.clone(),
            Some(NodeKind::ScopedStatement(scoped)) => vec![scoped.statement],
            _ => ast.get::<StructType>(st).map(|s| s.fields.clone()).unwrap_or_default(),
        }
    }

    fn parts(&self, ast: &Ast, st: NodeId) -> Vec<Part> {
        self.statements(ast, st)
            .into_iter()
            .filter_map(|stmt| match ast.kind(stmt) {
                NodeKind::Field(Field { field_type, .. }) => Some(Part::Type(*field_type)),
                NodeKind::Match(Match { struct_union_type: Some(su), .. }) => Some(Part::Type(*su)),
                NodeKind::If(If { .. }) | NodeKind::Loop(Loop { .. }) | NodeKind::Match(_)
                    if declares_field(ast, stmt) =>
                {
                    Some(Part::Opaque)
                }
                _ => None,
            })
            .collect()
    }
}

fn declares_field(ast: &Ast, stmt: NodeId) -> bool {
    ast.descendants(stmt).into_iter().any(|d| ast.is::<Field>(d))
}

/// The struct a named type stands for, or the type itself.
fn resolve(ast: &Ast, ty: NodeId) -> NodeId {
    let Some(base) = ast.get::<IdentType>(ty).and_then(|t| t.base) else {
        return ty;
    };
    let body = match ast.kind(base) {
        NodeKind::Format(Format { body, .. }) | NodeKind::State(State { body, .. }) => *body,
        _ => return base,
    };
    ast.get::<IndentBlock>(body)
        .and_then(|b| b.struct_type)
        .unwrap_or(ty)
}

/// Structs a value of `ty` embeds directly.
fn embedded(ast: &Ast, ty: NodeId, out: &mut Vec<NodeId>) {
    let ty = resolve(ast, ty);
    match ast.kind(ty) {
        NodeKind::StructType(_) => out.push(ty),
        NodeKind::ArrayType(ArrayType { element_type, .. }) => embedded(ast, *element_type, out),
        NodeKind::StructUnionType(StructUnionType { structs, .. }) => out.extend(structs),
        _ => {}
    }
}

/// Flags the struct of every format or state whose decoding reaches its
/// own struct again.
#[tracing::instrument(level = "trace", skip_all)]
pub fn mark_recursive_reference(ast: &mut Ast, root: NodeId) {
    let blocks = Blocks::collect(ast, root);
    let owners: Vec<NodeId> = ast
        .descendants(root)
        .into_iter()
        .filter_map(|id| match ast.kind(id) {
            NodeKind::Format(Format { body, .. }) | NodeKind::State(State { body, .. }) => {
                ast.get::<IndentBlock>(*body).and_then(|b| b.struct_type)
            }
            _ => None,
        })
        .collect();
    for st in owners {
        if reaches(ast, &blocks, st) {
            tracing::trace!(?st, "recursive struct");
            if let Some(s) = ast.get_mut::<StructType>(st) {
                s.recursive = true;
            }
        }
    }
}

fn reaches(ast: &Ast, blocks: &Blocks, start: NodeId) -> bool {
    let mut seen = FxHashSet::default();
    let mut stack = vec![start];
    while let Some(st) = stack.pop() {
        for part in blocks.parts(ast, st) {
            let Part::Type(ty) = part else { continue };
            let mut next = Vec::new();
            embedded(ast, ty, &mut next);
            for n in next {
                if n == start {
                    return true;
                }
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
    }
    false
}

/// Fills in [`TypeLayout`] on every struct, struct union and array type in
/// the tree. Run after [`mark_recursive_reference`].
#[tracing::instrument(level = "trace", skip_all)]
pub fn analyze_layout(ast: &mut Ast, root: NodeId) {
    let mut layouts = Layouts {
        blocks: Blocks::collect(ast, root),
        done: FxHashMap::default(),
        visiting: FxHashSet::default(),
    };
    let targets: Vec<NodeId> = ast
        .descendants(root)
        .into_iter()
        .filter(|&id| {
            matches!(
                ast.kind(id),
                NodeKind::StructType(_) | NodeKind::StructUnionType(_) | NodeKind::ArrayType(_)
            )
        })
        .collect();
    for &id in &targets {
        layouts.of(ast, id);
    }
    for (id, layout) in layouts.done {
        if let Some(s) = ast.get_mut::<StructType>(id) {
            s.layout = layout;
        } else if let Some(s) = ast.get_mut::<StructUnionType>(id) {
            s.layout = layout;
        } else if let Some(a) = ast.get_mut::<ArrayType>(id) {
            a.layout = layout;
        }
    }
    tracing::trace!(count = targets.len(), "layouts");
}

const DYNAMIC: TypeLayout = TypeLayout {
    bit_size: None,
    bit_alignment: BitAlignment::NotDecidable,
    non_dynamic: false,
};

const fn fixed(bits: u64) -> TypeLayout {
    TypeLayout {
        bit_size: Some(bits),
        bit_alignment: BitAlignment::of_bits(bits),
        non_dynamic: true,
    }
}

struct Layouts {
    blocks: Blocks,
    done: FxHashMap<NodeId, TypeLayout>,
    /// Structs on the current path; meeting one again is a recursive
    /// embedding.
    visiting: FxHashSet<NodeId>,
}

impl Layouts {
    fn of(&mut self, ast: &Ast, ty: NodeId) -> TypeLayout {
        if let Some(&done) = self.done.get(&ty) {
            return done;
        }
        bgn_stack::ensure_sufficient_stack(|| {
            let ty = resolve(ast, ty);
            match ast.kind(ty) {
                NodeKind::IntType(IntType { bit_size, .. })
                | NodeKind::FloatType(FloatType { bit_size, .. }) => fixed(*bit_size),
                NodeKind::BoolType => fixed(1),
                NodeKind::StrLiteralType(StrLiteralType { base }) => {
                    let bytes = ast.get::<StrLiteral>(*base).map_or(0, |s| s.length);
                    fixed(bytes * 8)
                }
                NodeKind::EnumType(EnumType { base: Some(e) }) => self.enumeration(ast, *e),
                NodeKind::Enum(_) => self.enumeration(ast, ty),
                NodeKind::ArrayType(_) => self.array(ast, ty),
                NodeKind::StructType(_) => self.structure(ast, ty),
                NodeKind::StructUnionType(_) => self.union(ast, ty),
                _ => TypeLayout::default(),
            }
        })
    }

    /// An enum without a base type only describes values.
    fn enumeration(&mut self, ast: &Ast, e: NodeId) -> TypeLayout {
        match ast.get::<Enum>(e).and_then(|e| e.base_type) {
            Some(base) => self.of(ast, base),
            None => TypeLayout::default(),
        }
    }

    fn array(&mut self, ast: &Ast, ty: NodeId) -> TypeLayout {
        let Some(array) = ast.get::<ArrayType>(ty) else {
            return DYNAMIC;
        };
        let (element_type, length) = (array.element_type, array.length_value);
        let element = self.of(ast, element_type);
        let bit_size = element.bit_size.zip(length).map(|(bits, n)| bits * n);
        let bit_alignment = match (element.bit_alignment.remainder(), length) {
            (Some(0), _) => BitAlignment::ByteAligned,
            (Some(rem), Some(n)) => BitAlignment::of_bits(rem * n),
            _ => BitAlignment::NotDecidable,
        };
        let layout = TypeLayout {
            bit_size,
            bit_alignment,
            non_dynamic: length.is_some() && element.non_dynamic,
        };
        self.done.insert(ty, layout);
        layout
    }

    fn structure(&mut self, ast: &Ast, st: NodeId) -> TypeLayout {
        if !self.visiting.insert(st) {
            return DYNAMIC;
        }
        let mut bit_size = Some(0u64);
        let mut remainder = Some(0u64);
        let mut non_dynamic = ast.get::<StructType>(st).is_some_and(|s| !s.recursive);
        for part in self.blocks.parts(ast, st) {
            let layout = match part {
                Part::Type(ty) => self.of(ast, ty),
                Part::Opaque => DYNAMIC,
            };
            bit_size = bit_size.zip(layout.bit_size).map(|(a, b)| a + b);
            remainder = remainder
                .zip(layout.bit_alignment.remainder())
                .map(|(a, b)| (a + b) % 8);
            non_dynamic &= layout.non_dynamic;
        }
        self.visiting.remove(&st);
        let layout = TypeLayout {
            bit_size,
            bit_alignment: remainder.map_or(BitAlignment::NotDecidable, BitAlignment::of_bits),
            non_dynamic,
        };
        self.done.insert(st, layout);
        layout
    }

    /// Size and alignment survive only when every alternative agrees. A
    /// non-exhaustive union may also decode nothing.
    fn union(&mut self, ast: &Ast, su: NodeId) -> TypeLayout {
        let Some(union) = ast.get::<StructUnionType>(su) else {
            return DYNAMIC;
        };
        let exhaustive = union.exhaustive;
        let mut alternatives: Vec<TypeLayout> = union
            .structs
            .clone()
            .into_iter()
            .map(|st| self.of(ast, st))
            .collect();
        if !exhaustive {
            alternatives.push(fixed(0));
        }
        let first = alternatives.first().copied().unwrap_or_else(|| fixed(0));
        let same_size = alternatives.iter().all(|l| l.bit_size == first.bit_size);
        let same_alignment = alternatives
            .iter()
            .all(|l| l.bit_alignment == first.bit_alignment);
        let layout = TypeLayout {
            bit_size: first.bit_size.filter(|_| same_size),
            bit_alignment: if same_alignment {
                first.bit_alignment
            } else {
                BitAlignment::NotDecidable
            },
            non_dynamic: alternatives.iter().all(|l| l.non_dynamic),
        };
        self.done.insert(su, layout);
        layout
    }
}
