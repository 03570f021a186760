//! Operators and the small closed vocabularies attached to nodes.
//!
//! Everything here is `Copy` and compared by value; the interchange format
//! writes them as `snake_case` names.

use std::fmt;

/// Binary operators, including the assignment and range forms the parser
/// folds into `Binary` nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum BinaryOp {
    // Multiplicative
    Mul,
    Div,
    Mod,
    // Shifts
    LeftArithmeticShift,
    RightArithmeticShift,
    LeftLogicalShift,
    RightLogicalShift,
    // Additive / bitwise
    BitAnd,
    Add,
    Sub,
    BitOr,
    BitXor,
    // Comparison
    Equal,
    NotEqual,
    Less,
    LessOrEq,
    Greater,
    GreaterOrEq,
    // Logical
    LogicalAnd,
    LogicalOr,
    // Ternary halves, only transient inside the parser
    CondOp1,
    CondOp2,
    // Ranges
    RangeExclusive,
    RangeInclusive,
    // Assignment
    Assign,
    DefineAssign,
    ConstAssign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    LeftLogicalShiftAssign,
    RightLogicalShiftAssign,
    LeftArithmeticShiftAssign,
    RightArithmeticShiftAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    /// `for x in <expr>` binder.
    InAssign,
    Comma,
}

impl BinaryOp {
    /// Source-level symbol, used in diagnostics.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::LeftArithmeticShift => "<<<",
            Self::RightArithmeticShift => ">>>",
            Self::LeftLogicalShift => "<<",
            Self::RightLogicalShift => ">>",
            Self::BitAnd => "&",
            Self::Add => "+",
            Self::Sub => "-",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEq => "<=",
            Self::Greater => ">",
            Self::GreaterOrEq => ">=",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::CondOp1 => "?",
            Self::CondOp2 => ":",
            Self::RangeExclusive => "..",
            Self::RangeInclusive => "..=",
            Self::Assign => "=",
            Self::DefineAssign => ":=",
            Self::ConstAssign => "::=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::LeftLogicalShiftAssign => "<<=",
            Self::RightLogicalShiftAssign => ">>=",
            Self::LeftArithmeticShiftAssign => "<<<=",
            Self::RightArithmeticShiftAssign => ">>>=",
            Self::BitAndAssign => "&=",
            Self::BitOrAssign => "|=",
            Self::BitXorAssign => "^=",
            Self::InAssign => "in",
            Self::Comma => ",",
        }
    }

    /// Every form that binds or writes its left operand.
    pub const fn is_assign(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::DefineAssign
                | Self::ConstAssign
                | Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::DivAssign
                | Self::ModAssign
                | Self::LeftLogicalShiftAssign
                | Self::RightLogicalShiftAssign
                | Self::LeftArithmeticShiftAssign
                | Self::RightArithmeticShiftAssign
                | Self::BitAndAssign
                | Self::BitOrAssign
                | Self::BitXorAssign
                | Self::InAssign
        )
    }

    /// Operators typed through the common-type rule.
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::Mod
                | Self::LeftArithmeticShift
                | Self::RightArithmeticShift
                | Self::LeftLogicalShift
                | Self::RightLogicalShift
        )
    }

    pub const fn is_bitwise(self) -> bool {
        matches!(self, Self::BitAnd | Self::BitOr | Self::BitXor)
    }

    pub const fn is_compare(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessOrEq
                | Self::Greater
                | Self::GreaterOrEq
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }

    pub const fn is_range(self) -> bool {
        matches!(self, Self::RangeExclusive | Self::RangeInclusive)
    }

    /// The arithmetic operator a compound assignment applies.
    pub const fn compound_base(self) -> Option<BinaryOp> {
        Some(match self {
            Self::AddAssign => Self::Add,
            Self::SubAssign => Self::Sub,
            Self::MulAssign => Self::Mul,
            Self::DivAssign => Self::Div,
            Self::ModAssign => Self::Mod,
            Self::LeftLogicalShiftAssign => Self::LeftLogicalShift,
            Self::RightLogicalShiftAssign => Self::RightLogicalShift,
            Self::LeftArithmeticShiftAssign => Self::LeftArithmeticShift,
            Self::RightArithmeticShiftAssign => Self::RightArithmeticShift,
            Self::BitAndAssign => Self::BitAnd,
            Self::BitOrAssign => Self::BitOr,
            Self::BitXorAssign => Self::BitXor,
            _ => return None,
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum UnaryOp {
    /// `!`: logical not on bool, bit complement on integers.
    Not,
    /// `-`
    MinusSign,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::MinusSign => "-",
        }
    }
}

/// What an identifier occurrence means once resolved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum IdentUsage {
    #[default]
    Unknown,
    BadIdent,
    Reference,
    DefineVariable,
    DefineConst,
    DefineField,
    DefineFormat,
    DefineState,
    DefineEnum,
    DefineEnumMember,
    DefineFn,
    DefineCastFn,
    DefineArg,
    ReferenceType,
    ReferenceMember,
    ReferenceMemberType,
    MaybeType,
    ReferenceBuiltinFn,
}

impl IdentUsage {
    /// Usages that never introduce a binding and so are skipped by lookup.
    pub const fn is_lookup_candidate(self) -> bool {
        !matches!(
            self,
            Self::Unknown
                | Self::Reference
                | Self::ReferenceType
                | Self::MaybeType
                | Self::ReferenceMember
                | Self::ReferenceMemberType
        )
    }

    /// Definitions that name a type (referencing them yields a type literal).
    pub const fn defines_type(self) -> bool {
        matches!(self, Self::DefineEnum | Self::DefineFormat | Self::DefineState)
    }
}

/// Compile-time knowledge about an expression's value.
///
/// `Unknown` is "not analyzed yet". Among analyzed levels `Variable`
/// dominates, then `ImmutableVariable`, then `Constant`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum ConstantLevel {
    #[default]
    Unknown,
    Constant,
    ImmutableVariable,
    Variable,
}

impl ConstantLevel {
    /// Level of a value computed from two operands.
    ///
    /// Commutative; `Variable` absorbs everything including `Unknown`.
    #[must_use]
    pub const fn combine(self, other: ConstantLevel) -> ConstantLevel {
        match (self, other) {
            (Self::Variable, _) | (_, Self::Variable) => Self::Variable,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::Constant, Self::Constant) => Self::Constant,
            _ => Self::ImmutableVariable,
        }
    }
}

/// Builtin I/O directive an `IOOperation` stands for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum IOMethod {
    #[default]
    Unspec,
    OutputPut,
    InputPeek,
    InputGet,
    InputBackward,
    InputOffset,
    InputBitOffset,
    InputRemain,
    InputSubrange,
    ConfigEndianLittle,
    ConfigEndianBig,
    ConfigEndianNative,
    ConfigBitOrderLsb,
    ConfigBitOrderMsb,
}

impl IOMethod {
    /// Dotted source name of the directive.
    pub const fn as_name(self) -> &'static str {
        match self {
            Self::Unspec => "unspec",
            Self::OutputPut => "output.put",
            Self::InputPeek => "input.peek",
            Self::InputGet => "input.get",
            Self::InputBackward => "input.backward",
            Self::InputOffset => "input.offset",
            Self::InputBitOffset => "input.bit_offset",
            Self::InputRemain => "input.remain",
            Self::InputSubrange => "input.subrange",
            Self::ConfigEndianLittle => "config.endian.little",
            Self::ConfigEndianBig => "config.endian.big",
            Self::ConfigEndianNative => "config.endian.native",
            Self::ConfigBitOrderLsb => "config.bit_order.lsb",
            Self::ConfigBitOrderMsb => "config.bit_order.msb",
        }
    }

    /// Directives written as a bare member access (`input.offset`).
    pub fn from_member_name(name: &str) -> Option<IOMethod> {
        Some(match name {
            "input.offset" => Self::InputOffset,
            "input.bit_offset" => Self::InputBitOffset,
            "input.remain" => Self::InputRemain,
            "config.endian.little" => Self::ConfigEndianLittle,
            "config.endian.big" => Self::ConfigEndianBig,
            "config.endian.native" => Self::ConfigEndianNative,
            "config.bit_order.lsb" => Self::ConfigBitOrderLsb,
            "config.bit_order.msb" => Self::ConfigBitOrderMsb,
            _ => return None,
        })
    }

    /// Directives written as a call (`input.get(u8)`).
    pub fn from_call_name(name: &str) -> Option<IOMethod> {
        Some(match name {
            "input.get" => Self::InputGet,
            "input.peek" => Self::InputPeek,
            "input.backward" => Self::InputBackward,
            "output.put" => Self::OutputPut,
            "input.subrange" => Self::InputSubrange,
            _ => return None,
        })
    }

    pub const fn is_config_flag(self) -> bool {
        matches!(
            self,
            Self::ConfigEndianLittle
                | Self::ConfigEndianBig
                | Self::ConfigEndianNative
                | Self::ConfigBitOrderLsb
                | Self::ConfigBitOrderMsb
        )
    }
}

/// Byte order of an integer or float type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum Endian {
    #[default]
    Unspec,
    Big,
    Little,
}

/// Which order a `SpecifyOrder` directive sets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum OrderType {
    /// `input.endian = ...`
    Byte,
    /// `input.bit_order = ...`
    Bit,
}

/// The `input`/`output`/`config` keywords.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum SpecialLiteralKind {
    Input,
    Output,
    Config,
}

impl SpecialLiteralKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Config => "config",
        }
    }
}

bitflags::bitflags! {
    /// How a field's fixed-value arguments relate to its type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
    pub struct FieldArgumentMapping: u8 {
        /// The argument is the field's value.
        const DIRECT = 1 << 0;
        /// The argument is repeated for every array element.
        const REPEAT = 1 << 1;
        /// The argument is one of several accepted values.
        const SOME_CANDIDATE = 1 << 2;
    }
}

/// Bit position, within a byte, at which a value of a type ends when it
/// starts on a byte boundary.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "snake_case"))]
pub enum BitAlignment {
    /// Not a wire type (functions, metatypes...).
    #[default]
    NotTarget,
    ByteAligned,
    Bit1,
    Bit2,
    Bit3,
    Bit4,
    Bit5,
    Bit6,
    Bit7,
    /// Depends on values only known while decoding.
    NotDecidable,
}

impl BitAlignment {
    /// Alignment of a value `bits` long.
    pub const fn of_bits(bits: u64) -> Self {
        match bits % 8 {
            0 => Self::ByteAligned,
            1 => Self::Bit1,
            2 => Self::Bit2,
            3 => Self::Bit3,
            4 => Self::Bit4,
            5 => Self::Bit5,
            6 => Self::Bit6,
            _ => Self::Bit7,
        }
    }

    /// Bits past the last byte boundary; `None` when not decidable or not
    /// a wire type.
    pub const fn remainder(self) -> Option<u64> {
        match self {
            Self::ByteAligned => Some(0),
            Self::Bit1 => Some(1),
            Self::Bit2 => Some(2),
            Self::Bit3 => Some(3),
            Self::Bit4 => Some(4),
            Self::Bit5 => Some(5),
            Self::Bit6 => Some(6),
            Self::Bit7 => Some(7),
            Self::NotTarget | Self::NotDecidable => None,
        }
    }
}

bitflags::bitflags! {
    /// What the statements of a block do, for backends choosing a
    /// decoding strategy. Traits of nested `if`/`for` blocks are folded
    /// into the enclosing block, except `BIT_STREAM`.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
    pub struct BlockTrait: u32 {
        const FIXED_PRIMITIVE = 1 << 0;
        /// An integer field whose width is not a multiple of 8.
        const BIT_FIELD = 1 << 1;
        /// A byte-multiple integer wider or narrower than 8/16/32/64.
        const UNCOMMON_SIZE = 1 << 2;
        const EXPLICIT_ERROR = 1 << 3;
        const ASSERTION = 1 << 4;
        const CONDITIONAL = 1 << 5;
        const FOR_LOOP = 1 << 6;
        const LOCAL_VARIABLE = 1 << 7;
        const STRUCT = 1 << 8;
        const FIXED_ARRAY = 1 << 9;
        const VARIABLE_ARRAY = 1 << 10;
        /// An enum field without a base type.
        const DESCRIPTION_ONLY = 1 << 11;
        /// A field with fixed-value arguments or a string literal type.
        const MAGIC_VALUE = 1 << 12;
        const READ_STATE = 1 << 13;
        const WRITE_STATE = 1 << 14;
        const STATIC_PEEK = 1 << 15;
        const BACKWARD_INPUT = 1 << 16;
        /// Reads or writes through `input.get` / `output.put`.
        const PROCEDURAL = 1 << 17;
        /// The block's struct does not end on a byte boundary.
        const BIT_STREAM = 1 << 18;
        /// A byte order chosen at decode time.
        const DYNAMIC_ORDER = 1 << 19;
    }
}
