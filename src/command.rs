//! The closed set of VM commands.
//!
//! One source line maps to exactly one [`VmCommand`]. Every emitter matches
//! exhaustively on these types, so adding a variant forces every stage of the
//! translator to handle it.

use std::fmt;

/// Arithmetic and logical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 9] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Neg,
        ArithmeticOp::Eq,
        ArithmeticOp::Gt,
        ArithmeticOp::Lt,
        ArithmeticOp::And,
        ArithmeticOp::Or,
        ArithmeticOp::Not,
    ];

    /// VM keyword for this operation.
    pub fn keyword(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    /// The comparison kind, if this operation needs a conditional branch.
    pub fn comparison(self) -> Option<Comparison> {
        match self {
            ArithmeticOp::Eq => Some(Comparison::Eq),
            ArithmeticOp::Gt => Some(Comparison::Gt),
            ArithmeticOp::Lt => Some(Comparison::Lt),
            _ => None,
        }
    }

    #[inline]
    pub fn is_unary(self) -> bool {
        matches!(self, ArithmeticOp::Neg | ArithmeticOp::Not)
    }
}

/// The three operations that branch on the sign of `x - y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Comparison {
    Eq,
    Gt,
    Lt,
}

impl Comparison {
    pub const ALL: [Comparison; 3] = [Comparison::Eq, Comparison::Gt, Comparison::Lt];

    /// Jump mnemonic taken when the comparison holds.
    pub fn jump(self) -> &'static str {
        match self {
            Comparison::Eq => "JEQ",
            Comparison::Gt => "JGT",
            Comparison::Lt => "JLT",
        }
    }

    /// Upper-case tag used in generated symbols.
    pub fn tag(self) -> &'static str {
        match self {
            Comparison::Eq => "EQ",
            Comparison::Gt => "GT",
            Comparison::Lt => "LT",
        }
    }

    /// Dense index for per-kind counter arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::Constant,
        Segment::Local,
        Segment::Argument,
        Segment::Static,
        Segment::This,
        Segment::That,
        Segment::Pointer,
        Segment::Temp,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

/// Direction of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Push,
    Pop,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Push => "push",
            Direction::Pop => "pop",
        }
    }
}

/// VM command variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithmeticOp),

    MemoryAccess {
        direction: Direction,
        segment: Segment,
        index: u16,
    },

    Label { name: String },
    Goto { label: String },
    IfGoto { label: String },

    Function { name: String, num_locals: u16 },
    Call { name: String, num_args: u16 },
    Return,
}

impl VmCommand {
    /// Shorthand for `push segment index`.
    pub fn push(segment: Segment, index: u16) -> Self {
        VmCommand::MemoryAccess {
            direction: Direction::Push,
            segment,
            index,
        }
    }

    /// Shorthand for `pop segment index`.
    pub fn pop(segment: Segment, index: u16) -> Self {
        VmCommand::MemoryAccess {
            direction: Direction::Pop,
            segment,
            index,
        }
    }

    /// Leading keyword of the command as written in VM source.
    pub fn keyword(&self) -> &'static str {
        match self {
            VmCommand::Arithmetic(op) => op.keyword(),
            VmCommand::MemoryAccess { direction, .. } => direction.keyword(),
            VmCommand::Label { .. } => "label",
            VmCommand::Goto { .. } => "goto",
            VmCommand::IfGoto { .. } => "if-goto",
            VmCommand::Function { .. } => "function",
            VmCommand::Call { .. } => "call",
            VmCommand::Return => "return",
        }
    }
}

impl fmt::Display for VmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmCommand::Arithmetic(op) => f.write_str(op.keyword()),
            VmCommand::MemoryAccess {
                direction,
                segment,
                index,
            } => write!(
                f,
                "{} {} {}",
                direction.keyword(),
                segment.keyword(),
                index
            ),
            VmCommand::Label { name } => write!(f, "label {}", name),
            VmCommand::Goto { label } => write!(f, "goto {}", label),
            VmCommand::IfGoto { label } => write!(f, "if-goto {}", label),
            VmCommand::Function { name, num_locals } => {
                write!(f, "function {} {}", name, num_locals)
            }
            VmCommand::Call { name, num_args } => write!(f, "call {} {}", name, num_args),
            VmCommand::Return => f.write_str("return"),
        }
    }
}
