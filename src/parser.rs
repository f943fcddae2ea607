//! Line scanner for VM source.
//!
//! Strips comments and whitespace and turns each remaining line into a typed
//! [`VmCommand`]. Only the shape of a command is checked here; range checks
//! that depend on the segment belong to the segment addressor.

use phf::phf_map;

use crate::command::{ArithmeticOp, Direction, Segment, VmCommand};
use crate::error::CommandError;

/// Operation keywords (compile-time perfect hash map)
static ARITHMETIC: phf::Map<&'static str, ArithmeticOp> = phf_map! {
    "add" => ArithmeticOp::Add,
    "sub" => ArithmeticOp::Sub,
    "neg" => ArithmeticOp::Neg,
    "eq" => ArithmeticOp::Eq,
    "gt" => ArithmeticOp::Gt,
    "lt" => ArithmeticOp::Lt,
    "and" => ArithmeticOp::And,
    "or" => ArithmeticOp::Or,
    "not" => ArithmeticOp::Not,
};

static SEGMENTS: phf::Map<&'static str, Segment> = phf_map! {
    "constant" => Segment::Constant,
    "local" => Segment::Local,
    "argument" => Segment::Argument,
    "static" => Segment::Static,
    "this" => Segment::This,
    "that" => Segment::That,
    "pointer" => Segment::Pointer,
    "temp" => Segment::Temp,
};

/// Strip comments and whitespace
#[inline]
pub fn clean_line(line: &str) -> &str {
    line.split("//").next().unwrap_or("").trim()
}

/// Parse a single VM line into a command.
///
/// Returns `Ok(None)` for empty lines and comments.
pub fn parse_line(line: &str) -> Result<Option<VmCommand>, CommandError> {
    let line = clean_line(line);
    if line.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let keyword = parts[0];

    if let Some(&op) = ARITHMETIC.get(keyword) {
        expect_arity(&parts, 1, op.keyword())?;
        return Ok(Some(VmCommand::Arithmetic(op)));
    }

    let cmd = match keyword {
        "push" => parse_memory_access(&parts, Direction::Push)?,
        "pop" => parse_memory_access(&parts, Direction::Pop)?,
        "label" => VmCommand::Label {
            name: parse_label_name(&parts, "label")?,
        },
        "goto" => VmCommand::Goto {
            label: parse_label_name(&parts, "goto")?,
        },
        "if-goto" => VmCommand::IfGoto {
            label: parse_label_name(&parts, "if-goto")?,
        },
        "function" => {
            let (name, num_locals) = parse_named_count(&parts, "function")?;
            VmCommand::Function { name, num_locals }
        }
        "call" => {
            let (name, num_args) = parse_named_count(&parts, "call")?;
            VmCommand::Call { name, num_args }
        }
        "return" => {
            expect_arity(&parts, 1, "return")?;
            VmCommand::Return
        }
        _ => {
            return Err(CommandError::InvalidCommand {
                command: keyword.to_string(),
            });
        }
    };

    Ok(Some(cmd))
}

/// Parse every line of a unit, keeping 1-based line numbers and the raw text.
///
/// Stops at the first malformed line.
pub fn parse_source(source: &str) -> impl Iterator<Item = ParsedLine<'_>> + '_ {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, text)| match parse_line(text) {
            Ok(None) => None,
            Ok(Some(command)) => Some(ParsedLine {
                line: i + 1,
                text,
                command: Ok(command),
            }),
            Err(e) => Some(ParsedLine {
                line: i + 1,
                text,
                command: Err(e),
            }),
        })
}

/// A non-empty source line and what it parsed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub line: usize,
    pub text: &'a str,
    pub command: Result<VmCommand, CommandError>,
}

fn expect_arity(parts: &[&str], arity: usize, command: &'static str) -> Result<(), CommandError> {
    if parts.len() < arity {
        return Err(CommandError::MissingArgument { command });
    }
    if parts.len() > arity {
        return Err(CommandError::UnexpectedArgument {
            command,
            extra: parts[arity].to_string(),
        });
    }
    Ok(())
}

fn parse_memory_access(parts: &[&str], direction: Direction) -> Result<VmCommand, CommandError> {
    expect_arity(parts, 3, direction.keyword())?;

    let segment = SEGMENTS
        .get(parts[1])
        .copied()
        .ok_or_else(|| CommandError::InvalidSegment {
            segment: parts[1].to_string(),
        })?;
    let index = parse_number(parts[2])?;

    Ok(VmCommand::MemoryAccess {
        direction,
        segment,
        index,
    })
}

fn parse_label_name(parts: &[&str], command: &'static str) -> Result<String, CommandError> {
    expect_arity(parts, 2, command)?;

    let name = parts[1];
    if !is_symbol(name) {
        return Err(CommandError::InvalidLabelName {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

fn parse_named_count(parts: &[&str], command: &'static str) -> Result<(String, u16), CommandError> {
    expect_arity(parts, 3, command)?;

    let name = parts[1];
    if !is_symbol(name) {
        return Err(CommandError::InvalidFunctionName {
            name: name.to_string(),
        });
    }
    let count = parse_number(parts[2])?;

    Ok((name.to_string(), count))
}

fn parse_number(s: &str) -> Result<u16, CommandError> {
    s.parse::<u16>().map_err(|_| CommandError::InvalidNumber {
        value: s.to_string(),
    })
}

/// Whether `s` is usable inside an assembly symbol: letters, digits and
/// `_ . $ :`, not starting with a digit.
pub fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => false,
        Some(_) => s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')),
        None => false,
    }
}
