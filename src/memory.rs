//! Segment addressing and the stack primitives built on it.
//!
//! Every push and pop goes through the location register: addressing leaves
//! the target RAM address in `R13`, then a single push or pop sequence
//! dereferences it. Constants are routed through the same path by parking
//! the literal in the value register `R14` and pointing `R13` at it.

use crate::command::{Direction, Segment};
use crate::error::CommandError;
use crate::symbols::{write_static_symbol, write_u16};

/// Initial stack pointer.
pub const STACK_BASE: u16 = 256;
/// First cell of the temp segment (`R5`).
pub const TEMP_BASE: u16 = 5;
/// Number of temp cells (`R5`..`R12`).
pub const TEMP_SIZE: u16 = 8;
/// Resolved target address of the current operation.
pub const LOCATION_REGISTER: &str = "R13";
/// Literal operand of `push constant`.
pub const VALUE_REGISTER: &str = "R14";
/// Return address handed to shared comparison routines.
pub const RETURN_REGISTER: &str = "R15";
/// Largest value an address-load instruction can carry.
pub const MAX_CONSTANT: u16 = 0x7FFF;
/// Number of cells a call pushes before the callee runs: return address,
/// LCL, ARG, THIS, THAT.
pub const FRAME_SIZE: u16 = 5;

/// Segment access mode for code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentAccess {
    /// Constant values (immediate)
    Constant,
    /// Indirect via base pointer (LCL, ARG, THIS, THAT)
    Indirect(&'static str),
    /// Direct RAM address (temp, pointer)
    Direct,
    /// Static variables with unit prefix
    Static,
}

/// Determine the access mode for a segment.
pub fn segment_access(segment: Segment) -> SegmentAccess {
    match segment {
        Segment::Constant => SegmentAccess::Constant,
        Segment::Local => SegmentAccess::Indirect("LCL"),
        Segment::Argument => SegmentAccess::Indirect("ARG"),
        Segment::This => SegmentAccess::Indirect("THIS"),
        Segment::That => SegmentAccess::Indirect("THAT"),
        Segment::Pointer | Segment::Temp => SegmentAccess::Direct,
        Segment::Static => SegmentAccess::Static,
    }
}

/// Temp segment is RAM[5..12], so temp i maps to RAM[5+i].
#[inline]
pub fn temp_address(index: u16) -> u16 {
    TEMP_BASE + index
}

/// pointer 0 = THIS (RAM[3]), pointer 1 = THAT (RAM[4])
#[inline]
pub fn pointer_symbol(index: u16) -> &'static str {
    if index == 0 { "THIS" } else { "THAT" }
}

/// Reject indices the segment cannot address.
pub fn validate(direction: Direction, segment: Segment, index: u16) -> Result<(), CommandError> {
    match segment {
        Segment::Constant if direction == Direction::Pop => Err(CommandError::PopToConstant),
        Segment::Constant if index > MAX_CONSTANT => {
            Err(CommandError::ConstantOutOfRange { value: index })
        }
        Segment::Pointer if index > 1 => Err(CommandError::InvalidPointerIndex { index }),
        Segment::Temp if index >= TEMP_SIZE => Err(CommandError::InvalidTempIndex { index }),
        _ => Ok(()),
    }
}

/// Emit code leaving the address of `segment[index]` in the location register.
///
/// `unit` qualifies static symbols.
pub fn write_address(
    segment: Segment,
    index: u16,
    unit: &str,
    buf: &mut String,
) -> Result<(), CommandError> {
    match segment_access(segment) {
        SegmentAccess::Constant => {
            if index > MAX_CONSTANT {
                return Err(CommandError::ConstantOutOfRange { value: index });
            }
            // R14 = index; R13 = &R14
            buf.push('@');
            write_u16(index, buf);
            buf.push_str("\nD=A\n@");
            buf.push_str(VALUE_REGISTER);
            buf.push_str("\nM=D\nD=A\n");
        }
        SegmentAccess::Indirect(base) => {
            if index == 0 {
                buf.push('@');
                buf.push_str(base);
                buf.push_str("\nD=M\n");
            } else {
                buf.push('@');
                write_u16(index, buf);
                buf.push_str("\nD=A\n@");
                buf.push_str(base);
                buf.push_str("\nD=D+M\n");
            }
        }
        SegmentAccess::Direct => {
            buf.push('@');
            if segment == Segment::Temp {
                if index >= TEMP_SIZE {
                    return Err(CommandError::InvalidTempIndex { index });
                }
                write_u16(temp_address(index), buf);
            } else {
                if index > 1 {
                    return Err(CommandError::InvalidPointerIndex { index });
                }
                buf.push_str(pointer_symbol(index));
            }
            buf.push_str("\nD=A\n");
        }
        SegmentAccess::Static => {
            buf.push('@');
            write_static_symbol(unit, index, buf);
            buf.push_str("\nD=A\n");
        }
    }

    buf.push('@');
    buf.push_str(LOCATION_REGISTER);
    buf.push_str("\nM=D\n");
    Ok(())
}

/// *SP = *R13; SP++
#[inline]
pub fn write_push_location(buf: &mut String) {
    buf.push('@');
    buf.push_str(LOCATION_REGISTER);
    buf.push_str("\nA=M\nD=M\n");
    write_push_d(buf);
}

/// SP--; *R13 = *SP
#[inline]
pub fn write_pop_location(buf: &mut String) {
    buf.push_str("@SP\nAM=M-1\nD=M\n@");
    buf.push_str(LOCATION_REGISTER);
    buf.push_str("\nA=M\nM=D\n");
}

/// *SP = D; SP++
#[inline]
pub fn write_push_d(buf: &mut String) {
    buf.push_str("@SP\nA=M\nM=D\n@SP\nM=M+1\n");
}

/// Push the value held in a named register cell (`LCL`, `ARG`, ...).
#[inline]
pub fn write_push_register(register: &str, buf: &mut String) {
    buf.push('@');
    buf.push_str(register);
    buf.push_str("\nD=M\n");
    write_push_d(buf);
}

/// Emit a complete push or pop.
pub fn write_memory_access(
    direction: Direction,
    segment: Segment,
    index: u16,
    unit: &str,
    buf: &mut String,
) -> Result<(), CommandError> {
    validate(direction, segment, index)?;
    write_address(segment, index, unit, buf)?;
    match direction {
        Direction::Push => write_push_location(buf),
        Direction::Pop => write_pop_location(buf),
    }
    Ok(())
}
