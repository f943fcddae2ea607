//! Calling convention and program flow.
//!
//! A call pushes a five-cell frame below the callee's locals:
//!
//! ```text
//! ARG -> arg 0 .. arg n-1
//!        return address
//!        saved LCL
//!        saved ARG
//!        saved THIS
//!        saved THAT
//! LCL -> local 0 .. local k-1
//!        working stack
//! ```
//!
//! `return` reads everything back relative to the callee's LCL, which is
//! restored last so the offsets stay valid throughout.

use crate::config::Strategy;
use crate::context::TranslationContext;
use crate::error::CommandError;
use crate::memory::{
    FRAME_SIZE, LOCATION_REGISTER, MAX_CONSTANT, VALUE_REGISTER, write_push_d, write_push_register,
};
use crate::symbols::{CALL_ROUTINE, RETURN_ROUTINE, write_label_symbol, write_u16};

/// Caller state saved by a call, in push order.
const SAVED_POINTERS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

// =========================================================================
// Program Flow Commands
// =========================================================================

pub fn write_label(name: &str, ctx: &TranslationContext, buf: &mut String) -> Result<(), CommandError> {
    let function = ctx.require_function("label")?;
    buf.push('(');
    write_label_symbol(function, name, buf);
    buf.push_str(")\n");
    Ok(())
}

pub fn write_goto(label: &str, ctx: &TranslationContext, buf: &mut String) -> Result<(), CommandError> {
    let function = ctx.require_function("goto")?;
    buf.push('@');
    write_label_symbol(function, label, buf);
    buf.push_str("\n0;JMP\n");
    Ok(())
}

/// Pop and jump when the value is non-zero.
pub fn write_if_goto(
    label: &str,
    ctx: &TranslationContext,
    buf: &mut String,
) -> Result<(), CommandError> {
    let function = ctx.require_function("if-goto")?;
    buf.push_str("@SP\nAM=M-1\nD=M\n@");
    write_label_symbol(function, label, buf);
    buf.push_str("\nD;JNE\n");
    Ok(())
}

// =========================================================================
// Function Commands
// =========================================================================

/// Entry label plus zeroed locals. Makes `name` the current function.
pub fn write_function(name: &str, num_locals: u16, ctx: &mut TranslationContext, buf: &mut String) {
    let entry = ctx.enter_function(name);
    buf.push('(');
    buf.push_str(entry);
    buf.push_str(")\n");

    for _ in 0..num_locals {
        buf.push_str("@SP\nA=M\nM=0\n@SP\nM=M+1\n");
    }
}

/// Call `name` with the top `num_args` stack values as its arguments.
pub fn write_call(
    name: &str,
    num_args: u16,
    strategy: Strategy,
    ctx: &mut TranslationContext,
    buf: &mut String,
) -> Result<(), CommandError> {
    let target = ctx.qualify(name);
    let ret = ctx.next_return_symbol()?;
    write_call_to(&target, num_args, &ret, strategy, buf)
}

/// Call sequence for an already-qualified target and return label.
pub fn write_call_to(
    target: &str,
    num_args: u16,
    ret: &str,
    strategy: Strategy,
    buf: &mut String,
) -> Result<(), CommandError> {
    let arg_offset = arg_offset(num_args)?;

    match strategy {
        Strategy::Inline => {
            // push return address
            buf.push('@');
            buf.push_str(ret);
            buf.push_str("\nD=A\n");
            write_push_d(buf);

            write_frame_setup(buf, |buf| {
                // ARG = SP - num_args - 5
                buf.push_str("@SP\nD=M\n@");
                write_u16(arg_offset, buf);
                buf.push_str("\nD=D-A\n");
            });

            buf.push('@');
            buf.push_str(target);
            buf.push_str("\n0;JMP\n");
        }
        Strategy::Shared => {
            // R13 = num_args + 5; R14 = target; D = return address
            buf.push('@');
            write_u16(arg_offset, buf);
            buf.push_str("\nD=A\n@");
            buf.push_str(LOCATION_REGISTER);
            buf.push_str("\nM=D\n@");
            buf.push_str(target);
            buf.push_str("\nD=A\n@");
            buf.push_str(VALUE_REGISTER);
            buf.push_str("\nM=D\n@");
            buf.push_str(ret);
            buf.push_str("\nD=A\n@");
            buf.push_str(CALL_ROUTINE);
            buf.push_str("\n0;JMP\n");
        }
    }

    buf.push('(');
    buf.push_str(ret);
    buf.push_str(")\n");
    Ok(())
}

/// Body of the shared call routine.
///
/// Expects the return address in D, `num_args + 5` in R13 and the callee
/// address in R14.
pub fn write_call_routine(buf: &mut String) {
    buf.push('(');
    buf.push_str(CALL_ROUTINE);
    buf.push_str(")\n");
    write_push_d(buf);

    write_frame_setup(buf, |buf| {
        // ARG = SP - R13
        buf.push('@');
        buf.push_str(LOCATION_REGISTER);
        buf.push_str("\nD=M\n@SP\nD=M-D\n");
    });

    buf.push('@');
    buf.push_str(VALUE_REGISTER);
    buf.push_str("\nA=M\n0;JMP\n");
}

/// Push the caller's pointers, then reposition ARG and LCL.
///
/// `arg_base` must leave the callee's ARG in D.
fn write_frame_setup(buf: &mut String, arg_base: impl FnOnce(&mut String)) {
    for register in SAVED_POINTERS {
        write_push_register(register, buf);
    }

    arg_base(&mut *buf);
    buf.push_str("@ARG\nM=D\n");

    // LCL = SP
    buf.push_str("@SP\nD=M\n@LCL\nM=D\n");
}

fn arg_offset(num_args: u16) -> Result<u16, CommandError> {
    num_args
        .checked_add(FRAME_SIZE)
        .filter(|&offset| offset <= MAX_CONSTANT)
        .ok_or(CommandError::TooManyArguments { num_args })
}

/// Return from the current function.
pub fn write_return(
    strategy: Strategy,
    ctx: &TranslationContext,
    buf: &mut String,
) -> Result<(), CommandError> {
    ctx.require_function("return")?;
    match strategy {
        Strategy::Inline => write_return_sequence(buf),
        Strategy::Shared => {
            buf.push('@');
            buf.push_str(RETURN_ROUTINE);
            buf.push_str("\n0;JMP\n");
        }
    }
    Ok(())
}

/// Body of the shared return routine.
pub fn write_return_routine(buf: &mut String) {
    buf.push('(');
    buf.push_str(RETURN_ROUTINE);
    buf.push_str(")\n");
    write_return_sequence(buf);
}

/// Tear down the current frame and jump back to the caller.
pub fn write_return_sequence(buf: &mut String) {
    // R13 = *(LCL - 5), before *ARG can overwrite it
    buf.push_str("@LCL\nD=M\n@");
    write_u16(FRAME_SIZE, buf);
    buf.push_str("\nA=D-A\nD=M\n@");
    buf.push_str(LOCATION_REGISTER);
    buf.push_str("\nM=D\n");

    // *ARG = pop()
    buf.push_str("@SP\nAM=M-1\nD=M\n@ARG\nA=M\nM=D\n");

    // SP = ARG + 1
    buf.push_str("@ARG\nD=M+1\n@SP\nM=D\n");

    // THAT, THIS, ARG, LCL = *(LCL - 1 .. 4)
    for (depth, register) in SAVED_POINTERS.iter().rev().enumerate() {
        let offset = depth + 1;
        if offset == 1 {
            buf.push_str("@LCL\nA=M-1\n");
        } else {
            buf.push_str("@LCL\nD=M\n@");
            write_u16(offset as u16, buf);
            buf.push_str("\nA=D-A\n");
        }
        buf.push_str("D=M\n@");
        buf.push_str(register);
        buf.push_str("\nM=D\n");
    }

    // goto R13
    buf.push('@');
    buf.push_str(LOCATION_REGISTER);
    buf.push_str("\nA=M\n0;JMP\n");
}
