//! Arithmetic and logical command emission.
//!
//! Binary operations pop `y`, then combine it into `x`'s slot, so the stack
//! shrinks by one and `sub` computes `x - y`. Unary operations rewrite the
//! top in place. Comparisons store `-1` (true) or `0` (false) and never
//! anything else.

use crate::command::{ArithmeticOp, Comparison};
use crate::config::Strategy;
use crate::context::TranslationContext;
use crate::error::CommandError;
use crate::memory::RETURN_REGISTER;
use crate::symbols::{comparison_return, comparison_routine, write_comparison_label};

/// Emit one arithmetic/logical command.
pub fn write_arithmetic(
    op: ArithmeticOp,
    strategy: Strategy,
    ctx: &mut TranslationContext,
    buf: &mut String,
) -> Result<(), CommandError> {
    match op {
        ArithmeticOp::Add => write_binary_op("D+M", buf),
        ArithmeticOp::Sub => write_binary_op("M-D", buf),
        ArithmeticOp::And => write_binary_op("D&M", buf),
        ArithmeticOp::Or => write_binary_op("D|M", buf),
        ArithmeticOp::Neg => write_unary_op("-M", buf),
        ArithmeticOp::Not => write_unary_op("!M", buf),
        ArithmeticOp::Eq => return write_comparison(Comparison::Eq, strategy, ctx, buf),
        ArithmeticOp::Gt => return write_comparison(Comparison::Gt, strategy, ctx, buf),
        ArithmeticOp::Lt => return write_comparison(Comparison::Lt, strategy, ctx, buf),
    }
    Ok(())
}

fn write_comparison(
    cmp: Comparison,
    strategy: Strategy,
    ctx: &mut TranslationContext,
    buf: &mut String,
) -> Result<(), CommandError> {
    let site = ctx.next_comparison_site(cmp)?;
    match strategy {
        Strategy::Inline => write_inline_comparison(cmp, site, buf),
        Strategy::Shared => write_shared_comparison_site(cmp, site, buf),
    }
    Ok(())
}

/// Pop y into D, then compute x op y in x's slot.
pub fn write_binary_op(operation: &str, buf: &mut String) {
    buf.push_str("@SP\nAM=M-1\nD=M\nA=A-1\nM=");
    buf.push_str(operation);
    buf.push('\n');
}

/// Apply operation to top of stack.
pub fn write_unary_op(operation: &str, buf: &mut String) {
    buf.push_str("@SP\nA=M-1\nM=");
    buf.push_str(operation);
    buf.push('\n');
}

/// Full comparison with its own branch labels.
pub fn write_inline_comparison(cmp: Comparison, site: u16, buf: &mut String) {
    buf.push_str("@SP\nAM=M-1\nD=M\nA=A-1\nD=M-D\n@");
    write_comparison_label(cmp, "TRUE", site, buf);
    buf.push_str("\nD;");
    buf.push_str(cmp.jump());
    buf.push_str("\n@SP\nA=M-1\nM=0\n@");
    write_comparison_label(cmp, "END", site, buf);
    buf.push_str("\n0;JMP\n(");
    write_comparison_label(cmp, "TRUE", site, buf);
    buf.push_str(")\n@SP\nA=M-1\nM=-1\n(");
    write_comparison_label(cmp, "END", site, buf);
    buf.push_str(")\n");
}

/// Hand a unique return address to the shared routine and jump into it.
pub fn write_shared_comparison_site(cmp: Comparison, site: u16, buf: &mut String) {
    let ret = comparison_return(cmp, site);
    buf.push('@');
    buf.push_str(&ret);
    buf.push_str("\nD=A\n@");
    buf.push_str(RETURN_REGISTER);
    buf.push_str("\nM=D\n@");
    buf.push_str(comparison_routine(cmp));
    buf.push_str("\n0;JMP\n(");
    buf.push_str(&ret);
    buf.push_str(")\n");
}

/// Body of the shared routine for one comparison kind.
///
/// Same net stack effect as the inline form: two pops, one push.
pub fn write_comparison_routine(cmp: Comparison, buf: &mut String) {
    let routine = comparison_routine(cmp);
    buf.push('(');
    buf.push_str(routine);
    buf.push_str(")\n@SP\nAM=M-1\nD=M\nA=A-1\nD=M-D\nM=-1\n@");
    buf.push_str(routine);
    buf.push_str("_TRUE\nD;");
    buf.push_str(cmp.jump());
    buf.push_str("\n@SP\nA=M-1\nM=0\n(");
    buf.push_str(routine);
    buf.push_str("_TRUE)\n@");
    buf.push_str(RETURN_REGISTER);
    buf.push_str("\nA=M\n0;JMP\n");
}
