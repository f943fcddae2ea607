//! Program-level framing: stack initialisation, jumps over shared routines
//! and halt loops.

use crate::memory::STACK_BASE;
use crate::symbols::write_u16;

/// SP = 256
pub fn write_stack_init(buf: &mut String) {
    buf.push('@');
    write_u16(STACK_BASE, buf);
    buf.push_str("\nD=A\n@SP\nM=D\n");
}

/// Unconditional jump to `label`.
pub fn write_jump(label: &str, buf: &mut String) {
    buf.push('@');
    buf.push_str(label);
    buf.push_str("\n0;JMP\n");
}

/// Define `label` as an infinite loop.
pub fn write_halt(label: &str, buf: &mut String) {
    buf.push('(');
    buf.push_str(label);
    buf.push_str(")\n");
    write_jump(label, buf);
}
