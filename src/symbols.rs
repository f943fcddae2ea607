//! Symbol naming for emitted assembly.
//!
//! User-derived symbols always contain a `.` (statics are `Unit.i`, functions
//! are `Program.name`), while translator-internal symbols start with `__VM_`
//! or `J<KIND>_` and never contain one. The two families cannot collide.

use crate::command::Comparison;

/// Shared call routine.
pub const CALL_ROUTINE: &str = "__VM_CALL";
/// Shared return routine.
pub const RETURN_ROUTINE: &str = "__VM_RETURN";
/// Landing point after the shared routine block.
pub const START_LABEL: &str = "__VM_START";
/// Halt loop entered if the entry function ever returns.
pub const HALT_LABEL: &str = "__VM_HALT";
/// Terminal loop appended after the last unit.
pub const END_LABEL: &str = "__VM_END";
/// Return address of the bootstrap call to the entry function.
pub const BOOTSTRAP_RETURN: &str = "__VM_BOOTSTRAP_RET";

/// `<program>.<function>`
pub fn function_symbol(program: &str, name: &str) -> String {
    let mut s = String::with_capacity(program.len() + name.len() + 1);
    s.push_str(program);
    s.push('.');
    s.push_str(name);
    s
}

/// Write `<unit>.<index>` without allocation.
#[inline]
pub fn write_static_symbol(unit: &str, index: u16, buf: &mut String) {
    buf.push_str(unit);
    buf.push('.');
    write_u16(index, buf);
}

/// Write `<function>$<label>` without allocation.
#[inline]
pub fn write_label_symbol(function: &str, label: &str, buf: &mut String) {
    buf.push_str(function);
    buf.push('$');
    buf.push_str(label);
}

/// `<caller>$ret<n>`, where `caller` is already fully qualified.
pub fn return_symbol(caller: &str, n: u16) -> String {
    let mut s = String::with_capacity(caller.len() + 9);
    s.push_str(caller);
    s.push_str("$ret");
    write_u16(n, &mut s);
    s
}

/// Write an inline comparison branch label: `JEQ_TRUE_3`, `JLT_END_0`, ...
#[inline]
pub fn write_comparison_label(cmp: Comparison, suffix: &str, n: u16, buf: &mut String) {
    buf.push_str(cmp.jump());
    buf.push('_');
    buf.push_str(suffix);
    buf.push('_');
    write_u16(n, buf);
}

/// Entry label of the shared routine for a comparison kind.
pub fn comparison_routine(cmp: Comparison) -> &'static str {
    match cmp {
        Comparison::Eq => "__VM_EQ",
        Comparison::Gt => "__VM_GT",
        Comparison::Lt => "__VM_LT",
    }
}

/// Return label for the `n`th call into a shared comparison routine.
pub fn comparison_return(cmp: Comparison, n: u16) -> String {
    let mut s = String::with_capacity(20);
    s.push_str(comparison_routine(cmp));
    s.push_str("_RET_");
    write_u16(n, &mut s);
    s
}

/// Write a u16 to the buffer without allocation.
#[inline]
pub fn write_u16(n: u16, buf: &mut String) {
    if n == 0 {
        buf.push('0');
        return;
    }

    let mut digits = [0u8; 5];
    let mut i = 0;
    let mut num = n;

    while num > 0 {
        digits[i] = (num % 10) as u8;
        num /= 10;
        i += 1;
    }

    while i > 0 {
        i -= 1;
        buf.push((b'0' + digits[i]) as char);
    }
}
