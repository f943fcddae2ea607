//! Hack assembly code generation for all VM commands.
//!
//! [`CodeGenerator`] owns the translation context and dispatches each command
//! to its emitter. It also remembers which shared routines the emitted code
//! jumps into, so the program driver can emit each of them exactly once.

use std::collections::BTreeSet;

use log::trace;

use crate::arithmetic::{write_arithmetic, write_comparison_routine};
use crate::calling::{
    write_call, write_call_routine, write_call_to, write_function, write_goto, write_if_goto,
    write_label, write_return, write_return_routine,
};
use crate::command::{Comparison, VmCommand};
use crate::config::Strategy;
use crate::context::TranslationContext;
use crate::error::CommandError;
use crate::memory::write_memory_access;
use crate::symbols::BOOTSTRAP_RETURN;

/// A subroutine shared by every site of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Routine {
    Compare(Comparison),
    Call,
    Return,
}

/// Write the body of a shared routine.
pub fn write_routine(routine: Routine, buf: &mut String) {
    match routine {
        Routine::Compare(cmp) => write_comparison_routine(cmp, buf),
        Routine::Call => write_call_routine(buf),
        Routine::Return => write_return_routine(buf),
    }
}

/// Code generator for Hack assembly.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    ctx: TranslationContext,
    strategy: Strategy,
    /// Shared routines referenced so far
    routines: BTreeSet<Routine>,
}

impl CodeGenerator {
    /// Create a generator for the program `program`.
    pub fn new(program: &str, strategy: Strategy) -> Self {
        Self {
            ctx: TranslationContext::new(program),
            strategy,
            routines: BTreeSet::new(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn context(&self) -> &TranslationContext {
        &self.ctx
    }

    /// Start translating a new source unit.
    pub fn enter_unit(&mut self, unit: &str) {
        self.ctx.enter_unit(unit);
    }

    /// Shared routines the emitted code depends on, in a stable order.
    pub fn routines(&self) -> impl Iterator<Item = Routine> + '_ {
        self.routines.iter().copied()
    }

    /// Translate a VM command to Hack assembly.
    pub fn translate(&mut self, cmd: &VmCommand, buf: &mut String) -> Result<(), CommandError> {
        trace!("{}", cmd);
        match cmd {
            VmCommand::Arithmetic(op) => {
                write_arithmetic(*op, self.strategy, &mut self.ctx, buf)?;
                if let Some(cmp) = op.comparison() {
                    self.uses(Routine::Compare(cmp));
                }
            }
            VmCommand::MemoryAccess {
                direction,
                segment,
                index,
            } => write_memory_access(*direction, *segment, *index, self.ctx.unit(), buf)?,
            VmCommand::Label { name } => write_label(name, &self.ctx, buf)?,
            VmCommand::Goto { label } => write_goto(label, &self.ctx, buf)?,
            VmCommand::IfGoto { label } => write_if_goto(label, &self.ctx, buf)?,
            VmCommand::Function { name, num_locals } => {
                write_function(name, *num_locals, &mut self.ctx, buf)
            }
            VmCommand::Call { name, num_args } => {
                write_call(name, *num_args, self.strategy, &mut self.ctx, buf)?;
                self.uses(Routine::Call);
            }
            VmCommand::Return => {
                write_return(self.strategy, &self.ctx, buf)?;
                self.uses(Routine::Return);
            }
        }
        Ok(())
    }

    /// Call the program entry function with no arguments.
    pub fn call_entry(&mut self, entry: &str, buf: &mut String) -> Result<(), CommandError> {
        let target = self.ctx.qualify(entry);
        write_call_to(&target, 0, BOOTSTRAP_RETURN, self.strategy, buf)?;
        self.uses(Routine::Call);
        Ok(())
    }

    fn uses(&mut self, routine: Routine) {
        if self.strategy == Strategy::Shared {
            self.routines.insert(routine);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ArithmeticOp, Segment};

    fn generate(strategy: Strategy, commands: &[VmCommand]) -> (CodeGenerator, String) {
        let mut cgen = CodeGenerator::new("Prog", strategy);
        cgen.enter_unit("Main");
        let mut buf = String::new();
        for cmd in commands {
            cgen.translate(cmd, &mut buf).unwrap();
        }
        (cgen, buf)
    }

    fn program() -> Vec<VmCommand> {
        vec![
            VmCommand::Function {
                name: "Main.main".to_string(),
                num_locals: 1,
            },
            VmCommand::push(Segment::Constant, 3),
            VmCommand::push(Segment::Constant, 4),
            VmCommand::Arithmetic(ArithmeticOp::Lt),
            VmCommand::pop(Segment::Local, 0),
            VmCommand::Call {
                name: "Main.f".to_string(),
                num_args: 0,
            },
            VmCommand::Return,
        ]
    }

    #[test]
    fn test_inline_uses_no_routines() {
        let (cgen, buf) = generate(Strategy::Inline, &program());
        assert_eq!(cgen.routines().count(), 0);
        assert!(!buf.contains("__VM_"));
        assert!(buf.contains("(Prog.Main.main)"));
    }

    #[test]
    fn test_shared_records_routines() {
        let (cgen, buf) = generate(Strategy::Shared, &program());
        let routines: Vec<_> = cgen.routines().collect();
        assert_eq!(
            routines,
            vec![Routine::Compare(Comparison::Lt), Routine::Call, Routine::Return]
        );
        assert!(buf.contains("@__VM_LT\n0;JMP"));
        assert!(buf.contains("@__VM_CALL\n0;JMP"));
        assert!(buf.contains("@__VM_RETURN\n0;JMP"));
    }

    #[test]
    fn test_failed_command_records_nothing() {
        let mut cgen = CodeGenerator::new("Prog", Strategy::Shared);
        cgen.enter_unit("Main");
        let mut buf = String::new();
        assert_eq!(
            cgen.translate(&VmCommand::Return, &mut buf),
            Err(CommandError::OutsideFunction { command: "return" })
        );
        assert_eq!(cgen.routines().count(), 0);
    }

    #[test]
    fn test_static_follows_unit() {
        let mut cgen = CodeGenerator::new("Prog", Strategy::Inline);
        let mut buf = String::new();
        cgen.enter_unit("A");
        cgen.translate(&VmCommand::push(Segment::Static, 1), &mut buf).unwrap();
        cgen.enter_unit("B");
        cgen.translate(&VmCommand::push(Segment::Static, 1), &mut buf).unwrap();
        assert!(buf.contains("@A.1\n"));
        assert!(buf.contains("@B.1\n"));
    }

    #[test]
    fn test_call_entry() {
        let mut cgen = CodeGenerator::new("Prog", Strategy::Inline);
        let mut buf = String::new();
        cgen.call_entry("Sys.init", &mut buf).unwrap();
        assert!(buf.contains("@5\nD=D-A\n@ARG\nM=D"));
        assert!(buf.ends_with("@Prog.Sys.init\n0;JMP\n(__VM_BOOTSTRAP_RET)\n"));
    }

    #[test]
    fn test_routine_bodies() {
        let mut buf = String::new();
        write_routine(Routine::Compare(Comparison::Eq), &mut buf);
        write_routine(Routine::Call, &mut buf);
        write_routine(Routine::Return, &mut buf);
        assert!(buf.contains("(__VM_EQ)"));
        assert!(buf.contains("(__VM_CALL)"));
        assert!(buf.contains("(__VM_RETURN)"));
    }
}
