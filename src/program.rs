//! Whole-program assembly.
//!
//! Units are translated one after another into a single body. [`finish`]
//! then frames the body:
//!
//! 1. `SP = 256` when bootstrapping;
//! 2. a jump over the shared routines, the routines, and `(__VM_START)`;
//! 3. the entry call followed by the `__VM_HALT` loop;
//! 4. the unit bodies in translation order;
//! 5. the `__VM_END` loop when requested.
//!
//! [`finish`]: ProgramBuilder::finish

use log::debug;

use crate::bootstrap::{write_halt, write_jump, write_stack_init};
use crate::codegen::{CodeGenerator, write_routine};
use crate::command::VmCommand;
use crate::config::TranslateOptions;
use crate::error::{CommandError, Result, VMError};
use crate::parser::parse_source;
use crate::symbols::{END_LABEL, HALT_LABEL, START_LABEL};

/// Average emitted bytes per VM command, used to pre-size buffers.
const BYTES_PER_COMMAND: usize = 50;

/// Accumulates translated units and produces the final assembly.
#[derive(Debug)]
pub struct ProgramBuilder {
    codegen: CodeGenerator,
    options: TranslateOptions,
    body: String,
    units: Vec<String>,
}

impl ProgramBuilder {
    pub fn new(program: &str, options: TranslateOptions) -> Self {
        Self {
            codegen: CodeGenerator::new(program, options.strategy),
            options,
            body: String::new(),
            units: Vec::new(),
        }
    }

    /// Names of the units added so far, in order.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Scan and translate one unit of VM source.
    pub fn add_source(&mut self, unit: &str, source: &str) -> Result<()> {
        debug!("translating unit {} ({} lines)", unit, source.lines().count());
        self.begin_unit(unit, source.lines().count());

        for parsed in parse_source(source) {
            let at = |e| VMError::at(unit, parsed.line, parsed.text, e);
            let cmd = parsed.command.map_err(at)?;
            self.emit(&cmd).map_err(at)?;
        }
        Ok(())
    }

    /// Translate one unit given as already-parsed commands.
    ///
    /// Errors report the 1-based position of the command in `commands`.
    pub fn add_commands<'a>(
        &mut self,
        unit: &str,
        commands: impl IntoIterator<Item = &'a VmCommand>,
    ) -> Result<()> {
        let commands = commands.into_iter();
        debug!("translating unit {} (parsed commands)", unit);
        self.begin_unit(unit, commands.size_hint().0);

        for (i, cmd) in commands.enumerate() {
            self.emit(cmd)
                .map_err(|e| VMError::at(unit, i + 1, &cmd.to_string(), e))?;
        }
        Ok(())
    }

    fn begin_unit(&mut self, unit: &str, size_hint: usize) {
        self.codegen.enter_unit(unit);
        self.units.push(unit.to_string());
        self.body.reserve(size_hint * BYTES_PER_COMMAND);
    }

    fn emit(&mut self, cmd: &VmCommand) -> std::result::Result<(), CommandError> {
        if self.options.annotate {
            self.body.push_str("// ");
            self.body.push_str(&cmd.to_string());
            self.body.push('\n');
        }
        self.codegen.translate(cmd, &mut self.body)
    }

    /// Frame the translated units and return the complete program.
    pub fn finish(mut self) -> Result<String> {
        let mut entry = String::new();
        if let Some(name) = self.options.entry_call() {
            debug!("bootstrap calls {}", name);
            let text = format!("call {} 0", name);
            self.codegen
                .call_entry(name, &mut entry)
                .map_err(|e| VMError::at("<bootstrap>", 0, &text, e))?;
            write_halt(HALT_LABEL, &mut entry);
        }

        let mut out = String::with_capacity(self.body.len() + entry.len() + 1024);

        if self.options.bootstrap {
            write_stack_init(&mut out);
        }

        let routines: Vec<_> = self.codegen.routines().collect();
        if !routines.is_empty() {
            debug!("emitting {} shared routines", routines.len());
            write_jump(START_LABEL, &mut out);
            for routine in routines {
                write_routine(routine, &mut out);
            }
            out.push('(');
            out.push_str(START_LABEL);
            out.push_str(")\n");
        }

        out.push_str(&entry);
        out.push_str(&self.body);

        if self.options.end_with_loop {
            write_halt(END_LABEL, &mut out);
        }

        Ok(out)
    }
}
