//! Translation state threaded through emission.

use std::collections::HashMap;

use crate::command::Comparison;
use crate::error::CommandError;
use crate::symbols::{function_symbol, return_symbol};

/// Mutable state of one whole-program translation.
///
/// Created once per program, mutated in source order, dropped with the
/// output. Nothing here is shared between translations.
#[derive(Debug, Clone)]
pub struct TranslationContext {
    program: String,
    unit: String,
    /// Fully-qualified name of the function being emitted into.
    function: Option<String>,
    /// Next return-label number, keyed by fully-qualified caller.
    call_sites: HashMap<String, u16>,
    /// Next site number per comparison kind.
    comparison_sites: [u16; 3],
}

impl TranslationContext {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            unit: String::new(),
            function: None,
            call_sites: HashMap::new(),
            comparison_sites: [0; 3],
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Current source unit, used for static qualification.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Start a new source unit. Function scope does not carry over.
    pub fn enter_unit(&mut self, unit: &str) {
        self.unit = unit.to_string();
        self.function = None;
    }

    /// Enter a function and return its fully-qualified entry symbol.
    pub fn enter_function(&mut self, name: &str) -> &str {
        self.function.insert(function_symbol(&self.program, name))
    }

    /// Fully-qualified current function, if any.
    pub fn current_function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Current function, or an error naming the command that needed one.
    pub fn require_function(&self, command: &'static str) -> Result<&str, CommandError> {
        self.current_function()
            .ok_or(CommandError::OutsideFunction { command })
    }

    /// Fully-qualified entry symbol of any function in this program.
    pub fn qualify(&self, name: &str) -> String {
        function_symbol(&self.program, name)
    }

    /// Allocate the next return-address symbol for a call site.
    ///
    /// The caller is the current function; top-level code calls on behalf
    /// of its unit.
    pub fn next_return_symbol(&mut self) -> Result<String, CommandError> {
        let caller = match &self.function {
            Some(f) => f.clone(),
            None => function_symbol(&self.program, &self.unit),
        };
        let counter = self.call_sites.entry(caller.clone()).or_insert(0);
        let n = *counter;
        *counter = n.checked_add(1).ok_or_else(|| CommandError::CounterOverflow {
            kind: "call",
            scope: caller.clone(),
        })?;
        Ok(return_symbol(&caller, n))
    }

    /// Allocate the next site number for a comparison kind.
    pub fn next_comparison_site(&mut self, cmp: Comparison) -> Result<u16, CommandError> {
        let slot = cmp.index();
        let n = self.comparison_sites[slot];
        self.comparison_sites[slot] = n.checked_add(1).ok_or_else(|| CommandError::CounterOverflow {
            kind: cmp.tag(),
            scope: self.program.clone(),
        })?;
        Ok(n)
    }
}
