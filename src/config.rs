//! Translation options.

/// How comparisons, calls and returns are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Every site carries its own full instruction sequence.
    #[default]
    Inline,
    /// Sites jump into one routine per kind, emitted once per program.
    Shared,
}

/// Whole-program translation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub strategy: Strategy,
    /// Initialise SP to the stack base and call [`entry`](Self::entry).
    pub bootstrap: bool,
    /// Entry function called by the bootstrap. `None` only sets SP.
    pub entry: Option<String>,
    /// Append a terminal infinite loop after the last unit.
    pub end_with_loop: bool,
    /// Precede each command's code with a `// <command>` line.
    pub annotate: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Inline,
            bootstrap: false,
            entry: Some("Sys.init".to_string()),
            end_with_loop: false,
            annotate: false,
        }
    }
}

impl TranslateOptions {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_bootstrap(mut self, entry: Option<&str>) -> Self {
        self.bootstrap = true;
        self.entry = entry.map(str::to_string);
        self
    }

    pub fn with_end_loop(mut self) -> Self {
        self.end_with_loop = true;
        self
    }

    pub fn with_annotations(mut self) -> Self {
        self.annotate = true;
        self
    }

    /// Entry function actually called at startup.
    pub fn entry_call(&self) -> Option<&str> {
        if self.bootstrap {
            self.entry.as_deref()
        } else {
            None
        }
    }
}
