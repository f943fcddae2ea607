//! Error types for VM translation.
//!
//! [`CommandError`] describes what is wrong with a single command and knows
//! nothing about where it came from. [`VMError`] adds the unit, line number
//! and source text so messages point at the offending line.

use thiserror::Error;

/// A malformed or untranslatable command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid command: {command}")]
    InvalidCommand { command: String },

    #[error("invalid segment: {segment}")]
    InvalidSegment { segment: String },

    #[error("missing argument for {command}")]
    MissingArgument { command: &'static str },

    #[error("unexpected argument for {command}: {extra}")]
    UnexpectedArgument {
        command: &'static str,
        extra: String,
    },

    #[error("invalid number: {value}")]
    InvalidNumber { value: String },

    #[error("invalid label name: {name}")]
    InvalidLabelName { name: String },

    #[error("invalid function name: {name}")]
    InvalidFunctionName { name: String },

    #[error("cannot pop to constant segment")]
    PopToConstant,

    #[error("constant {value} out of range (must be 0-32767)")]
    ConstantOutOfRange { value: u16 },

    #[error("invalid pointer index {index} (must be 0 or 1)")]
    InvalidPointerIndex { index: u16 },

    #[error("invalid temp index {index} (must be 0-7)")]
    InvalidTempIndex { index: u16 },

    #[error("too many arguments for call: {num_args}")]
    TooManyArguments { num_args: u16 },

    #[error("{command} outside of a function")]
    OutsideFunction { command: &'static str },

    #[error("too many {kind} sites in {scope}")]
    CounterOverflow { kind: &'static str, scope: String },
}

/// VM translation error with full context.
#[derive(Error, Debug)]
pub enum VMError {
    #[error("{file}:{line}: {source} (in `{text}`)")]
    Command {
        file: String,
        line: usize,
        text: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no .vm files found in directory: {path}")]
    NoVmFiles { path: String },

    #[error("path is not a .vm file or directory: {path}")]
    InvalidPath { path: String },
}

impl VMError {
    /// Attach a source position to a command error.
    pub fn at(file: &str, line: usize, text: &str, source: CommandError) -> Self {
        VMError::Command {
            file: file.to_string(),
            line,
            text: text.trim().to_string(),
            source,
        }
    }

    /// The underlying command error, if this is one.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            VMError::Command { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for VM operations.
pub type Result<T> = std::result::Result<T, VMError>;
