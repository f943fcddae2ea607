//! Hack VM Translator - stack VM to Hack assembly
//!
//! Translates VM code (.vm) into a single Hack assembly program (.asm) for
//! the nand2tetris computer. All twenty VM commands are supported, with two
//! emission strategies for comparisons, calls and returns.
//!
//! # Usage Modes
//!
//! - Source string: `translate("push constant 7", "Main")` - no bootstrap
//! - Single file: `translate_file(path, &options)`
//! - Directory: `translate_directory(path, &options)` - bootstrap if Sys.vm exists
//!
//! Multi-unit programs can also be built unit by unit with
//! [`ProgramBuilder`].

pub mod arithmetic;
pub mod bootstrap;
pub mod calling;
pub mod codegen;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod memory;
pub mod parser;
pub mod program;
pub mod symbols;

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

pub use crate::command::{ArithmeticOp, Comparison, Direction, Segment, VmCommand};
pub use crate::config::{Strategy, TranslateOptions};
pub use crate::error::{CommandError, Result, VMError};
pub use crate::program::ProgramBuilder;

/// Entry unit translated first in directory mode.
const SYS_FILE: &str = "Sys.vm";

/// Translate a single VM source string with default options.
///
/// The unit name doubles as the program name.
pub fn translate(source: &str, unit: &str) -> Result<String> {
    translate_with_options(source, unit, &TranslateOptions::default())
}

/// Translate a single VM source string.
pub fn translate_with_options(
    source: &str,
    unit: &str,
    options: &TranslateOptions,
) -> Result<String> {
    let mut builder = ProgramBuilder::new(unit, options.clone());
    builder.add_source(unit, source)?;
    builder.finish()
}

/// Translate a single .vm file. The program is named after the file stem.
pub fn translate_file(path: &Path, options: &TranslateOptions) -> Result<String> {
    let unit = unit_name(path);
    let source = read_source(path)?;
    translate_with_options(&source, &unit, options)
}

/// Translate all .vm files in a directory into one program.
///
/// - Processes Sys.vm first, then other files alphabetically
/// - Enables the bootstrap if Sys.vm exists (entry `Sys.init` unless
///   `options` names another)
/// - Names the program after the directory
pub fn translate_directory(dir_path: &Path, options: &TranslateOptions) -> Result<String> {
    let vm_files = list_vm_files(dir_path)?;

    if vm_files.is_empty() {
        return Err(VMError::NoVmFiles {
            path: dir_path.display().to_string(),
        });
    }

    let mut options = options.clone();
    let has_sys = vm_files
        .first()
        .is_some_and(|f| f.file_name().is_some_and(|n| n == SYS_FILE));
    if has_sys && !options.bootstrap {
        debug!("{} found, enabling bootstrap", SYS_FILE);
        options.bootstrap = true;
    }

    let program = directory_name(dir_path);
    let mut builder = ProgramBuilder::new(&program, options);
    for vm_file in &vm_files {
        let source = read_source(vm_file)?;
        builder.add_source(&unit_name(vm_file), &source)?;
    }

    builder.finish()
}

/// All .vm files in a directory, Sys.vm first and the rest sorted.
pub fn list_vm_files(dir_path: &Path) -> Result<Vec<PathBuf>> {
    let mut vm_files: Vec<_> = fs::read_dir(dir_path)
        .map_err(|e| VMError::FileRead {
            path: dir_path.display().to_string(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "vm"))
        .collect();

    vm_files.sort_by(|a, b| {
        let is_sys = |p: &PathBuf| p.file_name().is_some_and(|n| n == SYS_FILE);
        is_sys(b).cmp(&is_sys(a)).then_with(|| a.cmp(b))
    });

    Ok(vm_files)
}

/// Determine the output filename for a given input.
///
/// - Single file: Input.vm -> Input.asm
/// - Directory: dir/ -> dir/dir.asm
pub fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let dir_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        input.join(format!("{}.asm", dir_name))
    } else {
        input.with_extension("asm")
    }
}

/// Make `name` usable as an assembly symbol prefix.
///
/// Characters outside `[A-Za-z0-9_.$:]` become `_`; a leading digit gets a
/// `_` prefix.
pub fn symbol_name(name: &str) -> String {
    let mut s = String::with_capacity(name.len() + 1);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        s.push('_');
    }
    s.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':') {
            c
        } else {
            '_'
        }
    }));
    if s.is_empty() {
        s.push_str("Main");
    }
    s
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| VMError::FileRead {
        path: path.display().to_string(),
        source: e,
    })
}

fn unit_name(path: &Path) -> String {
    symbol_name(path.file_stem().and_then(|s| s.to_str()).unwrap_or("Main"))
}

fn directory_name(path: &Path) -> String {
    // `..` has no file name of its own
    let name = path
        .file_name()
        .map(|n| n.to_os_string())
        .or_else(|| fs::canonicalize(path).ok()?.file_name().map(|n| n.to_os_string()));
    name.as_deref()
        .and_then(|s| s.to_str())
        .map(symbol_name)
        .unwrap_or_else(|| "Main".to_string())
}
