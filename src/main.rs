//! Hack VM Translator CLI - Translates VM code to Hack assembly.
//!
//! Usage:
//!     hack-vm-translator <file.vm | directory>
//!     hack-vm-translator --strategy shared --bootstrap Prog.vm -o Prog.asm

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser as ClapParser, ValueEnum};
use hack_vm_translator::{
    Strategy, TranslateOptions, VMError, output_path, translate_directory, translate_file,
};
use log::{LevelFilter, debug, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    /// Full instruction sequence at every site
    Inline,
    /// One shared routine per kind
    Shared,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Inline => Strategy::Inline,
            StrategyArg::Shared => Strategy::Shared,
        }
    }
}

#[derive(ClapParser, Debug)]
#[command(name = "hack-vm-translator")]
#[command(version)]
#[command(about = "VM code to Hack assembly translator")]
#[command(author = "nand2tetris")]
struct Args {
    /// Input .vm file or directory of .vm files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to Input.asm, or dir/dir.asm for a directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emission strategy for comparisons, calls and returns
    #[arg(long, value_enum, default_value_t = StrategyArg::Inline)]
    strategy: StrategyArg,

    /// Initialise the stack and call the entry function
    #[arg(long)]
    bootstrap: bool,

    /// Entry function called by the bootstrap
    #[arg(long, value_name = "NAME", default_value = "Sys.init")]
    entry: String,

    /// Append an infinite loop after the program
    #[arg(long = "end-loop")]
    end_loop: bool,

    /// Precede each command's code with a comment
    #[arg(long)]
    annotate: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> TranslateOptions {
        let mut options = TranslateOptions::default().with_strategy(self.strategy.into());
        if self.bootstrap {
            options = options.with_bootstrap(Some(self.entry.as_str()));
        } else {
            options.entry = Some(self.entry.clone());
        }
        if self.end_loop {
            options = options.with_end_loop();
        }
        if self.annotate {
            options = options.with_annotations();
        }
        options
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    // A logger can only fail to install if one already exists.
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    if !args.input.exists() {
        eprintln!("Error: Input not found: {}", args.input.display());
        return ExitCode::from(2);
    }

    let start = Instant::now();
    match run(&args) {
        Ok(output) => {
            info!(
                "translated in {:.2}ms",
                start.elapsed().as_secs_f64() * 1000.0
            );
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, VMError> {
    let options = args.options();
    debug!("options: {:?}", options);

    let asm = if args.input.is_dir() {
        debug!("translating directory {}", args.input.display());
        translate_directory(&args.input, &options)?
    } else if args.input.extension().is_some_and(|ext| ext == "vm") {
        debug!("translating file {}", args.input.display());
        translate_file(&args.input, &options)?
    } else {
        return Err(VMError::InvalidPath {
            path: args.input.display().to_string(),
        });
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| output_path(&args.input));
    write_output(&output, &asm)?;
    debug!("wrote {} lines of assembly", asm.lines().count());

    Ok(output)
}

fn write_output(path: &Path, asm: &str) -> Result<(), VMError> {
    fs::write(path, asm).map_err(|e| VMError::FileWrite {
        path: path.display().to_string(),
        source: e,
    })
}
