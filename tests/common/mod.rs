//! Symbolic Hack CPU used to execute translator output in tests.
//!
//! Assembles text directly into an in-memory program: labels are resolved
//! first, then predefined symbols, then variables from RAM[16] upwards.
//! Execution stops when the program runs off its end, enters a
//! `(L) @L 0;JMP` loop, or exceeds the step limit.

#![allow(dead_code)]

use std::collections::HashMap;

use hack_vm_translator::{Strategy, TranslateOptions, translate_with_options};

pub const RAM_SIZE: usize = 32768;
pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;

/// Default step limit for [`run`].
pub const MAX_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, Copy)]
enum Operand {
    A,
    M,
}

#[derive(Debug, Clone, Copy)]
struct Dest {
    a: bool,
    d: bool,
    m: bool,
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Load(i16),
    Compute {
        dest: Dest,
        y: Operand,
        comp: fn(i16, i16) -> i16,
        jump: fn(i16) -> bool,
    },
}

/// Hack CPU state plus the assembled program.
pub struct Cpu {
    rom: Vec<Op>,
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
    symbols: HashMap<String, u16>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// Entered a one-instruction jump-to-self loop.
    Loop,
    /// Ran past the last instruction.
    End,
}

fn parse_dest(s: &str) -> Option<Dest> {
    if !s.chars().all(|c| matches!(c, 'A' | 'D' | 'M')) {
        return None;
    }
    Some(Dest {
        a: s.contains('A'),
        d: s.contains('D'),
        m: s.contains('M'),
    })
}

fn parse_comp(s: &str) -> Option<(Operand, fn(i16, i16) -> i16)> {
    let y = if s.contains('M') { Operand::M } else { Operand::A };
    let normalized = s.replace(['A', 'M'], "Y");
    let comp: fn(i16, i16) -> i16 = match normalized.as_str() {
        "0" => |_, _| 0,
        "1" => |_, _| 1,
        "-1" => |_, _| -1,
        "D" => |d, _| d,
        "Y" => |_, y| y,
        "!D" => |d, _| !d,
        "!Y" => |_, y| !y,
        "-D" => |d, _| d.wrapping_neg(),
        "-Y" => |_, y| y.wrapping_neg(),
        "D+1" | "1+D" => |d, _| d.wrapping_add(1),
        "Y+1" | "1+Y" => |_, y| y.wrapping_add(1),
        "D-1" => |d, _| d.wrapping_sub(1),
        "Y-1" => |_, y| y.wrapping_sub(1),
        "D+Y" | "Y+D" => |d, y| d.wrapping_add(y),
        "D-Y" => |d, y| d.wrapping_sub(y),
        "Y-D" => |d, y| y.wrapping_sub(d),
        "D&Y" | "Y&D" => |d, y| d & y,
        "D|Y" | "Y|D" => |d, y| d | y,
        _ => return None,
    };
    Some((y, comp))
}

fn parse_jump(s: &str) -> Option<fn(i16) -> bool> {
    let jump: fn(i16) -> bool = match s {
        "" => |_| false,
        "JGT" => |v| v > 0,
        "JEQ" => |v| v == 0,
        "JGE" => |v| v >= 0,
        "JLT" => |v| v < 0,
        "JNE" => |v| v != 0,
        "JLE" => |v| v <= 0,
        "JMP" => |_| true,
        _ => return None,
    };
    Some(jump)
}

fn predefined(symbol: &str) -> Option<u16> {
    match symbol {
        "SP" => Some(0),
        "LCL" => Some(1),
        "ARG" => Some(2),
        "THIS" => Some(3),
        "THAT" => Some(4),
        "SCREEN" => Some(16384),
        "KBD" => Some(24576),
        _ => symbol
            .strip_prefix('R')
            .filter(|n| *n == "0" || !n.starts_with('0'))
            .and_then(|n| n.parse::<u16>().ok())
            .filter(|&n| n < 16),
    }
}

/// Assemble Hack assembly text. Panics on malformed input.
pub fn assemble(asm: &str) -> Cpu {
    let lines: Vec<&str> = asm
        .lines()
        .map(|l| l.split("//").next().unwrap_or("").trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut symbols = HashMap::new();
    let mut address = 0u16;
    for line in &lines {
        if let Some(label) = line.strip_prefix('(').and_then(|l| l.strip_suffix(')')) {
            let previous = symbols.insert(label.to_string(), address);
            assert!(previous.is_none(), "duplicate label ({})", label);
        } else {
            address += 1;
        }
    }

    let mut next_variable = 16u16;
    let mut rom = Vec::with_capacity(address as usize);
    for line in &lines {
        if line.starts_with('(') {
            continue;
        }
        if let Some(value) = line.strip_prefix('@') {
            let resolved = if let Ok(n) = value.parse::<u16>() {
                assert!(n < 32768, "A-value out of range: {}", line);
                n
            } else if let Some(&addr) = symbols.get(value) {
                addr
            } else if let Some(addr) = predefined(value) {
                addr
            } else {
                let addr = next_variable;
                next_variable += 1;
                symbols.insert(value.to_string(), addr);
                addr
            };
            rom.push(Op::Load(resolved as i16));
            continue;
        }

        let (dest, rest) = match line.split_once('=') {
            Some((dest, rest)) => (dest, rest),
            None => ("", *line),
        };
        let (comp, jump) = rest.split_once(';').unwrap_or((rest, ""));
        let dest = parse_dest(dest).unwrap_or_else(|| panic!("bad dest: {}", line));
        let (y, comp) = parse_comp(comp).unwrap_or_else(|| panic!("bad comp: {}", line));
        let jump = parse_jump(jump).unwrap_or_else(|| panic!("bad jump: {}", line));
        rom.push(Op::Compute {
            dest,
            y,
            comp,
            jump,
        });
    }

    Cpu {
        rom,
        ram: vec![0; RAM_SIZE],
        a: 0,
        d: 0,
        pc: 0,
        symbols,
    }
}

impl Cpu {
    /// Set the segment pointers the way the course test scripts do.
    pub fn with_segments(mut self) -> Self {
        self.ram[SP] = 256;
        self.ram[LCL] = 300;
        self.ram[ARG] = 400;
        self.ram[THIS] = 3000;
        self.ram[THAT] = 3010;
        self
    }

    pub fn sp(&self) -> i16 {
        self.ram[SP]
    }

    /// Value at `*(SP - 1)`.
    pub fn top(&self) -> i16 {
        self.ram[self.sp() as usize - 1]
    }

    /// Address assigned to a label or variable.
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    pub fn rom_len(&self) -> usize {
        self.rom.len()
    }

    fn address(&self) -> usize {
        let addr = self.a as u16 as usize;
        assert!(addr < RAM_SIZE, "RAM access out of range at pc {}", self.pc);
        addr
    }

    /// Execute one instruction.
    fn step(&mut self) {
        match self.rom[self.pc] {
            Op::Load(value) => {
                self.a = value;
                self.pc += 1;
            }
            Op::Compute {
                dest,
                y,
                comp,
                jump,
            } => {
                let y = match y {
                    Operand::A => self.a,
                    Operand::M => self.ram[self.address()],
                };
                let out = comp(self.d, y);
                let target = self.a as u16 as usize;
                if dest.m {
                    let addr = self.address();
                    self.ram[addr] = out;
                }
                if dest.a {
                    self.a = out;
                }
                if dest.d {
                    self.d = out;
                }
                self.pc = if jump(out) { target } else { self.pc + 1 };
            }
        }
    }

    /// True when the next instruction jumps to the `@pc-1` before it.
    fn in_halt_loop(&self) -> bool {
        let Some(prev) = self.pc.checked_sub(1) else {
            return false;
        };
        matches!(
            (self.rom[prev], self.rom[self.pc]),
            (Op::Load(target), Op::Compute { jump, .. })
                if target as usize == prev && jump(-1) && jump(0) && jump(1)
        )
    }

    /// Run until halted. Panics when `max_steps` is exceeded.
    pub fn run(&mut self, max_steps: usize) -> Halt {
        for _ in 0..max_steps {
            if self.pc >= self.rom.len() {
                return Halt::End;
            }
            if self.in_halt_loop() {
                return Halt::Loop;
            }
            self.step();
        }
        panic!("no halt after {} steps (pc {})", max_steps, self.pc);
    }
}

/// Translate `source` as unit `Main` and load it with the usual segments.
pub fn load(source: &str, strategy: Strategy) -> Cpu {
    let options = TranslateOptions::default().with_strategy(strategy);
    let asm = translate_with_options(source, "Main", &options)
        .unwrap_or_else(|e| panic!("translation failed: {}", e));
    assemble(&asm).with_segments()
}

/// Translate and execute `source` to completion.
pub fn run(source: &str, strategy: Strategy) -> Cpu {
    let mut cpu = load(source, strategy);
    cpu.run(MAX_STEPS);
    cpu
}

/// Translate `source` with a bootstrap calling `Sys.init` and execute it.
pub fn run_program(source: &str, strategy: Strategy) -> Cpu {
    let options = TranslateOptions::default()
        .with_strategy(strategy)
        .with_bootstrap(Some("Sys.init"));
    let asm = translate_with_options(source, "Sys", &options)
        .unwrap_or_else(|e| panic!("translation failed: {}", e));
    let mut cpu = assemble(&asm);
    cpu.run(MAX_STEPS);
    cpu
}

pub const STRATEGIES: [Strategy; 2] = [Strategy::Inline, Strategy::Shared];
