//! Line based debugger over an [`Emulator`]: stepping, register and memory inspection and
//! patching.
use crate::emulator::Emulator;
use crate::errors::DebuggerError;
use crate::hardware::keyboard::KeyboardInput;
use crate::hardware::registers::GENERAL_PURPOSE_REGISTER_COUNT;
use std::io;
use std::io::{BufRead, Write};
use std::ops::ControlFlow;
use std::str::FromStr;

pub const PROMPT: &str = "(LC3) ";

const HELP: &str = "\
step [n]
\tExecutes n instructions (n defaults to 1, negative runs until halted)
quit
\tQuits the simulator
continue
\tRuns until the program halts
registers
\tPrints all registers, pc, and cc values
dump start [end]
\tDumps the contents of memory from the starting address to the end (if not provided will just print one value)
setaddr addr value
\tSets the value at the provided address
setreg Rn value
\tSets register n with the provided value
help
\tDisplays this menu
";

const DUMP_WORDS_PER_ROW: usize = 4;
const DUMP_SEPARATOR: &str = "|--------------------------------------|";

/// A parsed debugger command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Executes at most the given number of instructions, `None` until halted.
    Step(Option<u64>),
    Continue,
    Registers,
    Dump { start: u16, end: u16 },
    SetAddr { address: u16, value: u16 },
    SetReg { register: u8, value: u16 },
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = DebuggerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = line.split_whitespace();
        let command = args.next().unwrap_or_default();
        match command {
            "quit" | "q" => Ok(Self::Quit),
            "step" | "s" => {
                let count = args.next().map_or(Ok(1), parse_decimal)?;
                // negative counts run until halted
                Ok(Self::Step(u64::try_from(count).ok()))
            }
            "continue" | "c" | "run" => Ok(Self::Continue),
            "registers" | "r" => Ok(Self::Registers),
            "dump" => {
                let start = parse_address(args.next().ok_or(DebuggerError::MissingArgument(
                    "Starting memory index",
                ))?)?;
                let end = args.next().map_or(Ok(start), parse_address)?;
                Ok(Self::Dump { start, end })
            }
            "setaddr" => {
                let address = parse_address(
                    args.next()
                        .ok_or(DebuggerError::MissingArgument("Memory address"))?,
                )?;
                let value = parse_value(
                    args.next()
                        .ok_or(DebuggerError::MissingArgument("Memory value"))?,
                )?;
                Ok(Self::SetAddr { address, value })
            }
            "setreg" => {
                let register = parse_register(
                    args.next()
                        .ok_or(DebuggerError::MissingArgument("Register number"))?,
                )?;
                let value = parse_value(
                    args.next()
                        .ok_or(DebuggerError::MissingArgument("Register value"))?,
                )?;
                Ok(Self::SetReg { register, value })
            }
            "help" => Ok(Self::Help),
            other => Err(DebuggerError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_decimal(arg: &str) -> Result<i64, DebuggerError> {
    arg.parse()
        .map_err(|_| DebuggerError::InvalidNumber(arg.to_string()))
}

/// Addresses are hexadecimal, with or without `0x` or `x` prefix.
fn parse_address(arg: &str) -> Result<u16, DebuggerError> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .or_else(|| arg.strip_prefix('x'))
        .unwrap_or(arg);
    u16::from_str_radix(digits, 16).map_err(|_| DebuggerError::InvalidNumber(arg.to_string()))
}

/// Values are decimal in the range of either a signed or an unsigned word, or hexadecimal
/// with a `0x` or `x` prefix.
fn parse_value(arg: &str) -> Result<u16, DebuggerError> {
    if arg.starts_with("0x") || arg.starts_with("0X") || arg.starts_with('x') {
        return parse_address(arg);
    }
    let value = parse_decimal(arg)?;
    i16::try_from(value)
        .map(i16::cast_unsigned)
        .or_else(|_| u16::try_from(value))
        .map_err(|_| DebuggerError::InvalidNumber(arg.to_string()))
}

fn parse_register(arg: &str) -> Result<u8, DebuggerError> {
    arg.strip_prefix(['R', 'r'])
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| *n < GENERAL_PURPOSE_REGISTER_COUNT)
        .ok_or_else(|| DebuggerError::InvalidRegister(arg.to_string()))
}

/// Interactive front end, reads commands from `commands` until `quit` or end of input.
pub struct Debugger<'a, K, W> {
    emulator: &'a mut Emulator,
    keyboard: K,
    out: W,
}

impl<'a, K: KeyboardInput, W: Write> Debugger<'a, K, W> {
    pub const fn new(emulator: &'a mut Emulator, keyboard: K, out: W) -> Self {
        Self {
            emulator,
            keyboard,
            out,
        }
    }

    /// Prompt loop. Invalid commands and execution errors are reported and the loop continues.
    ///
    /// # Errors
    /// - reading commands or writing output fails
    pub fn run(&mut self, mut commands: impl BufRead) -> io::Result<()> {
        let mut line = String::new();
        loop {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;
            line.clear();
            if commands.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                return Ok(());
            }
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if self.execute(command)?.is_break() {
                        return Ok(());
                    }
                }
                Err(e) => writeln!(self.out, "ERR: {e}")?,
            }
        }
    }

    /// Executes one command, `Break` on quit.
    ///
    /// # Errors
    /// - writing output fails
    pub fn execute(&mut self, command: Command) -> io::Result<ControlFlow<()>> {
        tracing::debug!("debugger command {command:?}");
        match command {
            Command::Quit => return Ok(ControlFlow::Break(())),
            Command::Step(count) => self.run_emulator(count)?,
            Command::Continue => self.run_emulator(None)?,
            Command::Registers => self.print_registers()?,
            Command::Dump { start, end } => self.dump(start, end)?,
            Command::SetAddr { address, value } => self.emulator.set_memory(address, value),
            Command::SetReg { register, value } => self.emulator.set_register(register, value),
            Command::Help => write!(self.out, "{HELP}")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn run_emulator(&mut self, max_steps: Option<u64>) -> io::Result<()> {
        let was_halted = self.emulator.is_halted();
        if let Err(e) = self
            .emulator
            .run(max_steps, &mut self.keyboard, &mut self.out)
        {
            writeln!(self.out)?;
            writeln!(self.out, "ERR: {e}")?;
        } else if self.emulator.is_halted() {
            if !was_halted {
                writeln!(self.out)?;
            }
            writeln!(self.out, "Program halted")?;
        }
        Ok(())
    }

    fn print_registers(&mut self) -> io::Result<()> {
        writeln!(self.out, "CC: {}", self.emulator.condition_code().as_char())?;
        let pc = self.emulator.pc();
        writeln!(self.out, "PC: {pc:#06X} {pc}")?;
        for r in 0..GENERAL_PURPOSE_REGISTER_COUNT {
            let value = self.emulator.register(r);
            writeln!(
                self.out,
                "R{r}: {:#06X} {}",
                value.as_binary(),
                value.as_decimal()
            )?;
        }
        Ok(())
    }

    fn dump(&mut self, start: u16, end: u16) -> io::Result<()> {
        if end < start {
            return writeln!(
                self.out,
                "ERR: Input invalid: end {end:#06X} is before start {start:#06X}"
            );
        }
        writeln!(self.out, "{DUMP_SEPARATOR}")?;
        writeln!(self.out, "|  ADDR  | VALUES (4)                  |")?;
        writeln!(self.out, "{DUMP_SEPARATOR}")?;
        let words: Vec<(u16, u16)> = self.emulator.memory_words(start, end).collect();
        for row in words.chunks(DUMP_WORDS_PER_ROW) {
            write!(self.out, "| {:#06X} | ", row[0].0)?;
            for column in 0..DUMP_WORDS_PER_ROW {
                match row.get(column) {
                    Some((_, value)) => write!(self.out, "{value:#06X} ")?,
                    None => write!(self.out, "       ")?,
                }
            }
            writeln!(self.out, "|")?;
        }
        writeln!(self.out, "{DUMP_SEPARATOR}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator;
    use crate::hardware::keyboard::ReaderKeyboard;
    use crate::hardware::registers::from_binary;
    use googletest::prelude::*;
    use yare::parameterized;

    #[parameterized(
        quit = { "quit", Command::Quit },
        quit_short = { "q", Command::Quit },
        step_default = { "step", Command::Step(Some(1)) },
        step_count = { "s 12", Command::Step(Some(12)) },
        step_negative = { "step -1", Command::Step(None) },
        step_zero = { "step 0", Command::Step(Some(0)) },
        continue_long = { "continue", Command::Continue },
        continue_run = { "run", Command::Continue },
        registers = { "r", Command::Registers },
        dump_single = { "dump 3000", Command::Dump { start: 0x3000, end: 0x3000 } },
        dump_range = { "dump x3000 0x3007", Command::Dump { start: 0x3000, end: 0x3007 } },
        setaddr = { "setaddr 3001 -1", Command::SetAddr { address: 0x3001, value: 0xFFFF } },
        setaddr_hex = { "setaddr 3001 xF025", Command::SetAddr { address: 0x3001, value: 0xF025 } },
        setreg = { "setreg R3 42", Command::SetReg { register: 3, value: 42 } },
        setreg_unsigned = { "setreg r7 65535", Command::SetReg { register: 7, value: 0xFFFF } },
        help = { "  help  ", Command::Help },
    )]
    fn test_parse_command(line: &str, expected: Command) {
        let parsed = line.parse::<Command>().unwrap();
        assert_that!(parsed, eq(expected));
    }

    #[parameterized(
        unknown = { "jump 3", "Input invalid. Type 'help' for a list of instructions" },
        dump_missing = { "dump", "Input invalid: Starting memory index required" },
        setaddr_missing_value = { "setaddr 3000", "Input invalid: Memory value required" },
        setreg_missing = { "setreg", "Input invalid: Register number required" },
        setreg_out_of_range = { "setreg R8 1", "Input invalid: 'R8' is not a register, expected R0 to R7" },
        bad_address = { "dump zz", "Input invalid: 'zz' is not a number" },
        value_too_large = { "setaddr 3000 70000", "Input invalid: '70000' is not a number" },
    )]
    fn test_parse_command_errors(line: &str, message: &str) {
        let err = line.parse::<Command>().unwrap_err();
        assert_that!(err.to_string(), eq(message));
    }

    fn debug_session(image: &[u8], commands: &str) -> (Emulator, String) {
        let mut emu = emulator::from_program_bytes(image).unwrap();
        let mut out = Vec::new();
        Debugger::new(&mut emu, ReaderKeyboard::new(io::empty()), &mut out)
            .run(commands.as_bytes())
            .unwrap();
        (emu, String::from_utf8(out).unwrap())
    }

    #[gtest]
    pub fn test_step_and_registers() {
        // ADD R0, R0, #-1; HALT
        let (emu, out) = debug_session(&[0x30, 0x00, 0x10, 0x3F, 0xF0, 0x25], "step\nr\nquit\n");
        expect_that!(emu.register(0), eq(from_binary(0xFFFF)));
        expect_that!(out, contains_substring("CC: n\nPC: 0x3001 12289\nR0: 0xFFFF -1\n"));
        expect_that!(out, contains_substring("R7: 0x0000 0\n"));
    }

    #[gtest]
    pub fn test_continue_until_halt() {
        let (emu, out) = debug_session(&[0x30, 0x00, 0x10, 0x3F, 0xF0, 0x25], "c\n");
        expect_that!(emu.is_halted(), eq(true));
        expect_that!(out, contains_substring("Program halted"));
    }

    #[gtest]
    pub fn test_patch_and_dump() {
        let (emu, out) = debug_session(
            &[0x30, 0x00],
            "setaddr 3001 xF025\nsetreg R2 -2\ndump 3000 3004\nq\n",
        );
        expect_that!(emu.memory(0x3001), eq(0xF025));
        expect_that!(emu.register(2), eq(from_binary(0xFFFE)));
        expect_that!(
            out,
            contains_substring("| 0x3000 | 0x0000 0xF025 0x0000 0x0000 |\n")
        );
        let last_row = format!("| 0x3004 | 0x0000 {}|\n", " ".repeat(21));
        expect_that!(out, contains_substring(last_row));
    }

    #[gtest]
    pub fn test_errors_keep_session_alive() {
        let (emu, out) = debug_session(&[0x30, 0x00, 0xD0, 0x00], "bogus\nstep\nregisters\n");
        expect_that!(out, contains_substring("ERR: Input invalid. Type 'help'"));
        expect_that!(
            out,
            contains_substring("ERR: Illegal opcode 0b1101 in instruction 0xD000 at address 0x3000")
        );
        expect_that!(out, contains_substring("PC: 0x3000"));
        expect_that!(emu.is_halted(), eq(false));
    }
}
