//! Errors reported by the loader, the executor and the debugger front end.
use displaydoc::Display;
use std::io;
use thiserror::Error;

/// Errors while loading an object image into memory.
#[derive(Display, Error, Debug)]
pub enum LoadProgramError {
    /// Program is missing valid .ORIG header
    ProgramMissingOrigHeader,
    /// Program image ends in the middle of a word after {words_loaded} complete words
    TruncatedImage { words_loaded: usize },
    /// Error reading program image: {0}
    Io(#[from] io::Error),
}

/// Errors that abort a single step.
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Illegal opcode {opcode:#06b} in instruction {instruction:#06X} at address {address:#06X}
    IllegalOpcode {
        opcode: u8,
        instruction: u16,
        address: u16,
    },
    /// Unknown trap vector {vector:#04X} at address {address:#06X}
    UnknownTrap { vector: u8, address: u16 },
    /// Error during reading program input or writing program output: {0}
    InputOutput(String),
}

impl From<io::Error> for ExecutionError {
    fn from(error: io::Error) -> Self {
        Self::InputOutput(error.to_string())
    }
}

/// Errors parsing a debugger command line.
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum DebuggerError {
    /// Input invalid. Type 'help' for a list of instructions
    UnknownCommand(String),
    /// Input invalid: {0} required
    MissingArgument(&'static str),
    /// Input invalid: '{0}' is not a number
    InvalidNumber(String),
    /// Input invalid: '{0}' is not a register, expected R0 to R7
    InvalidRegister(String),
}
