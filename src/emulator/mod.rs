pub mod instruction;
pub mod opcodes;
#[cfg(test)]
mod test_helpers;
pub mod trap_routines;

use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::KeyboardInput;
use crate::hardware::memory::{LoadedImage, Memory};
use crate::hardware::registers::{ConditionFlag, Register, Registers, from_binary};
use instruction::{Instruction, Opcode};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::io::{Read, Write};
use std::ops::ControlFlow;
use std::path::Path;
use trap_routines::TrapVector;

/// The public facing emulator used to run LC-3 programs.
///
/// Holds the complete machine state. Instructions are executed with [`Emulator::step`] and
/// [`Emulator::run`], which read from and write to the console passed in.
pub struct Emulator {
    memory: Memory,
    registers: Registers,
    halted: bool,
}

impl Debug for Emulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Emulator {{ {:?}, halted: {}, {:?} }}",
            self.registers, self.halted, self.memory
        )
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an emulator and loads the object file at `path` into it.
///
/// # Errors
/// - file cannot be read
/// - see [`Emulator::load_program_bytes`]
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, LoadProgramError> {
    let image = fs::read(path)?;
    from_program_bytes(&image)
}

/// Creates an emulator and loads the object image into it.
///
/// # Errors
/// - see [`Emulator::load_program_bytes`]
pub fn from_program_bytes(image: &[u8]) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new();
    emu.load_program_bytes(image)?;
    Ok(emu)
}

impl Emulator {
    /// Initial machine state: PC at `0x3000`, condition code Z, not halted.
    /// Memory and registers are zero-filled.
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("initializing machine");
        Self {
            memory: Memory::new(),
            registers: Registers::new(),
            halted: false,
        }
    }

    /// Loads an object image: big-endian words, the first one being the origin address.
    /// PC, condition code and halted flag are left untouched.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header (image is empty)
    /// - Program ends in the middle of a word, complete words before are written
    pub fn load_program_bytes(&mut self, image: &[u8]) -> Result<LoadedImage, LoadProgramError> {
        let loaded = self.memory.load_image(image);
        match &loaded {
            Ok(l) => tracing::debug!(
                "loaded {} words at origin {:#06X}",
                l.word_count,
                l.origin
            ),
            Err(e) => tracing::debug!("loading program failed: {e}"),
        }
        loaded
    }

    /// Reads the complete object image from `reader`, then loads it.
    ///
    /// # Errors
    /// - reading fails
    /// - see [`Emulator::load_program_bytes`]
    pub fn load_program(&mut self, mut reader: impl Read) -> Result<LoadedImage, LoadProgramError> {
        let mut image = Vec::new();
        reader.read_to_end(&mut image)?;
        self.load_program_bytes(&image)
    }

    /// Executes the instruction at the program counter. Does nothing if the machine halted.
    ///
    /// # Errors
    /// - `IllegalOpcode` for RTI and the reserved opcode, machine state is left unchanged
    /// - `UnknownTrap` for trap vectors without service routine, machine state is left unchanged
    /// - `InputOutput` if a trap routine cannot read from `keyboard` or write to `display`, PC and
    ///   R7 are restored, output already written stays written
    pub fn step(
        &mut self,
        keyboard: &mut impl KeyboardInput,
        display: &mut impl Write,
    ) -> Result<(), ExecutionError> {
        if self.halted {
            return Ok(());
        }
        let address = self.registers.pc().as_binary();
        let i = Instruction::from(self.memory[address]);
        tracing::trace!("{address:#06X}: {i:?}");
        self.registers.increment_pc();

        let r = &mut self.registers;
        match i.opcode() {
            Opcode::Br => opcodes::br(i, r),
            Opcode::Add => opcodes::add(i, r),
            Opcode::Ld => opcodes::ld(i, r, &self.memory),
            Opcode::St => opcodes::st(i, r, &mut self.memory),
            Opcode::Jsr => opcodes::jsr(i, r),
            Opcode::And => opcodes::and(i, r),
            Opcode::Ldr => opcodes::ldr(i, r, &self.memory),
            Opcode::Str => opcodes::str(i, r, &mut self.memory),
            Opcode::Not => opcodes::not(i, r),
            Opcode::Ldi => opcodes::ldi(i, r, &self.memory),
            Opcode::Sti => opcodes::sti(i, r, &mut self.memory),
            Opcode::Jmp => opcodes::jmp_or_ret(i, r),
            Opcode::Lea => opcodes::lea(i, r),
            Opcode::Trap => {
                let Some(vector) = TrapVector::n(i.trap_vector()) else {
                    return Err(self.reject(
                        address,
                        ExecutionError::UnknownTrap {
                            vector: i.trap_vector(),
                            address,
                        },
                    ));
                };
                return self.trap(address, vector, keyboard, display);
            }
            opcode @ (Opcode::Rti | Opcode::Reserved) => {
                return Err(self.reject(
                    address,
                    ExecutionError::IllegalOpcode {
                        opcode: opcode as u8,
                        instruction: i.as_binary(),
                        address,
                    },
                ));
            }
        }
        Ok(())
    }

    /// Puts the program counter back onto the rejected instruction.
    fn reject(&mut self, address: u16, error: ExecutionError) -> ExecutionError {
        tracing::warn!("{error}");
        self.registers.set_pc(address);
        error
    }

    /// Runs a service routine. If the console fails, R7 and the PC are restored so the TRAP
    /// can be executed again.
    fn trap(
        &mut self,
        address: u16,
        vector: TrapVector,
        keyboard: &mut impl KeyboardInput,
        display: &mut impl Write,
    ) -> Result<(), ExecutionError> {
        let r = &mut self.registers;
        let link = r.get(7);
        r.set(7, r.pc());
        let flow = match vector {
            TrapVector::GetC => trap_routines::get_c(r, keyboard),
            TrapVector::Out => trap_routines::out(r, display),
            TrapVector::PutS => trap_routines::put_s(r, &self.memory, display),
            TrapVector::In => trap_routines::in_trap(r, keyboard, display),
            TrapVector::PutSp => trap_routines::put_sp(r, &self.memory, display),
            TrapVector::Halt => trap_routines::halt(r),
        };
        match flow {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(Ok(())) => {
                tracing::info!("halted at {:#06X}", self.registers.pc().as_binary());
                self.halted = true;
                Ok(())
            }
            ControlFlow::Break(Err(e)) => {
                self.registers.set(7, link);
                Err(self.reject(address, e))
            }
        }
    }

    /// Steps until the machine halts or `max_steps` instructions were executed, `None` runs
    /// without limit. Returns the number of executed steps.
    ///
    /// # Errors
    /// - the first error of [`Emulator::step`], execution stops there
    pub fn run(
        &mut self,
        max_steps: Option<u64>,
        keyboard: &mut impl KeyboardInput,
        display: &mut impl Write,
    ) -> Result<u64, ExecutionError> {
        let mut steps = 0;
        while !self.halted && max_steps.is_none_or(|max| steps < max) {
            self.step(keyboard, display)?;
            steps += 1;
        }
        tracing::info!("executed {steps} steps");
        Ok(steps)
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.registers.pc().as_binary()
    }
    #[must_use]
    pub const fn condition_code(&self) -> ConditionFlag {
        self.registers.get_conditional_register()
    }
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }
    /// Reads the memory cell at `address`.
    #[must_use]
    pub fn memory(&self, address: u16) -> u16 {
        self.memory[address]
    }
    /// Memory cells from `start` to `end` inclusive, wrapping past `0xFFFF`.
    pub fn memory_words(&self, start: u16, end: u16) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.memory.words(start, end)
    }
    /// Overwrites a general purpose register, the condition code is not updated.
    ///
    /// # Panics
    /// - `r` is greater than 7
    pub fn set_register(&mut self, r: u8, value: u16) {
        self.registers.set(r, from_binary(value));
    }
    #[must_use]
    pub fn register(&self, r: u8) -> Register {
        self.registers.get(r)
    }
    /// Overwrites a memory cell, any value is accepted.
    pub fn set_memory(&mut self, address: u16, value: u16) {
        self.memory[address] = value;
    }
}
