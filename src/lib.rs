//! # LC-3 Simulator.
//!
//! `lc3-sim` is a bit-accurate simulator of the LC-3 instruction set.
//! Usage starts with loading an object image via `emulator::from_program` or
//! `emulator::Emulator::load_program_bytes`, then executing it with `step` or `run`.
//!
//!  # Example
//! ```
//! use lc3_sim::emulator;
//! use lc3_sim::hardware::keyboard::ReaderKeyboard;
//! // origin 0x3000, HALT
//! let mut emu = emulator::from_program_bytes(&[0x30, 0x00, 0xF0, 0x25]).unwrap();
//! let mut keyboard = ReaderKeyboard::new(std::io::empty());
//! let mut display: Vec<u8> = Vec::new();
//! emu.run(None, &mut keyboard, &mut display).unwrap();
//! assert!(emu.is_halted());
//! assert_eq!(emu.pc(), 0x3000);
//! ```
//! # Errors
//! - Program is missing valid .ORIG header
//! - Program ends in the middle of a word
//! - Illegal opcode or unknown trap vector during execution

pub mod debugger;
pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod numbers;
pub(crate) mod terminal;
