//! Machine state of the LC-3: memory, registers and the keyboard the traps read from.
pub mod keyboard;
pub mod memory;
pub mod registers;
