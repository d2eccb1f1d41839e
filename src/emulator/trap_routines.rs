use crate::errors::ExecutionError;
use crate::hardware::keyboard::KeyboardInput;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use std::io::Write;
use std::ops::ControlFlow;

/// Prompt written by the IN trap before reading a character.
pub const IN_PROMPT: &str = ">> ";

/// Service routines reachable through `TRAP trapvect8`.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapVector {
    GetC = 0x20,
    Out = 0x21,
    PutS = 0x22,
    In = 0x23,
    PutSp = 0x24,
    Halt = 0x25,
}

/// Outcome of a trap routine: continue with the next instruction, or stop because the
/// machine halted (`Ok`) or the console failed (`Err`).
pub type TrapResult = ControlFlow<Result<(), ExecutionError>>;

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(regs: &mut Registers, keyboard: &mut impl KeyboardInput) -> TrapResult {
    match keyboard.read_char() {
        Ok(c) => {
            regs.set(0, from_binary(u16::from(c)));
            ControlFlow::Continue(())
        }
        Err(e) => ControlFlow::Break(Err(e.into())),
    }
}

/// IN: Print a prompt on the screen and read a single character from the keyboard.
///
/// Otherwise, like 0x20 GETC, the character is not echoed.
pub fn in_trap(
    regs: &mut Registers,
    keyboard: &mut impl KeyboardInput,
    stdout: &mut impl Write,
) -> TrapResult {
    write_out(IN_PROMPT.as_bytes(), stdout)?;
    get_c(regs, keyboard)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> TrapResult {
    write_out(&[low_byte(regs.get(0).as_binary())], stdout)
}

/// PUTS: print null-delimited string from register 0's address, one character per word.
pub fn put_s(regs: &Registers, mem: &Memory, stdout: &mut impl Write) -> TrapResult {
    let mut s = Vec::with_capacity(120);
    for word in string_words(regs, mem).take_while(|w| *w != 0) {
        s.push(low_byte(word));
    }
    write_out(&s, stdout)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// The second character of the last memory location can be 0x00.
/// Writing terminates after a word with a 0x00 high byte.
pub fn put_sp(regs: &Registers, mem: &Memory, stdout: &mut impl Write) -> TrapResult {
    let mut s = Vec::with_capacity(120);
    for word in string_words(regs, mem) {
        let [high, low] = word.to_be_bytes();
        if low != 0 {
            s.push(low);
        }
        if high == 0 {
            break;
        }
        s.push(high);
    }
    write_out(&s, stdout)
}

/// HALT: End the program. The program counter is moved back onto the HALT instruction.
pub fn halt(regs: &mut Registers) -> TrapResult {
    regs.decrement_pc();
    ControlFlow::Break(Ok(()))
}

/// Words starting at R0, at most one trip around memory.
fn string_words<'a>(regs: &Registers, mem: &'a Memory) -> impl Iterator<Item = u16> + 'a {
    let start = regs.get(0).as_binary();
    mem.words(start, start.wrapping_sub(1)).map(|(_, w)| w)
}

const fn low_byte(word: u16) -> u8 {
    word.to_le_bytes()[0]
}

fn write_out(data: &[u8], stdout: &mut impl Write) -> TrapResult {
    match stdout.write_all(data).and_then(|()| stdout.flush()) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => ControlFlow::Break(Err(e.into())),
    }
}
