use crate::hardware::memory::PROGRAM_SECTION_START;
use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Number of general purpose registers `R0` to `R7`.
pub const GENERAL_PURPOSE_REGISTER_COUNT: u8 = 8;

/// A 16-bit register value with unsigned (binary) and two's complement (decimal) views.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Register(u16);

impl Register {
    #[must_use]
    pub const fn from_binary(value: u16) -> Self {
        Self(value)
    }
    #[must_use]
    pub const fn from_decimal(value: i16) -> Self {
        Self(value.cast_unsigned())
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    #[must_use]
    pub const fn as_decimal(self) -> i16 {
        numbers::twos_complement_to_decimal(self.0)
    }
}

impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X} ({})", self.0, self.as_decimal())
    }
}

#[must_use]
pub const fn from_binary(value: u16) -> Register {
    Register::from_binary(value)
}
#[must_use]
pub const fn from_decimal(value: i16) -> Register {
    Register::from_decimal(value)
}

/// General purpose registers, program counter and condition code.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    general_purpose: [Register; GENERAL_PURPOSE_REGISTER_COUNT as usize],
    pc: Register,
    cond: ConditionFlag,
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PC: {:?}, CC: {:?}, R: {:?}",
            self.pc, self.cond, self.general_purpose
        )
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [Register(0); GENERAL_PURPOSE_REGISTER_COUNT as usize],
            pc: Register(PROGRAM_SECTION_START),
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` is not a valid register index, decoded fields are always in range
    #[must_use]
    pub fn get(&self, r: u8) -> Register {
        assert!(
            r < GENERAL_PURPOSE_REGISTER_COUNT,
            "Invalid general purpose register get"
        );
        self.general_purpose[usize::from(r)]
    }
    /// # Panics
    /// - `r` is not a valid register index, decoded fields are always in range
    pub fn set(&mut self, r: u8, value: Register) {
        assert!(
            r < GENERAL_PURPOSE_REGISTER_COUNT,
            "Invalid general purpose register set"
        );
        self.general_purpose[usize::from(r)] = value;
    }
    #[must_use]
    pub const fn pc(&self) -> Register {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = Register(value);
    }
    /// Advances the program counter by one word, wrapping at the end of memory.
    pub const fn increment_pc(&mut self) {
        self.pc = Register(self.pc.0.wrapping_add(1));
    }
    pub const fn decrement_pc(&mut self) {
        self.pc = Register(self.pc.0.wrapping_sub(1));
    }

    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    /// Derives the condition code from the signed value of register `r`.
    pub fn update_conditional_register(&mut self, r: u8) {
        let val = self.get(r);
        self.cond = ConditionFlag::from(val.as_binary());
    }
}

/// Condition code, bit values match the `n`, `z` and `p` bits of the BR instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}

impl ConditionFlag {
    /// Lower case letter used in debugger output.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Pos => 'p',
            Self::Zero => 'z',
            Self::Neg => 'n',
        }
    }
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_registers_initial_state() {
        let regs = Registers::new();
        expect_that!(regs.pc(), eq(from_binary(0x3000)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Zero));
    }

    #[gtest]
    pub fn test_pc_wraps() {
        let mut regs = Registers::new();
        regs.set_pc(0xFFFF);
        regs.increment_pc();
        expect_that!(regs.pc(), eq(from_binary(0)));
        regs.decrement_pc();
        expect_that!(regs.pc(), eq(from_binary(0xFFFF)));
    }

    #[gtest]
    pub fn test_register_views() {
        let r = from_decimal(-128);
        expect_that!(r.as_binary(), eq(0b1111_1111_1000_0000));
        expect_that!(r.as_decimal(), eq(-128));
    }

    #[gtest]
    #[should_panic(expected = "Invalid general purpose register get")]
    pub fn test_get_invalid_register() {
        let regs = Registers::new();
        let _ = regs.get(8);
    }

    #[parameterized(
        zero = { 0, ConditionFlag::Zero },
        one = { 1, ConditionFlag::Pos },
        largest_positive = { 0x7FFF, ConditionFlag::Pos },
        smallest_negative = { 0x8000, ConditionFlag::Neg },
        minus_one = { 0xFFFF, ConditionFlag::Neg },
    )]
    fn test_condition_flag_from_value(value: u16, expected: ConditionFlag) {
        let mut regs = Registers::new();
        regs.set(3, from_binary(value));
        regs.update_conditional_register(3);
        assert_that!(regs.get_conditional_register(), eq(expected));
    }
}
