use crate::numbers;
use std::fmt::{Debug, Formatter};

/// The 4-bit operation code in bits 15 to 12 of every instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    Br = 0b0000,
    Add = 0b0001,
    Ld = 0b0010,
    St = 0b0011,
    Jsr = 0b0100,
    And = 0b0101,
    Ldr = 0b0110,
    Str = 0b0111,
    /// Return from interrupt, not supported without supervisor mode.
    Rti = 0b1000,
    Not = 0b1001,
    Ldi = 0b1010,
    Sti = 0b1011,
    Jmp = 0b1100,
    Reserved = 0b1101,
    Lea = 0b1110,
    Trap = 0b1111,
}

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        let width = u32::from(to - from + 1);
        (self.0 >> from) & u16::MAX.checked_shr(u16::BITS - width).unwrap_or(0)
    }
    /// Gives the value of a bit range of at most 8 bits.
    /// See [`Instruction::get_bit_range()`]
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8) -> u8 {
        debug_assert!(to - from < 8, "bit range {from}..={to} does not fit into u8");
        u8::try_from(self.get_bit_range(from, to)).unwrap_or(u8::MAX)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.get_bit_range_u8(12, 15)
    }
    /// Decodes bits 15 to 12, every value maps to an [`Opcode`].
    #[must_use]
    pub fn opcode(self) -> Opcode {
        // all 16 values are enumerated
        Opcode::n(self.op_code()).unwrap_or(Opcode::Reserved)
    }
    /// Destination register, also the source register of the store instructions.
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11)
    }
    /// Source register 1, also `BaseR` of JMP, JSRR, LDR and STR.
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8)
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2)
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Sign extended `imm5`.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Sign extended offset of the lowest `len` bits, used as `offset6`, `PCoffset9` and
    /// `PCoffset11`. Adding it with wrapping arithmetic is two's complement addition.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// Unsigned 8-bit vector of the TRAP instruction.
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7)
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#06X} Op: {:?}, DR: {:03b}, PC_Off: {:09b}",
            self.0,
            self.opcode(),
            self.dr_number(),
            self.get_bit_range(0, 8)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_instr_get_bit_range_valid() {
        let sut = Instruction::from(0b1010_101_001010101);
        expect_that!(sut.op_code(), eq(0b1010));
        expect_that!(sut.opcode(), eq(Opcode::Ldi));
        expect_that!(sut.dr_number(), eq(0b101));
        expect_that!(sut.pc_offset(9), eq(0b0_0101_0101));

        // Add: DR: 3, SR1: 2, Immediate: false, SR2: 1
        let sut = Instruction::from(0b0001_011_010_0_00_001);
        expect_that!(sut.opcode(), eq(Opcode::Add));
        expect_that!(sut.dr_number(), eq(3));
        expect_that!(sut.sr1_number(), eq(2));
        expect_that!(sut.sr2_number(), eq(1));
        expect_that!(sut.is_immediate(), eq(false));

        // Add: DR: 7, SR1: 0, Immediate: true, imm5: 14
        let sut = Instruction::from(0b0001_111_000_1_01110);
        expect_that!(sut.dr_number(), eq(7));
        expect_that!(sut.sr1_number(), eq(0));
        expect_that!(sut.is_immediate(), eq(true));
        expect_that!(sut.get_immediate(), eq(14));

        // Trap: vector 0x25
        let sut = Instruction::from(0xF025);
        expect_that!(sut.opcode(), eq(Opcode::Trap));
        expect_that!(sut.trap_vector(), eq(0x25));
    }
    #[gtest]
    pub fn test_instr_full_width_range() {
        let sut = Instruction::from(0xBEEF);
        expect_that!(sut.get_bit_range(0, 15), eq(0xBEEF));
    }
    #[parameterized(
        imm5_minus_one = { 0b0001_000_000_1_11111, 0xFFFF },
        imm5_plus_fifteen = { 0b0001_000_000_1_01111, 15 },
        imm5_minus_sixteen = { 0b0001_000_000_1_10000, 0xFFF0 },
    )]
    fn test_instr_immediate(bits: u16, expected: u16) {
        assert_that!(Instruction::from(bits).get_immediate(), eq(expected));
    }
    #[parameterized(
        offset6_negative = { 0b0110_010_110_100000, 6, 0xFFE0 },
        offset9_negative = { 0b0000_111_111111111, 9, 0xFFFF },
        offset9_positive = { 0b0000_111_011111111, 9, 0x00FF },
        offset11_negative = { 0b0100_1_10000000000, 11, 0xFC00 },
        offset11_positive = { 0b0100_1_00110100001, 11, 0x01A1 },
    )]
    fn test_instr_pc_offset(bits: u16, len: u8, expected: u16) {
        assert_that!(Instruction::from(bits).pc_offset(len), eq(expected));
    }
    #[gtest]
    pub fn test_every_opcode_value_decodes() {
        for op in 0..=0xFu16 {
            let sut = Instruction::from(op << 12);
            expect_that!(sut.opcode() as u16, eq(op));
        }
    }
    #[gtest]
    #[should_panic(expected = "wrong direction of from: 2 and to: 1")]
    pub fn test_instr_get_bit_range_wrong_order() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 1);
    }
    #[gtest]
    #[should_panic(expected = "index: 16 to u16 is greater than maximum value 15")]
    pub fn test_instr_get_bit_range_index_too_large() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 16);
    }
}
