/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// Only the low `bit_width` bits of `value` are considered, the bit at `bit_width - 1` is the
/// sign bit which is copied into all higher bits.
///
/// # Panics
/// - `bit_width` is not in `1..=16` (debug builds only)
#[must_use]
pub const fn sign_extend(value: u16, bit_width: u8) -> u16 {
    debug_assert!(bit_width >= 1 && bit_width <= 16, "invalid bit width");
    if bit_width == 16 {
        return value;
    }
    let bits = value & ((1 << bit_width) - 1);
    if (bits >> (bit_width - 1)) & 1 == 1 {
        // negative: 1-extend
        bits | (0xFFFF << bit_width)
    } else {
        // positive, already 0-extended
        bits
    }
}

/// Signed interpretation of a 16-bit two's complement word.
#[must_use]
pub const fn twos_complement_to_decimal(bin_rep: u16) -> i16 {
    bin_rep.cast_signed()
}
