use std::fmt::Debug;
use std::mem::size_of;
use std::ops::RangeInclusive;

/// Returns the bits of `word` from `low` to `high` (both inclusive), moved
/// to the least significant end.
///
/// Decoders only call this with literal bit positions, `high >= low` and
/// both in `0..=31`.
#[must_use]
pub fn extract(word: u32, high: u8, low: u8) -> u32 {
    debug_assert!(high >= low && high < 32, "invalid bit range {high}..{low}");
    word.get_bits(low..=high)
}

/// Contains some helper methods to manipulate bits,
/// the index (`bit_idx`) is supposed to be from lsb to msb (right to left)
pub trait Bits
where
    Self: Clone + Sized + Into<u128> + TryFrom<u128> + From<bool> + TryInto<u8> + From<u8>,
    <Self as TryFrom<u128>>::Error: Debug,
    <Self as TryInto<u8>>::Error: Debug,
{
    fn is_bit_on(&self, bit_idx: u8) -> bool {
        debug_assert!(bit_idx < (size_of::<Self>() * 8) as u8);
        let bitwise: u128 = <Self as Into<u128>>::into(self.clone());
        let mask: u128 = 0b1 << bit_idx;
        (bitwise & mask) != 0
    }

    fn set_bit_on(&mut self, bit_idx: u8) {
        debug_assert!(bit_idx < (size_of::<Self>() * 8) as u8);
        let mut bitwise: u128 = <Self as Into<u128>>::into(self.clone());
        bitwise |= 0b1 << bit_idx;
        *self = <Self as TryFrom<u128>>::try_from(bitwise).unwrap();
    }

    fn set_bit_off(&mut self, bit_idx: u8) {
        debug_assert!(bit_idx < (size_of::<Self>() * 8) as u8);
        let mut bitwise: u128 = <Self as Into<u128>>::into(self.clone());
        bitwise &= !(0b1 << bit_idx);
        *self = <Self as TryFrom<u128>>::try_from(bitwise).unwrap();
    }

    fn set_bit(&mut self, bit_idx: u8, value: bool) {
        if value {
            self.set_bit_on(bit_idx);
        } else {
            self.set_bit_off(bit_idx);
        }
    }

    fn get_bit(&self, bit_idx: u8) -> bool {
        self.is_bit_on(bit_idx)
    }

    fn get_bits(&self, bits_range: RangeInclusive<u8>) -> Self {
        let start = bits_range.start();
        let length = bits_range.len() as u32;

        // `length` ones, moved up to the first bit of the range.
        let mask = ((2_u128.pow(length)) - 1) << start;

        let value: u128 = <Self as Into<u128>>::into(self.clone());

        <Self as TryFrom<u128>>::try_from((value & mask) >> start).unwrap()
    }

    fn get_byte(&self, byte_nth: u8) -> u8 {
        debug_assert!(byte_nth < size_of::<Self>() as u8);

        self.get_bits(byte_nth * 8..=byte_nth * 8 + 7)
            .try_into()
            .unwrap()
    }

    /// Returns a sign-extended copy of the value.
    /// `number_of_bits` is the width of the two's complement value stored
    /// in the low bits; anything above it must already be zero.
    fn sign_extended(&self, number_of_bits: u8) -> Self {
        let value: u128 = <Self as Into<u128>>::into(self.clone());

        // XOR clears the sign bit of a negative value (set it for a positive one),
        // the subtraction then borrows through every upper bit or cancels the XOR.
        // 4 bits: 0b1001 ^ 0b1000 = 0b0001, 0b0001 - 0b1000 = ...1111_1001 (-7).
        let mask = 1 << (number_of_bits - 1);
        let value = ((value as i128 ^ mask) - mask) as u128;

        // Drop the leading ones above the width of `Self`.
        let size_bits = (size_of::<Self>() * 8) as u128;
        let value = value & ((1 << size_bits) - 1);

        <Self as TryFrom<u128>>::try_from(value).unwrap()
    }
}

impl Bits for u32 {}
impl Bits for u8 {}
