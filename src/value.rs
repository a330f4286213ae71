//! Value types a signal can carry, and how each one is marshalled to and from
//! the signal's byte storage.

use std::fmt::Debug;

use crate::bits::{
    array_to_u16, array_to_u32, array_to_u64, reflect_u8, u16_to_array, u32_to_array,
    u64_to_array,
};

mod private {
    pub trait Sealed {}
}

/// A value type that can be stored in a signal.
///
/// `store` left-aligns the value inside its storage by shifting it left by
/// `bit_mask_shift`, which also drops the bits beyond the signal's width;
/// `load` shifts it back. Signed types shift back arithmetically, so a narrow
/// signed field sign-extends on read.
pub trait SignalValue: Copy + Debug + private::Sealed {
    /// Width of the value type in bits.
    const BITS: usize;

    /// Number of buffer bits the value occupies regardless of the signal
    /// width, if fixed by the type (a flag is always one bit, raw bytes always
    /// span their full storage).
    const SPAN_BITS: Option<usize> = None;

    /// Byte storage, `BITS / 8` bytes long.
    type Storage: AsRef<[u8]> + AsMut<[u8]> + Copy + Debug;

    /// Zero-filled storage.
    const ZEROED: Self::Storage;

    fn store(self, bit_mask_shift: u32, bytes: &mut Self::Storage);

    fn load(bytes: &Self::Storage, bit_mask_shift: u32) -> Self;
}

impl private::Sealed for bool {}

impl SignalValue for bool {
    const BITS: usize = 8;
    const SPAN_BITS: Option<usize> = Some(1);

    type Storage = [u8; 1];
    const ZEROED: [u8; 1] = [0];

    // The flag lives in the most significant bit of the byte.
    fn store(self, _: u32, bytes: &mut [u8; 1]) {
        bytes[0] = reflect_u8(self as u8);
    }

    fn load(bytes: &[u8; 1], _: u32) -> Self {
        reflect_u8(bytes[0] & 0x80) != 0
    }
}

impl<const N: usize> private::Sealed for [u8; N] {}

/// Raw bytes, copied as they are. The signal width is not applied and the
/// field always spans all `N` bytes.
impl<const N: usize> SignalValue for [u8; N] {
    const BITS: usize = N * 8;
    const SPAN_BITS: Option<usize> = Some(N * 8);

    type Storage = [u8; N];
    const ZEROED: [u8; N] = [0; N];

    fn store(self, _: u32, bytes: &mut [u8; N]) {
        *bytes = self;
    }

    fn load(bytes: &[u8; N], _: u32) -> Self {
        *bytes
    }
}

impl private::Sealed for u8 {}

impl SignalValue for u8 {
    const BITS: usize = 8;

    type Storage = [u8; 1];
    const ZEROED: [u8; 1] = [0];

    fn store(self, bit_mask_shift: u32, bytes: &mut [u8; 1]) {
        bytes[0] = self << bit_mask_shift;
    }

    fn load(bytes: &[u8; 1], bit_mask_shift: u32) -> Self {
        bytes[0] >> bit_mask_shift
    }
}

impl private::Sealed for i8 {}

impl SignalValue for i8 {
    const BITS: usize = 8;

    type Storage = [u8; 1];
    const ZEROED: [u8; 1] = [0];

    fn store(self, bit_mask_shift: u32, bytes: &mut [u8; 1]) {
        (self as u8).store(bit_mask_shift, bytes);
    }

    fn load(bytes: &[u8; 1], bit_mask_shift: u32) -> Self {
        (bytes[0] as i8) >> bit_mask_shift
    }
}

macro_rules! impl_word_value {
    ($unsigned:ty, $signed:ty, $bytes:literal, $to_array:ident, $from_array:ident) => {
        impl private::Sealed for $unsigned {}

        impl SignalValue for $unsigned {
            const BITS: usize = $bytes * 8;

            type Storage = [u8; $bytes];
            const ZEROED: [u8; $bytes] = [0; $bytes];

            fn store(self, bit_mask_shift: u32, bytes: &mut [u8; $bytes]) {
                *bytes = $to_array(self << bit_mask_shift);
            }

            fn load(bytes: &[u8; $bytes], bit_mask_shift: u32) -> Self {
                $from_array(bytes) >> bit_mask_shift
            }
        }

        impl private::Sealed for $signed {}

        impl SignalValue for $signed {
            const BITS: usize = $bytes * 8;

            type Storage = [u8; $bytes];
            const ZEROED: [u8; $bytes] = [0; $bytes];

            fn store(self, bit_mask_shift: u32, bytes: &mut [u8; $bytes]) {
                (self as $unsigned).store(bit_mask_shift, bytes);
            }

            fn load(bytes: &[u8; $bytes], bit_mask_shift: u32) -> Self {
                ($from_array(bytes) as $signed) >> bit_mask_shift
            }
        }
    };
}

impl_word_value!(u16, i16, 2, u16_to_array, array_to_u16);
impl_word_value!(u32, i32, 4, u32_to_array, array_to_u32);
impl_word_value!(u64, i64, 8, u64_to_array, array_to_u64);

macro_rules! impl_float_value {
    ($float:ty, $bits:ty, $bytes:literal) => {
        impl private::Sealed for $float {}

        /// Only the IEEE 754 bit pattern is transferred; no numeric conversion.
        impl SignalValue for $float {
            const BITS: usize = $bytes * 8;

            type Storage = [u8; $bytes];
            const ZEROED: [u8; $bytes] = [0; $bytes];

            fn store(self, bit_mask_shift: u32, bytes: &mut [u8; $bytes]) {
                self.to_bits().store(bit_mask_shift, bytes);
            }

            fn load(bytes: &[u8; $bytes], bit_mask_shift: u32) -> Self {
                <$float>::from_bits(<$bits>::load(bytes, bit_mask_shift))
            }
        }
    };
}

impl_float_value!(f32, u32, 4);
impl_float_value!(f64, u64, 8);

/// Stores `value` into the front of `dest`, which must hold at least
/// `T::BITS / 8` bytes.
pub(crate) fn store_into<T: SignalValue>(value: T, bit_mask_shift: u32, dest: &mut [u8]) {
    let mut storage = T::ZEROED;
    value.store(bit_mask_shift, &mut storage);

    let bytes = storage.as_ref();
    dest[..bytes.len()].copy_from_slice(bytes);
}

/// Loads a `T` from the front of `src`, which must hold at least `T::BITS / 8` bytes.
pub(crate) fn load_from<T: SignalValue>(src: &[u8], bit_mask_shift: u32) -> T {
    let mut storage = T::ZEROED;
    let len = storage.as_ref().len();
    storage.as_mut().copy_from_slice(&src[..len]);

    T::load(&storage, bit_mask_shift)
}
