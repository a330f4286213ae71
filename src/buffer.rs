//! Fixed-capacity byte buffer that signals are packed into and unpacked from.

use std::{
    cell::Cell,
    ops::{Deref, DerefMut, Index, IndexMut},
};

use log::{trace, warn};

use crate::descriptor::SignalDescriptor;

/// Health of a [BitBuffer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Ok,
    /// An index at or beyond the capacity was used since the last [BitBuffer::clear].
    Overflow,
}

/// Mutable access to one buffer cell, tagged with whether it is real storage.
#[derive(Debug)]
pub enum Slot<'a> {
    Data(&'a mut u8),
    /// The shared overrun byte. Writes here never reach the buffer.
    Overrun(&'a mut u8),
}

impl Slot<'_> {
    pub fn is_overrun(&self) -> bool {
        matches!(self, Slot::Overrun(_))
    }
}

impl Deref for Slot<'_> {
    type Target = u8;

    fn deref(&self) -> &u8 {
        match self {
            Slot::Data(byte) | Slot::Overrun(byte) => &**byte,
        }
    }
}

impl DerefMut for Slot<'_> {
    fn deref_mut(&mut self) -> &mut u8 {
        match self {
            Slot::Data(byte) | Slot::Overrun(byte) => &mut **byte,
        }
    }
}

/// `SIZE` bytes plus an overflow status.
///
/// Indexing never panics: an out-of-range index flips the status to
/// [Status::Overflow] and resolves to an overrun byte whose content is
/// meaningless. Check [status](BitBuffer::status) after a sequence of
/// operations.
#[derive(Debug, Clone)]
pub struct BitBuffer<const SIZE: usize> {
    overrun: u8,
    status: Cell<Status>,
    data: [u8; SIZE],
}

impl<const SIZE: usize> BitBuffer<SIZE> {
    /// Creates a zeroed buffer.
    pub fn new() -> Self {
        BitBuffer {
            overrun: 0,
            status: Cell::new(Status::Ok),
            data: [0; SIZE],
        }
    }

    /// Wraps existing bytes, e.g. a received frame.
    pub fn from_bytes(data: [u8; SIZE]) -> Self {
        BitBuffer {
            overrun: 0,
            status: Cell::new(Status::Ok),
            data,
        }
    }

    /// Zeroes every byte and resets the status to [Status::Ok].
    pub fn clear(&mut self) {
        self.status.set(Status::Ok);
        self.overrun = 0;
        self.data = [0; SIZE];
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    /// Capacity in bytes.
    pub const fn size(&self) -> usize {
        SIZE
    }

    pub fn as_bytes(&self) -> &[u8; SIZE] {
        &self.data
    }

    /// Reads a byte without touching the status.
    pub fn get(&self, i: usize) -> Option<u8> {
        self.data.get(i).copied()
    }

    /// Tagged mutable access. An out-of-range index marks the overflow.
    pub fn slot(&mut self, i: usize) -> Slot<'_> {
        if i < SIZE {
            Slot::Data(&mut self.data[i])
        } else {
            self.mark_overflow(i);
            Slot::Overrun(&mut self.overrun)
        }
    }

    /// Whether `signal` lies entirely inside the buffer.
    pub fn fits<S: SignalDescriptor + ?Sized>(&self, signal: &S) -> bool {
        signal
            .position()
            .checked_add(signal.size_in_buffer())
            .is_some_and(|end| end <= SIZE)
    }

    /// Unpacks the buffer bytes covered by `signal` into its storage.
    ///
    /// Walks from the field's last byte back to its first, carrying the low
    /// bits of each buffer byte into the storage byte before it. Storage bytes
    /// are OR-ed into, so `signal` should be cleared beforehand. Bits of
    /// neighbouring fields picked up on the way are dropped by
    /// [SignalDescriptor::normalize].
    pub fn extract<S: SignalDescriptor + ?Sized>(&mut self, signal: &mut S) -> &mut Self {
        let position = signal.position();
        let type_size = signal.type_size();
        let shift_l = signal.read_lshift();
        let shift_r = signal.read_rshift();

        trace!(
            "extracting {} bytes at byte {} (<< {}, >> {})",
            signal.size_in_buffer(),
            position,
            shift_l,
            shift_r
        );

        let mut rem = 0u8;

        for i in (0..signal.size_in_buffer()).rev() {
            let byte = self[position + i];

            if i < type_size {
                signal[i] |= rem | (byte << shift_l);
            }

            if shift_r != 0 {
                rem = byte >> shift_r;
            }
        }

        signal.normalize();

        self
    }

    /// Packs `signal`'s storage into the buffer bytes it covers.
    ///
    /// Walks from the field's first byte to its last, carrying the bits that
    /// spill out of each storage byte into the next buffer byte. Buffer bytes
    /// are OR-ed into, so stale content has to be cleared beforehand.
    pub fn insert<S: SignalDescriptor + ?Sized>(&mut self, signal: &S) -> &mut Self {
        let position = signal.position();
        let type_size = signal.type_size();
        let shift_l = signal.write_lshift();
        let shift_r = signal.write_rshift();

        trace!(
            "inserting {} bytes at byte {} (>> {}, << {})",
            signal.size_in_buffer(),
            position,
            shift_r,
            shift_l
        );

        let mut rem = 0u8;

        for i in 0..signal.size_in_buffer() {
            let byte = if i < type_size { signal[i] } else { 0 };

            *self.slot(position + i) |= rem | (byte >> shift_r);

            if shift_l != 0 {
                rem = byte << shift_l;
            }
        }

        self
    }

    fn mark_overflow(&self, i: usize) {
        if self.status.replace(Status::Overflow) == Status::Ok {
            warn!("index {} out of range for a {}-byte bit buffer", i, SIZE);
        }
    }
}

// The overrun byte holds junk and takes no part in equality.
impl<const SIZE: usize> PartialEq for BitBuffer<SIZE> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.status.get() == other.status.get()
    }
}

impl<const SIZE: usize> Eq for BitBuffer<SIZE> {}

impl<const SIZE: usize> Default for BitBuffer<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> Index<usize> for BitBuffer<SIZE> {
    type Output = u8;

    fn index(&self, i: usize) -> &u8 {
        match self.data.get(i) {
            Some(byte) => byte,
            None => {
                self.mark_overflow(i);
                &self.overrun
            }
        }
    }
}

impl<const SIZE: usize> IndexMut<usize> for BitBuffer<SIZE> {
    fn index_mut(&mut self, i: usize) -> &mut u8 {
        match self.slot(i) {
            Slot::Data(byte) | Slot::Overrun(byte) => byte,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::signal::FixedWidthSignal;

    #[test]
    fn test_new_buffer_is_clean() {
        let buffer = BitBuffer::<4>::new();
        assert_eq!(buffer.status(), Status::Ok);
        assert_eq!(buffer.size(), 4);
        assert_eq!(buffer.as_bytes(), &[0; 4]);
    }

    #[test]
    fn test_index_out_of_range_sets_overflow() {
        let mut buffer = BitBuffer::<4>::from_bytes([1, 2, 3, 4]);

        buffer[4] = 0xFF;
        let _byte = buffer[4];
        buffer[100] |= 0x0F;

        assert_eq!(buffer.status(), Status::Overflow);
        assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_shared_index_sets_overflow() {
        let buffer = BitBuffer::<2>::new();
        let _byte = buffer[2];
        assert_eq!(buffer.status(), Status::Overflow);
    }

    #[test]
    fn test_overflow_is_sticky_until_clear() {
        let mut buffer = BitBuffer::<2>::new();
        let _byte = buffer[2];

        buffer[0] = 7;
        assert_eq!(buffer.status(), Status::Overflow);

        buffer.clear();
        assert_eq!(buffer.status(), Status::Ok);
        assert_eq!(buffer.as_bytes(), &[0, 0]);
    }

    #[test]
    fn test_get_does_not_touch_status() {
        let buffer = BitBuffer::<2>::from_bytes([9, 8]);
        assert_eq!(buffer.get(1), Some(8));
        assert_eq!(buffer.get(2), None);
        assert_eq!(buffer.status(), Status::Ok);
    }

    #[test]
    fn test_slot_is_tagged() {
        let mut buffer = BitBuffer::<2>::new();
        assert!(!buffer.slot(1).is_overrun());
        assert_eq!(buffer.status(), Status::Ok);

        let mut slot = buffer.slot(2);
        assert!(slot.is_overrun());
        *slot = 0xAA;
        assert_eq!(buffer.status(), Status::Overflow);
        assert_eq!(buffer.as_bytes(), &[0, 0]);
    }

    #[test]
    fn test_equality_ignores_overrun_byte() {
        let mut a = BitBuffer::<2>::from_bytes([3, 4]);
        let mut b = BitBuffer::<2>::from_bytes([3, 4]);
        assert_eq!(a, b);

        let _byte = a[2];
        *b.slot(5) = 0xAA;
        assert_eq!(a, b);

        b[0] = 0;
        assert_ne!(a, b);

        a.clear();
        b.clear();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_compares_status() {
        let a = BitBuffer::<1>::new();
        let b = BitBuffer::<1>::new();
        let _byte = b[1];
        assert_ne!(a, b);
    }

    #[test]
    fn test_extract_drops_neighbouring_bits() {
        let mut source = BitBuffer::<1>::from_bytes([0b1011_1111]);
        let mut gear = FixedWidthSignal::<u8, 6, 3>::new();
        source.extract(&mut gear);

        assert_eq!(gear.read(), 3);
        assert_eq!(gear.as_bytes(), &[0x60]);

        let mut target = BitBuffer::<1>::new();
        target.insert(&gear);
        assert_eq!(target.as_bytes(), &[0b0011_0000]);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_reframed_field_keeps_to_its_bits() {
        let mut source = BitBuffer::<3>::from_bytes([0xFF; 3]);
        let mut speed = FixedWidthSignal::<u16, 4, 12>::new();
        source.extract(&mut speed);
        assert_eq!(speed.read(), 0x0FFF);

        let mut target = BitBuffer::<3>::new();
        target.insert(&speed);
        assert_eq!(target.as_bytes(), &[0x1F, 0xFE, 0x00]);

        let mut flag = FixedWidthSignal::<bool, 2>::new();
        source.extract(&mut flag);
        assert!(flag.read());
        assert_eq!(flag.as_bytes(), &[0x80]);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_twelve_bit_field_across_first_two_bytes() {
        let signal = FixedWidthSignal::<u16, 4, 12>::with_value(0xABC);
        let mut buffer = BitBuffer::<4>::new();

        buffer.insert(&signal);
        assert_eq!(buffer.as_bytes(), &[0x15, 0x78, 0x00, 0x00]);
        assert_eq!(buffer.status(), Status::Ok);

        let mut decoded = FixedWidthSignal::<u16, 4, 12>::new();
        buffer.extract(&mut decoded);
        assert_eq!(decoded.read(), 0xABC);
    }

    #[test]
    fn test_insert_merges_with_neighbouring_bits() {
        // Bits 7..5 of byte 0 and bit 0 of byte 1 belong to someone else.
        let mut buffer = BitBuffer::<4>::from_bytes([0xE0, 0x01, 0x00, 0x00]);
        buffer.insert(&FixedWidthSignal::<u16, 4, 12>::with_value(0xABC));

        assert_eq!(buffer.as_bytes()[0] & 0xE0, 0xE0);
        assert_eq!(buffer.as_bytes()[1] & 0x01, 0x01);

        let mut decoded = FixedWidthSignal::<u16, 4, 12>::new();
        buffer.extract(&mut decoded);
        assert_eq!(decoded.read(), 0xABC);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_byte_aligned_u32() {
        let mut buffer = BitBuffer::<6>::new();
        buffer.insert(&FixedWidthSignal::<u32, 15>::with_value(0xDEAD_BEEF));
        assert_eq!(buffer.as_bytes(), &[0x00, 0xDE, 0xAD, 0xBE, 0xEF, 0x00]);

        let mut decoded = FixedWidthSignal::<u32, 15>::new();
        buffer.extract(&mut decoded);
        assert_eq!(decoded.read(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_low_start_bit_keeps_every_bit() {
        let mut buffer = BitBuffer::<2>::new();
        buffer.insert(&FixedWidthSignal::<u8, 0>::with_value(0xFF));

        assert_eq!(buffer.as_bytes(), &[0x01, 0xFE]);

        let mut decoded = FixedWidthSignal::<u8, 0>::new();
        buffer.extract(&mut decoded);
        assert_eq!(decoded.read(), 0xFF);
    }

    #[test]
    fn test_flags_share_a_byte() {
        let mut buffer = BitBuffer::<1>::new();
        buffer
            .insert(&FixedWidthSignal::<bool, 7>::with_value(true))
            .insert(&FixedWidthSignal::<bool, 5>::with_value(false))
            .insert(&FixedWidthSignal::<bool, 0>::with_value(true));

        assert_eq!(buffer.as_bytes(), &[0b1000_0001]);
        assert_eq!(buffer.status(), Status::Ok);

        let mut flag = FixedWidthSignal::<bool, 0>::new();
        buffer.extract(&mut flag);
        assert!(flag.read());

        let mut flag = FixedWidthSignal::<bool, 5>::new();
        buffer.extract(&mut flag);
        assert!(!flag.read());
    }

    #[test]
    fn test_insert_past_end_overflows_without_bleeding() {
        let mut buffer = BitBuffer::<2>::new();
        let signal = FixedWidthSignal::<u16, 12>::with_value(0xFFFF);
        assert!(!buffer.fits(&signal));

        buffer.insert(&signal);

        assert_eq!(buffer.status(), Status::Overflow);
        assert_eq!(buffer.as_bytes(), &[0x00, 0x1F]);
    }

    #[test]
    fn test_dyn_descriptor() {
        let signal = FixedWidthSignal::<i8, 10, 6>::with_value(-7);
        let descriptor: &dyn SignalDescriptor = &signal;

        let mut buffer = BitBuffer::<3>::new();
        assert!(buffer.fits(descriptor));
        buffer.insert(descriptor);

        let mut decoded = FixedWidthSignal::<i8, 10, 6>::new();
        let target: &mut dyn SignalDescriptor = &mut decoded;
        buffer.extract(target);
        assert_eq!(decoded.read(), -7);
    }

    macro_rules! round_trip_props {
        ($($name:ident: $ty:ty, $pos:literal, $size:literal, $strategy:expr;)*) => {
            proptest! {
                $(
                    #[test]
                    fn $name(value in $strategy) {
                        let mut buffer = BitBuffer::<12>::new();
                        let signal = FixedWidthSignal::<$ty, $pos, $size>::with_value(value);
                        buffer.insert(&signal);

                        prop_assert_eq!(buffer.status(), Status::Ok);

                        let first = signal.position();
                        let end = first + signal.size_in_buffer();
                        for (i, byte) in buffer.as_bytes().iter().enumerate() {
                            if i < first || i >= end {
                                prop_assert_eq!(*byte, 0, "byte {} bled", i);
                            }
                        }

                        let mut decoded = FixedWidthSignal::<$ty, $pos, $size>::new();
                        buffer.extract(&mut decoded);
                        prop_assert_eq!(decoded.read(), value);
                    }
                )*
            }
        };
    }

    round_trip_props! {
        prop_u8_5_at_0: u8, 0, 5, 0u8..32;
        prop_u8_3_at_2: u8, 2, 3, 0u8..8;
        prop_u8_7_at_9: u8, 9, 7, 0u8..128;
        prop_u16_12_at_4: u16, 4, 12, 0u16..4096;
        prop_u16_9_at_17: u16, 17, 9, 0u16..512;
        prop_u16_15_at_1: u16, 1, 15, 0u16..32768;
        prop_i16_11_at_22: i16, 22, 11, -1024i16..1024;
        prop_u32_20_at_6: u32, 6, 20, 0u32..(1 << 20);
        prop_u32_31_at_3: u32, 3, 31, 0u32..(1 << 31);
        prop_i32_17_at_38: i32, 38, 17, -65536i32..65536;
        prop_u64_45_at_13: u64, 13, 45, 0u64..(1 << 45);
        prop_i64_63_at_1: i64, 1, 63, -(1i64 << 62)..(1i64 << 62);
    }

    proptest! {
        #[test]
        fn prop_full_width_f32_at_odd_position(bits: u32) {
            let value = f32::from_bits(bits);
            let mut buffer = BitBuffer::<6>::new();
            buffer.insert(&FixedWidthSignal::<f32, 11>::with_value(value));

            let mut decoded = FixedWidthSignal::<f32, 11>::new();
            buffer.extract(&mut decoded);
            prop_assert_eq!(decoded.read().to_bits(), bits);
        }

        #[test]
        fn prop_full_width_f64_at_odd_position(bits: u64) {
            let value = f64::from_bits(bits);
            let mut buffer = BitBuffer::<10>::new();
            buffer.insert(&FixedWidthSignal::<f64, 2>::with_value(value));

            let mut decoded = FixedWidthSignal::<f64, 2>::new();
            buffer.extract(&mut decoded);
            prop_assert_eq!(decoded.read().to_bits(), bits);
        }

        #[test]
        fn prop_neighbours_survive(a in 0u16..1024, b in 0u8..64, c: bool) {
            // Bits 0..9 for a, 10..15 for b, 16 for c, counting from the MSB of byte 0.
            let mut buffer = BitBuffer::<3>::new();
            buffer
                .insert(&FixedWidthSignal::<u16, 7, 10>::with_value(a))
                .insert(&FixedWidthSignal::<u8, 13, 6>::with_value(b))
                .insert(&FixedWidthSignal::<bool, 23>::with_value(c));

            let mut da = FixedWidthSignal::<u16, 7, 10>::new();
            let mut db = FixedWidthSignal::<u8, 13, 6>::new();
            let mut dc = FixedWidthSignal::<bool, 23>::new();
            buffer.extract(&mut da).extract(&mut db).extract(&mut dc);

            prop_assert_eq!(buffer.status(), Status::Ok);
            prop_assert_eq!(da.read(), a);
            prop_assert_eq!(db.read(), b);
            prop_assert_eq!(dc.read(), c);
        }
    }
}
