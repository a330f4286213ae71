//! Compile-time configured signals.

use std::{
    fmt,
    ops::{Index, IndexMut},
};

use crate::{
    descriptor::{SignalDescriptor, SignalGeometry},
    value::SignalValue,
};

/// `BIT_SIZE` value meaning "the full width of the value type".
pub const NATIVE_WIDTH: usize = usize::MAX;

/// A typed field of `BIT_SIZE` bits whose most significant bit sits at
/// `BIT_POS` (see [crate::descriptor] for the bit numbering).
///
/// The geometry is an associated constant, so it is derived once per
/// instantiation; an invalid width is a compile error.
///
/// ```
/// use bitsignal::{buffer::BitBuffer, signal::FixedWidthSignal};
///
/// let mut speed = FixedWidthSignal::<u16, 4, 12>::new();
/// speed.write(0xABC);
///
/// let mut frame = BitBuffer::<4>::new();
/// frame.insert(&speed);
/// assert_eq!(frame.as_bytes(), &[0x15, 0x78, 0x00, 0x00]);
///
/// let mut decoded = FixedWidthSignal::<u16, 4, 12>::new();
/// frame.extract(&mut decoded);
/// assert_eq!(decoded.read(), 0xABC);
/// ```
pub struct FixedWidthSignal<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize = { NATIVE_WIDTH }>
{
    overrun: u8,
    data: T::Storage,
}

impl<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize>
    FixedWidthSignal<T, BIT_POS, BIT_SIZE>
{
    const GEOMETRY: SignalGeometry = {
        let bit_size = if BIT_SIZE == NATIVE_WIDTH { T::BITS } else { BIT_SIZE };
        let span_bits = match T::SPAN_BITS {
            Some(bits) => bits,
            None => bit_size,
        };

        assert!(bit_size > 0, "signal width must be at least one bit");
        assert!(bit_size <= T::BITS, "signal width exceeds its value type");

        SignalGeometry::new(BIT_POS, bit_size, span_bits, T::BITS)
    };

    /// Creates a signal with zeroed storage.
    pub fn new() -> Self {
        let _ = Self::GEOMETRY;

        FixedWidthSignal {
            overrun: 0,
            data: T::ZEROED,
        }
    }

    /// Creates a signal holding `value`.
    pub fn with_value(value: T) -> Self {
        let mut signal = Self::new();
        signal.write(value);
        signal
    }

    /// Zero-fills the storage.
    pub fn clear(&mut self) {
        self.overrun = 0;
        self.data = T::ZEROED;
    }

    /// Replaces the stored value.
    pub fn write(&mut self, value: T) {
        value.store(Self::GEOMETRY.bit_mask_shift(), &mut self.data);
    }

    /// Decodes the stored value.
    pub fn read(&self) -> T {
        T::load(&self.data, Self::GEOMETRY.bit_mask_shift())
    }

    pub const fn geometry(&self) -> SignalGeometry {
        Self::GEOMETRY
    }

    /// Raw storage bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize> Default
    for FixedWidthSignal<T, BIT_POS, BIT_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize> Clone
    for FixedWidthSignal<T, BIT_POS, BIT_SIZE>
{
    fn clone(&self) -> Self {
        FixedWidthSignal {
            overrun: self.overrun,
            data: self.data,
        }
    }
}

impl<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize> fmt::Debug
    for FixedWidthSignal<T, BIT_POS, BIT_SIZE>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedWidthSignal")
            .field("geometry", &Self::GEOMETRY)
            .field("value", &self.read())
            .field("data", &self.data)
            .finish()
    }
}

impl<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize> Index<usize>
    for FixedWidthSignal<T, BIT_POS, BIT_SIZE>
{
    type Output = u8;

    fn index(&self, i: usize) -> &u8 {
        self.data.as_ref().get(i).unwrap_or(&self.overrun)
    }
}

impl<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize> IndexMut<usize>
    for FixedWidthSignal<T, BIT_POS, BIT_SIZE>
{
    fn index_mut(&mut self, i: usize) -> &mut u8 {
        match self.data.as_mut().get_mut(i) {
            Some(byte) => byte,
            None => &mut self.overrun,
        }
    }
}

impl<T: SignalValue, const BIT_POS: usize, const BIT_SIZE: usize> SignalDescriptor
    for FixedWidthSignal<T, BIT_POS, BIT_SIZE>
{
    fn position(&self) -> usize {
        Self::GEOMETRY.position()
    }

    fn size_in_buffer(&self) -> usize {
        Self::GEOMETRY.size_in_buffer()
    }

    fn type_size(&self) -> usize {
        Self::GEOMETRY.type_size()
    }

    fn write_lshift(&self) -> u32 {
        Self::GEOMETRY.write_lshift()
    }

    fn write_rshift(&self) -> u32 {
        Self::GEOMETRY.write_rshift()
    }

    fn read_lshift(&self) -> u32 {
        Self::GEOMETRY.read_lshift()
    }

    fn read_rshift(&self) -> u32 {
        Self::GEOMETRY.read_rshift()
    }

    fn normalize(&mut self) {
        self.write(self.read());
    }
}
