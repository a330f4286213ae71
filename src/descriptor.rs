//! The capability a field needs to be packed into a [crate::buffer::BitBuffer],
//! and the geometry value that answers it.
//!
//! Bit numbering: a signal's bit position addresses its most significant bit.
//! `bit_pos / 8` is the byte, `bit_pos % 8` the bit number inside that byte,
//! with 7 the byte's MSB. The field runs toward less significant bits and on
//! into the following bytes, so `bit_pos % 8 == 7` is byte aligned.

use std::ops::IndexMut;

use crate::{bits::U08_BIT_COUNT, errors::LayoutError};

const BYTE_BITS: usize = U08_BIT_COUNT as usize;

/// A field that [crate::buffer::BitBuffer] can insert and extract.
///
/// Indexing gives access to the field's own byte storage, most significant
/// byte first as far as the buffer is concerned. Indices at or beyond
/// [type_size](SignalDescriptor::type_size) must not panic; implementors hand
/// out a scratch byte instead.
pub trait SignalDescriptor: IndexMut<usize, Output = u8> {
    /// Byte offset of the field's first byte in the buffer.
    fn position(&self) -> usize;

    /// Number of buffer bytes the field touches.
    fn size_in_buffer(&self) -> usize;

    /// Number of bytes of the field's own storage.
    fn type_size(&self) -> usize;

    /// Carry shift applied to a storage byte when packing.
    fn write_lshift(&self) -> u32;

    /// Shift applied to a storage byte before it is merged into the buffer.
    fn write_rshift(&self) -> u32;

    /// Shift applied to a buffer byte before it is merged into storage.
    fn read_lshift(&self) -> u32;

    /// Carry shift applied to a buffer byte when unpacking.
    fn read_rshift(&self) -> u32;

    /// Zeroes storage bits beyond the field's width.
    ///
    /// Called by [crate::buffer::BitBuffer::extract] after it has merged the
    /// field's bytes, which also carry the bits of neighbouring fields.
    fn normalize(&mut self) {}
}

/// Placement and shift geometry of a signal, derived once from its bit
/// position, its bit width and the width of its value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalGeometry {
    position: usize,
    size_in_buffer: usize,
    type_size: usize,
    bit_size: usize,
    write_lshift: u32,
    write_rshift: u32,
    bit_mask_shift: u32,
}

impl SignalGeometry {
    /// Derives the geometry without validation.
    ///
    /// `span_bits` is the number of buffer bits the field occupies (1 for a
    /// flag, `bit_size` otherwise). Callers guarantee
    /// `0 < bit_size <= type_bits` and `type_bits % 8 == 0`.
    pub const fn new(bit_pos: usize, bit_size: usize, span_bits: usize, type_bits: usize) -> Self {
        let write_lshift = (bit_pos % BYTE_BITS + 1) % BYTE_BITS;
        let write_rshift = (BYTE_BITS - write_lshift) % BYTE_BITS;

        // write_rshift is also how far the field's first bit sits below the MSB
        // of its first byte.
        let size_in_buffer = (write_rshift + span_bits).div_ceil(BYTE_BITS);

        SignalGeometry {
            position: bit_pos / BYTE_BITS,
            size_in_buffer,
            type_size: type_bits / BYTE_BITS,
            bit_size,
            write_lshift: write_lshift as u32,
            write_rshift: write_rshift as u32,
            bit_mask_shift: (type_bits - bit_size) as u32,
        }
    }

    /// Derives the geometry after checking `bit_size` against `type_bits`.
    pub const fn try_new(
        bit_pos: usize,
        bit_size: usize,
        span_bits: usize,
        type_bits: usize,
    ) -> Result<Self, LayoutError> {
        if bit_size == 0 {
            return Err(LayoutError::ZeroWidth);
        }

        if bit_size > type_bits {
            return Err(LayoutError::WidthExceedsType {
                width: bit_size,
                type_bits,
            });
        }

        Ok(Self::new(bit_pos, bit_size, span_bits, type_bits))
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn size_in_buffer(&self) -> usize {
        self.size_in_buffer
    }

    pub const fn type_size(&self) -> usize {
        self.type_size
    }

    /// Significant bits of the field.
    pub const fn bit_size(&self) -> usize {
        self.bit_size
    }

    /// Bit number (7 = MSB) of the field's most significant bit in its first byte.
    pub const fn bit_offset_within_byte(&self) -> usize {
        (BYTE_BITS + BYTE_BITS - 1 - self.write_rshift as usize) % BYTE_BITS
    }

    pub const fn write_lshift(&self) -> u32 {
        self.write_lshift
    }

    pub const fn write_rshift(&self) -> u32 {
        self.write_rshift
    }

    pub const fn read_lshift(&self) -> u32 {
        self.write_rshift
    }

    pub const fn read_rshift(&self) -> u32 {
        self.write_lshift
    }

    /// Shift that left-aligns a value narrower than its type.
    pub const fn bit_mask_shift(&self) -> u32 {
        self.bit_mask_shift
    }
}
