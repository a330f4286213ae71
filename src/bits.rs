//! Low-level bit primitives: bit scan, reflection, parity and the
//! composition/decomposition helpers between nibbles, bytes, words and byte arrays.
//!
//! Everything here is pure and total over its input type.

/// Bits in a nibble.
pub const U04_BIT_COUNT: u32 = 4;
/// Bits in a `u8`.
pub const U08_BIT_COUNT: u32 = 8;
/// Bits in a `u16`.
pub const U16_BIT_COUNT: u32 = 16;
/// Bits in a `u32`.
pub const U32_BIT_COUNT: u32 = 32;

/// Low nibble mask.
pub const U04_BIT_MASK: u8 = 0x0F;
/// Low byte mask of a `u16`.
pub const U08_BIT_MASK: u16 = 0x00FF;
/// Low word mask of a `u32`.
pub const U16_BIT_MASK: u32 = 0x0000_FFFF;
/// Low double word mask of a `u64`.
pub const U32_BIT_MASK: u64 = 0x0000_0000_FFFF_FFFF;

/// Parity convention selected by [parity].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even = 0,
    Odd = 1,
}

const DE_BRUIJN_SEQ: u32 = 0x077C_B531;

const DE_BRUIJN_BIT_POSITION: [u32; 32] = [
    0, 1, 28, 2, 29, 14, 24, 3, 30, 22, 20, 15, 25, 17, 4, 8, 31, 27, 13, 23, 21, 19, 16, 7, 26,
    12, 18, 6, 11, 5, 10, 9,
];

const REFLECT_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = reverse_bits_n(i as u8, U08_BIT_COUNT);
        i += 1;
    }
    table
};

const PARITY_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = ((i as u8).count_ones() & 1) as u8;
        i += 1;
    }
    table
};

/// Reverses the low `n` bits of `x` (LSB becomes MSB of the result).
const fn reverse_bits_n(mut x: u8, n: u32) -> u8 {
    let mut r = 0u8;
    let mut i = 0;
    while i < n {
        r = (r << 1) | (x & 1);
        x >>= 1;
        i += 1;
    }

    r
}

/// Two's complement negation over 32-bit wrapping arithmetic.
pub fn twos_complement(data: u32) -> u32 {
    (!data).wrapping_add(1)
}

/// Position (0-31) of the least significant set bit, or `None` if `data` is zero.
///
/// Isolates the lowest set bit, multiplies it by a de Bruijn(2, 5) sequence and
/// looks the top five bits of the product up in a 32-entry table. No loop.
pub fn lsb_pos(data: u32) -> Option<u32> {
    if data == 0 {
        return None;
    }

    let lsb = data & twos_complement(data);
    let index = lsb.wrapping_mul(DE_BRUIJN_SEQ) >> 27;

    Some(DE_BRUIJN_BIT_POSITION[index as usize])
}

/// Reverses the bit order of a byte.
pub fn reflect_u8(data: u8) -> u8 {
    REFLECT_TABLE[data as usize]
}

/// Reflects a `u16`.
///
/// With `lsb_first` unset the whole word is mirrored (bit 0 swaps with bit 15).
/// With `lsb_first` set each byte is mirrored in place and byte order is kept.
pub fn reflect_u16(data: u16, lsb_first: bool) -> u16 {
    let b0 = reflect_u8(u16_to_u8l(data));
    let b1 = reflect_u8(u16_to_u8h(data));

    if lsb_first { to_u16(b1, b0) } else { to_u16(b0, b1) }
}

/// Reflects a `u32`, with the same `lsb_first` convention as [reflect_u16].
pub fn reflect_u32(data: u32, lsb_first: bool) -> u32 {
    let w0 = u32_to_u16l(data);
    let w1 = u32_to_u16h(data);

    let b0 = reflect_u8(u16_to_u8l(w0));
    let b1 = reflect_u8(u16_to_u8h(w0));
    let b2 = reflect_u8(u16_to_u8l(w1));
    let b3 = reflect_u8(u16_to_u8h(w1));

    if lsb_first {
        bytes_to_u32(b3, b2, b1, b0)
    } else {
        bytes_to_u32(b0, b1, b2, b3)
    }
}

/// Parity bit of `data` under the given convention: 0 or 1.
pub fn parity(data: u32, parity: Parity) -> u8 {
    let b = u32_to_array(data);

    let result = PARITY_TABLE[b[3] as usize]
        ^ PARITY_TABLE[b[2] as usize]
        ^ PARITY_TABLE[b[1] as usize]
        ^ PARITY_TABLE[b[0] as usize];

    result ^ parity as u8
}

/// Builds a byte from a high and a low nibble. Bits above each nibble are ignored.
pub const fn to_u8(u4_1: u8, u4_0: u8) -> u8 {
    ((u4_1 & U04_BIT_MASK) << U04_BIT_COUNT) | (u4_0 & U04_BIT_MASK)
}

pub const fn u8_to_u4h(u08_0: u8) -> u8 {
    u08_0 >> U04_BIT_COUNT
}

pub const fn u8_to_u4l(u08_0: u8) -> u8 {
    u08_0 & U04_BIT_MASK
}

/// Builds a `u16` from its most and least significant bytes.
pub const fn to_u16(u08_1: u8, u08_0: u8) -> u16 {
    ((u08_1 as u16) << U08_BIT_COUNT) | u08_0 as u16
}

pub const fn u16_to_u8h(u16_0: u16) -> u8 {
    (u16_0 >> U08_BIT_COUNT) as u8
}

pub const fn u16_to_u8l(u16_0: u16) -> u8 {
    (u16_0 & U08_BIT_MASK) as u8
}

/// Builds a `u32` from its most and least significant words.
pub const fn to_u32(u16_1: u16, u16_0: u16) -> u32 {
    ((u16_1 as u32) << U16_BIT_COUNT) | u16_0 as u32
}

/// Builds a `u32` from four bytes, most significant first.
pub const fn bytes_to_u32(u08_3: u8, u08_2: u8, u08_1: u8, u08_0: u8) -> u32 {
    ((u08_3 as u32) << (U16_BIT_COUNT + U08_BIT_COUNT))
        | ((u08_2 as u32) << U16_BIT_COUNT)
        | ((u08_1 as u32) << U08_BIT_COUNT)
        | u08_0 as u32
}

pub const fn u32_to_u16h(u32_0: u32) -> u16 {
    (u32_0 >> U16_BIT_COUNT) as u16
}

pub const fn u32_to_u16l(u32_0: u32) -> u16 {
    (u32_0 & U16_BIT_MASK) as u16
}

/// Builds a `u64` from its most and least significant double words.
pub const fn to_u64(u32_1: u32, u32_0: u32) -> u64 {
    ((u32_1 as u64) << U32_BIT_COUNT) | u32_0 as u64
}

pub const fn u64_to_u32h(u64_0: u64) -> u32 {
    (u64_0 >> U32_BIT_COUNT) as u32
}

pub const fn u64_to_u32l(u64_0: u64) -> u32 {
    (u64_0 & U32_BIT_MASK) as u32
}

// The array forms hold the value in the reverse of the host's in-memory byte
// order: most significant byte first on little-endian hosts, least significant
// byte first on big-endian hosts.

/// Converts a `u16` to its two-byte array form.
pub fn u16_to_array(u16_0: u16) -> [u8; 2] {
    if cfg!(target_endian = "little") {
        [u16_to_u8h(u16_0), u16_to_u8l(u16_0)]
    } else {
        [u16_to_u8l(u16_0), u16_to_u8h(u16_0)]
    }
}

/// Inverse of [u16_to_array].
pub fn array_to_u16(data: &[u8; 2]) -> u16 {
    if cfg!(target_endian = "little") {
        to_u16(data[0], data[1])
    } else {
        to_u16(data[1], data[0])
    }
}

/// Converts a `u32` to its four-byte array form.
pub fn u32_to_array(u32_0: u32) -> [u8; 4] {
    let w0 = u32_to_u16l(u32_0);
    let w1 = u32_to_u16h(u32_0);

    if cfg!(target_endian = "little") {
        [u16_to_u8h(w1), u16_to_u8l(w1), u16_to_u8h(w0), u16_to_u8l(w0)]
    } else {
        [u16_to_u8l(w0), u16_to_u8h(w0), u16_to_u8l(w1), u16_to_u8h(w1)]
    }
}

/// Inverse of [u32_to_array].
pub fn array_to_u32(data: &[u8; 4]) -> u32 {
    if cfg!(target_endian = "little") {
        bytes_to_u32(data[0], data[1], data[2], data[3])
    } else {
        bytes_to_u32(data[3], data[2], data[1], data[0])
    }
}

/// Converts a `u64` to its eight-byte array form.
pub fn u64_to_array(u64_0: u64) -> [u8; 8] {
    let d0 = u32_to_array(u64_to_u32l(u64_0));
    let d1 = u32_to_array(u64_to_u32h(u64_0));

    let (first, second) = if cfg!(target_endian = "little") {
        (d1, d0)
    } else {
        (d0, d1)
    };

    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&first);
    out[4..].copy_from_slice(&second);

    out
}

/// Inverse of [u64_to_array].
pub fn array_to_u64(data: &[u8; 8]) -> u64 {
    let first = array_to_u32(&[data[0], data[1], data[2], data[3]]);
    let second = array_to_u32(&[data[4], data[5], data[6], data[7]]);

    if cfg!(target_endian = "little") {
        to_u64(first, second)
    } else {
        to_u64(second, first)
    }
}
