//! Signals whose placement is only known at run time.
//!
//! A [SignalLayout] carries the same parameters a
//! [FixedWidthSignal](crate::signal::FixedWidthSignal) takes as generics. It is
//! validated once, when a [DynSignal] is built from it; after that the signal
//! behaves exactly like its compile-time counterpart and produces the same
//! buffer bytes.

use std::ops::{Index, IndexMut};

use log::debug;

use crate::{
    descriptor::{SignalDescriptor, SignalGeometry},
    errors::{LayoutError, WriteError},
    value::{SignalValue, load_from, store_into},
};

/// Widest value a [DynSignal] can hold, in bytes.
const MAX_TYPE_SIZE: usize = 8;

/// Value type of a runtime signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ValueKind {
    /// Width of the value type in bits.
    pub const fn bits(self) -> usize {
        match self {
            ValueKind::Bool => <bool as SignalValue>::BITS,
            ValueKind::U8 => <u8 as SignalValue>::BITS,
            ValueKind::I8 => <i8 as SignalValue>::BITS,
            ValueKind::U16 => <u16 as SignalValue>::BITS,
            ValueKind::I16 => <i16 as SignalValue>::BITS,
            ValueKind::U32 => <u32 as SignalValue>::BITS,
            ValueKind::I32 => <i32 as SignalValue>::BITS,
            ValueKind::U64 => <u64 as SignalValue>::BITS,
            ValueKind::I64 => <i64 as SignalValue>::BITS,
            ValueKind::F32 => <f32 as SignalValue>::BITS,
            ValueKind::F64 => <f64 as SignalValue>::BITS,
        }
    }

    const fn span_bits(self, bit_size: usize) -> usize {
        match self {
            ValueKind::Bool => 1,
            _ => bit_size,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::ValueKindDef> for ValueKind {
    fn from(value: crate::serde::ValueKindDef) -> Self {
        use crate::serde::ValueKindDef;

        match value {
            ValueKindDef::Bool => ValueKind::Bool,
            ValueKindDef::U8 => ValueKind::U8,
            ValueKindDef::I8 => ValueKind::I8,
            ValueKindDef::U16 => ValueKind::U16,
            ValueKindDef::I16 => ValueKind::I16,
            ValueKindDef::U32 => ValueKind::U32,
            ValueKindDef::I32 => ValueKind::I32,
            ValueKindDef::U64 => ValueKind::U64,
            ValueKindDef::I64 => ValueKind::I64,
            ValueKindDef::F32 => ValueKind::F32,
            ValueKindDef::F64 => ValueKind::F64,
        }
    }
}

/// A typed value read from or written to a [DynSignal].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::U8(_) => ValueKind::U8,
            Value::I8(_) => ValueKind::I8,
            Value::U16(_) => ValueKind::U16,
            Value::I16(_) => ValueKind::I16,
            Value::U32(_) => ValueKind::U32,
            Value::I32(_) => ValueKind::I32,
            Value::U64(_) => ValueKind::U64,
            Value::I64(_) => ValueKind::I64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
        }
    }
}

/// Placement of a runtime signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalLayout {
    /// Value type.
    pub kind: ValueKind,
    /// Bit position of the field's most significant bit
    /// (see [crate::descriptor] for the numbering).
    pub bit_pos: usize,
    /// Significant bits; `None` means the full width of `kind`.
    pub bit_size: Option<usize>,
}

impl SignalLayout {
    /// A full-width layout.
    pub fn new(kind: ValueKind, bit_pos: usize) -> Self {
        SignalLayout {
            kind,
            bit_pos,
            bit_size: None,
        }
    }

    pub fn with_bit_size(mut self, bit_size: usize) -> Self {
        self.bit_size = Some(bit_size);
        self
    }

    /// Validates the layout and derives its geometry.
    pub fn geometry(&self) -> Result<SignalGeometry, LayoutError> {
        let type_bits = self.kind.bits();
        let bit_size = self.bit_size.unwrap_or(type_bits);

        SignalGeometry::try_new(
            self.bit_pos,
            bit_size,
            self.kind.span_bits(bit_size),
            type_bits,
        )
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::SignalDef> for SignalLayout {
    fn from(value: crate::serde::SignalDef) -> Self {
        SignalLayout {
            kind: value.kind.into(),
            bit_pos: value.bit_pos,
            bit_size: value.bit_size,
        }
    }
}

/// A signal laid out at run time.
///
/// ```
/// use bitsignal::buffer::BitBuffer;
/// use bitsignal::layout::{DynSignal, SignalLayout, Value, ValueKind};
///
/// let layout = SignalLayout::new(ValueKind::I16, 4).with_bit_size(12);
/// let mut temperature = DynSignal::new(layout).unwrap();
/// temperature.write(Value::I16(-40)).unwrap();
///
/// let mut frame = BitBuffer::<4>::new();
/// frame.insert(&temperature);
///
/// let mut decoded = DynSignal::new(layout).unwrap();
/// frame.extract(&mut decoded);
/// assert_eq!(decoded.read(), Value::I16(-40));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynSignal {
    layout: SignalLayout,
    geometry: SignalGeometry,
    overrun: u8,
    data: [u8; MAX_TYPE_SIZE],
}

impl DynSignal {
    /// Validates `layout` and creates a signal with zeroed storage.
    pub fn new(layout: SignalLayout) -> Result<Self, LayoutError> {
        let geometry = layout.geometry().inspect_err(|err| {
            debug!("rejected signal layout {:?}: {}", layout, err);
        })?;

        Ok(DynSignal {
            layout,
            geometry,
            overrun: 0,
            data: [0; MAX_TYPE_SIZE],
        })
    }

    pub fn layout(&self) -> SignalLayout {
        self.layout
    }

    pub fn geometry(&self) -> SignalGeometry {
        self.geometry
    }

    /// Zero-fills the storage.
    pub fn clear(&mut self) {
        self.overrun = 0;
        self.data = [0; MAX_TYPE_SIZE];
    }

    /// Replaces the stored value. The value's kind must match the layout's.
    pub fn write(&mut self, value: Value) -> Result<(), WriteError> {
        if value.kind() != self.layout.kind {
            debug!(
                "rejected {:?} write to a {:?} signal",
                value.kind(),
                self.layout.kind
            );
            return Err(WriteError::KindMismatch {
                expected: self.layout.kind,
                found: value.kind(),
            });
        }

        self.store_value(value);

        Ok(())
    }

    // Callers have checked the value's kind against the layout.
    fn store_value(&mut self, value: Value) {
        match value {
            Value::Bool(v) => self.store(v),
            Value::U8(v) => self.store(v),
            Value::I8(v) => self.store(v),
            Value::U16(v) => self.store(v),
            Value::I16(v) => self.store(v),
            Value::U32(v) => self.store(v),
            Value::I32(v) => self.store(v),
            Value::U64(v) => self.store(v),
            Value::I64(v) => self.store(v),
            Value::F32(v) => self.store(v),
            Value::F64(v) => self.store(v),
        }
    }

    /// Decodes the stored value as the layout's kind.
    pub fn read(&self) -> Value {
        match self.layout.kind {
            ValueKind::Bool => Value::Bool(self.load()),
            ValueKind::U8 => Value::U8(self.load()),
            ValueKind::I8 => Value::I8(self.load()),
            ValueKind::U16 => Value::U16(self.load()),
            ValueKind::I16 => Value::I16(self.load()),
            ValueKind::U32 => Value::U32(self.load()),
            ValueKind::I32 => Value::I32(self.load()),
            ValueKind::U64 => Value::U64(self.load()),
            ValueKind::I64 => Value::I64(self.load()),
            ValueKind::F32 => Value::F32(self.load()),
            ValueKind::F64 => Value::F64(self.load()),
        }
    }

    /// Raw storage bytes, `type_size` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.geometry.type_size()]
    }

    fn store<T: SignalValue>(&mut self, value: T) {
        store_into(value, self.geometry.bit_mask_shift(), &mut self.data);
    }

    fn load<T: SignalValue>(&self) -> T {
        load_from(&self.data, self.geometry.bit_mask_shift())
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::SignalDef> for DynSignal {
    type Error = LayoutError;

    fn try_from(value: crate::serde::SignalDef) -> Result<Self, Self::Error> {
        DynSignal::new(value.into())
    }
}

impl Index<usize> for DynSignal {
    type Output = u8;

    fn index(&self, i: usize) -> &u8 {
        self.as_bytes().get(i).unwrap_or(&self.overrun)
    }
}

impl IndexMut<usize> for DynSignal {
    fn index_mut(&mut self, i: usize) -> &mut u8 {
        if i < self.geometry.type_size() {
            &mut self.data[i]
        } else {
            &mut self.overrun
        }
    }
}

impl SignalDescriptor for DynSignal {
    fn position(&self) -> usize {
        self.geometry.position()
    }

    fn size_in_buffer(&self) -> usize {
        self.geometry.size_in_buffer()
    }

    fn type_size(&self) -> usize {
        self.geometry.type_size()
    }

    fn write_lshift(&self) -> u32 {
        self.geometry.write_lshift()
    }

    fn write_rshift(&self) -> u32 {
        self.geometry.write_rshift()
    }

    fn read_lshift(&self) -> u32 {
        self.geometry.read_lshift()
    }

    fn read_rshift(&self) -> u32 {
        self.geometry.read_rshift()
    }

    fn normalize(&mut self) {
        self.store_value(self.read());
    }
}
