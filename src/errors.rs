//! Error types for signal layout validation and runtime value writes.
//!
//! Buffer overruns are not errors: they are reported through
//! [crate::buffer::Status::Overflow].

use crate::layout::ValueKind;

/// Errors produced when validating a [crate::layout::SignalLayout].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The signal is zero bits wide.
    #[error("signal width must be at least one bit")]
    ZeroWidth,
    /// The signal is wider than its value type.
    #[error("signal width of {width} bits exceeds the {type_bits}-bit value type")]
    WidthExceedsType { width: usize, type_bits: usize },
}

/// Errors produced when writing a [crate::layout::Value] into a [crate::layout::DynSignal].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// The value's kind differs from the kind the signal was laid out for.
    #[error("signal holds {expected:?} values, got {found:?}")]
    KindMismatch { expected: ValueKind, found: ValueKind },
}
