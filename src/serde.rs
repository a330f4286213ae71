//! Deserializable signal layout descriptions.
//!
//! These types describe where a signal sits in a frame. They are meant to be
//! read from a configuration file and then converted into
//! [SignalLayout](crate::layout::SignalLayout) or, with validation,
//! [DynSignal](crate::layout::DynSignal).

use serde::{Deserialize, Serialize};

/// Value type of a signal.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueKindDef {
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

/// Description of a single signal.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SignalDef {
    /// Value type carried by the signal.
    pub kind: ValueKindDef,
    /// Bit position of the signal's most significant bit.
    pub bit_pos: usize,
    /// Significant bits; the full type width when omitted.
    #[serde(default)]
    pub bit_size: Option<usize>,
}
