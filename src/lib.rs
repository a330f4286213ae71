//! Bit-granular packing of typed signals into fixed-size byte buffers.
//!
//! A signal is a typed value of a given bit width placed at an arbitrary bit
//! position. [signal::FixedWidthSignal] fixes the placement at compile time,
//! [layout::DynSignal] takes it from a [layout::SignalLayout] at run time.
//! Both are packed into and unpacked from a [buffer::BitBuffer] through the
//! [descriptor::SignalDescriptor] trait.

pub mod bits;
pub mod buffer;
pub mod descriptor;
pub mod errors;
pub mod layout;
#[cfg(feature = "serde")]
pub mod serde;
pub mod signal;
pub mod value;
