//! Typed configuration values
//!
//! [`ConfigValue`] maps a Rust type to its fixed-size little-endian byte
//! representation in storage. [`Setting`] pairs a key with its value type so
//! typed callers can never pass a buffer of the wrong size.

use core::fmt;
use core::marker::PhantomData;

/// Type with a fixed-size byte encoding
///
/// `encode` and `decode` operate on slices of exactly `SIZE` bytes. Shorter
/// slices are handled without panicking: missing bytes read as zero and
/// surplus output is left untouched.
pub trait ConfigValue: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Write the encoding of `self` into `out`
    fn encode(&self, out: &mut [u8]);

    /// Rebuild a value from its encoding
    fn decode(bytes: &[u8]) -> Self;
}

fn copy_prefix(dst: &mut [u8], src: &[u8]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
}

macro_rules! impl_le_value {
    ($($ty:ty),* $(,)?) => {$(
        impl ConfigValue for $ty {
            const SIZE: usize = core::mem::size_of::<$ty>();

            fn encode(&self, out: &mut [u8]) {
                copy_prefix(out, &self.to_le_bytes());
            }

            fn decode(bytes: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$ty>()];
                copy_prefix(&mut raw, bytes);
                <$ty>::from_le_bytes(raw)
            }
        }
    )*};
}

impl_le_value!(u8, u16, u32, u64, i8, i16, i32, i64, f32);

impl ConfigValue for bool {
    const SIZE: usize = 1;

    fn encode(&self, out: &mut [u8]) {
        copy_prefix(out, &[*self as u8]);
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes.first().is_some_and(|b| *b != 0)
    }
}

impl<const N: usize> ConfigValue for [u8; N] {
    const SIZE: usize = N;

    fn encode(&self, out: &mut [u8]) {
        copy_prefix(out, self);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut raw = [0u8; N];
        copy_prefix(&mut raw, bytes);
        raw
    }
}

/// Typed handle for one configuration key
///
/// Created by `config_schema!`; the value type is fixed by the schema
/// declaration.
pub struct Setting<T> {
    key: u16,
    _value: PhantomData<fn() -> T>,
}

impl<T> Setting<T> {
    /// Create a handle for `key`
    pub const fn new(key: u16) -> Self {
        Self {
            key,
            _value: PhantomData,
        }
    }

    /// Raw key id
    pub const fn key(&self) -> u16 {
        self.key
    }
}

impl<T> Clone for Setting<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Setting<T> {}

impl<T> PartialEq for Setting<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Setting<T> {}

impl<T> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting").field("key", &self.key).finish()
    }
}
