//! Declarative schema definition
//!
//! [`config_schema!`](crate::config_schema) generates, from a single list of
//! declarations:
//!
//! - a `#[repr(u16)]` key enum with dense ids `0..COUNT`
//! - `COUNT`, `ALL` and the `DECLS` table consumed by
//!   [`SchemaRegistry::new`](super::SchemaRegistry::new)
//! - `TryFrom<u16>` and `From<Key> for u16` conversions
//! - a module of typed [`Setting`](super::Setting) handles, one per key
//!
//! # Syntax
//!
//! ```text
//! config_schema! {
//!     pub enum Key in settings {
//!         NAME: Type = default_expr, resettable: bool $(, validate: path)?;
//!     }
//! }
//! ```
//!
//! `Type` must implement [`ConfigValue`](super::ConfigValue). The validator is
//! a `fn(&Type) -> bool` and runs on the decoded value before every write.

/// Define a configuration schema
///
/// # Example
///
/// ```
/// use nvconfig::config_schema;
///
/// fn nonzero(value: &u32) -> bool {
///     *value != 0
/// }
///
/// config_schema! {
///     pub enum Key in settings {
///         /// Sampling rate multiplier
///         RATE_MULT: u32 = 1, resettable: true, validate: nonzero;
///         SERIAL: [u8; 4] = *b"0000", resettable: false;
///     }
/// }
///
/// fn main() {
///     assert_eq!(Key::COUNT, 2);
///     assert_eq!(settings::SERIAL.key(), 1);
///
///     let registry = Key::registry().unwrap();
///     assert_eq!(registry.name_of(Key::RATE_MULT.id()), "RATE_MULT");
///     assert!(!registry.entry_for(0).unwrap().validate(&0u32.to_le_bytes()));
/// }
/// ```
#[macro_export]
macro_rules! config_schema {
    (@validator $ty:ty) => {
        ::core::option::Option::None
    };

    (@validator $ty:ty, $check:path) => {
        ::core::option::Option::Some(
            (|bytes: &[u8]| -> bool {
                $check(&<$ty as $crate::core::config::ConfigValue>::decode(bytes))
            }) as $crate::core::config::Validator,
        )
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $Key:ident in $settings:ident {
            $(
                $(#[$entry_meta:meta])*
                $name:ident : $ty:ty = $default:expr, resettable: $rst:literal
                    $(, validate: $check:path)? ;
            )+
        }
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        $vis enum $Key {
            $(
                $(#[$entry_meta])*
                $name,
            )+
        }

        impl $Key {
            /// Number of keys in the schema
            pub const COUNT: usize = <[&str]>::len(&[$(stringify!($name)),+]);

            /// Every key, in id order
            pub const ALL: [Self; Self::COUNT] = [$(Self::$name),+];

            /// Declaration table, indexed by key id
            pub const DECLS: [$crate::core::config::SchemaDecl; Self::COUNT] = [$(
                $crate::core::config::SchemaDecl {
                    name: stringify!($name),
                    size: <$ty as $crate::core::config::ConfigValue>::SIZE,
                    default: |out: &mut [u8]| {
                        let value: $ty = $default;
                        $crate::core::config::ConfigValue::encode(&value, out);
                    },
                    resettable: $rst,
                    validator: $crate::config_schema!(@validator $ty $(, $check)?),
                }
            ),+];

            /// Raw key id
            pub const fn id(self) -> u16 {
                self as u16
            }

            /// Declared name
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)+
                }
            }

            /// Build the registry for this schema
            pub fn registry() -> ::core::result::Result<
                $crate::core::config::SchemaRegistry,
                $crate::core::config::SchemaError,
            > {
                $crate::core::config::SchemaRegistry::new(&Self::DECLS)
            }
        }

        impl ::core::convert::TryFrom<u16> for $Key {
            type Error = $crate::core::config::ConfigError;

            fn try_from(raw: u16) -> ::core::result::Result<Self, Self::Error> {
                Self::ALL
                    .get(raw as usize)
                    .copied()
                    .ok_or($crate::core::config::ConfigError::KeyNotFound(raw))
            }
        }

        impl ::core::convert::From<$Key> for u16 {
            fn from(key: $Key) -> u16 {
                key as u16
            }
        }

        /// Typed handles for every configuration key
        $vis mod $settings {
            #[allow(unused_imports)]
            use super::*;

            $(
                $(#[$entry_meta])*
                pub const $name: $crate::core::config::Setting<$ty> =
                    $crate::core::config::Setting::new(super::$Key::$name as u16);
            )+
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::config::{ConfigError, ConfigValue};

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Pair {
        a: u8,
        b: u8,
    }

    impl ConfigValue for Pair {
        const SIZE: usize = 2;

        fn encode(&self, out: &mut [u8]) {
            out[0] = self.a;
            out[1] = self.b;
        }

        fn decode(bytes: &[u8]) -> Self {
            Self {
                a: bytes[0],
                b: bytes[1],
            }
        }
    }

    fn below_ten(value: &u16) -> bool {
        *value < 10
    }

    crate::config_schema! {
        /// Test keys
        pub enum TestKey in test_settings {
            FIRST: u16 = 3, resettable: true, validate: below_ten;
            /// Custom type
            SECOND: Pair = Pair { a: 1, b: 2 }, resettable: false;
            THIRD: bool = true, resettable: true;
        }
    }

    #[test]
    fn test_enum_is_dense() {
        assert_eq!(TestKey::COUNT, 3);
        assert_eq!(TestKey::ALL, [TestKey::FIRST, TestKey::SECOND, TestKey::THIRD]);
        assert_eq!(TestKey::THIRD.id(), 2);
        assert_eq!(u16::from(TestKey::SECOND), 1);
        assert_eq!(TestKey::SECOND.name(), "SECOND");
    }

    #[test]
    fn test_try_from_raw_id() {
        assert_eq!(TestKey::try_from(1), Ok(TestKey::SECOND));
        assert_eq!(TestKey::try_from(3), Err(ConfigError::KeyNotFound(3)));
    }

    #[test]
    fn test_declarations() {
        let registry = TestKey::registry().unwrap();

        let first = registry.entry_for(0).unwrap();
        assert_eq!(first.name(), "FIRST");
        assert_eq!(first.default_value(), &[3u8, 0]);
        assert!(first.is_resettable());
        assert!(first.validate(&9u16.to_le_bytes()));
        assert!(!first.validate(&10u16.to_le_bytes()));

        let second = registry.entry_for(1).unwrap();
        assert_eq!(second.default_value(), &[1u8, 2]);
        assert!(!second.is_resettable());
        assert!(!second.has_validator());

        assert_eq!(registry.entry_for(2).unwrap().default_value(), &[1u8]);
    }

    #[test]
    fn test_typed_settings() {
        assert_eq!(test_settings::FIRST.key(), TestKey::FIRST.id());
        assert_eq!(test_settings::SECOND.key(), 1);
        assert_eq!(test_settings::THIRD.key(), 2);
    }
}
