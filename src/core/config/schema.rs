//! Schema registry
//!
//! Fixed table of configuration entries indexed by key. Each entry carries the
//! value size, default value, human-readable name, resettable flag and an
//! optional semantic validator.
//!
//! The registry is built once from a static declaration table (normally
//! generated by [`config_schema!`](crate::config_schema)) and is immutable
//! once handed to a [`ConfigStore`](super::ConfigStore).

use super::error::{ConfigError, SchemaError};
use crate::core::kv::{MAX_KEYS, MAX_VALUE_SIZE};
use core::fmt;
use heapless::Vec;

/// Name reported for keys outside the schema
pub const UNKNOWN_KEY_NAME: &str = "Unknown key";

/// Semantic check applied to a value before it is written
pub type Validator = fn(&[u8]) -> bool;

/// Static declaration of one configuration key
#[derive(Clone, Copy)]
pub struct SchemaDecl {
    /// Human-readable name
    pub name: &'static str,
    /// Value size in bytes
    pub size: usize,
    /// Writes the default encoding into a buffer of `size` bytes
    pub default: fn(&mut [u8]),
    /// Cleared by `reset_resettable`
    pub resettable: bool,
    /// Optional semantic validator
    pub validator: Option<Validator>,
}

impl fmt::Debug for SchemaDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDecl")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("resettable", &self.resettable)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Registry entry for one key
#[derive(Clone)]
pub struct SchemaEntry {
    name: &'static str,
    default: Vec<u8, MAX_VALUE_SIZE>,
    resettable: bool,
    validator: Option<Validator>,
}

impl SchemaEntry {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Default value bytes
    pub fn default_value(&self) -> &[u8] {
        &self.default
    }

    /// Value size in bytes
    pub fn value_size(&self) -> usize {
        self.default.len()
    }

    /// True if `reset_resettable` clears this key
    pub fn is_resettable(&self) -> bool {
        self.resettable
    }

    /// True if a validator is installed
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Run the validator; values of keys without one are always accepted
    pub fn validate(&self, value: &[u8]) -> bool {
        self.validator.is_none_or(|check| check(value))
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry")
            .field("name", &self.name)
            .field("default", &self.default.as_slice())
            .field("resettable", &self.resettable)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Key-indexed table of schema entries
#[derive(Clone, Debug)]
pub struct SchemaRegistry {
    entries: Vec<SchemaEntry, MAX_KEYS>,
}

impl SchemaRegistry {
    /// Build the registry from declarations; key `i` is `decls[i]`.
    ///
    /// # Errors
    ///
    /// - `SchemaError::TooManyKeys` if there are more than `MAX_KEYS` declarations
    /// - `SchemaError::ZeroSize` if a declaration has a zero value size
    /// - `SchemaError::ValueTooLarge` if a value exceeds `MAX_VALUE_SIZE`
    pub fn new(decls: &[SchemaDecl]) -> Result<Self, SchemaError> {
        if decls.len() > MAX_KEYS {
            return Err(SchemaError::TooManyKeys);
        }

        let mut entries = Vec::new();
        for (index, decl) in decls.iter().enumerate() {
            let key = index as u16;
            if decl.size == 0 {
                return Err(SchemaError::ZeroSize { key });
            }

            let mut default = Vec::new();
            default
                .resize(decl.size, 0)
                .map_err(|_| SchemaError::ValueTooLarge { key })?;
            (decl.default)(&mut default);

            entries
                .push(SchemaEntry {
                    name: decl.name,
                    default,
                    resettable: decl.resettable,
                    validator: decl.validator,
                })
                .map_err(|_| SchemaError::TooManyKeys)?;
        }

        crate::log_debug!("Schema registry built with {} keys", entries.len());
        Ok(Self { entries })
    }

    /// Look up the entry for `key`
    pub fn entry_for(&self, key: u16) -> Result<&SchemaEntry, ConfigError> {
        self.entries
            .get(key as usize)
            .ok_or(ConfigError::KeyNotFound(key))
    }

    /// Human-readable name of `key`, or `"Unknown key"`
    pub fn name_of(&self, key: u16) -> &'static str {
        self.entries
            .get(key as usize)
            .map_or(UNKNOWN_KEY_NAME, |entry| entry.name)
    }

    /// Install or replace the validator of `key`
    ///
    /// Only possible before the registry is moved into a store.
    pub fn set_validator(&mut self, key: u16, validator: Validator) -> Result<(), ConfigError> {
        let entry = self
            .entries
            .get_mut(key as usize)
            .ok_or(ConfigError::KeyNotFound(key))?;
        entry.validator = Some(validator);
        Ok(())
    }

    /// Every valid key, in ascending order
    pub fn keys(&self) -> core::ops::Range<u16> {
        0..self.entries.len() as u16
    }

    /// Keys marked resettable, in ascending order
    pub fn resettable_keys(&self) -> impl Iterator<Item = u16> + '_ {
        self.iter()
            .filter(|(_, entry)| entry.resettable)
            .map(|(key, _)| key)
    }

    /// Iterate over `(key, entry)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (u16, &SchemaEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index as u16, entry))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the schema declares no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_one(out: &mut [u8]) {
        out.copy_from_slice(&1u32.to_le_bytes());
    }

    fn default_zero(_out: &mut [u8]) {}

    fn nonzero(value: &[u8]) -> bool {
        value.iter().any(|b| *b != 0)
    }

    const DECLS: [SchemaDecl; 2] = [
        SchemaDecl {
            name: "SERIAL",
            size: 8,
            default: default_zero,
            resettable: false,
            validator: None,
        },
        SchemaDecl {
            name: "RATE_MULT",
            size: 4,
            default: default_one,
            resettable: true,
            validator: Some(nonzero as Validator),
        },
    ];

    #[test]
    fn test_entries_follow_declarations() {
        let registry = SchemaRegistry::new(&DECLS).unwrap();
        assert_eq!(registry.len(), 2);

        let entry = registry.entry_for(1).unwrap();
        assert_eq!(entry.name(), "RATE_MULT");
        assert_eq!(entry.value_size(), 4);
        assert_eq!(entry.default_value(), &[1u8, 0, 0, 0]);
        assert!(entry.is_resettable());

        let serial = registry.entry_for(0).unwrap();
        assert_eq!(serial.default_value(), &[0u8; 8]);
        assert!(!serial.is_resettable());
    }

    #[test]
    fn test_entry_for_out_of_range() {
        let registry = SchemaRegistry::new(&DECLS).unwrap();
        assert!(matches!(
            registry.entry_for(2),
            Err(ConfigError::KeyNotFound(2))
        ));
    }

    #[test]
    fn test_name_of_never_fails() {
        let registry = SchemaRegistry::new(&DECLS).unwrap();
        assert_eq!(registry.name_of(0), "SERIAL");
        assert_eq!(registry.name_of(99), "Unknown key");
    }

    #[test]
    fn test_key_enumeration() {
        let registry = SchemaRegistry::new(&DECLS).unwrap();
        assert_eq!(registry.keys(), 0..2);

        let resettable: Vec<u16, 4> = registry.resettable_keys().collect();
        assert_eq!(resettable.as_slice(), &[1u16]);
    }

    #[test]
    fn test_validator() {
        let mut registry = SchemaRegistry::new(&DECLS).unwrap();
        let entry = registry.entry_for(1).unwrap();
        assert!(!entry.validate(&[0, 0, 0, 0]));
        assert!(entry.validate(&[5, 0, 0, 0]));

        // Keys without a validator accept anything
        assert!(registry.entry_for(0).unwrap().validate(&[0; 8]));

        registry.set_validator(0, nonzero).unwrap();
        assert!(!registry.entry_for(0).unwrap().validate(&[0; 8]));
        assert!(matches!(
            registry.set_validator(7, nonzero),
            Err(ConfigError::KeyNotFound(7))
        ));
    }

    #[test]
    fn test_rejects_bad_declarations() {
        let mut decl = DECLS[0];
        decl.size = 0;
        assert_eq!(
            SchemaRegistry::new(&[decl]).unwrap_err(),
            SchemaError::ZeroSize { key: 0 }
        );

        decl.size = MAX_VALUE_SIZE + 1;
        assert_eq!(
            SchemaRegistry::new(&[DECLS[0], decl]).unwrap_err(),
            SchemaError::ValueTooLarge { key: 1 }
        );

        let many = [DECLS[0]; MAX_KEYS + 1];
        assert_eq!(
            SchemaRegistry::new(&many).unwrap_err(),
            SchemaError::TooManyKeys
        );
    }
}
