//! Named parameter bindings of one compiled query.

use compact_str::{CompactString, format_compact};
use hashbrown::HashSet;

use crate::error::{RelqError, Result};
use crate::value::SqlValue;

/// Ordered map of parameter name to bound value.
///
/// Every name is unique. Generated names follow `@_<field>_<n>_`, probing `n`
/// upwards from `0` until a free name is found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    entries: Vec<(CompactString, SqlValue)>,
    reserved: HashSet<CompactString>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` under the first free generated name for `field`.
    pub fn bind(&mut self, field: &str, value: SqlValue) -> CompactString {
        let mut n = 0usize;
        let name = loop {
            let candidate = format_compact!("@_{field}_{n}_");
            if !self.reserved.contains(candidate.as_str()) {
                break candidate;
            }
            n += 1;
        };
        self.reserved.insert(name.clone());
        self.entries.push((name.clone(), value));
        name
    }

    /// Binds `value` under an explicit name. A name that is already reserved
    /// is a fatal error; values are never overwritten.
    pub fn insert(&mut self, name: &str, value: SqlValue) -> Result<()> {
        if !self.reserved.insert(CompactString::new(name)) {
            return Err(RelqError::Compile(format!(
                "parameter `{name}` is already reserved"
            )));
        }
        self.entries.push((CompactString::new(name), value));
        Ok(())
    }

    /// Moves every binding of `other` into `self` under its existing name.
    pub fn extend_from(&mut self, other: ParamMap) -> Result<()> {
        for (name, value) in other.entries {
            self.insert(&name, value)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<(CompactString, SqlValue)> {
        self.entries
    }
}
