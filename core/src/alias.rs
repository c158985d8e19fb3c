//! Table aliases for one compile pass.

use compact_str::CompactString;
use hashbrown::HashMap;

use crate::error::{RelqError, Result};
use crate::schema::SchemaRegistry;

/// Assigns and remembers a short alias per table.
///
/// The primary table is always `a`; other tables get `b, c, … z, aa, ab, …`
/// in first-seen order. Aliases are never reassigned or freed.
#[derive(Debug, Clone)]
pub struct AliasRegistry {
    assigned: Vec<(CompactString, CompactString)>,
    index: HashMap<CompactString, usize>,
}

impl AliasRegistry {
    /// Creates a registry with `a` reserved for `primary_table`.
    pub fn new(primary_table: &str) -> Self {
        let mut registry = Self {
            assigned: Vec::new(),
            index: HashMap::new(),
        };
        registry.assign(primary_table);
        registry
    }

    /// Alias of `table`, assigning the next token on first use.
    pub fn alias_for(&mut self, table: &str, schema: &SchemaRegistry) -> Result<&str> {
        if schema.by_table(table).is_none() {
            return Err(RelqError::Schema(format!("table `{table}` is not registered")));
        }
        let slot = match self.index.get(table) {
            Some(&slot) => slot,
            None => self.assign(table),
        };
        Ok(&self.assigned[slot].1)
    }

    /// Alias of the primary table.
    pub fn primary(&self) -> &str {
        &self.assigned[0].1
    }

    /// Alias already assigned to `table`, if any.
    pub fn get(&self, table: &str) -> Option<&str> {
        self.index
            .get(table)
            .map(|&slot| self.assigned[slot].1.as_str())
    }

    /// `(table, alias)` pairs in assignment order, primary first.
    pub fn aliased(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assigned
            .iter()
            .map(|(table, alias)| (table.as_str(), alias.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    fn assign(&mut self, table: &str) -> usize {
        let slot = self.assigned.len();
        self.assigned
            .push((CompactString::new(table), alias_token(slot)));
        self.index.insert(CompactString::new(table), slot);
        slot
    }
}

/// `0 → a`, `25 → z`, `26 → aa`, `27 → ab`, …
fn alias_token(mut n: usize) -> CompactString {
    let mut letters = Vec::with_capacity(2);
    loop {
        letters.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}
