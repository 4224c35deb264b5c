//! Schema entries and lookup strategies.
//!
//! A schema maps `(section, key)` pairs to [`Entry`] values. Two physical
//! representations share the [`Resolve`] contract:
//!
//! - [`ConfigTable`]: an ordered sequence searched linearly, first match
//!   wins. Duplicate `(section, key)` pairs are legal but only the first
//!   entry is ever matched.
//! - [`PerfTable`]: a minimal perfect hash over the composite
//!   `"section.key"` strings, for schemas with many entries.
//!
//! Key and section matching is case-sensitive in both strategies.
//! An entry whose section is the empty string matches body lines that
//! appear before any section header.

use thiserror::Error;

use crate::{convert::Convert, phash::PerfectHash};

/// One recognized `(section, key)` pair.
pub struct Entry<U> {
    /// Converter invoked for every assignment to this key.
    pub convert: Convert<U>,
    /// Discriminator letting one converter serve several entries.
    pub ltype: i32,
}

impl<U> Clone for Entry<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Entry<U> {}

/// Lookup contract shared by both schema representations.
///
/// `section` is `None` for body lines before the first header; table
/// entries with an empty section string match those.
pub trait Resolve<U> {
    fn resolve(&self, section: Option<&str>, key: &str) -> Option<&Entry<U>>;
}

/// Construction failures for the perfect-hash representation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The same `(section, key)` pair was added twice.
    #[error("duplicate schema entry: {0}")]
    Duplicate(String),

    /// No perfect hash placement was found for the key set.
    #[error("could not construct a perfect hash over {0} keys")]
    NoPerfectHash(usize),
}

struct TableItem<U> {
    section: String,
    key: String,
    entry: Entry<U>,
}

/// Ordered schema searched by linear scan.
pub struct ConfigTable<U> {
    items: Vec<TableItem<U>>,
}

impl<U> ConfigTable<U> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append one entry. Use an empty `section` to match body lines before
    /// the first section header.
    pub fn item(mut self, section: &str, key: &str, ltype: i32, convert: Convert<U>) -> Self {
        self.items.push(TableItem {
            section: section.to_string(),
            key: key.to_string(),
            entry: Entry { convert, ltype },
        });
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<U> Default for ConfigTable<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Resolve<U> for ConfigTable<U> {
    fn resolve(&self, section: Option<&str>, key: &str) -> Option<&Entry<U>> {
        let section = section.unwrap_or("");
        self.items
            .iter()
            .find(|item| item.section == section && item.key == key)
            .map(|item| &item.entry)
    }
}

struct PerfSlot<U> {
    composite: String,
    entry: Entry<U>,
}

/// Schema looked up through a minimal perfect hash over `"section.key"`.
///
/// Built once with [`PerfTableBuilder`]; the table itself is immutable.
pub struct PerfTable<U> {
    hash: PerfectHash,
    slots: Vec<Option<PerfSlot<U>>>,
}

impl<U> Resolve<U> for PerfTable<U> {
    fn resolve(&self, section: Option<&str>, key: &str) -> Option<&Entry<U>> {
        let composite = composite(section.unwrap_or(""), key);
        let slot = self.slots[self.hash.index(&composite)?].as_ref()?;
        // The hash is perfect for stored keys only; an absent query can
        // still land on an occupied slot and must be checked.
        if slot.composite == composite {
            Some(&slot.entry)
        } else {
            None
        }
    }
}

/// Builder for [`PerfTable`].
pub struct PerfTableBuilder<U> {
    items: Vec<(String, Entry<U>)>,
}

impl<U> PerfTableBuilder<U> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append one entry, keyed by the composite of `section` and `key`.
    pub fn item(mut self, section: &str, key: &str, ltype: i32, convert: Convert<U>) -> Self {
        self.items
            .push((composite(section, key), Entry { convert, ltype }));
        self
    }

    /// Construct the perfect hash and place all entries.
    ///
    /// Unlike the linear table, duplicate `(section, key)` pairs are
    /// rejected here, at construction time.
    pub fn build(self) -> Result<PerfTable<U>, SchemaError> {
        let (hash, slot_of) = {
            let keys: Vec<&str> = self.items.iter().map(|(k, _)| k.as_str()).collect();

            let mut sorted = keys.clone();
            sorted.sort_unstable();
            if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
                return Err(SchemaError::Duplicate(pair[0].to_string()));
            }

            PerfectHash::build(&keys).ok_or(SchemaError::NoPerfectHash(keys.len()))?
        };

        let mut slots: Vec<Option<PerfSlot<U>>> = std::iter::repeat_with(|| None)
            .take(self.items.len())
            .collect();
        for ((composite, entry), slot) in self.items.into_iter().zip(slot_of) {
            slots[slot] = Some(PerfSlot { composite, entry });
        }

        Ok(PerfTable { hash, slots })
    }
}

impl<U> Default for PerfTableBuilder<U> {
    fn default() -> Self {
        Self::new()
    }
}

fn composite(section: &str, key: &str) -> String {
    format!("{section}.{key}")
}
