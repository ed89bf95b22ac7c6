//! HPACK dynamic table (RFC 7541 §2.3.2, §4): a FIFO of recently-used
//! header fields bounded by a byte budget, insertion evicting from the
//! tail until the new entry fits. Grounded on the `basic_dynamic_table`
//! used by `original_source/include/http2/detail/hpack/header.hpp`
//! (`table.lookup`/`table.insert`), with the 32-byte per-entry overhead
//! RFC 7541 §4.1 specifies.

use std::collections::VecDeque;

/// Per-entry overhead RFC 7541 §4.1 adds to `name.len() + value.len()`
/// when counting an entry against the table's size budget.
const ENTRY_OVERHEAD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    value: String,
}

impl Entry {
    fn size(&self) -> usize {
        self.name.len() + self.value.len() + ENTRY_OVERHEAD
    }
}

/// A dynamic table with a maximum size in bytes (default 4096, per RFC 7541
/// §6.3 `Dynamic Table Size Update` default and spec.md's HPACK scope).
#[derive(Debug, Clone)]
pub struct DynamicTable {
    entries: VecDeque<Entry>,
    max_size: usize,
    size: usize,
}

impl Default for DynamicTable {
    fn default() -> Self {
        DynamicTable::new(4096)
    }
}

impl DynamicTable {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        DynamicTable { entries: VecDeque::new(), max_size, size: 0 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Most-recently-inserted entries are evicted last: index `0` is the
    /// newest.
    #[must_use]
    pub fn lookup(&self, index: usize) -> Option<(&str, &str)> {
        self.entries.get(index).map(|e| (e.name.as_str(), e.value.as_str()))
    }

    /// Finds the dynamic-table index (0-based, newest-first) of an exact
    /// match, falling back to a name-only match.
    #[must_use]
    pub fn find(&self, name: &str, value: &str) -> Option<(usize, bool)> {
        let mut name_only = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.name == name {
                if entry.value == value {
                    return Some((i, true));
                }
                if name_only.is_none() {
                    name_only = Some((i, false));
                }
            }
        }
        name_only
    }

    /// Inserts a new entry at the front, evicting from the back until it
    /// fits the size budget. An entry larger than the whole table is
    /// simply not stored (RFC 7541 §4.4).
    pub fn insert(&mut self, name: String, value: String) {
        let entry = Entry { name, value };
        let added = entry.size();
        while self.size + added > self.max_size {
            match self.entries.pop_back() {
                Some(evicted) => self.size -= evicted.size(),
                None => break,
            }
        }
        if added <= self.max_size {
            self.size += added;
            self.entries.push_front(entry);
        }
    }

    /// Applies a dynamic table size update, evicting entries as needed.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.size > self.max_size {
            match self.entries.pop_back() {
                Some(evicted) => self.size -= evicted.size(),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_round_trips() {
        let mut table = DynamicTable::default();
        table.insert("x-custom".into(), "value".into());
        assert_eq!(table.lookup(0), Some(("x-custom", "value")));
        assert_eq!(table.size(), "x-custom".len() + "value".len() + ENTRY_OVERHEAD);
    }

    #[test]
    fn newest_entry_is_index_zero() {
        let mut table = DynamicTable::default();
        table.insert("a".into(), "1".into());
        table.insert("b".into(), "2".into());
        assert_eq!(table.lookup(0), Some(("b", "2")));
        assert_eq!(table.lookup(1), Some(("a", "1")));
    }

    #[test]
    fn eviction_drops_oldest_entries_first() {
        let mut table = DynamicTable::new(ENTRY_OVERHEAD + 2);
        table.insert("a".into(), "1".into());
        table.insert("b".into(), "2".into());
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(0), Some(("b", "2")));
    }

    #[test]
    fn entry_larger_than_table_is_not_stored() {
        let mut table = DynamicTable::new(4);
        table.insert("way-too-big".into(), "for-this-table".into());
        assert!(table.is_empty());
    }

    #[test]
    fn shrinking_max_size_evicts_down_to_fit() {
        let mut table = DynamicTable::default();
        table.insert("a".into(), "1".into());
        table.insert("b".into(), "2".into());
        table.set_max_size(ENTRY_OVERHEAD + 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(0), Some(("b", "2")));
    }
}
