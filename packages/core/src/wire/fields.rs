//! HTTP header fields collection, per spec.md §3 "Fields collection": "An
//! ordered sequence of (name, value) records, each carrying an `index`
//! hint ∈ {default, never}. Invariant: order is preserved in iteration;
//! `equal_range(name)` returns the contiguous run of entries with that
//! name; `insert(name, value)` appends; `assign(name, value)` removes all
//! prior entries with that name, then appends; a record's `c_str` is the
//! canonical "name: value" string for diagnostics. Names compare
//! case-insensitively, but the inserted casing is preserved."
//!
//! There's no single file in `original_source` this is grounded on
//! directly — the `http2`/`http3` request/response types there carry
//! headers as plain string multimaps without an indexing hint. The
//! indexing hint here feeds [`crate::hpack::Indexing`] at the HPACK layer.

/// Whether a field should be eligible for HPACK dynamic table indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHint {
    Default,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub index: IndexHint,
}

impl Field {
    /// The canonical `"name: value"` diagnostic string.
    #[must_use]
    pub fn c_str(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

/// An ordered multimap of header fields. Names compare case-insensitively;
/// the casing of the first insertion of a name is preserved in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<Field>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.0.iter()
    }

    /// Appends a field, without touching any existing entries for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert_with_hint(name, value, IndexHint::Default);
    }

    pub fn insert_with_hint(&mut self, name: impl Into<String>, value: impl Into<String>, index: IndexHint) {
        self.0.push(Field { name: name.into(), value: value.into(), index });
    }

    /// Removes every prior entry whose name matches `name`
    /// case-insensitively, then appends the new one.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|f| !f.name.eq_ignore_ascii_case(&name));
        self.insert(name, value);
    }

    /// The contiguous-in-iteration-order run of entries matching `name`
    /// case-insensitively (not necessarily contiguous in storage, but
    /// returned in the collection's overall iteration order).
    #[must_use]
    pub fn equal_range(&self, name: &str) -> Vec<&Field> {
        self.0.iter().filter(|f| f.name.eq_ignore_ascii_case(name)).collect()
    }

    /// The value of the first entry matching `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|f| f.name.eq_ignore_ascii_case(name)).map(|f| f.value.as_str())
    }

    pub fn remove_all(&mut self, name: &str) {
        self.0.retain(|f| !f.name.eq_ignore_ascii_case(name));
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut fields = Fields::new();
        fields.insert("X-First", "1");
        fields.insert("x-second", "2");
        fields.insert("X-FIRST", "3");
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["X-First", "x-second", "X-FIRST"]);
    }

    #[test]
    fn equal_range_matches_case_insensitively_in_order() {
        let mut fields = Fields::new();
        fields.insert("Set-Cookie", "a=1");
        fields.insert("Content-Type", "text/plain");
        fields.insert("set-cookie", "b=2");

        let values: Vec<&str> = fields.equal_range("SET-COOKIE").iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["a=1", "b=2"]);
    }

    #[test]
    fn assign_removes_prior_entries_before_appending() {
        let mut fields = Fields::new();
        fields.insert("Cookie", "a=1");
        fields.insert("Cookie", "b=2");
        fields.assign("cookie", "c=3");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("Cookie"), Some("c=3"));
    }

    #[test]
    fn casing_of_first_insertion_is_preserved() {
        let mut fields = Fields::new();
        fields.insert("Content-Length", "4");
        assert_eq!(fields.iter().next().unwrap().name, "Content-Length");
    }

    #[test]
    fn c_str_is_canonical_diagnostic_form() {
        let mut fields = Fields::new();
        fields.insert("Host", "example.com");
        assert_eq!(fields.iter().next().unwrap().c_str(), "Host: example.com");
    }
}
