//! HPACK header field representation (RFC 7541 §6): the four forms
//! (indexed, literal with incremental indexing, literal without indexing,
//! literal never indexed) over the static and dynamic tables. Grounded on
//! `original_source/include/http2/detail/hpack/header.hpp`'s
//! `encode_header`/`decode_header`, generalized here to cover all four
//! forms rather than only the "without indexing, literal name" case the
//! original stubs out.

use super::dynamic_table::DynamicTable;
use super::{integer, static_table, string};
use crate::error::HpackError;

/// How a literal header field should be handled by the peer's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexing {
    /// Insert into the dynamic table (RFC 7541 §6.1).
    Incremental,
    /// Don't index, but may be re-encoded as a literal later (§6.2.2).
    WithoutIndexing,
    /// Must never be indexed, even by intermediaries (§6.2.3) — used for
    /// sensitive header values.
    NeverIndexed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// Encodes one header field, picking the most compact representation the
/// tables allow: a fully indexed field if both name and value match an
/// existing entry, otherwise a literal naming an indexed name where
/// possible. `indexing` controls whether the dynamic table is updated.
pub fn encode(
    field: &HeaderField,
    indexing: Indexing,
    table: &mut DynamicTable,
    out: &mut Vec<u8>,
) {
    if let Some((index, exact)) = static_table::find(&field.name, &field.value).or_else(|| {
        table
            .find(&field.name, &field.value)
            .map(|(i, exact)| (i + 1 + static_table::STATIC_TABLE.len(), exact))
    }) {
        if exact {
            integer::encode::<7>(index as u64, 0x80, out);
            return;
        }
        encode_literal_with_name_index(index, field, indexing, table, out);
        return;
    }
    encode_literal_with_literal_name(field, indexing, table, out);
}

fn encode_literal_with_name_index(
    index: usize,
    field: &HeaderField,
    indexing: Indexing,
    table: &mut DynamicTable,
    out: &mut Vec<u8>,
) {
    match indexing {
        Indexing::Incremental => {
            integer::encode::<6>(index as u64, 0x40, out);
            string::encode(&field.value, out);
            table.insert(field.name.clone(), field.value.clone());
        }
        Indexing::WithoutIndexing => {
            integer::encode::<4>(index as u64, 0x00, out);
            string::encode(&field.value, out);
        }
        Indexing::NeverIndexed => {
            integer::encode::<4>(index as u64, 0x10, out);
            string::encode(&field.value, out);
        }
    }
}

fn encode_literal_with_literal_name(
    field: &HeaderField,
    indexing: Indexing,
    table: &mut DynamicTable,
    out: &mut Vec<u8>,
) {
    match indexing {
        Indexing::Incremental => {
            integer::encode::<6>(0, 0x40, out);
            string::encode(&field.name, out);
            string::encode(&field.value, out);
            table.insert(field.name.clone(), field.value.clone());
        }
        Indexing::WithoutIndexing => {
            integer::encode::<4>(0, 0x00, out);
            string::encode(&field.name, out);
            string::encode(&field.value, out);
        }
        Indexing::NeverIndexed => {
            integer::encode::<4>(0, 0x10, out);
            string::encode(&field.name, out);
            string::encode(&field.value, out);
        }
    }
}

/// Decodes one header field, applying dynamic table size updates and
/// indexing insertions as a side effect.
pub fn decode(input: &mut &[u8], table: &mut DynamicTable) -> Result<HeaderField, HpackError> {
    let &first = input.first().ok_or(HpackError::DecodeTruncated)?;

    if first & 0x80 != 0 {
        let (index, _flags) = integer::decode::<7>(input)?;
        let (name, value) = lookup(index as usize, table)?;
        return Ok(HeaderField { name, value });
    }

    if first & 0x40 != 0 {
        let (index, _flags) = integer::decode::<6>(input)?;
        let name = decode_name(index as usize, table, input)?;
        let value = string::decode(input)?;
        table.insert(name.clone(), value.clone());
        return Ok(HeaderField { name, value });
    }

    if first & 0x20 != 0 {
        // Dynamic Table Size Update (§6.3): handled by the caller via
        // `decode_size_update`, not a header field.
        return Err(HpackError::DecodeInvalidIndex);
    }

    // Literal Header Field without Indexing (0000xxxx) or Never Indexed
    // (0001xxxx): both use a 4-bit prefix and neither indexes.
    let (index, _flags) = integer::decode::<4>(input)?;
    let name = decode_name(index as usize, table, input)?;
    let value = string::decode(input)?;
    Ok(HeaderField { name, value })
}

/// Decodes a Dynamic Table Size Update octet (§6.3), if present at the
/// front of `input`. Returns `Ok(None)` if the next octet isn't one.
pub fn decode_size_update(input: &mut &[u8], table: &mut DynamicTable) -> Result<Option<usize>, HpackError> {
    match input.first() {
        Some(&b) if b & 0xe0 == 0x20 => {
            let (new_size, _flags) = integer::decode::<5>(input)?;
            let new_size = usize::try_from(new_size).map_err(|_| HpackError::DecodeIntegerOverflow)?;
            table.set_max_size(new_size);
            Ok(Some(new_size))
        }
        _ => Ok(None),
    }
}

fn decode_name(index: usize, table: &DynamicTable, input: &mut &[u8]) -> Result<String, HpackError> {
    if index == 0 {
        return string::decode(input);
    }
    lookup(index, table).map(|(name, _)| name)
}

fn lookup(index: usize, table: &DynamicTable) -> Result<(String, String), HpackError> {
    if index == 0 {
        return Err(HpackError::DecodeInvalidIndex);
    }
    let static_len = static_table::STATIC_TABLE.len();
    if index <= static_len {
        let entry = static_table::lookup(index).ok_or(HpackError::DecodeInvalidIndex)?;
        return Ok((entry.name.to_string(), entry.value.to_string()));
    }
    let dyn_index = index - static_len - 1;
    table
        .lookup(dyn_index)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or(HpackError::DecodeInvalidIndex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_literal_field_without_indexing() {
        let mut table = DynamicTable::default();
        let field = HeaderField { name: "name".into(), value: "value".into() };
        let mut out = Vec::new();
        encode(&field, Indexing::WithoutIndexing, &mut table, &mut out);

        let mut input: &[u8] = &out;
        let mut decode_table = DynamicTable::default();
        let decoded = decode(&mut input, &mut decode_table).unwrap();
        assert_eq!(decoded, field);
        assert!(input.is_empty());
        assert!(decode_table.is_empty());
    }

    #[test]
    fn incremental_indexing_populates_dynamic_table_on_both_sides() {
        let mut enc_table = DynamicTable::default();
        let field = HeaderField { name: "x-request-id".into(), value: "abc123".into() };
        let mut out = Vec::new();
        encode(&field, Indexing::Incremental, &mut enc_table, &mut out);
        assert_eq!(enc_table.len(), 1);

        let mut input: &[u8] = &out;
        let mut dec_table = DynamicTable::default();
        let decoded = decode(&mut input, &mut dec_table).unwrap();
        assert_eq!(decoded, field);
        assert_eq!(dec_table.len(), 1);
    }

    #[test]
    fn exact_static_table_match_encodes_as_fully_indexed() {
        let mut table = DynamicTable::default();
        let field = HeaderField { name: ":method".into(), value: "GET".into() };
        let mut out = Vec::new();
        encode(&field, Indexing::WithoutIndexing, &mut table, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], 0x80 | 2);
    }

    #[test]
    fn second_reference_to_a_dynamic_entry_reuses_its_index() {
        let mut table = DynamicTable::default();
        let field = HeaderField { name: "x-trace".into(), value: "1".into() };
        let mut first = Vec::new();
        encode(&field, Indexing::Incremental, &mut table, &mut first);

        let mut second = Vec::new();
        encode(&field, Indexing::Incremental, &mut table, &mut second);
        assert_eq!(second.len(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn dynamic_table_size_update_is_applied() {
        let mut table = DynamicTable::default();
        let mut bytes = Vec::new();
        integer::encode::<5>(100, 0x20, &mut bytes);
        let mut input: &[u8] = &bytes;
        let applied = decode_size_update(&mut input, &mut table).unwrap();
        assert_eq!(applied, Some(100));
        assert_eq!(table.max_size(), 100);
    }

    #[test]
    fn invalid_index_is_rejected() {
        let mut bytes = Vec::new();
        integer::encode::<7>(200, 0x80, &mut bytes);
        let mut input: &[u8] = &bytes;
        let mut table = DynamicTable::default();
        assert_eq!(decode(&mut input, &mut table), Err(HpackError::DecodeInvalidIndex));
    }
}
