//! HTTP/2 `SETTINGS` frame payload, per spec.md §4.1 "HTTP/2 settings" and
//! §3 "For HTTP/2 there is a separate `setting_values`...". Grounded on
//! `original_source/include/http2/detail/settings.hpp` and `src/settings.cc`
//! (the `copy_changes` helper and the registry-ordered parameter list).

use super::network_order::{U16, U32};
use super::{array, Decode, DecodeResult, Encode};

/// One `(identifier, value)` pair as it appears in a SETTINGS payload: a
/// 2-byte identifier followed by a 4-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingEntry {
    pub identifier: SettingIdentifier,
    pub value: u32,
}

pub const SETTING_ENTRY_LEN: usize = 6;

impl Encode for SettingEntry {
    fn encoded_size(&self) -> usize {
        SETTING_ENTRY_LEN
    }

    fn encode(&self, out: &mut Vec<u8>) {
        U16::new(u64::from(self.identifier.registry_id())).unwrap().encode(out);
        U32::new(u64::from(self.value)).unwrap().encode(out);
    }
}

impl Decode for SettingEntry {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        let identifier = U16::decode(input)?.get() as u16;
        let value = U32::decode(input)?.get() as u32;
        Ok(SettingEntry { identifier: SettingIdentifier::from_registry_id(identifier), value })
    }
}

/// Registry identifiers `1..=6` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingIdentifier {
    HeaderTableSize,
    EnablePush,
    MaxConcurrentStreams,
    InitialWindowSize,
    MaxFrameSize,
    MaxHeaderListSize,
    /// An identifier outside `1..=6`: spec.md §4.1 "Unknown identifiers are
    /// skipped" (for transport parameters); for HTTP/2 SETTINGS, RFC 9113
    /// says unknown identifiers MUST be ignored, so we keep the raw id
    /// rather than erroring.
    Unknown(u16),
}

impl SettingIdentifier {
    pub const COUNT: usize = 6;

    #[must_use]
    pub fn registry_id(self) -> u16 {
        match self {
            Self::HeaderTableSize => 1,
            Self::EnablePush => 2,
            Self::MaxConcurrentStreams => 3,
            Self::InitialWindowSize => 4,
            Self::MaxFrameSize => 5,
            Self::MaxHeaderListSize => 6,
            Self::Unknown(id) => id,
        }
    }

    #[must_use]
    pub fn from_registry_id(id: u16) -> Self {
        match id {
            1 => Self::HeaderTableSize,
            2 => Self::EnablePush,
            3 => Self::MaxConcurrentStreams,
            4 => Self::InitialWindowSize,
            5 => Self::MaxFrameSize,
            6 => Self::MaxHeaderListSize,
            other => Self::Unknown(other),
        }
    }
}

/// The six registered HTTP/2 SETTINGS parameters, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingValues {
    pub header_table_size: u32,
    pub enable_push: u32,
    pub max_concurrent_streams: u32,
    pub initial_window_size: u32,
    pub max_frame_size: u32,
    pub max_header_list_size: u32,
}

impl Default for SettingValues {
    fn default() -> Self {
        // RFC 9113 §6.5.2 defaults.
        SettingValues {
            header_table_size: 4096,
            enable_push: 1,
            max_concurrent_streams: u32::MAX,
            initial_window_size: 65_535,
            max_frame_size: 16_384,
            max_header_list_size: u32::MAX,
        }
    }
}

impl SettingValues {
    fn registry_ordered(&self) -> [u32; SettingIdentifier::COUNT] {
        [
            self.header_table_size,
            self.enable_push,
            self.max_concurrent_streams,
            self.initial_window_size,
            self.max_frame_size,
            self.max_header_list_size,
        ]
    }

    /// All six parameters as entries, in registry order.
    #[must_use]
    pub fn to_entries(&self) -> Vec<SettingEntry> {
        self.registry_ordered()
            .into_iter()
            .enumerate()
            .map(|(i, value)| SettingEntry {
                identifier: SettingIdentifier::from_registry_id(i as u16 + 1),
                value,
            })
            .collect()
    }

    /// Applies a decoded entry, updating the matching field. Unknown
    /// identifiers are silently ignored.
    pub fn apply(&mut self, entry: SettingEntry) {
        match entry.identifier {
            SettingIdentifier::HeaderTableSize => self.header_table_size = entry.value,
            SettingIdentifier::EnablePush => self.enable_push = entry.value,
            SettingIdentifier::MaxConcurrentStreams => self.max_concurrent_streams = entry.value,
            SettingIdentifier::InitialWindowSize => self.initial_window_size = entry.value,
            SettingIdentifier::MaxFrameSize => self.max_frame_size = entry.value,
            SettingIdentifier::MaxHeaderListSize => self.max_header_list_size = entry.value,
            SettingIdentifier::Unknown(_) => {}
        }
    }

    /// `copy_changes`: only the parameters whose value differs between
    /// `from` and `to`, in registry order (spec.md §4.1 "HTTP/2 settings").
    #[must_use]
    pub fn changes_from(from: &SettingValues, to: &SettingValues) -> Vec<SettingEntry> {
        let froms = from.registry_ordered();
        let tos = to.registry_ordered();
        froms
            .iter()
            .zip(tos.iter())
            .enumerate()
            .filter(|(_, (f, t))| f != t)
            .map(|(i, (_, &value))| SettingEntry {
                identifier: SettingIdentifier::from_registry_id(i as u16 + 1),
                value,
            })
            .collect()
    }
}

/// Encodes a SETTINGS frame payload: a flat run of entries, no count prefix.
pub fn encode_payload(entries: &[SettingEntry], out: &mut Vec<u8>) {
    array::encode_array(entries, out);
}

/// Decodes a SETTINGS frame payload. `payload.len()` must be a multiple of
/// [`SETTING_ENTRY_LEN`]; RFC 9113 requires this be treated as
/// `FRAME_SIZE_ERROR`, which the caller maps from the `Truncated` this
/// returns when it is not.
pub fn decode_payload(mut payload: &[u8]) -> DecodeResult<Vec<SettingEntry>> {
    array::decode_array_until_empty(&mut payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_to_vec;

    #[test]
    fn s4_empty_settings_frame_header() {
        use crate::codec::FrameHeader;
        let header = FrameHeader::new(0, 4, 0, 0).unwrap();
        let bytes = encode_to_vec(&header);
        assert_eq!(bytes, [0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn copy_changes_is_empty_for_identical_values() {
        let a = SettingValues::default();
        let b = SettingValues::default();
        assert!(SettingValues::changes_from(&a, &b).is_empty());
    }

    #[test]
    fn copy_changes_lists_only_differing_fields_in_registry_order() {
        let from = SettingValues::default();
        let mut to = from;
        to.enable_push = 0;
        to.max_frame_size = 32_768;

        let changes = SettingValues::changes_from(&from, &to);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].identifier.registry_id(), 2);
        assert_eq!(changes[0].value, 0);
        assert_eq!(changes[1].identifier.registry_id(), 5);
        assert_eq!(changes[1].value, 32_768);
    }

    #[test]
    fn entry_round_trips() {
        let entry = SettingEntry { identifier: SettingIdentifier::MaxConcurrentStreams, value: 128 };
        let bytes = encode_to_vec(&entry);
        assert_eq!(bytes.len(), SETTING_ENTRY_LEN);
        let mut input: &[u8] = &bytes;
        let decoded = SettingEntry::decode(&mut input).unwrap();
        assert_eq!(decoded.identifier.registry_id(), 3);
        assert_eq!(decoded.value, 128);
    }

    #[test]
    fn unknown_identifier_is_preserved_and_ignored_on_apply() {
        let entry = SettingEntry { identifier: SettingIdentifier::Unknown(42), value: 7 };
        let bytes = encode_to_vec(&entry);
        let mut input: &[u8] = &bytes;
        let decoded = SettingEntry::decode(&mut input).unwrap();
        assert_eq!(decoded.identifier.registry_id(), 42);

        let mut values = SettingValues::default();
        let before = values;
        values.apply(decoded);
        assert_eq!(values, before);
    }
}
