//! The HPACK static table (RFC 7541 Appendix A), 61 fixed entries indexed
//! `1..=61`. Grounded on
//! `original_source/include/http2/detail/hpack/static_table.hpp`.

pub struct StaticTableEntry {
    pub name: &'static str,
    pub value: &'static str,
}

pub const STATIC_TABLE: [StaticTableEntry; 61] = [
    StaticTableEntry { name: ":authority", value: "" },
    StaticTableEntry { name: ":method", value: "GET" },
    StaticTableEntry { name: ":method", value: "POST" },
    StaticTableEntry { name: ":path", value: "/" },
    StaticTableEntry { name: ":path", value: "/index.html" },
    StaticTableEntry { name: ":scheme", value: "http" },
    StaticTableEntry { name: ":scheme", value: "https" },
    StaticTableEntry { name: ":status", value: "200" },
    StaticTableEntry { name: ":status", value: "204" },
    StaticTableEntry { name: ":status", value: "206" },
    StaticTableEntry { name: ":status", value: "304" },
    StaticTableEntry { name: ":status", value: "400" },
    StaticTableEntry { name: ":status", value: "404" },
    StaticTableEntry { name: ":status", value: "500" },
    StaticTableEntry { name: "accept-charset", value: "" },
    StaticTableEntry { name: "accept-encoding", value: "gzip, deflate" },
    StaticTableEntry { name: "accept-language", value: "" },
    StaticTableEntry { name: "accept-ranges", value: "" },
    StaticTableEntry { name: "accept", value: "" },
    StaticTableEntry { name: "access-control-allow-origin", value: "" },
    StaticTableEntry { name: "age", value: "" },
    StaticTableEntry { name: "allow", value: "" },
    StaticTableEntry { name: "authorization", value: "" },
    StaticTableEntry { name: "cache-control", value: "" },
    StaticTableEntry { name: "content-disposition", value: "" },
    StaticTableEntry { name: "content-encoding", value: "" },
    StaticTableEntry { name: "content-language", value: "" },
    StaticTableEntry { name: "content-length", value: "" },
    StaticTableEntry { name: "content-location", value: "" },
    StaticTableEntry { name: "content-range", value: "" },
    StaticTableEntry { name: "content-type", value: "" },
    StaticTableEntry { name: "cookie", value: "" },
    StaticTableEntry { name: "date", value: "" },
    StaticTableEntry { name: "etag", value: "" },
    StaticTableEntry { name: "expect", value: "" },
    StaticTableEntry { name: "expires", value: "" },
    StaticTableEntry { name: "from", value: "" },
    StaticTableEntry { name: "host", value: "" },
    StaticTableEntry { name: "if-match", value: "" },
    StaticTableEntry { name: "if-modified-since", value: "" },
    StaticTableEntry { name: "if-none-match", value: "" },
    StaticTableEntry { name: "if-range", value: "" },
    StaticTableEntry { name: "if-unmodified-since", value: "" },
    StaticTableEntry { name: "last-modified", value: "" },
    StaticTableEntry { name: "link", value: "" },
    StaticTableEntry { name: "location", value: "" },
    StaticTableEntry { name: "max-forwards", value: "" },
    StaticTableEntry { name: "proxy-authenticate", value: "" },
    StaticTableEntry { name: "proxy-authorization", value: "" },
    StaticTableEntry { name: "range", value: "" },
    StaticTableEntry { name: "referer", value: "" },
    StaticTableEntry { name: "refresh", value: "" },
    StaticTableEntry { name: "retry-after", value: "" },
    StaticTableEntry { name: "server", value: "" },
    StaticTableEntry { name: "set-cookie", value: "" },
    StaticTableEntry { name: "strict-transport-security", value: "" },
    StaticTableEntry { name: "transfer-encoding", value: "" },
    StaticTableEntry { name: "user-agent", value: "" },
    StaticTableEntry { name: "vary", value: "" },
    StaticTableEntry { name: "via", value: "" },
    StaticTableEntry { name: "www-authenticate", value: "" },
];

/// Looks up a 1-based static table index.
#[must_use]
pub fn lookup(index: usize) -> Option<&'static StaticTableEntry> {
    index.checked_sub(1).and_then(|i| STATIC_TABLE.get(i))
}

/// Finds the static table index (1-based) of an exact `name, value` match,
/// falling back to a name-only match. Used when encoding, to prefer
/// indexed forms over literals.
#[must_use]
pub fn find(name: &str, value: &str) -> Option<(usize, bool)> {
    let mut name_only = None;
    for (i, entry) in STATIC_TABLE.iter().enumerate() {
        if entry.name == name {
            if entry.value == value {
                return Some((i + 1, true));
            }
            if name_only.is_none() {
                name_only = Some((i + 1, false));
            }
        }
    }
    name_only
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_61_entries() {
        assert_eq!(STATIC_TABLE.len(), 61);
    }

    #[test]
    fn index_1_is_authority() {
        assert_eq!(lookup(1).unwrap().name, ":authority");
    }

    #[test]
    fn index_0_and_62_are_out_of_range() {
        assert!(lookup(0).is_none());
        assert!(lookup(62).is_none());
    }

    #[test]
    fn find_prefers_exact_value_match() {
        assert_eq!(find(":method", "POST"), Some((3, true)));
        assert_eq!(find(":method", "PATCH"), Some((2, false)));
        assert_eq!(find("x-custom", "whatever"), None);
    }
}
