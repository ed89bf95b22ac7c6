//! Fields-collection behavior exercised the way a request/response header
//! block actually uses it (spec.md §3 "Fields collection"), rather than as
//! isolated method calls.

use nexusq_core::wire::{Fields, IndexHint};

#[test]
fn building_a_request_then_overriding_a_forwarded_header_preserves_order_elsewhere() {
    let mut fields = Fields::new();
    fields.insert(":method", "GET");
    fields.insert(":path", "/status");
    fields.insert("x-forwarded-for", "10.0.0.1");
    fields.insert_with_hint("authorization", "Bearer secret", IndexHint::Never);
    fields.insert("x-forwarded-for", "10.0.0.1, 10.0.0.2");

    // `assign` collapses the two `x-forwarded-for` entries into the latest
    // value without disturbing the other fields' relative order.
    fields.assign("X-Forwarded-For", "10.0.0.1, 10.0.0.2, 10.0.0.3");

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, [":method", ":path", "authorization", "x-forwarded-for"]);
    assert_eq!(fields.get("x-forwarded-for"), Some("10.0.0.1, 10.0.0.2, 10.0.0.3"));

    let auth = fields.equal_range("Authorization");
    assert_eq!(auth.len(), 1);
    assert_eq!(auth[0].index, IndexHint::Never);
}

#[test]
fn set_cookie_entries_keep_their_own_casing_and_stay_in_server_emission_order() {
    let mut fields = Fields::new();
    fields.insert("Set-Cookie", "session=abc; HttpOnly");
    fields.insert("Content-Type", "text/html");
    fields.insert("set-cookie", "theme=dark");

    let cookies: Vec<&str> = fields.equal_range("set-cookie").iter().map(|f| f.value.as_str()).collect();
    assert_eq!(cookies, ["session=abc; HttpOnly", "theme=dark"]);

    let diagnostics: Vec<String> = fields.iter().map(|f| f.c_str()).collect();
    assert_eq!(
        diagnostics,
        [
            "Set-Cookie: session=abc; HttpOnly",
            "Content-Type: text/html",
            "set-cookie: theme=dark",
        ]
    );
}

#[test]
fn remove_all_drops_a_trailer_header_entirely() {
    let mut fields = Fields::new();
    fields.insert("Trailer", "x-checksum");
    fields.insert("x-checksum", "deadbeef");
    fields.remove_all("x-checksum");

    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("x-checksum"), None);
}
