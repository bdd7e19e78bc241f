//! Delivery body composition
//!
//! Deliveries carry a human-readable body naming the event followed by the raw
//! trigger payload:
//!
//! ```text
//! Event ORDER_PLACED occurred. Payload: payload-A
//! ```
//!
//! The signature header covers only the payload part, so verifiers have to cut
//! the prefix off again before checking it. [`extract_payload`] does that.

/// Separator between the event label and the payload
const MARKER: &[u8] = b" occurred. Payload: ";

/// Prefix preceding the event label
const PREFIX: &[u8] = b"Event ";

/// Build the body sent to a subscriber for `event` and `payload`
pub fn compose(event: &str, payload: &[u8]) -> Vec<u8> {
    let mut body =
        Vec::with_capacity(PREFIX.len() + event.len() + MARKER.len() + payload.len());
    body.extend_from_slice(PREFIX);
    body.extend_from_slice(event.as_bytes());
    body.extend_from_slice(MARKER);
    body.extend_from_slice(payload);
    body
}

/// Recover the signed payload from a delivered body.
///
/// With the event label known the exact prefix is stripped. Without it the
/// first marker occurrence is used. Bodies that were not produced by
/// [`compose`] are returned unchanged.
pub fn extract_payload<'a>(body: &'a [u8], event: Option<&str>) -> &'a [u8] {
    if let Some(event) = event {
        let prefix_len = PREFIX.len() + event.len() + MARKER.len();
        if body.len() >= prefix_len
            && body.starts_with(PREFIX)
            && body[PREFIX.len()..].starts_with(event.as_bytes())
            && body[PREFIX.len() + event.len()..].starts_with(MARKER)
        {
            return &body[prefix_len..];
        }
    }

    if body.starts_with(PREFIX) {
        if let Some(pos) = find(&body[PREFIX.len()..], MARKER) {
            return &body[PREFIX.len() + pos + MARKER.len()..];
        }
    }

    body
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
