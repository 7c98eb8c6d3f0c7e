//! Query string and path segment decoding
//!
//! Query strings are decoded as `application/x-www-form-urlencoded`: `+` is a
//! space and `%XX` escapes are decoded. When a key repeats, the last value wins.

use std::borrow::Cow;

/// Get the decoded value of `name` from a raw query string (without `?`)
///
/// A key present without `=` yields `Some("")`; an absent key yields `None`.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == name)
        .last()
        .map(|(_, value)| value.into_owned())
}

/// Percent-decode a single path segment
///
/// Segments that do not decode to valid UTF-8 are returned unchanged.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}
