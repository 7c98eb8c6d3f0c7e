//! Bird endpoint handlers
//!
//! Each handler is a pure function of its inputs and the record store. Absence
//! is returned as `Outcome::NotFound` and turned into a bodiless 404 by the router.

use serde::Serialize;
use std::borrow::Cow;

use crate::http::decode_segment;
use crate::store::{BirdCollection, BirdId, BirdStore};

/// Result of a lookup at the handler boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Found(v),
            None => Self::NotFound,
        }
    }
}

/// Body of `GET /`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Greeting {
    pub greeting: &'static str,
    pub number: i64,
}

pub const GREETING: Greeting = Greeting {
    greeting: "Hello birds!",
    number: 42,
};

/// `GET /`
pub const fn root() -> Greeting {
    GREETING
}

/// `GET /birds[?starts_with=<prefix>]`
///
/// Without a prefix the whole collection is returned, even if it is empty.
/// With a prefix, an empty subset is `NotFound`.
pub fn list_birds<'a>(
    store: &'a BirdStore,
    starts_with: Option<&str>,
) -> Outcome<Cow<'a, BirdCollection>> {
    let Some(prefix) = starts_with else {
        return Outcome::Found(Cow::Borrowed(store.get_all()));
    };

    let hits = store.filter_by_prefix(prefix);
    if hits.is_empty() {
        Outcome::NotFound
    } else {
        Outcome::Found(Cow::Owned(hits))
    }
}

/// `GET /birds/{birdid}`
pub fn get_bird(store: &BirdStore, id: BirdId) -> Outcome<&str> {
    store.get_by_id(id).into()
}

/// 422 body for a path parameter that is not an integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub detail: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub loc: [&'static str; 2],
    pub msg: &'static str,
    pub input: String,
}

/// Parse the `birdid` path segment
///
/// Ids are `i64`: a value outside that range is a 422, not a 404.
pub fn parse_bird_id(segment: &str) -> Result<BirdId, ValidationError> {
    let decoded = decode_segment(segment);
    match decoded.parse::<BirdId>() {
        Ok(id) => Ok(id),
        Err(_) => Err(ValidationError {
            detail: vec![ValidationIssue {
                kind: "int_parsing",
                loc: ["path", "birdid"],
                msg: "Input should be a valid integer, unable to parse string as an integer",
                input: decoded.into_owned(),
            }],
        }),
    }
}
