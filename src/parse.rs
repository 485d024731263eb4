//! Mapping raw remote records into typed parsed representations.
//!
//! Each entity kind declares its own field schema by implementing
//! [`RemoteRecord`]. Parsing one record is independent of all others; the
//! only cross-record concern (reference resolution) happens later in
//! [`crate::resolve`].

use crate::error::{Result, SyncError};
use crate::models::{EntityKind, ParsedCharacter, ParsedFilm, ParsedStarship};
use crate::normalize::{decimal_field, int_field, text_field};
use serde_json::{Map, Value};

/// A raw remote record: an open-ended JSON object.
pub type RawRecord = Map<String, Value>;

/// Parse-from-raw capability, implemented once per entity kind.
pub trait RemoteRecord: Sized {
    const KIND: EntityKind;

    /// Parse one raw record. The origin URL and the identifying field are
    /// required; every other scalar is normalized to a nullable value.
    fn parse(record: &RawRecord) -> Result<Self>;
}

/// Parse a whole fetched collection, preserving record order.
pub fn parse_collection<T: RemoteRecord>(records: &[RawRecord]) -> Result<Vec<T>> {
    records.iter().map(T::parse).collect()
}

fn malformed(kind: EntityKind, reason: impl Into<String>) -> SyncError {
    SyncError::MalformedRecord {
        kind,
        reason: reason.into(),
    }
}

/// Required string field; absence is a fatal parse error for the record.
fn required_str(kind: EntityKind, record: &RawRecord, field: &str) -> Result<String> {
    match record.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(malformed(kind, format!("field `{field}` is not a string"))),
        None => Err(malformed(kind, format!("missing required field `{field}`"))),
    }
}

/// Raw textual view of a field. Numbers are rendered to text so the
/// normalizer sees a single input shape.
fn raw_text(record: &RawRecord, field: &str) -> Option<String> {
    match record.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Ordered list of remote reference URLs; an absent field means no references.
fn url_list(kind: EntityKind, record: &RawRecord, field: &str) -> Result<Vec<String>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(malformed(
                    kind,
                    format!("field `{field}` contains a non-string reference"),
                )),
            })
            .collect(),
        Some(_) => Err(malformed(kind, format!("field `{field}` is not a list"))),
    }
}

impl RemoteRecord for ParsedFilm {
    const KIND: EntityKind = EntityKind::Film;

    fn parse(record: &RawRecord) -> Result<Self> {
        Ok(ParsedFilm {
            url: required_str(Self::KIND, record, "url")?,
            title: required_str(Self::KIND, record, "title")?,
            episode_id: int_field(raw_text(record, "episode_id").as_deref()),
            opening_crawl: text_field(raw_text(record, "opening_crawl").as_deref()),
            director: text_field(raw_text(record, "director").as_deref()),
            producer: text_field(raw_text(record, "producer").as_deref()),
            release_date: text_field(raw_text(record, "release_date").as_deref()),
            character_urls: url_list(Self::KIND, record, "characters")?,
            starship_urls: url_list(Self::KIND, record, "starships")?,
        })
    }
}

impl RemoteRecord for ParsedCharacter {
    const KIND: EntityKind = EntityKind::Character;

    fn parse(record: &RawRecord) -> Result<Self> {
        Ok(ParsedCharacter {
            url: required_str(Self::KIND, record, "url")?,
            name: required_str(Self::KIND, record, "name")?,
            height: int_field(raw_text(record, "height").as_deref()),
            mass: int_field(raw_text(record, "mass").as_deref()),
            hair_color: text_field(raw_text(record, "hair_color").as_deref()),
            skin_color: text_field(raw_text(record, "skin_color").as_deref()),
            eye_color: text_field(raw_text(record, "eye_color").as_deref()),
            gender: text_field(raw_text(record, "gender").as_deref()),
            birth_year: text_field(raw_text(record, "birth_year").as_deref()),
        })
    }
}

impl RemoteRecord for ParsedStarship {
    const KIND: EntityKind = EntityKind::Starship;

    fn parse(record: &RawRecord) -> Result<Self> {
        Ok(ParsedStarship {
            url: required_str(Self::KIND, record, "url")?,
            name: required_str(Self::KIND, record, "name")?,
            model: text_field(raw_text(record, "model").as_deref()),
            manufacturer: text_field(raw_text(record, "manufacturer").as_deref()),
            cost_in_credits: int_field(raw_text(record, "cost_in_credits").as_deref()),
            length: decimal_field(raw_text(record, "length").as_deref()),
            max_atmosphering_speed: int_field(
                raw_text(record, "max_atmosphering_speed").as_deref(),
            ),
            crew: text_field(raw_text(record, "crew").as_deref()),
            passengers: int_field(raw_text(record, "passengers").as_deref()),
            cargo_capacity: int_field(raw_text(record, "cargo_capacity").as_deref()),
            consumables: text_field(raw_text(record, "consumables").as_deref()),
            hyperdrive_rating: decimal_field(raw_text(record, "hyperdrive_rating").as_deref()),
            mglt: int_field(raw_text(record, "MGLT").as_deref()),
            starship_class: text_field(raw_text(record, "starship_class").as_deref()),
            pilot_urls: url_list(Self::KIND, record, "pilots")?,
        })
    }
}
