//! Core data types: entity kinds, parsed representations, and stored records.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of entity kinds the mirror knows about.
///
/// Each variant carries its remote endpoint and naming directly, so no
/// runtime type lookup is ever needed to route a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Film,
    Character,
    Starship,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Film,
        EntityKind::Character,
        EntityKind::Starship,
    ];

    /// Collection endpoint on the remote API.
    pub fn endpoint(self) -> &'static str {
        match self {
            EntityKind::Film => "films",
            EntityKind::Character => "people",
            EntityKind::Starship => "starships",
        }
    }

    /// Plural label, also the local table name.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Film => "films",
            EntityKind::Character => "characters",
            EntityKind::Starship => "starships",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Film => "film",
            EntityKind::Character => "character",
            EntityKind::Starship => "starship",
        };
        f.write_str(name)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "film" | "films" => Ok(EntityKind::Film),
            "character" | "characters" => Ok(EntityKind::Character),
            "starship" | "starships" => Ok(EntityKind::Starship),
            other => Err(format!(
                "unknown entity kind `{other}` (expected film, character, or starship)"
            )),
        }
    }
}

/// A film as parsed from the remote payload. Foreign references are kept as
/// ordered remote origin URLs, unresolved.
#[derive(Debug, Clone)]
pub struct ParsedFilm {
    pub url: String,
    pub title: String,
    pub episode_id: Option<i64>,
    pub opening_crawl: Option<String>,
    pub director: Option<String>,
    pub producer: Option<String>,
    pub release_date: Option<String>,
    pub character_urls: Vec<String>,
    pub starship_urls: Vec<String>,
}

/// A character as parsed from the remote payload.
#[derive(Debug, Clone)]
pub struct ParsedCharacter {
    pub url: String,
    pub name: String,
    pub height: Option<i64>,
    pub mass: Option<i64>,
    pub hair_color: Option<String>,
    pub skin_color: Option<String>,
    pub eye_color: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<String>,
}

/// A starship as parsed from the remote payload, pilot references unresolved.
#[derive(Debug, Clone)]
pub struct ParsedStarship {
    pub url: String,
    pub name: String,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub cost_in_credits: Option<i64>,
    pub length: Option<f64>,
    pub max_atmosphering_speed: Option<i64>,
    pub crew: Option<String>,
    pub passengers: Option<i64>,
    pub cargo_capacity: Option<i64>,
    pub consumables: Option<String>,
    pub hyperdrive_rating: Option<f64>,
    pub mglt: Option<i64>,
    pub starship_class: Option<String>,
    pub pilot_urls: Vec<String>,
}

/// A fully resolved dataset, ready for the replace transaction.
///
/// Entities carry their assigned local ids; edges reference those ids only.
/// Edge vectors are deduplicated and ordered first-seen.
#[derive(Debug, Default)]
pub struct Dataset {
    pub films: Vec<(Uuid, ParsedFilm)>,
    pub characters: Vec<(Uuid, ParsedCharacter)>,
    pub starships: Vec<(Uuid, ParsedStarship)>,
    pub film_characters: Vec<(Uuid, Uuid)>,
    pub film_starships: Vec<(Uuid, Uuid)>,
    pub starship_pilots: Vec<(Uuid, Uuid)>,
}

impl Dataset {
    /// Per-kind entity counts for the sync summary.
    pub fn summary(&self) -> SyncSummary {
        SyncSummary {
            films: self.films.len(),
            characters: self.characters.len(),
            starships: self.starships.len(),
        }
    }
}

/// Per-kind counts returned by a successful sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub films: usize,
    pub characters: usize,
    pub starships: usize,
}

/// A stored film, read back with its relationship edges.
#[derive(Debug, Clone, Serialize)]
pub struct FilmRecord {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub episode_id: Option<i64>,
    pub opening_crawl: Option<String>,
    pub director: Option<String>,
    pub producer: Option<String>,
    pub release_date: Option<String>,
    pub characters: Vec<Uuid>,
    pub starships: Vec<Uuid>,
}

/// A stored character, read back with its relationship edges.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterRecord {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub height: Option<i64>,
    pub mass: Option<i64>,
    pub hair_color: Option<String>,
    pub skin_color: Option<String>,
    pub eye_color: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<String>,
    pub films: Vec<Uuid>,
    pub starships: Vec<Uuid>,
}

/// A stored starship, read back with its relationship edges.
#[derive(Debug, Clone, Serialize)]
pub struct StarshipRecord {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub cost_in_credits: Option<i64>,
    pub length: Option<f64>,
    pub max_atmosphering_speed: Option<i64>,
    pub crew: Option<String>,
    pub passengers: Option<i64>,
    pub cargo_capacity: Option<i64>,
    pub consumables: Option<String>,
    pub hyperdrive_rating: Option<f64>,
    pub mglt: Option<i64>,
    pub starship_class: Option<String>,
    pub films: Vec<Uuid>,
    pub pilots: Vec<Uuid>,
}

/// One page of a filtered list query.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
    pub items: Vec<T>,
}
