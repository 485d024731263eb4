//! Two-phase relationship resolution.
//!
//! Phase one assigns a local id to every parsed entity and builds one
//! origin-URL index per kind. Phase two walks every foreign reference and
//! materializes relationship edges through the indexes. Resolution only
//! starts once all kinds are fully parsed, so forward references between
//! kinds resolve regardless of fetch completion order.

use crate::error::{Result, SyncError};
use crate::models::{Dataset, EntityKind, ParsedCharacter, ParsedFilm, ParsedStarship};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Index from remote origin URL to assigned local id for one entity kind.
struct ResolutionIndex {
    kind: EntityKind,
    by_url: HashMap<String, Uuid>,
}

impl ResolutionIndex {
    fn build<'a>(kind: EntityKind, entries: impl Iterator<Item = (&'a str, Uuid)>) -> Result<Self> {
        let mut by_url = HashMap::new();
        for (url, id) in entries {
            if by_url.insert(url.to_string(), id).is_some() {
                return Err(SyncError::MalformedRecord {
                    kind,
                    reason: format!("duplicate origin URL `{url}`"),
                });
            }
        }
        Ok(Self { kind, by_url })
    }

    fn resolve(&self, url: &str) -> Result<Uuid> {
        self.by_url
            .get(url)
            .copied()
            .ok_or_else(|| SyncError::DanglingReference {
                kind: self.kind,
                url: url.to_string(),
            })
    }
}

/// Edge accumulator that drops duplicate pairs while keeping first-seen order.
#[derive(Default)]
struct EdgeSet {
    seen: HashSet<(Uuid, Uuid)>,
    edges: Vec<(Uuid, Uuid)>,
}

impl EdgeSet {
    fn insert(&mut self, from: Uuid, to: Uuid) {
        if self.seen.insert((from, to)) {
            self.edges.push((from, to));
        }
    }
}

/// Assign local ids to all parsed entities and materialize every
/// relationship edge, producing a dataset ready for the replace transaction.
pub fn link_dataset(
    films: Vec<ParsedFilm>,
    characters: Vec<ParsedCharacter>,
    starships: Vec<ParsedStarship>,
) -> Result<Dataset> {
    let films: Vec<(Uuid, ParsedFilm)> =
        films.into_iter().map(|f| (Uuid::new_v4(), f)).collect();
    let characters: Vec<(Uuid, ParsedCharacter)> =
        characters.into_iter().map(|c| (Uuid::new_v4(), c)).collect();
    let starships: Vec<(Uuid, ParsedStarship)> =
        starships.into_iter().map(|s| (Uuid::new_v4(), s)).collect();

    // Nothing references films, but their origin URLs must still be unique
    // for the cycle; build the index for the duplicate check alone.
    ResolutionIndex::build(
        EntityKind::Film,
        films.iter().map(|(id, f)| (f.url.as_str(), *id)),
    )?;
    let character_index = ResolutionIndex::build(
        EntityKind::Character,
        characters.iter().map(|(id, c)| (c.url.as_str(), *id)),
    )?;
    let starship_index = ResolutionIndex::build(
        EntityKind::Starship,
        starships.iter().map(|(id, s)| (s.url.as_str(), *id)),
    )?;

    let mut film_characters = EdgeSet::default();
    let mut film_starships = EdgeSet::default();
    let mut starship_pilots = EdgeSet::default();

    for (film_id, film) in &films {
        for url in &film.character_urls {
            film_characters.insert(*film_id, character_index.resolve(url)?);
        }
        for url in &film.starship_urls {
            film_starships.insert(*film_id, starship_index.resolve(url)?);
        }
    }
    for (starship_id, starship) in &starships {
        for url in &starship.pilot_urls {
            starship_pilots.insert(*starship_id, character_index.resolve(url)?);
        }
    }

    debug!(
        film_characters = film_characters.edges.len(),
        film_starships = film_starships.edges.len(),
        starship_pilots = starship_pilots.edges.len(),
        "relationship edges resolved"
    );

    Ok(Dataset {
        films,
        characters,
        starships,
        film_characters: film_characters.edges,
        film_starships: film_starships.edges,
        starship_pilots: starship_pilots.edges,
    })
}
