//! The sync orchestrator: fetch, parse, resolve, replace.

use crate::error::Result;
use crate::fetch::{RawCollections, RemoteSource};
use crate::models::{ParsedCharacter, ParsedFilm, ParsedStarship, SyncSummary};
use crate::parse::parse_collection;
use crate::resolve::link_dataset;
use crate::store::Store;
use tracing::info;

/// Run one full sync cycle against the remote source.
///
/// The three collections are fetched concurrently; everything after the
/// fetch is sequential. On success the returned counts equal the number of
/// raw records fetched per kind. On any failure the stored dataset is left
/// exactly as it was before the call.
pub async fn synchronize(remote: &RemoteSource, store: &mut Store) -> Result<SyncSummary> {
    info!("starting sync cycle");
    let raw = remote.fetch_all().await?;
    info!(
        films = raw.films.len(),
        characters = raw.characters.len(),
        starships = raw.starships.len(),
        "fetch complete"
    );
    apply_snapshot(store, raw)
}

/// Parse, resolve, and transactionally install one fetched snapshot.
///
/// All kinds are parsed before any reference is resolved; forward references
/// between kinds are legal.
pub fn apply_snapshot(store: &mut Store, raw: RawCollections) -> Result<SyncSummary> {
    let films: Vec<ParsedFilm> = parse_collection(&raw.films)?;
    let characters: Vec<ParsedCharacter> = parse_collection(&raw.characters)?;
    let starships: Vec<ParsedStarship> = parse_collection(&raw.starships)?;
    info!(
        films = films.len(),
        characters = characters.len(),
        starships = starships.len(),
        "parse complete"
    );

    let dataset = link_dataset(films, characters, starships)?;
    info!(
        film_characters = dataset.film_characters.len(),
        film_starships = dataset.film_starships.len(),
        starship_pilots = dataset.starship_pilots.len(),
        "resolution complete"
    );

    store.replace_dataset(&dataset)?;
    let summary = dataset.summary();
    info!(
        films = summary.films,
        characters = summary.characters,
        starships = summary.starships,
        "dataset replaced"
    );
    Ok(summary)
}
