//! Integration tests for the holocron sync pipeline.
//!
//! These tests drive the full pipeline from raw JSON snapshots through
//! parsing, relationship resolution, and the replace-dataset transaction
//! into a real SQLite store, then verify the read path on the result.
//! Tests are organized into logical sections:
//!
//! - **Sync Tests** -- counts, edge materialization, idempotence
//! - **Failure Tests** -- dangling references, malformed records, an
//!   unreachable remote; each must leave the stored dataset untouched
//! - **Read Path Tests** -- get-by-id, pagination, filtering
//!
//! # Test Strategy
//!
//! Snapshots are built with `serde_json::json!` fixtures mirroring the
//! remote payload shape and fed through `apply_snapshot`, which is exactly
//! `synchronize` minus the network phase. The one test that exercises the
//! fetch phase points at an unroutable loopback port, so the suite needs no
//! network access. Stores are in-memory except where a test exercises an
//! on-disk database via TempDir.

use holocron::error::SyncError;
use holocron::fetch::{RawCollections, RemoteSource};
use holocron::models::EntityKind;
use holocron::parse::RawRecord;
use holocron::store::Store;
use holocron::sync::{apply_snapshot, synchronize};
use serde_json::{json, Value};
use tempfile::TempDir;

fn record(value: Value) -> RawRecord {
    value.as_object().unwrap().clone()
}

/// Snapshot from the reference scenario: one film referencing one character
/// and one starship, the starship piloted by that same character.
fn sample_snapshot() -> RawCollections {
    RawCollections {
        films: vec![record(json!({
            "url": "film1",
            "title": "A New Hope",
            "episode_id": 4,
            "opening_crawl": "It is a period of civil war.",
            "director": "George Lucas",
            "producer": "Gary Kurtz",
            "release_date": "1977-05-25",
            "characters": ["char1"],
            "starships": ["ship1"]
        }))],
        characters: vec![record(json!({
            "url": "char1",
            "name": "Luke Skywalker",
            "height": "172",
            "mass": "77",
            "hair_color": "blond",
            "birth_year": "19BBY",
            "gender": "male"
        }))],
        starships: vec![record(json!({
            "url": "ship1",
            "name": "X-wing",
            "model": "T-65 X-wing",
            "manufacturer": "Incom Corporation",
            "cost_in_credits": "149,999",
            "length": "12.5",
            "crew": "1",
            "starship_class": "Starfighter",
            "pilots": ["char1"]
        }))],
    }
}

// -------------------------
// Sync Tests
// -------------------------

#[test]
fn full_cycle_stores_entities_and_edges() {
    let dir = TempDir::new().unwrap();
    let mut store = Store::open(dir.path().join("mirror.db")).unwrap();

    let summary = apply_snapshot(&mut store, sample_snapshot()).unwrap();
    assert_eq!(summary.films, 1);
    assert_eq!(summary.characters, 1);
    assert_eq!(summary.starships, 1);

    let counts = store.counts().unwrap();
    assert_eq!(counts.film_characters, 1);
    assert_eq!(counts.film_starships, 1);
    assert_eq!(counts.starship_pilots, 1);
}

#[test]
fn references_from_film_and_starship_hit_the_same_character() {
    let mut store = Store::open_in_memory().unwrap();
    apply_snapshot(&mut store, sample_snapshot()).unwrap();

    let film = &store.list_films(None, 0, 10).unwrap().items[0];
    let starship = &store.list_starships(None, 0, 10).unwrap().items[0];

    assert_eq!(film.characters.len(), 1);
    assert_eq!(starship.pilots.len(), 1);
    // Identity, not just field equality: both edges resolve to one local id.
    assert_eq!(film.characters[0], starship.pilots[0]);

    let character = store.get_character(film.characters[0]).unwrap();
    assert_eq!(character.name, "Luke Skywalker");
    assert_eq!(character.height, Some(172));
    assert_eq!(character.films, vec![film.id]);
}

#[test]
fn starship_numerics_are_normalized() {
    let mut store = Store::open_in_memory().unwrap();
    apply_snapshot(&mut store, sample_snapshot()).unwrap();

    let starship = &store.list_starships(None, 0, 10).unwrap().items[0];
    assert_eq!(starship.cost_in_credits, Some(149_999));
    assert_eq!(starship.length, Some(12.5));
    assert_eq!(starship.passengers, None);
}

#[test]
fn repeated_sync_over_unchanged_snapshot_is_idempotent() {
    let mut store = Store::open_in_memory().unwrap();

    let first = apply_snapshot(&mut store, sample_snapshot()).unwrap();
    let counts_first = store.counts().unwrap();
    let second = apply_snapshot(&mut store, sample_snapshot()).unwrap();
    let counts_second = store.counts().unwrap();

    assert_eq!(first, second);
    assert_eq!(counts_first, counts_second);
}

#[test]
fn forward_references_resolve_regardless_of_collection_order() {
    // The film references a starship; films are parsed before starships, so
    // resolution must wait until every kind is parsed.
    let mut store = Store::open_in_memory().unwrap();
    let summary = apply_snapshot(&mut store, sample_snapshot()).unwrap();
    assert_eq!(summary.starships, 1);
    assert_eq!(store.counts().unwrap().film_starships, 1);
}

// -------------------------
// Failure Tests
// -------------------------

#[test]
fn dangling_reference_aborts_and_preserves_prior_dataset() {
    let mut store = Store::open_in_memory().unwrap();
    apply_snapshot(&mut store, sample_snapshot()).unwrap();
    let before = store.counts().unwrap();

    let mut snapshot = sample_snapshot();
    snapshot.films[0].insert("characters".into(), json!(["char1", "char-ghost"]));

    let err = apply_snapshot(&mut store, snapshot).unwrap_err();
    match err {
        SyncError::DanglingReference { kind, url } => {
            assert_eq!(kind, EntityKind::Character);
            assert_eq!(url, "char-ghost");
        }
        other => panic!("expected DanglingReference, got {other:?}"),
    }
    assert_eq!(store.counts().unwrap(), before);
}

#[test]
fn malformed_record_aborts_before_any_mutation() {
    let mut store = Store::open_in_memory().unwrap();

    let mut snapshot = sample_snapshot();
    snapshot.characters[0].remove("name");

    let err = apply_snapshot(&mut store, snapshot).unwrap_err();
    assert!(matches!(err, SyncError::MalformedRecord { .. }));

    let counts = store.counts().unwrap();
    assert_eq!(counts.films, 0);
    assert_eq!(counts.characters, 0);
    assert_eq!(counts.starships, 0);
}

#[tokio::test]
async fn unreachable_remote_leaves_store_untouched() {
    let mut store = Store::open_in_memory().unwrap();
    apply_snapshot(&mut store, sample_snapshot()).unwrap();
    let before = store.counts().unwrap();

    // Port 9 (discard) is not listening; every fetch is refused.
    let remote = RemoteSource::new("http://127.0.0.1:9").unwrap();
    let err = synchronize(&remote, &mut store).await.unwrap_err();
    assert!(matches!(err, SyncError::RemoteUnavailable { .. }));

    assert_eq!(store.counts().unwrap(), before);
}

// -------------------------
// Read Path Tests
// -------------------------

fn crew_snapshot() -> RawCollections {
    let characters = [
        ("char1", "Luke Skywalker"),
        ("char2", "Leia Organa"),
        ("char3", "Han Solo"),
        ("char4", "Anakin Skywalker"),
        ("char5", "Obi-Wan Kenobi"),
    ]
    .iter()
    .map(|(url, name)| record(json!({ "url": url, "name": name })))
    .collect();
    RawCollections {
        films: Vec::new(),
        characters,
        starships: Vec::new(),
    }
}

#[test]
fn list_filters_by_case_insensitive_substring() {
    let mut store = Store::open_in_memory().unwrap();
    apply_snapshot(&mut store, crew_snapshot()).unwrap();

    let page = store.list_characters(Some("skywalker"), 0, 10).unwrap();
    assert_eq!(page.total, 2);
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Luke Skywalker", "Anakin Skywalker"]);
}

#[test]
fn list_paginates_with_exact_total() {
    let mut store = Store::open_in_memory().unwrap();
    apply_snapshot(&mut store, crew_snapshot()).unwrap();

    let page = store.list_characters(None, 4, 2).unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Obi-Wan Kenobi");
}

#[test]
fn get_unknown_id_is_not_found() {
    let mut store = Store::open_in_memory().unwrap();
    apply_snapshot(&mut store, sample_snapshot()).unwrap();

    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        store.get_film(missing),
        Err(SyncError::NotFound {
            kind: EntityKind::Film,
            ..
        })
    ));
}
