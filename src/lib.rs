//! Holocron: a local mirror of the Star Wars reference API
//!
//! This crate synchronizes films, characters, and starships (with their
//! many-to-many relationships) from a remote read-only API into a local
//! SQLite database, then serves the local copy through paginated, filterable
//! queries.
//!
//! One sync cycle runs as a pipeline:
//!
//! 1. **Fetch** -- Retrieve all three collections concurrently; fail fast on
//!    the first network or protocol error
//! 2. **Parse** -- Map each raw JSON record into a typed representation,
//!    normalizing dirty field values and keeping foreign references as
//!    unresolved remote URLs
//! 3. **Resolve** -- Build a URL-to-local-id index per entity kind and
//!    materialize relationship edges from the parsed references
//! 4. **Replace** -- Delete the prior dataset and insert the new one inside
//!    a single transaction; the old data stays visible until commit
//!
//! All entities of all kinds are fully parsed before any reference is
//! resolved, so forward references between kinds resolve regardless of fetch
//! completion order. The engine never retries and never applies a partial
//! sync: on any failure the stored dataset is either fully old or fully new.
//!
//! # Key Modules
//!
//! - [`normalize`] -- Dirty-value normalization (absence markers, thousands
//!   separators)
//! - [`parse`] -- Per-kind record parsing via the [`parse::RemoteRecord`] trait
//! - [`fetch`] -- Concurrent collection fetches over HTTP
//! - [`resolve`] -- Two-phase relationship resolution
//! - [`store`] -- SQLite persistence, the replace-dataset transaction, and
//!   the read path (get-by-id, paginated filtered lists)
//! - [`sync`] -- The orchestrator tying the phases together
//! - [`models`] -- Entity kinds, parsed and stored record types
//! - [`error`] -- The sync error taxonomy
//! - [`config`] -- Constants for the remote source and pagination

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod resolve;
pub mod store;
pub mod sync;
