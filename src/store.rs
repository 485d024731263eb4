//! SQLite persistence: schema, the replace-dataset transaction, and the
//! read path (get-by-id, paginated filtered lists, counts).
//!
//! The store is the only shared mutable resource in the system. The replace
//! transaction is the sole writer; readers observe the prior dataset until
//! commit. Edge tables use composite natural keys, no surrogate ids.

use crate::config;
use crate::error::{Result, SyncError};
use crate::models::{
    CharacterRecord, Dataset, EntityKind, FilmRecord, Page, StarshipRecord,
};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS films (
    id            TEXT PRIMARY KEY,
    url           TEXT NOT NULL UNIQUE,
    title         TEXT NOT NULL,
    episode_id    INTEGER,
    opening_crawl TEXT,
    director      TEXT,
    producer      TEXT,
    release_date  TEXT
);
CREATE TABLE IF NOT EXISTS characters (
    id         TEXT PRIMARY KEY,
    url        TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    height     INTEGER,
    mass       INTEGER,
    hair_color TEXT,
    skin_color TEXT,
    eye_color  TEXT,
    gender     TEXT,
    birth_year TEXT
);
CREATE TABLE IF NOT EXISTS starships (
    id                     TEXT PRIMARY KEY,
    url                    TEXT NOT NULL UNIQUE,
    name                   TEXT NOT NULL,
    model                  TEXT,
    manufacturer           TEXT,
    cost_in_credits        INTEGER,
    length                 REAL,
    max_atmosphering_speed INTEGER,
    crew                   TEXT,
    passengers             INTEGER,
    cargo_capacity         INTEGER,
    consumables            TEXT,
    hyperdrive_rating      REAL,
    mglt                   INTEGER,
    starship_class         TEXT
);
CREATE TABLE IF NOT EXISTS film_characters (
    film_id      TEXT NOT NULL REFERENCES films(id),
    character_id TEXT NOT NULL REFERENCES characters(id),
    PRIMARY KEY (film_id, character_id)
);
CREATE TABLE IF NOT EXISTS film_starships (
    film_id     TEXT NOT NULL REFERENCES films(id),
    starship_id TEXT NOT NULL REFERENCES starships(id),
    PRIMARY KEY (film_id, starship_id)
);
CREATE TABLE IF NOT EXISTS starship_pilots (
    starship_id  TEXT NOT NULL REFERENCES starships(id),
    character_id TEXT NOT NULL REFERENCES characters(id),
    PRIMARY KEY (starship_id, character_id)
);
";

/// Edge tables come first: they reference the entity rows.
const CLEAR_ORDER: &[&str] = &[
    "film_characters",
    "film_starships",
    "starship_pilots",
    "films",
    "characters",
    "starships",
];

/// Per-table row counts, used by the sync summary and the atomicity tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub films: u64,
    pub characters: u64,
    pub starships: u64,
    pub film_characters: u64,
    pub film_starships: u64,
    pub starship_pilots: u64,
}

/// Handle to the local SQLite mirror.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Atomically replace the entire stored population.
    ///
    /// Deletes all edges and entities, inserts the new dataset, and commits
    /// in one transaction. On any failure the transaction rolls back and the
    /// prior dataset remains intact.
    pub fn replace_dataset(&mut self, dataset: &Dataset) -> Result<()> {
        let tx = self.conn.transaction()?;

        for table in CLEAR_ORDER {
            let removed = tx.execute(&format!("DELETE FROM {table}"), [])?;
            debug!(table, removed, "cleared table");
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO films
                 (id, url, title, episode_id, opening_crawl, director, producer, release_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (id, film) in &dataset.films {
                stmt.execute(params![
                    id.to_string(),
                    film.url,
                    film.title,
                    film.episode_id,
                    film.opening_crawl,
                    film.director,
                    film.producer,
                    film.release_date,
                ])?;
            }
        }
        {
            let mut stmt = tx.prepare(
                "INSERT INTO characters
                 (id, url, name, height, mass, hair_color, skin_color, eye_color, gender, birth_year)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for (id, character) in &dataset.characters {
                stmt.execute(params![
                    id.to_string(),
                    character.url,
                    character.name,
                    character.height,
                    character.mass,
                    character.hair_color,
                    character.skin_color,
                    character.eye_color,
                    character.gender,
                    character.birth_year,
                ])?;
            }
        }
        {
            let mut stmt = tx.prepare(
                "INSERT INTO starships
                 (id, url, name, model, manufacturer, cost_in_credits, length,
                  max_atmosphering_speed, crew, passengers, cargo_capacity, consumables,
                  hyperdrive_rating, mglt, starship_class)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;
            for (id, starship) in &dataset.starships {
                stmt.execute(params![
                    id.to_string(),
                    starship.url,
                    starship.name,
                    starship.model,
                    starship.manufacturer,
                    starship.cost_in_credits,
                    starship.length,
                    starship.max_atmosphering_speed,
                    starship.crew,
                    starship.passengers,
                    starship.cargo_capacity,
                    starship.consumables,
                    starship.hyperdrive_rating,
                    starship.mglt,
                    starship.starship_class,
                ])?;
            }
        }

        insert_edges(
            &tx,
            "INSERT INTO film_characters (film_id, character_id) VALUES (?1, ?2)",
            &dataset.film_characters,
        )?;
        insert_edges(
            &tx,
            "INSERT INTO film_starships (film_id, starship_id) VALUES (?1, ?2)",
            &dataset.film_starships,
        )?;
        insert_edges(
            &tx,
            "INSERT INTO starship_pilots (starship_id, character_id) VALUES (?1, ?2)",
            &dataset.starship_pilots,
        )?;

        tx.commit()?;
        Ok(())
    }

    pub fn get_film(&self, id: Uuid) -> Result<FilmRecord> {
        let mut film = self
            .conn
            .query_row(
                "SELECT id, url, title, episode_id, opening_crawl, director, producer,
                        release_date
                 FROM films WHERE id = ?1",
                [id.to_string()],
                film_scalar_row,
            )
            .map_err(|e| not_found(e, EntityKind::Film, id))?;
        film.characters = self.edge_targets(
            "SELECT character_id FROM film_characters WHERE film_id = ?1 ORDER BY rowid",
            id,
        )?;
        film.starships = self.edge_targets(
            "SELECT starship_id FROM film_starships WHERE film_id = ?1 ORDER BY rowid",
            id,
        )?;
        Ok(film)
    }

    pub fn get_character(&self, id: Uuid) -> Result<CharacterRecord> {
        let mut character = self
            .conn
            .query_row(
                "SELECT id, url, name, height, mass, hair_color, skin_color, eye_color,
                        gender, birth_year
                 FROM characters WHERE id = ?1",
                [id.to_string()],
                character_scalar_row,
            )
            .map_err(|e| not_found(e, EntityKind::Character, id))?;
        // Reverse views are derived from the same edge set the films and
        // starships declared.
        character.films = self.edge_targets(
            "SELECT film_id FROM film_characters WHERE character_id = ?1 ORDER BY rowid",
            id,
        )?;
        character.starships = self.edge_targets(
            "SELECT starship_id FROM starship_pilots WHERE character_id = ?1 ORDER BY rowid",
            id,
        )?;
        Ok(character)
    }

    pub fn get_starship(&self, id: Uuid) -> Result<StarshipRecord> {
        let mut starship = self
            .conn
            .query_row(
                "SELECT id, url, name, model, manufacturer, cost_in_credits, length,
                        max_atmosphering_speed, crew, passengers, cargo_capacity,
                        consumables, hyperdrive_rating, mglt, starship_class
                 FROM starships WHERE id = ?1",
                [id.to_string()],
                starship_scalar_row,
            )
            .map_err(|e| not_found(e, EntityKind::Starship, id))?;
        starship.films = self.edge_targets(
            "SELECT film_id FROM film_starships WHERE starship_id = ?1 ORDER BY rowid",
            id,
        )?;
        starship.pilots = self.edge_targets(
            "SELECT character_id FROM starship_pilots WHERE starship_id = ?1 ORDER BY rowid",
            id,
        )?;
        Ok(starship)
    }

    /// Paginated film listing, filtered by case-insensitive substring on title.
    pub fn list_films(
        &self,
        search: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Page<FilmRecord>> {
        let limit = limit.min(config::MAX_PAGE_SIZE);
        let total = self.count_filtered("films", "title", search)?;
        let mut items = self.list_scalars(
            "SELECT id, url, title, episode_id, opening_crawl, director, producer,
                    release_date
             FROM films",
            "title",
            search,
            offset,
            limit,
            film_scalar_row,
        )?;
        for film in &mut items {
            film.characters = self.edge_targets(
                "SELECT character_id FROM film_characters WHERE film_id = ?1 ORDER BY rowid",
                film.id,
            )?;
            film.starships = self.edge_targets(
                "SELECT starship_id FROM film_starships WHERE film_id = ?1 ORDER BY rowid",
                film.id,
            )?;
        }
        Ok(Page {
            total,
            offset,
            limit,
            items,
        })
    }

    /// Paginated character listing, filtered by case-insensitive substring on name.
    pub fn list_characters(
        &self,
        search: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Page<CharacterRecord>> {
        let limit = limit.min(config::MAX_PAGE_SIZE);
        let total = self.count_filtered("characters", "name", search)?;
        let mut items = self.list_scalars(
            "SELECT id, url, name, height, mass, hair_color, skin_color, eye_color,
                    gender, birth_year
             FROM characters",
            "name",
            search,
            offset,
            limit,
            character_scalar_row,
        )?;
        for character in &mut items {
            character.films = self.edge_targets(
                "SELECT film_id FROM film_characters WHERE character_id = ?1 ORDER BY rowid",
                character.id,
            )?;
            character.starships = self.edge_targets(
                "SELECT starship_id FROM starship_pilots WHERE character_id = ?1 ORDER BY rowid",
                character.id,
            )?;
        }
        Ok(Page {
            total,
            offset,
            limit,
            items,
        })
    }

    /// Paginated starship listing, filtered by case-insensitive substring on name.
    pub fn list_starships(
        &self,
        search: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Page<StarshipRecord>> {
        let limit = limit.min(config::MAX_PAGE_SIZE);
        let total = self.count_filtered("starships", "name", search)?;
        let mut items = self.list_scalars(
            "SELECT id, url, name, model, manufacturer, cost_in_credits, length,
                    max_atmosphering_speed, crew, passengers, cargo_capacity,
                    consumables, hyperdrive_rating, mglt, starship_class
             FROM starships",
            "name",
            search,
            offset,
            limit,
            starship_scalar_row,
        )?;
        for starship in &mut items {
            starship.films = self.edge_targets(
                "SELECT film_id FROM film_starships WHERE starship_id = ?1 ORDER BY rowid",
                starship.id,
            )?;
            starship.pilots = self.edge_targets(
                "SELECT character_id FROM starship_pilots WHERE starship_id = ?1 ORDER BY rowid",
                starship.id,
            )?;
        }
        Ok(Page {
            total,
            offset,
            limit,
            items,
        })
    }

    /// Row counts for every entity and edge table.
    pub fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            films: self.count_filtered("films", "title", None)?,
            characters: self.count_filtered("characters", "name", None)?,
            starships: self.count_filtered("starships", "name", None)?,
            film_characters: self.count_table("film_characters")?,
            film_starships: self.count_table("film_starships")?,
            starship_pilots: self.count_table("starship_pilots")?,
        })
    }

    fn list_scalars<T>(
        &self,
        select: &str,
        filter_field: &str,
        search: Option<&str>,
        offset: u32,
        limit: u32,
        map_row: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        match search {
            Some(needle) => {
                let sql = format!(
                    "{select} WHERE {filter_field} LIKE ?1 ORDER BY rowid LIMIT ?2 OFFSET ?3"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![like_pattern(needle), limit, offset], map_row)?;
                for row in rows {
                    items.push(row?);
                }
            }
            None => {
                let sql = format!("{select} ORDER BY rowid LIMIT ?1 OFFSET ?2");
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![limit, offset], map_row)?;
                for row in rows {
                    items.push(row?);
                }
            }
        }
        Ok(items)
    }

    fn count_filtered(&self, table: &str, field: &str, search: Option<&str>) -> Result<u64> {
        let count: i64 = match search {
            Some(needle) => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE {field} LIKE ?1"),
                [like_pattern(needle)],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?,
        };
        Ok(count as u64)
    }

    fn count_table(&self, table: &str) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    fn edge_targets(&self, sql: &str, id: Uuid) -> Result<Vec<Uuid>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([id.to_string()], |row| uuid_column(row, 0))?;
        let mut targets = Vec::new();
        for row in rows {
            targets.push(row?);
        }
        Ok(targets)
    }
}

fn insert_edges(
    tx: &rusqlite::Transaction<'_>,
    sql: &str,
    edges: &[(Uuid, Uuid)],
) -> Result<()> {
    let mut stmt = tx.prepare(sql)?;
    for (from, to) in edges {
        stmt.execute(params![from.to_string(), to.to_string()])?;
    }
    Ok(())
}

// SQLite LIKE is case-insensitive for ASCII, which matches the query contract.
fn like_pattern(needle: &str) -> String {
    format!("%{needle}%")
}

fn not_found(err: rusqlite::Error, kind: EntityKind, id: Uuid) -> SyncError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => SyncError::NotFound { kind, id },
        other => SyncError::Store(other),
    }
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn film_scalar_row(row: &Row<'_>) -> rusqlite::Result<FilmRecord> {
    Ok(FilmRecord {
        id: uuid_column(row, 0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        episode_id: row.get(3)?,
        opening_crawl: row.get(4)?,
        director: row.get(5)?,
        producer: row.get(6)?,
        release_date: row.get(7)?,
        characters: Vec::new(),
        starships: Vec::new(),
    })
}

fn character_scalar_row(row: &Row<'_>) -> rusqlite::Result<CharacterRecord> {
    Ok(CharacterRecord {
        id: uuid_column(row, 0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        height: row.get(3)?,
        mass: row.get(4)?,
        hair_color: row.get(5)?,
        skin_color: row.get(6)?,
        eye_color: row.get(7)?,
        gender: row.get(8)?,
        birth_year: row.get(9)?,
        films: Vec::new(),
        starships: Vec::new(),
    })
}

fn starship_scalar_row(row: &Row<'_>) -> rusqlite::Result<StarshipRecord> {
    Ok(StarshipRecord {
        id: uuid_column(row, 0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        model: row.get(3)?,
        manufacturer: row.get(4)?,
        cost_in_credits: row.get(5)?,
        length: row.get(6)?,
        max_atmosphering_speed: row.get(7)?,
        crew: row.get(8)?,
        passengers: row.get(9)?,
        cargo_capacity: row.get(10)?,
        consumables: row.get(11)?,
        hyperdrive_rating: row.get(12)?,
        mglt: row.get(13)?,
        starship_class: row.get(14)?,
        films: Vec::new(),
        pilots: Vec::new(),
    })
}
