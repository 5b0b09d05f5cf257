//! Sense vector storage (SQLite) and the in-memory similarity model built from it

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::sense::{SenseKey, SimilarityService};

/// One row of the sense store
#[derive(Debug, Clone, PartialEq)]
pub struct SenseEntry {
    pub key: SenseKey,
    pub freq: i64,
    pub vector: Vec<f32>,
}

/// Initialize the sense store with its schema
pub fn init_store<P: AsRef<Path>>(db_path: P) -> Result<Connection> {
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS senses (
            key TEXT PRIMARY KEY,
            freq INTEGER NOT NULL DEFAULT 0,
            vector BLOB NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

/// Insert or replace a single sense
pub fn add_sense(conn: &Connection, key: &SenseKey, freq: i64, vector: &[f32]) -> Result<()> {
    let existing: Option<Vec<u8>> = conn
        .query_row("SELECT vector FROM senses LIMIT 1", [], |row| row.get(0))
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            e => Err(e),
        })?;

    if let Some(blob) = existing {
        let expected = blob.len() / 4;
        if expected != vector.len() {
            return Err(Error::InvalidDimension {
                expected,
                actual: vector.len(),
            });
        }
    }

    conn.execute(
        "INSERT OR REPLACE INTO senses (key, freq, vector) VALUES (?1, ?2, ?3)",
        params![key.to_string(), freq, encode_vector(vector)],
    )?;
    Ok(())
}

/// Load every sense into memory
pub fn load_senses(conn: &Connection) -> Result<SenseVectors> {
    let mut stmt = conn.prepare("SELECT key, freq, vector FROM senses ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Vec<u8>>(2)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (raw_key, freq, blob) = row?;
        entries.push(SenseEntry {
            key: SenseKey::parse(&raw_key)?,
            freq,
            vector: decode_vector(&blob)?,
        });
    }

    SenseVectors::new(entries)
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_vector(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::CorruptVector { bytes: blob.len() });
    }
    Ok(blob
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// In-memory sense vectors answering similarity queries by cosine similarity
#[derive(Debug, Clone, Default)]
pub struct SenseVectors {
    entries: Vec<SenseEntry>,
    index: HashMap<SenseKey, usize>,
    by_phrase: HashMap<String, Vec<usize>>,
}

impl SenseVectors {
    pub fn new(entries: Vec<SenseEntry>) -> Result<Self> {
        if let Some(first) = entries.first() {
            let expected = first.vector.len();
            if let Some(bad) = entries.iter().find(|e| e.vector.len() != expected) {
                return Err(Error::InvalidDimension {
                    expected,
                    actual: bad.vector.len(),
                });
            }
        }

        let mut index = HashMap::new();
        let mut by_phrase: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index.insert(entry.key.clone(), i);
            by_phrase.entry(entry.key.phrase.clone()).or_default().push(i);
        }

        Ok(Self {
            entries,
            index,
            by_phrase,
        })
    }

    /// Open a store file and load it
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let vectors = load_senses(&conn)?;
        tracing::info!(senses = vectors.len(), "sense vectors loaded");
        Ok(vectors)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SimilarityService for SenseVectors {
    fn best_sense(&self, normalized: &str) -> Result<Option<SenseKey>> {
        let best = self.by_phrase.get(normalized).and_then(|ids| {
            // max_by_key keeps the last maximum, iterate in reverse so ties go to the first loaded
            ids.iter()
                .rev()
                .max_by_key(|&&i| self.entries[i].freq)
                .map(|&i| self.entries[i].key.clone())
        });
        Ok(best)
    }

    fn most_similar(&self, key: &SenseKey, n: usize) -> Result<Vec<(SenseKey, f32)>> {
        let Some(&query_id) = self.index.get(key) else {
            return Ok(Vec::new());
        };
        let query = &self.entries[query_id].vector;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != query_id)
            .map(|(i, e)| (i, cosine(query, &e.vector)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(n);

        Ok(scored
            .into_iter()
            .map(|(i, score)| (self.entries[i].key.clone(), score))
            .collect())
    }
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "init_store")]
pub fn py_init_store(db_path: &str) -> PyResult<()> {
    init_store(db_path)
        .map(|_| ())
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "add_sense")]
pub fn py_add_sense(db_path: &str, key: &str, freq: i64, vector: Vec<f32>) -> PyResult<()> {
    let conn = Connection::open(db_path)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
    let key = SenseKey::parse(key)?;
    add_sense(&conn, &key, freq, &vector)?;
    Ok(())
}
