//! JSON catalogue import
//!
//! Walks a directory tree for `cells.json` (an array of cell records) and
//! `components.json` (an object of component arrays). Each record is
//! checked on its own: malformed or invalid records are counted and
//! skipped, the rest are stored.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::catalogue::{
    Catalogue, ComponentPools, validate_bms, validate_cable, validate_cell, validate_fuse,
    validate_relay, validate_shunt,
};
use crate::db;
use crate::error::CatalogueError;

pub const CELLS_FILE: &str = "cells.json";
pub const COMPONENTS_FILE: &str = "components.json";

/// Import counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub files: usize,
    pub cells: usize,
    pub components: usize,
    /// Records that failed to parse or validate
    pub errors: usize,
    /// Catalogue files that could not be read as JSON at all
    pub failed_files: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} cells and {} components from {} files. Errors: {}, Unreadable files: {}",
            self.cells, self.components, self.files, self.errors, self.failed_files
        )
    }
}

/// Raw `components.json` layout, records left unparsed
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawComponents {
    fuses: Vec<Value>,
    relays: Vec<Value>,
    cables: Vec<Value>,
    bms: Vec<Value>,
    shunts: Vec<Value>,
}

/// Find every catalogue file under `dir`, in a stable order
pub fn find_catalogue_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name();
            name == CELLS_FILE || name == COMPONENTS_FILE
        })
        .map(|e| e.into_path())
        .collect()
}

/// Parse and validate each record, keeping the good ones
fn accept<T: DeserializeOwned>(
    values: Vec<Value>,
    validate: fn(&T) -> Result<(), CatalogueError>,
    source: &Path,
    errors: &mut usize,
) -> Vec<T> {
    let mut accepted = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        let record = match serde_json::from_value::<T>(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(file = %source.display(), index, error = %e, "malformed record");
                *errors += 1;
                continue;
            }
        };
        match validate(&record) {
            Ok(()) => accepted.push(record),
            Err(e) => {
                warn!(file = %source.display(), index, error = %e, "invalid record");
                *errors += 1;
            }
        }
    }
    accepted
}

/// Read every catalogue file under `dir` into one catalogue
pub fn read_catalogue_dir(dir: &Path) -> Result<(Catalogue, ImportStats)> {
    let mut stats = ImportStats::default();
    let mut catalogue = Catalogue::default();

    for path in find_catalogue_files(dir) {
        stats.files += 1;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if path.file_name().is_some_and(|n| n == CELLS_FILE) {
            let values: Vec<Value> = match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "expected an array of cells");
                    stats.failed_files += 1;
                    continue;
                }
            };
            let cells = accept(values, validate_cell, &path, &mut stats.errors);
            stats.cells += cells.len();
            catalogue.cells.extend(cells);
        } else {
            let raw: RawComponents = match serde_json::from_str(&content) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        error = %e,
                        "expected an object of component lists"
                    );
                    stats.failed_files += 1;
                    continue;
                }
            };
            let errors = &mut stats.errors;
            let parsed = ComponentPools {
                fuses: accept(raw.fuses, validate_fuse, &path, errors),
                relays: accept(raw.relays, validate_relay, &path, errors),
                cables: accept(raw.cables, validate_cable, &path, errors),
                bms: accept(raw.bms, validate_bms, &path, errors),
                shunts: accept(raw.shunts, validate_shunt, &path, errors),
            };
            stats.components += parsed.len();

            let pools = &mut catalogue.components;
            pools.fuses.extend(parsed.fuses);
            pools.relays.extend(parsed.relays);
            pools.cables.extend(parsed.cables);
            pools.bms.extend(parsed.bms);
            pools.shunts.extend(parsed.shunts);
        }
    }

    Ok((catalogue, stats))
}

/// Import every catalogue file under `dir` into the database
pub fn import_to_database(conn: &mut Connection, dir: &Path) -> Result<ImportStats> {
    info!(dir = %dir.display(), "scanning for catalogue files");
    let (catalogue, stats) = read_catalogue_dir(dir)?;
    db::store_catalogue(conn, &catalogue)?;
    info!(
        cells = stats.cells,
        components = stats.components,
        errors = stats.errors,
        "import finished"
    );
    Ok(stats)
}
