//! Persistent basis set store.
//!
//! Two tables, as the data was first laid out in SQL: `basis_tab` holds one
//! row per basis set, `data_tab` one row per (basis set, element) chunk.
//! The whole store is a single pretty-printed JSON file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use bsx_parse::{Chunk, Format};
use serde::{Deserialize, Serialize};

use crate::error::{LocalError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisRow {
    pub basis_id: u64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub basis_id: u64,
    pub elt: String,
    pub data: Chunk,
}

/// Anything that can hand out the raw chunks of a basis set.
pub trait ChunkSource {
    /// Format the chunks are written in.
    fn format(&self) -> Format;

    /// Chunks of `basis_name` (any case), restricted to `elements` unless
    /// that is empty.
    fn chunks(&self, basis_name: &str, elements: &[&str]) -> Result<Vec<Chunk>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisStore {
    format: Format,
    basis_tab: Vec<BasisRow>,
    data_tab: Vec<DataRow>,
}

impl BasisStore {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            basis_tab: Vec::new(),
            data_tab: Vec::new(),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let store: BasisStore = serde_json::from_str(&text)?;
        store.check().map_err(|reason| LocalError::InvalidStore {
            path: path.display().to_string(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), basis = store.basis_tab.len(), "opened store");
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn check(&self) -> std::result::Result<(), String> {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for row in &self.basis_tab {
            if !names.insert(row.name.as_str()) {
                return Err(format!("basis set '{}' appears twice", row.name));
            }
            if !ids.insert(row.basis_id) {
                return Err(format!("basis_id {} appears twice", row.basis_id));
            }
        }
        match self.data_tab.iter().find(|d| !ids.contains(&d.basis_id)) {
            Some(orphan) => Err(format!(
                "data for {} points at missing basis_id {}",
                orphan.elt, orphan.basis_id
            )),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.basis_tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basis_tab.is_empty()
    }

    /// Add a basis set and its chunks, returning the new `basis_id`.
    pub fn insert(&mut self, name: &str, description: &str, chunks: Vec<Chunk>) -> Result<u64> {
        if self.basis_tab.iter().any(|b| b.name == name) {
            return Err(LocalError::DuplicateBasis(name.to_string()));
        }
        let basis_id = self.basis_tab.iter().map(|b| b.basis_id).max().unwrap_or(0) + 1;
        self.basis_tab.push(BasisRow {
            basis_id,
            name: name.to_string(),
            description: description.to_string(),
        });
        self.data_tab.extend(chunks.into_iter().map(|data| DataRow {
            basis_id,
            elt: data.symbol.clone(),
            data,
        }));
        Ok(basis_id)
    }

    fn find(&self, basis_name: &str) -> Option<&BasisRow> {
        self.basis_tab
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(basis_name.trim()))
    }

    fn rows_of(&self, basis_id: u64) -> impl Iterator<Item = &DataRow> {
        self.data_tab.iter().filter(move |d| d.basis_id == basis_id)
    }

    /// `(name, description)` of every basis set holding all of `elements`,
    /// sorted by name.
    pub fn list_basis_available(&self, elements: &[&str]) -> Vec<(&str, &str)> {
        let mut found: Vec<(&str, &str)> = self
            .basis_tab
            .iter()
            .filter(|b| {
                elements.iter().all(|e| {
                    self.rows_of(b.basis_id)
                        .any(|d| d.elt.eq_ignore_ascii_case(e.trim()))
                })
            })
            .map(|b| (b.name.as_str(), b.description.as_str()))
            .collect();
        found.sort();
        found
    }

    pub fn list_element_available(&self, basis_name: &str) -> Result<Vec<&str>> {
        let basis = self
            .find(basis_name)
            .ok_or_else(|| LocalError::BasisNotFound(basis_name.to_string()))?;
        Ok(self.rows_of(basis.basis_id).map(|d| d.elt.as_str()).collect())
    }
}

impl ChunkSource for BasisStore {
    fn format(&self) -> Format {
        self.format
    }

    fn chunks(&self, basis_name: &str, elements: &[&str]) -> Result<Vec<Chunk>> {
        let basis = self
            .find(basis_name)
            .ok_or_else(|| LocalError::BasisNotFound(basis_name.to_string()))?;
        Ok(self
            .rows_of(basis.basis_id)
            .filter(|d| elements.is_empty() || elements.iter().any(|e| d.elt.eq_ignore_ascii_case(e.trim())))
            .map(|d| d.data.clone())
            .collect())
    }
}
