//! Basis set lookup over any chunk source.

use std::path::Path;

use bsx_parse::{convert, ConvertOptions, Conversion};

use crate::config::spherical_or_cartesian;
use crate::error::Result;
use crate::store::{BasisStore, ChunkSource};

pub struct Library<S> {
    source: S,
}

impl<S: ChunkSource> Library<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Convert the stored chunks of `basis_name` to `options.target`.
    ///
    /// Without an explicit convention the basis set's customary one is
    /// forced on every entry.
    pub fn get_basis(&self, basis_name: &str, elements: &[&str], options: &ConvertOptions) -> Result<Conversion> {
        let chunks = self.source.chunks(basis_name, elements)?;
        let convention = options
            .convention
            .unwrap_or_else(|| spherical_or_cartesian(basis_name));
        let options = options.with_convention(Some(convention));
        tracing::debug!(basis = basis_name, chunks = chunks.len(), %convention, "converting");
        Ok(convert(basis_name, &chunks, self.source.format(), &options))
    }
}

impl Library<BasisStore> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(BasisStore::open(path)?))
    }

    pub fn list_basis_available(&self, elements: &[&str]) -> Vec<(&str, &str)> {
        self.source.list_basis_available(elements)
    }

    pub fn list_element_available(&self, basis_name: &str) -> Result<Vec<&str>> {
        self.source.list_element_available(basis_name)
    }
}
