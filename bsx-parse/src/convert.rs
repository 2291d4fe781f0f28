//! Batch conversion of one basis set's chunks from a source format to a
//! target format. A bad chunk costs only itself: its error is collected and
//! the rest of the batch carries on.

use rayon::prelude::*;

use crate::classify::ParseHint;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::entry::{BasisSetEntry, CoordinateConvention};
use crate::error::BasisError;
use crate::extract::{Chunk, Section};
use crate::format::Format;
use crate::serialize::wrap_nwchem;
use crate::validate::AngularMomentumReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub target: Format,
    /// Forces the coordinate convention of every parsed entry.
    pub convention: Option<CoordinateConvention>,
    /// Use the older, lower GAMESS-US angular momentum limit.
    pub legacy_ceiling: bool,
}

impl ConvertOptions {
    pub fn new(target: Format) -> Self {
        Self {
            target,
            convention: None,
            legacy_ceiling: false,
        }
    }

    pub fn with_convention(mut self, convention: Option<CoordinateConvention>) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_legacy_ceiling(mut self, legacy: bool) -> Self {
        self.legacy_ceiling = legacy;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    pub symbol: String,
    pub error: BasisError,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub entries: Vec<BasisSetEntry>,
    /// The rendered document in the target format.
    pub text: String,
    pub report: AngularMomentumReport,
    pub diagnostics: Diagnostics,
    pub failures: Vec<ChunkFailure>,
}

fn parse_chunk(
    chunk: &Chunk,
    source: Format,
    convention: Option<CoordinateConvention>,
) -> Result<Option<(BasisSetEntry, Diagnostics)>, BasisError> {
    match chunk.ao_basis() {
        // ECP or fitting data only
        None => Ok(None),
        Some(text) => source
            .parse(text, &ParseHint::for_chunk(chunk).with_override(convention))
            .map(Some),
    }
}

fn passthrough(chunks: &[&Chunk], source: Format, convention: CoordinateConvention) -> String {
    match source {
        Format::NwChem => wrap_nwchem(
            chunks
                .iter()
                .flat_map(|c| c.sections.iter().map(|(s, text)| (*s, text.as_str()))),
            convention,
        ),
        _ => {
            let blocks: Vec<&str> = chunks.iter().filter_map(|c| c.ao_basis()).collect();
            source.wrap(&blocks, convention)
        }
    }
}

/// Parse `chunks` (in parallel), validate the entries against the target
/// and render them. Converting a format to itself passes the surviving
/// chunks through untouched, ECP and fitting sections included.
pub fn convert(basis_name: &str, chunks: &[Chunk], source: Format, options: &ConvertOptions) -> Conversion {
    let parsed: Vec<_> = chunks
        .par_iter()
        .map(|chunk| parse_chunk(chunk, source, options.convention))
        .collect();

    let mut entries = Vec::new();
    let mut kept: Vec<&Chunk> = Vec::new();
    let mut diagnostics = Diagnostics::new();
    let mut failures = Vec::new();

    for (chunk, result) in chunks.iter().zip(parsed) {
        match result {
            Ok(Some((entry, found))) => {
                diagnostics.extend(found);
                entries.push(entry);
                kept.push(chunk);
            }
            Ok(None) => kept.push(chunk),
            Err(error) => {
                tracing::warn!(basis = basis_name, symbol = %chunk.symbol, %error, "chunk skipped");
                failures.push(ChunkFailure {
                    symbol: chunk.symbol.clone(),
                    error,
                });
            }
        }
    }

    let report = options.target.validate(&entries, options.legacy_ceiling);
    if report.too_large {
        if let Some(ceiling) = report.ceiling {
            diagnostics.push(Diagnostic::AngularMomentumExceeded {
                max: report.max,
                ceiling,
                format: options.target.program_name().to_string(),
            });
        }
    }

    let text = if source == options.target {
        let convention = options
            .convention
            .or_else(|| kept.iter().find_map(|c| c.convention))
            .unwrap_or_default();
        passthrough(&kept, source, convention)
    } else {
        for chunk in kept.iter().filter(|c| c.ecp().is_some()) {
            diagnostics.push(Diagnostic::EcpDropped {
                symbol: chunk.symbol.clone(),
                format: options.target.program_name().to_string(),
            });
        }
        for chunk in &kept {
            for &section in chunk.sections.keys() {
                if matches!(section, Section::CdBasis | Section::XcBasis) {
                    diagnostics.push(Diagnostic::FittingDropped {
                        symbol: chunk.symbol.clone(),
                        section,
                        format: options.target.program_name().to_string(),
                    });
                }
            }
        }
        options.target.render(&entries, basis_name)
    };

    tracing::debug!(
        basis = basis_name,
        entries = entries.len(),
        failures = failures.len(),
        "converted"
    );
    Conversion {
        entries,
        text,
        report,
        diagnostics,
        failures,
    }
}
