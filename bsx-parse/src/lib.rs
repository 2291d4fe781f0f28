pub mod classify;
pub mod convert;
pub mod diagnostics;
pub mod element;
pub mod entry;
pub mod error;
pub mod extract;
pub mod format;
pub mod parse_gamess_us;
pub mod parse_gaussian94;
pub mod parse_nwchem;
pub mod reformat;
pub mod serialize;
pub mod shell;
pub mod validate;

pub use classify::ParseHint;
pub use convert::{convert, ChunkFailure, ConvertOptions, Conversion};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use entry::{BasisSetEntry, CoordinateConvention, FunctionsPerShell, Primitive, ShellBlock};
pub use error::{BasisError, Result};
pub use extract::{Chunk, Extraction, Section};
pub use format::Format;
pub use shell::ShellKind;
pub use validate::AngularMomentumReport;

use phf::{phf_map, Map};

/// Every format tag the Basis Set Exchange can emit, with its program name.
/// Only the tags `Format` covers have a parser.
pub static FORMAT_MAP: Map<&'static str, &'static str> = phf_map! {
    "g94" => "Gaussian94",
    "gamess-us" => "GAMESS-US",
    "gamess-uk" => "GAMESS-UK",
    "turbomole" => "Turbomole",
    "tx93" => "TX93",
    "molpro" => "Molpro",
    "molproint" => "MolproInt",
    "hondo" => "Hondo",
    "supermolecule" => "SuperMolecule",
    "molcas" => "Molcas",
    "hyperchem" => "HyperChem",
    "dalton" => "Dalton",
    "demon-ks" => "deMon-KS",
    "demon2k" => "deMon2k",
    "aces2" => "AcesII",
    "nwchem" => "NWChem",
};
