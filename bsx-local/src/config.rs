//! Constants and defaults for the local library.

use std::path::PathBuf;

use bsx_parse::{CoordinateConvention, Format};
use phf::{phf_set, Set};

/// Page listing every basis set the Basis Set Exchange offers.
pub const CATALOG_URL: &str =
    "https://bse.pnl.gov/bse/portal/user/anon/js_peid/11535052407933/panel/Main/template/content";

/// Download endpoint; basis set, elements and format go in the query.
pub const DOWNLOAD_URL: &str = "https://bse.pnl.gov:443/bse/portal/user/anon/js_peid/11535052407933/action/portlets.BasisSetAction/template/courier_content/panel/Main//eventSubmit_doDownload/true";

pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Attempts per basis set before the harvest gives up on it.
pub const MAX_ATTEMPTS: u32 = 20;

/// Fixed pause between attempts.
pub const RETRY_DELAY_MS: u64 = 100;

pub const DEFAULT_WORKERS: usize = 1;

/// Overrides the directory holding the per-format stores.
pub const DB_ROOT_ENV: &str = "BSX_DB_ROOT";

const DEFAULT_DB_ROOT: &str = "db";

const BASIS_EXCEPTIONS: [char; 3] = ['*', '+', '-'];

// Pople sets defined for cartesian d shells, by normalized name
static CARTESIAN_BASES: Set<&'static str> = phf_set! {
    "3-21g",
    "4-31g",
    "6-31g",
    "6-31g*",
    "6-31g**",
};

/// Lower-case, with everything but alphanumerics and `* + -` removed.
pub fn normalize_basis_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || BASIS_EXCEPTIONS.contains(c))
        .collect()
}

/// The convention a basis set was designed for, when the data does not say.
pub fn spherical_or_cartesian(basis_name: &str) -> CoordinateConvention {
    if CARTESIAN_BASES.contains(normalize_basis_name(basis_name).as_str()) {
        CoordinateConvention::Cartesian
    } else {
        CoordinateConvention::Spherical
    }
}

pub fn db_root() -> PathBuf {
    std::env::var_os(DB_ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_ROOT))
}

/// Where the store for `format` lives by default, e.g. `db/gamess-us.json`.
pub fn default_db_path(format: Format) -> PathBuf {
    db_root().join(format!("{}.json", format.tag()))
}
