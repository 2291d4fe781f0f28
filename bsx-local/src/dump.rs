//! Harvesting basis sets from the Basis Set Exchange into a local store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use bsx_parse::element::element_by_symbol;
use bsx_parse::{Chunk, Format};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until},
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::separated_list0,
    sequence::{delimited, preceded},
    IResult,
};
use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::Url;

use crate::config::{
    CATALOG_URL, DEFAULT_WORKERS, DOWNLOAD_URL, HTTP_TIMEOUT_SECS, MAX_ATTEMPTS, RETRY_DELAY_MS,
};
use crate::error::{LocalError, Result};
use crate::store::{BasisStore, ChunkSource};

const USER_AGENT: &str = concat!("bsx/", env!("CARGO_PKG_VERSION"));

const CATALOG_MARKER: &str = "new basisSet(";

/// One published basis set from the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    /// Path of the basis set's XML file on the server.
    pub path: String,
    pub description: String,
    pub elements: Vec<String>,
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), map(opt(is_not("\"")), Option::unwrap_or_default), char('"')),
        delimited(char('\''), map(opt(is_not("'")), Option::unwrap_or_default), char('\'')),
    ))(input)
}

// unquoted values such as `true` are taken verbatim
fn argument(input: &str) -> IResult<&str, &str> {
    alt((quoted, map(is_not(",)"), str::trim)))(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        take_until(CATALOG_MARKER),
        preceded(
            tag(CATALOG_MARKER),
            separated_list0(
                delimited(multispace0, char(','), multispace0),
                preceded(multispace0, argument),
            ),
        ),
    )(input)
}

fn element_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim_matches(|c: char| c == '[' || c == ']' || c == '"' || c.is_whitespace()))
        .filter(|e| !e.is_empty())
        .filter(|e| element_by_symbol(e).is_ok())
        .map(str::to_string)
        .collect()
}

fn catalog_entry(line: &str, format: Format) -> Option<CatalogEntry> {
    let (_, args) = arguments(line).ok()?;
    if args.len() < 5 {
        tracing::debug!(line, "catalog line with too few fields");
        return None;
    }
    if args[4] != "published" {
        return None;
    }
    let path = args[0];
    if path.to_lowercase().contains("-ecp") && format != Format::NwChem {
        return None;
    }
    let description = args.last().copied().unwrap_or_default();
    Some(CatalogEntry {
        name: args[1].to_string(),
        path: path.to_string(),
        description: description.split_whitespace().collect::<Vec<_>>().join(" "),
        elements: element_list(args[3]),
    })
}

/// Every published basis set on a catalog page, sorted by name. A name
/// listed twice keeps its last entry.
pub fn parse_catalog(page: &str, format: Format) -> Vec<CatalogEntry> {
    let unique: BTreeMap<String, CatalogEntry> = page
        .lines()
        .filter(|l| l.contains(CATALOG_MARKER))
        .filter_map(|l| catalog_entry(l, format))
        .map(|e| (e.name.clone(), e))
        .collect();
    unique.into_values().collect()
}

/// Where catalog pages and basis set downloads come from.
pub trait Fetcher: Sync {
    fn fetch_catalog(&self) -> Result<String>;

    fn fetch_basis(&self, entry: &CatalogEntry, format: Format) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
    /// Ask the server for contracted functions.
    contracted: bool,
}

impl HttpFetcher {
    pub fn new(contracted: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, contracted })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_catalog(&self) -> Result<String> {
        tracing::info!("downloading basis set catalog");
        Ok(self.client.get(CATALOG_URL).send()?.error_for_status()?.text()?)
    }

    fn fetch_basis(&self, entry: &CatalogEntry, format: Format) -> Result<String> {
        let elements = entry.elements.join(" ");
        let minimize = if self.contracted { "True" } else { "False" };
        let url = Url::parse_with_params(
            DOWNLOAD_URL,
            &[
                ("bsurl", entry.path.as_str()),
                ("bsname", entry.name.as_str()),
                ("elts", elements.as_str()),
                ("format", format.program_name()),
                ("minimize", minimize),
            ],
        )
        .map_err(|e| LocalError::InvalidUrl(e.to_string()))?;
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}

/// Reads pages saved earlier: `catalog.html` plus one page per basis set.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `6-31+G*` is saved as `6-31pGs.html`.
    pub fn file_name(basis_name: &str) -> String {
        let stem: String = basis_name
            .chars()
            .map(|c| match c {
                '+' => 'p',
                ' ' => '_',
                '*' => 's',
                '/' => '-',
                c => c,
            })
            .collect();
        format!("{stem}.html")
    }

    fn read(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.root.join(name))?)
    }
}

impl Fetcher for DirectoryFetcher {
    fn fetch_catalog(&self) -> Result<String> {
        self.read("catalog.html")
    }

    fn fetch_basis(&self, entry: &CatalogEntry, _format: Format) -> Result<String> {
        self.read(&Self::file_name(&entry.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestOptions {
    pub workers: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_attempts: MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

/// Fetch one basis set and cut it into chunks, retrying on any failure.
pub fn fetch_and_extract(
    fetcher: &dyn Fetcher,
    entry: &CatalogEntry,
    format: Format,
    options: &HarvestOptions,
) -> Result<Vec<Chunk>> {
    let elements: Vec<&str> = entry.elements.iter().map(String::as_str).collect();
    let mut last_error = None;

    for attempt in 0..options.max_attempts {
        if attempt > 0 {
            thread::sleep(options.retry_delay);
        }
        let result = fetcher
            .fetch_basis(entry, format)
            .and_then(|page| Ok(format.extract(&page, &entry.name, &elements)?));
        match result {
            Ok(extraction) => return Ok(extraction.chunks),
            Err(e) => {
                tracing::warn!(
                    basis = %entry.name,
                    error = %e,
                    attempt = attempt + 1,
                    max_retries = options.max_attempts,
                    "fetch failed, will retry"
                );
                last_error = Some(e.to_string());
            }
        }
    }

    Err(LocalError::RetriesExhausted {
        name: entry.name.clone(),
        attempts: options.max_attempts,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub stored: Vec<String>,
    pub failed: Vec<String>,
    /// Names already present in the store.
    pub skipped: Vec<String>,
}

/// Fetch every catalog entry on a pool of `options.workers` threads and
/// insert the results into `store`, in catalog order.
pub fn harvest(
    fetcher: &dyn Fetcher,
    catalog: &[CatalogEntry],
    store: &mut BasisStore,
    options: &HarvestOptions,
) -> Result<HarvestReport> {
    let format = store.format();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()?;
    let fetched: Vec<Result<Vec<Chunk>>> = pool.install(|| {
        catalog
            .par_iter()
            .map(|entry| fetch_and_extract(fetcher, entry, format, options))
            .collect()
    });

    let mut report = HarvestReport::default();
    let total = catalog.len();
    for (i, (entry, result)) in catalog.iter().zip(fetched).enumerate() {
        match result.and_then(|chunks| store.insert(&entry.name, &entry.description, chunks)) {
            Ok(_) => {
                tracing::info!(index = i + 1, total, basis = %entry.name, "stored");
                report.stored.push(entry.name.clone());
            }
            Err(LocalError::DuplicateBasis(name)) => {
                tracing::warn!(basis = %name, "already stored, skipping");
                report.skipped.push(name);
            }
            Err(e) => {
                tracing::warn!(basis = %entry.name, error = %e, "basis set not stored");
                report.failed.push(entry.name.clone());
            }
        }
    }
    Ok(report)
}

/// Build a fresh store at `path` from everything the catalog lists.
pub fn create_db(
    fetcher: &dyn Fetcher,
    path: &Path,
    format: Format,
    options: &HarvestOptions,
) -> Result<HarvestReport> {
    let catalog = parse_catalog(&fetcher.fetch_catalog()?, format);
    tracing::info!(count = catalog.len(), "basis sets will be downloaded");
    let mut store = BasisStore::new(format);
    let report = harvest(fetcher, &catalog, &mut store, options)?;
    store.save(path)?;
    Ok(report)
}
