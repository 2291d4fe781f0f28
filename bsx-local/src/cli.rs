//! Command-line interface for the local basis set library.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bsx_parse::{ConvertOptions, CoordinateConvention, Format, FORMAT_MAP};
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;

use crate::config::default_db_path;
use crate::dump::{create_db, DirectoryFetcher, Fetcher, HarvestOptions, HttpFetcher};
use crate::error::{LocalError, Result};
use crate::library::Library;
use crate::store::{BasisStore, ChunkSource};

/// bsx - Query a local copy of the Basis Set Exchange.
#[derive(Parser)]
#[command(name = "bsx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct StoreArgs {
    /// Format of the store to read (nwchem, gamess-us, g94)
    #[arg(short, long, default_value = "gamess-us")]
    pub format: Format,

    /// Store file (default: $BSX_DB_ROOT/<format>.json)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

impl StoreArgs {
    fn path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(|| default_db_path(self.format))
    }

    fn open(&self) -> Result<Library<BasisStore>> {
        let path = self.path();
        let library = Library::open(&path)?;
        if library.source().format() != self.format {
            return Err(LocalError::InvalidStore {
                path: path.display().to_string(),
                reason: format!(
                    "holds {} data, not {}",
                    library.source().format().program_name(),
                    self.format.program_name()
                ),
            });
        }
        Ok(library)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the basis sets holding every given element.
    ListBasis {
        /// Element symbol; repeat for several
        #[arg(short, long = "atom")]
        atoms: Vec<String>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List the elements a basis set covers.
    ListAtoms {
        #[arg(short, long)]
        basis: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print a basis set, optionally converted to another format.
    GetBasisData {
        #[arg(short, long)]
        basis: String,

        /// Element symbol; repeat for several (default: all)
        #[arg(short, long = "atom")]
        atoms: Vec<String>,

        #[command(flatten)]
        store: StoreArgs,

        /// Output format (default: the store's format)
        #[arg(short, long)]
        target: Option<Format>,

        /// Force spherical or cartesian functions
        #[arg(long)]
        convention: Option<CoordinateConvention>,

        /// Check against the older GAMESS-US angular momentum limit
        #[arg(long)]
        legacy: bool,

        /// Write to a file instead of stdout
        #[arg(long)]
        save: bool,

        /// File for --save (default: <tmp>/<basis>_<atoms>.bs)
        #[arg(long, requires = "save")]
        path: Option<PathBuf>,
    },

    /// List every format the Basis Set Exchange knows.
    ListFormats,

    /// Download the whole catalog into a new store.
    CreateDb {
        #[command(flatten)]
        store: StoreArgs,

        /// Parallel downloads
        #[arg(short, long, default_value_t = crate::config::DEFAULT_WORKERS)]
        workers: usize,

        /// Ask for uncontracted functions
        #[arg(long)]
        no_contraction: bool,

        /// Read saved pages from a directory instead of the network
        #[arg(long)]
        from_dir: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    execute(cli.command, &mut stdout)
}

/// Execute one command, writing its output to `out`.
pub fn execute(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::ListBasis { atoms, store } => {
            let library = store.open()?;
            let atoms: Vec<&str> = atoms.iter().map(String::as_str).collect();
            for (i, (name, description)) in library.list_basis_available(&atoms).into_iter().enumerate() {
                writeln!(out, "{} - '{}' || {:<50}", i + 1, name, description)?;
            }
        }
        Commands::ListAtoms { basis, store } => {
            let library = store.open()?;
            writeln!(out, "{}", library.list_element_available(&basis)?.join(", "))?;
        }
        Commands::GetBasisData {
            basis,
            atoms,
            store,
            target,
            convention,
            legacy,
            save,
            path,
        } => {
            let library = store.open()?;
            let options = ConvertOptions::new(target.unwrap_or(store.format))
                .with_convention(convention)
                .with_legacy_ceiling(legacy);
            let atoms: Vec<&str> = atoms.iter().map(String::as_str).collect();
            let conversion = library.get_basis(&basis, &atoms, &options)?;
            let text = format!("{}\n", conversion.text);
            if save {
                let path = path.unwrap_or_else(|| save_path(&basis, &atoms));
                fs::write(&path, text)?;
                writeln!(out, "{}", path.display())?;
            } else {
                write!(out, "{text}")?;
            }
        }
        Commands::ListFormats => {
            for (tag, name) in FORMAT_MAP.entries().sorted() {
                writeln!(out, "{tag:<14}{name}")?;
            }
        }
        Commands::CreateDb {
            store,
            workers,
            no_contraction,
            from_dir,
        } => {
            let fetcher: Box<dyn Fetcher> = match from_dir {
                Some(dir) => Box::new(DirectoryFetcher::new(dir)),
                None => Box::new(HttpFetcher::new(!no_contraction)?),
            };
            let options = HarvestOptions {
                workers,
                ..HarvestOptions::default()
            };
            let path = store.path();
            let report = create_db(fetcher.as_ref(), &path, store.format, &options)?;
            writeln!(
                out,
                "{}: {} stored, {} failed, {} skipped",
                path.display(),
                report.stored.len(),
                report.failed.len(),
                report.skipped.len()
            )?;
            for name in &report.failed {
                writeln!(out, "  failed: {name}")?;
            }
        }
    }
    Ok(())
}

fn save_path(basis: &str, atoms: &[&str]) -> PathBuf {
    let name = format!("{}_{}.bs", basis, atoms.join("."));
    std::env::temp_dir().join(Path::new(&name.replace('/', "-")))
}
