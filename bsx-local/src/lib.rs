//! bsx - a local copy of the Basis Set Exchange.
//!
//! Basis sets are harvested once into a JSON store per program format and
//! served from there, converted to any of the supported formats on the way
//! out.
//!
//! # Example
//!
//! ```
//! use bsx_local::config::spherical_or_cartesian;
//! use bsx_parse::CoordinateConvention;
//!
//! assert_eq!(spherical_or_cartesian("6-31G*"), CoordinateConvention::Cartesian);
//! assert_eq!(spherical_or_cartesian("cc-pVDZ"), CoordinateConvention::Spherical);
//! ```
//!
//! - [`config`]: constants and default paths
//! - [`error`]: error types and Result alias
//! - [`store`]: the JSON store and the [`store::ChunkSource`] seam
//! - [`dump`]: catalog parsing and harvesting
//! - [`library`]: lookup and conversion
//! - [`cli`]: command-line interface

pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod library;
pub mod store;

pub use error::{LocalError, Result};
pub use library::Library;
pub use store::{BasisStore, ChunkSource};
