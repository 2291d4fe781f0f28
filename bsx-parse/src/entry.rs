//! Canonical, format-independent basis set data for one element.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::element::Element;
use crate::error::{BasisError, Result};
use crate::reformat::to_tall;
use crate::shell::ShellKind;

/// Relative tolerance used when comparing numeric payloads.
pub const MAX_DEVIATION: f64 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateConvention {
    #[default]
    Spherical,
    Cartesian,
}

impl CoordinateConvention {
    pub fn as_str(self) -> &'static str {
        match self {
            CoordinateConvention::Spherical => "spherical",
            CoordinateConvention::Cartesian => "cartesian",
        }
    }

    /// Find a convention keyword anywhere in a line of text.
    pub fn find_in(line: &str) -> Option<Self> {
        let lower = line.to_lowercase();
        if lower.contains("spherical") {
            Some(CoordinateConvention::Spherical)
        } else if lower.contains("cartesian") {
            Some(CoordinateConvention::Cartesian)
        } else {
            None
        }
    }
}

impl fmt::Display for CoordinateConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateConvention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spherical" | "pure" => Ok(CoordinateConvention::Spherical),
            "cartesian" => Ok(CoordinateConvention::Cartesian),
            other => Err(format!("expected 'spherical' or 'cartesian', got '{other}'")),
        }
    }
}

/// One Gaussian exponent and its contraction coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub exponent: f64,
    pub coefficients: Vec<f64>,
}

impl Primitive {
    pub fn new(exponent: f64, coefficients: Vec<f64>) -> Self {
        Self {
            exponent,
            coefficients,
        }
    }
}

/// A run of primitives sharing one shell kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellBlock {
    kind: ShellKind,
    primitives: Vec<Primitive>,
}

impl ShellBlock {
    /// Build a block, checking that it has rows, that every row has the
    /// same number of coefficient columns, and that SP rows have two.
    pub fn new(kind: ShellKind, primitives: Vec<Primitive>) -> Result<Self> {
        let Some(first) = primitives.first() else {
            return Err(BasisError::malformed(None, format!("shell {kind} has no primitives")));
        };
        let width = first.coefficients.len();
        if width == 0 {
            return Err(BasisError::malformed(
                None,
                format!("shell {kind} has rows without coefficients"),
            ));
        }
        if let Some(row) = primitives.iter().find(|p| p.coefficients.len() != width) {
            return Err(BasisError::malformed(
                None,
                format!(
                    "shell {kind} mixes {width} and {} coefficient columns",
                    row.coefficients.len()
                ),
            ));
        }
        if let Some(fixed) = kind.fixed_width() {
            if width != fixed {
                return Err(BasisError::malformed(
                    None,
                    format!("shell {kind} needs {fixed} coefficient columns, found {width}"),
                ));
            }
        }
        Ok(Self { kind, primitives })
    }

    /// Build a block from `[exponent, c1, c2, ...]` rows.
    pub fn from_rows(kind: ShellKind, rows: &[Vec<f64>]) -> Result<Self> {
        let primitives = rows
            .iter()
            .map(|row| match row.split_first() {
                Some((exponent, coefficients)) => Ok(Primitive::new(*exponent, coefficients.to_vec())),
                None => Err(BasisError::malformed(None, format!("empty row in shell {kind}"))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(kind, primitives)
    }

    pub fn kind(&self) -> ShellKind {
        self.kind
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Number of coefficient columns.
    pub fn width(&self) -> usize {
        self.primitives[0].coefficients.len()
    }

    pub fn exponents(&self) -> impl Iterator<Item = f64> + '_ {
        self.primitives.iter().map(|p| p.exponent)
    }

    /// Coefficients of one column, in row order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.primitives.iter().map(move |p| p.coefficients[index])
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.primitives
            .iter()
            .map(|p| std::iter::once(p.exponent).chain(p.coefficients.iter().copied()).collect())
            .collect()
    }
}

/// Contracted function count per shell kind, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionsPerShell(BTreeMap<ShellKind, usize>);

impl FunctionsPerShell {
    pub fn from_shells(shells: &[ShellBlock]) -> Self {
        let mut counts = BTreeMap::new();
        for block in shells {
            *counts.entry(block.kind()).or_insert(0) += block.width();
        }
        Self(counts)
    }

    pub fn get(&self, kind: ShellKind) -> Option<usize> {
        self.0.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShellKind, usize)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Contraction summary like `5s,4p,2d,1f`.
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(kind, n)| format!("{n}{}", kind.label().to_lowercase()))
            .join(",")
    }
}

impl fmt::Display for FunctionsPerShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter().map(|(kind, n)| format!("'{kind}' : {n}")).join(", ")
        )
    }
}

impl<const N: usize> From<[(ShellKind, usize); N]> for FunctionsPerShell {
    fn from(pairs: [(ShellKind, usize); N]) -> Self {
        Self(pairs.into_iter().collect())
    }
}

/// Basis set data for one (basis set, element) pair.
///
/// Never mutated after construction; transforms return a new entry, which
/// recomputes `functions_per_shell`.
#[derive(Debug, Clone)]
pub struct BasisSetEntry {
    element: Element,
    convention: CoordinateConvention,
    scale_factor: f64,
    shells: Vec<ShellBlock>,
    functions_per_shell: FunctionsPerShell,
}

impl BasisSetEntry {
    pub fn new(
        element: Element,
        convention: CoordinateConvention,
        scale_factor: f64,
        shells: Vec<ShellBlock>,
    ) -> Self {
        let functions_per_shell = FunctionsPerShell::from_shells(&shells);
        Self {
            element,
            convention,
            scale_factor,
            shells,
            functions_per_shell,
        }
    }

    /// Same element metadata, different shells.
    pub fn with_shells(&self, shells: Vec<ShellBlock>) -> Self {
        Self::new(self.element, self.convention, self.scale_factor, shells)
    }

    pub fn with_convention(&self, convention: CoordinateConvention) -> Self {
        Self::new(self.element, convention, self.scale_factor, self.shells.clone())
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn symbol(&self) -> &'static str {
        self.element.symbol
    }

    pub fn atomic_number(&self) -> u32 {
        self.element.number
    }

    pub fn name(&self) -> &'static str {
        self.element.name
    }

    pub fn convention(&self) -> CoordinateConvention {
        self.convention
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn shells(&self) -> &[ShellBlock] {
        &self.shells
    }

    pub fn functions_per_shell(&self) -> &FunctionsPerShell {
        &self.functions_per_shell
    }
}

impl fmt::Display for BasisSetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {} {}>",
            self.element.symbol, self.convention, self.functions_per_shell
        )
    }
}

fn within_tolerance(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let ratio = a / b;
    ratio <= 1.0 + MAX_DEVIATION && ratio >= 1.0 - MAX_DEVIATION
}

fn blocks_agree(a: &ShellBlock, b: &ShellBlock) -> bool {
    a.kind() == b.kind()
        && a.primitives().len() == b.primitives().len()
        && a.primitives().iter().zip(b.primitives()).all(|(p, q)| {
            p.coefficients.len() == q.coefficients.len()
                && within_tolerance(p.exponent, q.exponent)
                && p
                    .coefficients
                    .iter()
                    .zip(&q.coefficients)
                    .all(|(x, y)| within_tolerance(*x, *y))
        })
}

impl PartialEq for BasisSetEntry {
    /// Same textual summary and, on the tall layout, every number equal to
    /// within one part per million.
    fn eq(&self, other: &Self) -> bool {
        if self.to_string() != other.to_string() {
            return false;
        }
        let ours = to_tall(&self.shells);
        let theirs = to_tall(&other.shells);
        ours.len() == theirs.len() && ours.iter().zip(&theirs).all(|(a, b)| blocks_agree(a, b))
    }
}
