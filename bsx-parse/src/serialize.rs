//! Render entries back to text.
//!
//! Downstream programs read these columns by position, so every number is
//! padded until its decimal point lands on a fixed column.

use itertools::Itertools;

use crate::entry::{BasisSetEntry, CoordinateConvention, ShellBlock};
use crate::extract::Section;

/// `value` with 7 decimals, left-padded so the decimal point sits `point`
/// characters in. At least one space is always kept.
pub fn aligned(value: f64, point: usize) -> String {
    let text = format!("{value:.7}");
    let dot = text.find('.').unwrap_or(text.len());
    let pad = point.saturating_sub(dot).max(1);
    format!("{}{}", " ".repeat(pad), text)
}

fn coefficient_columns(block: &ShellBlock, row: usize, point: usize) -> String {
    block.primitives()[row]
        .coefficients
        .iter()
        .map(|c| aligned(*c, point))
        .collect()
}

/// NWChem element block on the fused layout.
pub fn serialize_nwchem(entry: &BasisSetEntry, origin: &str) -> String {
    let mut lines = vec![
        format!("#BASIS SET reformatted: [{}]", entry.functions_per_shell().summary()),
        format!("#origin: {origin}"),
    ];
    for block in entry.reformatted().shells() {
        lines.push(format!("{:<6}{}", entry.symbol(), block.kind().label()));
        for (i, primitive) in block.primitives().iter().enumerate() {
            lines.push(format!(
                "{}{}",
                aligned(primitive.exponent, 8),
                coefficient_columns(block, i, 16)
            ));
        }
    }
    lines.join("\n")
}

/// GAMESS-US element block on the tall layout, SP written as `L`.
pub fn serialize_gamess_us(entry: &BasisSetEntry) -> String {
    let mut lines = vec![entry.name().to_string()];
    for block in entry.to_tall().shells() {
        lines.push(format!("{:<4}{}", block.kind().gamess_label(), block.primitives().len()));
        for (i, primitive) in block.primitives().iter().enumerate() {
            lines.push(format!(
                "{:>3}{}{}",
                i + 1,
                aligned(primitive.exponent, 7),
                coefficient_columns(block, i, 15)
            ));
        }
    }
    lines.join("\n")
}

/// Gaussian94 element block on the tall layout. Every shell header carries
/// the entry-level scale factor, so a per-shell scale that differed in the
/// source only survives as a `ScaleFactorMismatch` diagnostic.
pub fn serialize_gaussian94(entry: &BasisSetEntry) -> String {
    let mut lines = vec![format!("{:<7}0", entry.symbol())];
    for block in entry.to_tall().shells() {
        lines.push(format!(
            "{:<4}{:<4}{:.2}",
            block.kind().label(),
            block.primitives().len(),
            entry.scale_factor()
        ));
        for (i, primitive) in block.primitives().iter().enumerate() {
            lines.push(format!(
                "{}{}",
                aligned(primitive.exponent, 7),
                coefficient_columns(block, i, 15)
            ));
        }
    }
    lines.join("\n")
}

/// Group blocks into `basis "..." <convention>` sections and an `ECP`
/// section, each closed by `END`.
pub fn wrap_nwchem<'a>(
    blocks: impl IntoIterator<Item = (Section, &'a str)>,
    convention: CoordinateConvention,
) -> String {
    let grouped = blocks.into_iter().into_group_map();
    [Section::AoBasis, Section::CdBasis, Section::XcBasis, Section::Ecp]
        .iter()
        .filter_map(|section| {
            let texts = grouped.get(section)?;
            let head = match section {
                Section::Ecp => "ECP".to_string(),
                _ => format!("basis \"{}\" {}", section.name(), convention),
            };
            Some(format!("{head}\n{}\nEND", texts.iter().join("\n")))
        })
        .join("\n")
}

pub fn wrap_gamess_us<S: AsRef<str>>(blocks: &[S]) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    format!("$DATA\n{}\n$END", blocks.iter().map(AsRef::as_ref).join("\n\n"))
}

/// `****` before every block and after the last; blank lines dropped.
pub fn wrap_gaussian94<S: AsRef<str>>(blocks: &[S], convention: CoordinateConvention) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    let mut lines = vec![format!("! {convention}")];
    for block in blocks {
        lines.push("****".to_string());
        lines.extend(
            block
                .as_ref()
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string),
        );
    }
    lines.push("****".to_string());
    lines.join("\n")
}
