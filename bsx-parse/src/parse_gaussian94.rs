use crate::classify::{data_row, fortran_double, BlockBuilder, Header, Line, ParseHint};
use crate::diagnostics::Diagnostics;
use crate::element::atomic_number_of;
use crate::entry::{BasisSetEntry, CoordinateConvention};
use crate::error::{BasisError, Result};
use crate::shell::ShellKind;

// "S     0" is sulfur, "S   3   1.00" is an S shell: a zero count on a
// two-token line means an identity line.
fn classify(line: &str) -> Result<Line<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('!') {
        return Ok(Line::Blank);
    }
    if trimmed == "****" {
        return Ok(Line::Terminator);
    }
    if let Some(convention) = CoordinateConvention::find_in(trimmed) {
        return Ok(Line::Directive(convention));
    }
    if let Some(values) = data_row(line) {
        return Ok(Line::Data(values));
    }
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    match tokens[..] {
        [symbol, "0"] if atomic_number_of(symbol).is_ok() => Ok(Line::Identity(symbol)),
        [label, n, ..] if ShellKind::from_label(label).is_some() && tokens.len() <= 3 => {
            let count = n.parse::<usize>().ok();
            let scale = match tokens.get(2) {
                Some(token) => Some(fortran_double(token).ok_or_else(|| {
                    BasisError::malformed(None, format!("bad scale factor in '{trimmed}'"))
                })?),
                None => None,
            };
            match count {
                Some(count) => Ok(Line::Header(Header {
                    symbol: None,
                    label,
                    count: Some(count),
                    scale,
                })),
                None => Err(BasisError::malformed(None, format!("bad primitive count in '{trimmed}'"))),
            }
        }
        _ => Err(BasisError::malformed(None, format!("unrecognized line '{trimmed}'"))),
    }
}

/// Parse one Gaussian94 element block. The first shell's scale factor
/// becomes the entry's; a differing later one is reported, not applied.
pub fn parse_gaussian94(text: &str, hint: &ParseHint) -> Result<(BasisSetEntry, Diagnostics)> {
    let mut builder = BlockBuilder::new(hint);
    let mut started = false;
    for line in text.lines() {
        let line = classify(line)?;
        // a chunk may still open with its own **** marker
        if line == Line::Terminator && !started {
            continue;
        }
        started |= line != Line::Blank;
        if !builder.feed(line)? {
            break;
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::entry::FunctionsPerShell;
    use crate::extract::extract_gaussian94;
    use std::fs;

    #[test]
    fn helium() {
        let text = "He     0\nS   3   1.00\n     38.4216340              0.0237660\n      5.7780300              0.1546790\n      1.2417740              0.4696300\nS   1   1.00\n      0.2979640              1.0000000";
        let (entry, diagnostics) = parse_gaussian94(text, &ParseHint::expecting("He")).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(entry.scale_factor(), 1.0);
        assert_eq!(entry.to_string(), "<He spherical {'S' : 2}>");
    }

    #[test]
    fn sulfur_identity_line() {
        let text = "S     0\nS   1   1.00\n      0.2979640              1.0000000\n****";
        let (entry, _) = parse_gaussian94(text, &ParseHint::expecting("S")).unwrap();
        assert_eq!(entry.symbol(), "S");
        assert_eq!(entry.shells().len(), 1);
    }

    #[test]
    fn chlorine_with_document_convention() {
        let data = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/basis_files/gaussian94-6-31Gs.txt")).unwrap();
        let extraction = extract_gaussian94(&data, "6-31G*", &["Cl"]).unwrap();
        let chunk = extraction.chunks.iter().find(|c| c.symbol == "Cl").unwrap();
        let (entry, _) = parse_gaussian94(chunk.ao_basis().unwrap(), &ParseHint::for_chunk(chunk)).unwrap();
        assert_eq!(entry.convention(), CoordinateConvention::Cartesian);
        assert_eq!(
            *entry.functions_per_shell(),
            FunctionsPerShell::from([(ShellKind::S, 1), (ShellKind::SP, 6), (ShellKind::D, 1)])
        );
    }

    #[test]
    fn scale_factor_mismatch_is_reported() {
        let text = "H     0\nS   1   1.20\n      0.5              1.0\nS   1   1.00\n      0.1              1.0";
        let (entry, diagnostics) = parse_gaussian94(text, &ParseHint::expecting("H")).unwrap();
        assert_eq!(entry.scale_factor(), 1.2);
        assert_eq!(
            diagnostics.into_vec(),
            vec![Diagnostic::ScaleFactorMismatch {
                symbol: "H".to_string(),
                kept: 1.2,
                found: 1.0,
            }]
        );
    }

    #[test]
    fn missing_rows_and_bad_counts() {
        assert!(parse_gaussian94("H     0\nS   3   1.00\n****", &ParseHint::expecting("H")).is_err());
        assert!(parse_gaussian94("H     0\nS   x   1.00\n   0.5   1.0", &ParseHint::expecting("H")).is_err());
        assert!(parse_gaussian94("H     0\nS   2   1.00\n   0.5   1.0", &ParseHint::expecting("H")).is_err());
    }
}
