use crate::classify::{data_row, fortran_double, BlockBuilder, Header, Line, ParseHint};
use crate::diagnostics::Diagnostics;
use crate::entry::{BasisSetEntry, CoordinateConvention};
use crate::error::{BasisError, Result};

fn count(token: &str) -> Option<usize> {
    token.parse().ok()
}

// An element name line, then "<label> <count>" headers, then indexed rows
fn classify(line: &str) -> Result<Line<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }
    if trimmed.to_uppercase().starts_with("$END") {
        return Ok(Line::Terminator);
    }
    if let Some(convention) = CoordinateConvention::find_in(trimmed) {
        return Ok(Line::Directive(convention));
    }
    if let Some(values) = data_row(line) {
        return match values.split_first() {
            Some((_, rest)) if rest.len() >= 2 => Ok(Line::Data(rest.to_vec())),
            _ => Err(BasisError::malformed(None, format!("short data row '{trimmed}'"))),
        };
    }
    match trimmed.split_whitespace().collect::<Vec<_>>()[..] {
        [name] if name.chars().all(|c| c.is_ascii_alphabetic()) => Ok(Line::Identity(name)),
        [label, n] if count(n).is_some() => Ok(Line::Header(Header {
            symbol: None,
            label,
            count: count(n),
            scale: None,
        })),
        // some dumps append a scale factor like Gaussian94 does
        [label, n, scale] if count(n).is_some() && fortran_double(scale).is_some() => {
            Ok(Line::Header(Header {
                symbol: None,
                label,
                count: count(n),
                scale: fortran_double(scale),
            }))
        }
        _ => Err(BasisError::malformed(None, format!("unrecognized line '{trimmed}'"))),
    }
}

/// Parse one GAMESS-US element block. "L" shells read as SP until the
/// element's first D shell, and as L afterwards.
pub fn parse_gamess_us(text: &str, hint: &ParseHint) -> Result<(BasisSetEntry, Diagnostics)> {
    let mut builder = BlockBuilder::new(hint).gamess_labels();
    for line in text.lines() {
        if !builder.feed(classify(line)?)? {
            break;
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FunctionsPerShell;
    use crate::extract::extract_gamess_us;
    use crate::reformat::gamess_ranks;
    use crate::shell::ShellKind;
    use std::fs;

    const HELIUM: &str = "HELIUM
S   3
  1     38.4216340              0.0237660
  2      5.7780300              0.1546790
  3      1.2417740              0.4696300
S   1
  1      0.2979640              1.0000000";

    #[test]
    fn helium() {
        let (entry, diagnostics) = parse_gamess_us(HELIUM, &ParseHint::expecting("He")).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(entry.symbol(), "He");
        assert_eq!(entry.shells().len(), 2);
        assert_eq!(entry.shells()[0].exponents().collect::<Vec<_>>(), vec![38.421634, 5.77803, 1.241774]);
        assert_eq!(entry.to_string(), "<He spherical {'S' : 2}>");
    }

    #[test]
    fn chlorine_sp_shells() {
        let data = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/basis_files/gamess-us-6-31Gs.txt")).unwrap();
        let extraction = extract_gamess_us(&data, "6-31G*", &["H", "He", "Cl"]).unwrap();
        let chunk = &extraction.chunks[2];
        let (entry, _) = parse_gamess_us(chunk.ao_basis().unwrap(), &ParseHint::for_chunk(chunk)).unwrap();
        assert_eq!(
            *entry.functions_per_shell(),
            FunctionsPerShell::from([(ShellKind::S, 1), (ShellKind::SP, 6), (ShellKind::D, 1)])
        );
    }

    #[test]
    fn declared_count_is_enforced() {
        let text = "HYDROGEN\nS   3\n  1      3.4252509              0.1543290\n  2      0.6239137              0.5353281";
        let err = parse_gamess_us(text, &ParseHint::expecting("H")).unwrap_err();
        assert_eq!(
            err,
            BasisError::MalformedBlock {
                element: Some("H".to_string()),
                reason: "shell S declares 3 primitives, found 2".to_string(),
            }
        );
    }

    #[test]
    fn wrong_element_name() {
        let err = parse_gamess_us(HELIUM, &ParseHint::expecting("H")).unwrap_err();
        assert!(matches!(err, BasisError::ElementMismatch { .. }));
    }

    const CHLORINE_S_D_L: &str = "CHLORINE
S   1
  1    105.8190000              1.0000000
D   1
  1      0.7500000              1.0000000
L   2
  1      5.4000000             -0.2500000               0.1600000
  2      0.4900000              1.0000000               0.8800000";

    #[test]
    fn l_after_d_is_stored_as_sp() {
        let (entry, _) = parse_gamess_us(CHLORINE_S_D_L, &ParseHint::expecting("Cl")).unwrap();
        assert_eq!(
            entry.functions_per_shell(),
            &FunctionsPerShell::from([(ShellKind::S, 1), (ShellKind::SP, 2), (ShellKind::D, 1)])
        );
        let tall: Vec<ShellKind> = entry.to_tall().shells().iter().map(|b| b.kind()).collect();
        assert_eq!(tall, vec![ShellKind::S, ShellKind::D, ShellKind::SP]);
        // only the rank follows the position relative to D
        assert_eq!(gamess_ranks(entry.shells()), vec![0, 2, 8]);
    }

    #[test]
    fn single_column_l_is_an_l_shell() {
        let text = "NEON\nD   1\n  1      1.0000000              1.0000000\nL   1\n  1      0.5000000              1.0000000";
        let (entry, _) = parse_gamess_us(text, &ParseHint::expecting("Ne")).unwrap();
        assert_eq!(entry.shells()[1].kind(), ShellKind::L);
    }
}
