use crate::classify::{data_row, BlockBuilder, Header, Line, ParseHint};
use crate::diagnostics::Diagnostics;
use crate::entry::{BasisSetEntry, CoordinateConvention};
use crate::error::{BasisError, Result};

// "Cl    SP" headers carry the symbol, data rows are bare numbers
fn classify(line: &str) -> Result<Line<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Blank);
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with("end") || lower.starts_with("ecp") {
        return Ok(Line::Terminator);
    }
    if let Some(convention) = CoordinateConvention::find_in(&lower) {
        return Ok(Line::Directive(convention));
    }
    if lower.starts_with("basis") {
        return Ok(Line::Blank);
    }
    if let Some(values) = data_row(line) {
        return Ok(Line::Data(values));
    }
    match trimmed.split_whitespace().collect::<Vec<_>>()[..] {
        [symbol, label] => Ok(Line::Header(Header {
            symbol: Some(symbol),
            label,
            count: None,
            scale: None,
        })),
        _ => Err(BasisError::malformed(None, format!("unrecognized line '{trimmed}'"))),
    }
}

/// Parse the orbital basis text of one NWChem chunk.
pub fn parse_nwchem(text: &str, hint: &ParseHint) -> Result<(BasisSetEntry, Diagnostics)> {
    let mut builder = BlockBuilder::new(hint);
    for line in text.lines() {
        if !builder.feed(classify(line)?)? {
            break;
        }
    }
    builder.finish()
}
