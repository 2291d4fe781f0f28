use crate::entry::BasisSetEntry;
use crate::reformat::gamess_ranks;
use crate::shell::ShellKind;

/// Highest shell found in a basis set and whether a target can hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngularMomentumReport {
    pub max: ShellKind,
    pub too_large: bool,
    /// `None` when the target has no limit.
    pub ceiling: Option<ShellKind>,
}

/// Compare the highest rank across `entries` with `ceiling`. With
/// `gamess_rules`, SP and L blocks are ranked per element by the
/// L-before-D rule.
pub fn check_angular_momentum(
    entries: &[BasisSetEntry],
    ceiling: Option<ShellKind>,
    gamess_rules: bool,
) -> AngularMomentumReport {
    let max_rank = entries
        .iter()
        .flat_map(|entry| {
            if gamess_rules {
                gamess_ranks(entry.shells())
            } else {
                entry.shells().iter().map(|b| b.kind().rank()).collect()
            }
        })
        .max()
        .unwrap_or(0);
    let max = ShellKind::from_rank(max_rank).unwrap_or(ShellKind::M);
    let too_large = ceiling.is_some_and(|c| max_rank > c.rank());
    AngularMomentumReport {
        max,
        too_large,
        ceiling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::element_by_symbol;
    use crate::entry::{CoordinateConvention, ShellBlock};

    fn entry(kinds: &[ShellKind]) -> BasisSetEntry {
        let shells = kinds
            .iter()
            .map(|&kind| {
                let row = if kind == ShellKind::SP { vec![1.0, 0.5, 0.5] } else { vec![1.0, 1.0] };
                ShellBlock::from_rows(kind, &[row]).unwrap()
            })
            .collect();
        BasisSetEntry::new(element_by_symbol("Ne").unwrap(), CoordinateConvention::Spherical, 1.0, shells)
    }

    #[test]
    fn ceilings() {
        let neon = [entry(&[ShellKind::S, ShellKind::P, ShellKind::D, ShellKind::I])];
        let report = check_angular_momentum(&neon, Some(ShellKind::I), false);
        assert_eq!(report.max, ShellKind::I);
        assert!(!report.too_large);
        assert!(check_angular_momentum(&neon, Some(ShellKind::G), true).too_large);
        assert!(!check_angular_momentum(&neon, None, false).too_large);
    }

    #[test]
    fn sp_reports_as_p() {
        let report = check_angular_momentum(&[entry(&[ShellKind::S, ShellKind::SP])], Some(ShellKind::I), true);
        assert_eq!(report.max, ShellKind::P);
    }

    #[test]
    fn gamess_rule_applies_per_entry() {
        let entries = [
            entry(&[ShellKind::S, ShellKind::D]),
            entry(&[ShellKind::S, ShellKind::SP]),
        ];
        let report = check_angular_momentum(&entries, Some(ShellKind::G), true);
        assert_eq!(report.max, ShellKind::D);
        assert!(!report.too_large);

        let late = [entry(&[ShellKind::D, ShellKind::SP])];
        let report = check_angular_momentum(&late, Some(ShellKind::I), true);
        assert_eq!(report.max, ShellKind::L);
        assert!(report.too_large);
        assert_eq!(check_angular_momentum(&late, Some(ShellKind::I), false).max, ShellKind::D);
    }

    #[test]
    fn empty_input() {
        let report = check_angular_momentum(&[], Some(ShellKind::I), false);
        assert_eq!(report.max, ShellKind::S);
        assert!(!report.too_large);
    }
}
