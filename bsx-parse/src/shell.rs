use serde::{Deserialize, Serialize};
use std::fmt;

/// Angular momentum class of a shell block.
///
/// Declaration order is the display order used by `functions_per_shell`,
/// so `Ord` sorts S, P, SP, D, ... with the fused SP kind next to P.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShellKind {
    S,
    P,
    SP,
    D,
    F,
    G,
    H,
    I,
    K,
    L,
    M,
}

// rank -> kind, SP has no rung of its own
const LADDER: [ShellKind; 10] = [
    ShellKind::S,
    ShellKind::P,
    ShellKind::D,
    ShellKind::F,
    ShellKind::G,
    ShellKind::H,
    ShellKind::I,
    ShellKind::K,
    ShellKind::L,
    ShellKind::M,
];

impl ShellKind {
    pub const ALL: [ShellKind; 11] = [
        ShellKind::S,
        ShellKind::P,
        ShellKind::SP,
        ShellKind::D,
        ShellKind::F,
        ShellKind::G,
        ShellKind::H,
        ShellKind::I,
        ShellKind::K,
        ShellKind::L,
        ShellKind::M,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShellKind::S => "S",
            ShellKind::P => "P",
            ShellKind::SP => "SP",
            ShellKind::D => "D",
            ShellKind::F => "F",
            ShellKind::G => "G",
            ShellKind::H => "H",
            ShellKind::I => "I",
            ShellKind::K => "K",
            ShellKind::L => "L",
            ShellKind::M => "M",
        }
    }

    /// GAMESS-US spells the fused SP shell "L".
    pub fn gamess_label(self) -> &'static str {
        match self {
            ShellKind::SP => "L",
            other => other.label(),
        }
    }

    /// Angular momentum rank; SP counts as P.
    pub fn rank(self) -> u8 {
        match self {
            ShellKind::S => 0,
            ShellKind::P | ShellKind::SP => 1,
            ShellKind::D => 2,
            ShellKind::F => 3,
            ShellKind::G => 4,
            ShellKind::H => 5,
            ShellKind::I => 6,
            ShellKind::K => 7,
            ShellKind::L => 8,
            ShellKind::M => 9,
        }
    }

    pub fn from_rank(rank: u8) -> Option<ShellKind> {
        LADDER.get(rank as usize).copied()
    }

    /// Case-insensitive label lookup. "L" is the rank-8 shell here; callers
    /// reading GAMESS-US text resolve "L" themselves.
    pub fn from_label(label: &str) -> Option<ShellKind> {
        let upper = label.trim().to_uppercase();
        ShellKind::ALL.into_iter().find(|k| k.label() == upper)
    }

    /// Number of coefficient columns every row of this kind must carry, if fixed.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            ShellKind::SP => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_the_ladder() {
        for (rank, kind) in LADDER.iter().enumerate() {
            assert_eq!(kind.rank() as usize, rank);
            assert_eq!(ShellKind::from_rank(rank as u8), Some(*kind));
        }
        assert_eq!(ShellKind::SP.rank(), ShellKind::P.rank());
        assert_eq!(ShellKind::from_rank(10), None);
    }

    #[test]
    fn labels() {
        assert_eq!(ShellKind::from_label("sp"), Some(ShellKind::SP));
        assert_eq!(ShellKind::from_label("L"), Some(ShellKind::L));
        assert_eq!(ShellKind::from_label("X"), None);
        assert_eq!(ShellKind::SP.gamess_label(), "L");
        assert_eq!(ShellKind::SP.to_string(), "SP");
    }

    #[test]
    fn display_order() {
        let mut kinds = vec![ShellKind::D, ShellKind::SP, ShellKind::S, ShellKind::P];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![ShellKind::S, ShellKind::P, ShellKind::SP, ShellKind::D]
        );
    }
}
