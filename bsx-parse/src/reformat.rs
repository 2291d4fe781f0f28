//! Wide/tall layout transforms and the GAMESS-US rank rule.
//!
//! Wide: one row per primitive, several coefficient columns.
//! Tall: one coefficient column per block.

use crate::entry::{BasisSetEntry, Primitive, ShellBlock};
use crate::shell::ShellKind;

fn single_column(block: &ShellBlock, column: usize) -> ShellBlock {
    let primitives = block
        .primitives()
        .iter()
        .map(|p| Primitive::new(p.exponent, vec![p.coefficients[column]]))
        .collect();
    // same rows, one column: cannot fail validation
    ShellBlock::new(block.kind(), primitives).unwrap_or_else(|_| block.clone())
}

/// Split every non-SP block into one block per coefficient column, in
/// column order. SP blocks stay three columns wide.
pub fn to_tall(shells: &[ShellBlock]) -> Vec<ShellBlock> {
    shells
        .iter()
        .flat_map(|block| {
            if block.kind() == ShellKind::SP || block.width() == 1 {
                vec![block.clone()]
            } else {
                (0..block.width()).map(|c| single_column(block, c)).collect()
            }
        })
        .collect()
}

fn exponent_key(block: &ShellBlock) -> (ShellKind, Vec<u64>) {
    (block.kind(), block.exponents().map(f64::to_bits).collect())
}

/// Merge blocks that share a shell kind and the same ordered exponents,
/// concatenating their columns. Groups keep first-seen order.
pub fn fuse(shells: &[ShellBlock]) -> Vec<ShellBlock> {
    let mut groups: Vec<((ShellKind, Vec<u64>), Vec<Primitive>)> = Vec::new();
    let mut fused: Vec<Option<usize>> = Vec::new();
    let mut passthrough: Vec<ShellBlock> = Vec::new();

    for block in shells {
        if block.kind() == ShellKind::SP {
            fused.push(None);
            passthrough.push(block.clone());
            continue;
        }
        let key = exponent_key(block);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, primitives)) => {
                for (merged, p) in primitives.iter_mut().zip(block.primitives()) {
                    merged.coefficients.extend_from_slice(&p.coefficients);
                }
            }
            None => {
                fused.push(Some(groups.len()));
                groups.push((key, block.primitives().to_vec()));
            }
        }
    }

    let mut groups = groups.into_iter().map(|((kind, _), primitives)| (kind, primitives));
    let mut passthrough = passthrough.into_iter();
    fused
        .into_iter()
        .filter_map(|slot| match slot {
            Some(_) => groups
                .next()
                .and_then(|(kind, primitives)| ShellBlock::new(kind, primitives).ok()),
            None => passthrough.next(),
        })
        .collect()
}

/// The multi-column layout: split everything, then fuse what shares exponents.
pub fn reformat(shells: &[ShellBlock]) -> Vec<ShellBlock> {
    fuse(&to_tall(shells))
}

impl BasisSetEntry {
    pub fn to_tall(&self) -> BasisSetEntry {
        self.with_shells(to_tall(self.shells()))
    }

    pub fn fused(&self) -> BasisSetEntry {
        self.with_shells(fuse(self.shells()))
    }

    pub fn reformatted(&self) -> BasisSetEntry {
        self.with_shells(reformat(self.shells()))
    }
}

/// Ranks as GAMESS-US sees one element's blocks: an SP or L block before
/// the first D counts as P, afterwards as L.
pub fn gamess_ranks(shells: &[ShellBlock]) -> Vec<u8> {
    let mut seen_d = false;
    shells
        .iter()
        .map(|block| match block.kind() {
            ShellKind::SP | ShellKind::L if !seen_d => ShellKind::P.rank(),
            ShellKind::SP | ShellKind::L => ShellKind::L.rank(),
            kind => {
                if kind == ShellKind::D {
                    seen_d = true;
                }
                kind.rank()
            }
        })
        .collect()
}
