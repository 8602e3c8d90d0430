// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A vertical seam: one column index per row, top to bottom.

use crate::energy::EnergyMap;
use crate::error::{Error, Result};
use itertools::Itertools;

/// The columns of a top-to-bottom path through an image, one per row.
///
/// Seams produced by [`find_vertical_seam`](crate::find_vertical_seam)
/// are 8-connected: consecutive rows differ by at most one column.  A
/// seam built by hand with `From<Vec<u32>>` carries no such promise,
/// which is why the operations that consume one check it against the
/// image first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seam(Vec<u32>);

impl Seam {
    /// The column for each row, row 0 first.
    pub fn columns(&self) -> &[u32] {
        &self.0
    }

    /// Number of rows the seam spans.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(x, y)` of every pixel on the seam, top to bottom.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().zip(0..).map(|(&x, y)| (x, y))
    }

    /// Whether every step down moves at most one column sideways.
    pub fn is_connected(&self) -> bool {
        self.0
            .iter()
            .tuple_windows()
            .all(|(&upper, &lower)| upper.abs_diff(lower) <= 1)
    }

    /// Total energy under the seam, every row included.
    pub fn cost(&self, energy: &EnergyMap) -> Result<u32> {
        self.check_fits(energy.dimensions())?;
        Ok(self.pixels().map(|pt| u32::from(energy[pt])).sum())
    }

    /// Fails unless the seam has one entry per row and every entry is a
    /// real column of a `(width, height)` image.
    pub(crate) fn check_fits(&self, (width, height): (u32, u32)) -> Result<()> {
        if self.0.len() != height as usize {
            return Err(Error::SeamLength {
                expected: height,
                actual: self.0.len() as u32,
            });
        }
        match self.pixels().find(|&(x, _)| x >= width) {
            Some((column, row)) => Err(Error::SeamOutOfBounds { row, column, width }),
            None => Ok(()),
        }
    }
}

impl From<Vec<u32>> for Seam {
    fn from(columns: Vec<u32>) -> Self {
        Seam(columns)
    }
}

impl From<Seam> for Vec<u32> {
    fn from(seam: Seam) -> Self {
        seam.0
    }
}

impl AsRef<[u32]> for Seam {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}
