// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the cheapest vertical seam through an energy map.
//!
//! A single top-to-bottom dynamic programming pass over the map.  Every
//! cell of the distance grid holds the least total energy of any
//! connected path from the top row down to that cell; the choice grid
//! remembers which of the three cells above (`-1`, `0`, `+1` columns
//! away) that path came through.  The seam ends at the cheapest cell of
//! the bottom row and is read back up through the choices.
//!
//! Ties go to the leftmost candidate, both among a cell's parents and
//! along the bottom row, so the same map always yields the same seam.

use crate::energy::EnergyMap;
use crate::error::{ensure_not_empty, Error, Result};
use crate::seam::Seam;
use crate::ternary::cq;
use crate::twodmap::TwoDimensionalMap;
use image::GenericImageView;
use itertools::Itertools;

/// The distance and choice grids for one energy map.  Built once per
/// seam and thrown away once the seam has been traced.
#[derive(Debug, Clone)]
pub struct SeamLattice {
    distance: TwoDimensionalMap<u32>,
    choice: TwoDimensionalMap<i8>,
}

// Relax the cells of one row, or a contiguous span of it starting at
// column `start`, from the finished row above.  `above` and `energy`
// are always full rows.
fn relax_span(above: &[u32], energy: &[u8], start: usize, distance: &mut [u32], choice: &mut [i8]) {
    let last = above.len() - 1;
    for (x, (cell, offset)) in (start..).zip(distance.iter_mut().zip(choice.iter_mut())) {
        let parent = (cq!(x == 0, 0, x - 1)..=cq!(x == last, last, x + 1))
            .min_by_key(|&p| above[p])
            .unwrap_or(x);
        *cell = above[parent].saturating_add(u32::from(energy[x]));
        *offset = (parent as isize - x as isize) as i8;
    }
}

#[cfg(not(feature = "threaded"))]
fn relax_row(above: &[u32], energy: &[u8], distance: &mut [u32], choice: &mut [i8]) {
    relax_span(above, energy, 0, distance, choice);
}

// Below this width the cost of spawning outweighs the work.
#[cfg(feature = "threaded")]
const PARALLEL_WIDTH: usize = 2048;

// The cells of a row only read the row above and never each other, so
// the row can be split into spans and relaxed side by side.
#[cfg(feature = "threaded")]
fn relax_row(above: &[u32], energy: &[u8], distance: &mut [u32], choice: &mut [i8]) {
    let workers = num_cpus::get();
    if workers < 2 || distance.len() < PARALLEL_WIDTH {
        return relax_span(above, energy, 0, distance, choice);
    }
    relax_in_spans(above, energy, distance, choice, workers);
}

#[cfg(feature = "threaded")]
fn relax_in_spans(above: &[u32], energy: &[u8], distance: &mut [u32], choice: &mut [i8], workers: usize) {
    let span = (distance.len() + workers - 1) / workers;
    let outcome = crossbeam::scope(|scope| {
        for (index, (cells, offsets)) in distance
            .chunks_mut(span)
            .zip(choice.chunks_mut(span))
            .enumerate()
        {
            scope.spawn(move |_| relax_span(above, energy, index * span, cells, offsets));
        }
    });
    if let Err(panic) = outcome {
        std::panic::resume_unwind(panic);
    }
}

impl SeamLattice {
    /// Run the dynamic program over `energy`.
    ///
    /// The top row is seeded with its own energy, so a seam's cost is
    /// the energy under every one of its pixels.
    pub fn new(energy: &EnergyMap) -> Result<Self> {
        let (width, height) = energy.dimensions();
        ensure_not_empty((width, height))?;

        let mut distance = TwoDimensionalMap::new(width, height);
        let mut choice = TwoDimensionalMap::new(width, height);
        // Seeding with energy rather than zero means the top-row parent
        // is the cheaper one, not always the leftmost of a tie.
        for (cell, &e) in distance.row_mut(0).iter_mut().zip(energy.row(0)) {
            *cell = u32::from(e);
        }

        // For every subsequent row, each cell takes the cheapest of the
        // (up to) three cells above it, plus its own energy.
        for y in 1..height {
            let (above, current) = distance.row_pair_mut(y);
            relax_row(above, energy.row(y), current, choice.row_mut(y));
        }
        Ok(SeamLattice { distance, choice })
    }

    /// Least cumulative energy from the top row to each cell.
    pub fn distance(&self) -> &TwoDimensionalMap<u32> {
        &self.distance
    }

    /// Column offset, `-1`, `0` or `+1`, from each cell to the parent
    /// its least-energy path came through.  Zero throughout the top row.
    pub fn choice(&self) -> &TwoDimensionalMap<i8> {
        &self.choice
    }

    // Leftmost cheapest cell of the bottom row.
    fn bottom(&self) -> u32 {
        let last = self.distance.row(self.distance.height() - 1);
        last.iter().position_min().unwrap_or(0) as u32
    }

    /// Total energy of the cheapest seam.
    pub fn cost(&self) -> u32 {
        self.distance[(self.bottom(), self.distance.height() - 1)]
    }

    /// Trace the cheapest seam back up from the bottom row.
    pub fn seam(&self) -> Seam {
        let height = self.distance.height();
        let mut column = self.bottom();
        // Working backwards, collect the x coordinates that map to the
        // seam, then reverse them into top-to-bottom order.
        let mut columns = (0..height)
            .rev()
            .fold(Vec::<u32>::with_capacity(height as usize), |mut acc, y| {
                acc.push(column);
                column = (i64::from(column) + i64::from(self.choice[(column, y)])) as u32;
                acc
            });
        columns.reverse();
        Seam::from(columns)
    }
}

/// Given an image and its energy map, return the connected top-to-bottom
/// seam of least total energy.
///
/// Fails with `InvalidDimensions` when the map was not built from an
/// image of this shape, or the image is empty.
pub fn find_vertical_seam<I>(image: &I, energy: &EnergyMap) -> Result<Seam>
where
    I: GenericImageView,
{
    if image.dimensions() != energy.dimensions() {
        return Err(Error::InvalidDimensions {
            expected: image.dimensions(),
            actual: energy.dimensions(),
        });
    }
    let lattice = SeamLattice::new(energy)?;
    let seam = lattice.seam();
    log::trace!("seam of cost {} ends at column {}", lattice.cost(), lattice.bottom());
    Ok(seam)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Image;
    use image::{ImageBuffer, Luma};

    const ENERGY_DATA: [u8; 20] = [9, 9, 0, 9, 9, 9, 1, 9, 8, 9, 9, 9, 9, 9, 0, 9, 9, 9, 0, 9];

    fn energies(width: u32, rows: &[&[u8]]) -> EnergyMap {
        EnergyMap::from_vec(width, rows.len() as u32, rows.concat()).unwrap()
    }

    fn blank(width: u32, height: u32) -> Image<Luma<u8>> {
        ImageBuffer::new(width, height)
    }

    #[test]
    fn energy_grid_to_vertical_seam() {
        let energy = EnergyMap::from_vec(5, 4, ENERGY_DATA.to_vec()).unwrap();
        let seam = find_vertical_seam(&blank(5, 4), &energy).unwrap();
        assert_eq!(seam.columns(), &[2, 3, 4, 3]);
        assert!(seam.is_connected());
    }

    #[test]
    fn distance_grid_accumulates_the_cheapest_parent() {
        let energy = EnergyMap::from_vec(5, 4, ENERGY_DATA.to_vec()).unwrap();
        let lattice = SeamLattice::new(&energy).unwrap();
        assert_eq!(lattice.distance().row(0), &[9, 9, 0, 9, 9]);
        assert_eq!(lattice.distance().row(1), &[18, 1, 9, 8, 18]);
        assert_eq!(lattice.distance().row(3), &[19, 19, 19, 8, 17]);
        assert_eq!(lattice.choice().row(1), &[0, 1, 0, -1, -1]);
        assert_eq!(lattice.cost(), 8);
        assert_eq!(lattice.seam().cost(&energy), Ok(8));
    }

    #[test]
    fn seam_avoids_a_high_energy_stripe() {
        let row: &[u8] = &[9, 9, 200, 9, 9];
        let energy = energies(5, &[row, row, row, row]);
        let seam = find_vertical_seam(&blank(5, 4), &energy).unwrap();
        assert!(seam.columns().iter().all(|&x| x != 2));
        assert_eq!(seam.columns(), &[0, 0, 0, 0]);
    }

    #[test]
    fn ties_go_to_the_lower_column_at_every_row() {
        let row: &[u8] = &[5, 0, 0, 5];
        let energy = energies(4, &[row, row, row, row]);
        let seam = find_vertical_seam(&blank(4, 4), &energy).unwrap();
        assert_eq!(seam.columns(), &[1, 1, 1, 1]);
    }

    #[test]
    fn seam_can_wander_to_both_edges() {
        let energy = energies(3, &[&[0, 5, 5], &[5, 0, 5], &[5, 5, 0], &[5, 0, 5]]);
        let lattice = SeamLattice::new(&energy).unwrap();
        assert_eq!(lattice.seam().columns(), &[0, 1, 2, 1]);
        assert_eq!(lattice.cost(), 0);
    }

    #[test]
    fn degenerate_shapes() {
        let column = energies(1, &[&[3], &[1], &[4]]);
        let seam = find_vertical_seam(&blank(1, 3), &column).unwrap();
        assert_eq!(seam.columns(), &[0, 0, 0]);

        let row = energies(4, &[&[3, 1, 1, 4]]);
        let seam = find_vertical_seam(&blank(4, 1), &row).unwrap();
        assert_eq!(seam.columns(), &[1]);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let energy = EnergyMap::from_vec(5, 4, ENERGY_DATA.to_vec()).unwrap();
        assert_eq!(
            find_vertical_seam(&blank(4, 5), &energy),
            Err(Error::InvalidDimensions {
                expected: (4, 5),
                actual: (5, 4)
            })
        );
    }

    #[cfg(feature = "threaded")]
    #[test]
    fn spans_relax_exactly_like_a_single_pass() {
        let (width, height) = (3001, 7);
        let mut state = 0x2545_f491u32;
        let energy = EnergyMap::from_fn(width, height, |_, _| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            // Few distinct values, so ties between parents are common.
            ((state >> 16) % 6) as u8
        });
        let lattice = SeamLattice::new(&energy).unwrap();

        for y in 1..height {
            let above = lattice.distance().row(y - 1);
            let mut single = (vec![0u32; width as usize], vec![0i8; width as usize]);
            relax_span(above, energy.row(y), 0, &mut single.0, &mut single.1);
            for workers in [2, 4, 7] {
                let mut spans = (vec![0u32; width as usize], vec![0i8; width as usize]);
                relax_in_spans(above, energy.row(y), &mut spans.0, &mut spans.1, workers);
                assert_eq!(spans, single, "row {} with {} workers", y, workers);
            }
            assert_eq!(lattice.distance().row(y), &single.0[..]);
            assert_eq!(lattice.choice().row(y), &single.1[..]);
        }
    }

    #[test]
    fn empty_maps_are_rejected() {
        assert!(SeamLattice::new(&EnergyMap::new(0, 0)).is_err());
    }
}
