// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A flat, row-major two dimensional grid.
//!
//! The energy map, the lattice's cumulative distances and its
//! back-pointers are all the same shape as the image they describe,
//! and all of them are read row by row in the hot loop.  Keeping them
//! in one contiguous `Vec` apiece, addressed `(x, y)` the way `image`
//! addresses pixels, keeps that loop cache-friendly and allocation-free.

use crate::error::{Error, Result};
use std::ops::{Index, IndexMut};

/// An addressable two-dimensional field of `P`: a `u8` per pixel for
/// the energy map, a `u32` for the lattice's distances, an `i8` for
/// its back-pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoDimensionalMap<P: Default + Copy> {
    width: u32,
    height: u32,
    cells: Vec<P>,
}

impl<P: Default + Copy> TwoDimensionalMap<P> {
    /// A `width` × `height` map with every cell at `P::default()`.
    pub fn new(width: u32, height: u32) -> Self {
        TwoDimensionalMap {
            width,
            height,
            cells: vec![P::default(); width as usize * height as usize],
        }
    }

    /// Wrap existing row-major cells.  Fails if there are not exactly
    /// `width * height` of them.
    pub fn from_vec(width: u32, height: u32, cells: Vec<P>) -> Result<Self> {
        if cells.len() != width as usize * height as usize {
            return Err(Error::InvalidDimensions {
                expected: (width, height),
                actual: (cells.len() as u32, 1),
            });
        }
        Ok(TwoDimensionalMap {
            width,
            height,
            cells,
        })
    }

    /// Build a map by evaluating `f(x, y)` for every cell.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> P,
    {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        TwoDimensionalMap {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`, matching `GenericImageView::dimensions`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.  This
    // particular variant is the same one used in image.rs.
    fn get_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// One full row.
    pub fn row(&self, y: u32) -> &[P] {
        let start = self.get_index(0, y);
        &self.cells[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [P] {
        let start = self.get_index(0, y);
        let end = start + self.width as usize;
        &mut self.cells[start..end]
    }

    /// Row `y - 1` for reading alongside row `y` for writing, which is
    /// exactly the borrow a top-to-bottom relaxation pass needs.
    ///
    /// `y` must be at least 1.
    pub fn row_pair_mut(&mut self, y: u32) -> (&[P], &mut [P]) {
        let width = self.width as usize;
        let start = self.get_index(0, y);
        let (above, rest) = self.cells.split_at_mut(start);
        (&above[start - width..], &mut rest[..width])
    }

    /// All cells, row-major.
    pub fn as_slice(&self) -> &[P] {
        &self.cells
    }
}

impl<P: Default + Copy> Index<(u32, u32)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (u32, u32)) -> &P {
        let index = self.get_index(x, y);
        &self.cells[index]
    }
}

impl<P: Default + Copy> IndexMut<(u32, u32)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.cells[index]
    }
}
