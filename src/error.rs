// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised while carving.
//!
//! Every failure is detected before or during the offending step and
//! returned to the caller at once; a carve that fails partway through
//! hands back the error, never a partially-narrowed image.

use thiserror::Error;

/// The ways a carve can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A buffer has no rows or no columns, or two buffers that must
    /// agree in shape (image and energy map) do not.
    ///
    /// Both fields are `(width, height)`.  For an empty buffer,
    /// `expected` reports the smallest usable size, `(1, 1)`.
    #[error("invalid dimensions: expected {expected:?}, got {actual:?}")]
    InvalidDimensions {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The number of seams requested cannot be removed from an image of
    /// this width.  At least one column must survive.
    #[error("cannot remove {requested} seams from an image {width} columns wide")]
    InvalidSeamCount {
        /// Seams requested
        requested: u32,
        /// Width of the image they were requested from
        width: u32,
    },

    /// A seam names a column that does not exist in its row.  The seam
    /// finder never produces one of these; seeing it means a seam was
    /// built by hand or applied to the wrong image.
    #[error("seam column {column} in row {row} is outside an image {width} columns wide")]
    SeamOutOfBounds {
        /// Row holding the offending entry
        row: u32,
        /// The out-of-range column
        column: u32,
        /// Width of the image the seam was applied to
        width: u32,
    },

    /// A seam does not have exactly one entry per image row.
    #[error("seam has {actual} entries but the image has {expected} rows")]
    SeamLength {
        /// Rows in the image
        expected: u32,
        /// Entries in the seam
        actual: u32,
    },
}

/// Shorthand used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Reject buffers with no rows or no columns.
pub(crate) fn ensure_not_empty((width, height): (u32, u32)) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions {
            expected: (1, 1),
            actual: (width, height),
        });
    }
    Ok(())
}
