// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware image narrowing by seam carving.
//!
//! Each pass builds a gradient energy map of the working image, finds
//! the connected top-to-bottom path of least total energy (a "seam")
//! with a dynamic program, paints that seam onto an overlay copy of the
//! original, and deletes it from the working image.  Repeat `n` times
//! and the image is `n` columns narrower, with its high-contrast content
//! left mostly intact.
//!
//! ```no_run
//! use image::Rgb;
//! use seamcarve::{remove_n_seams, Image};
//!
//! let picture: Image<Rgb<u8>> = image::open("castle.png")?.to_rgb8();
//! let carved = remove_n_seams(&picture, 50)?;
//! carved.image.save("castle-narrow.png")?;
//! carved.overlay.save("castle-seams.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use image::{ImageBuffer, Pixel};

mod ternary;

pub mod energy;
pub mod error;
pub mod seam;
pub mod seamcarver;
pub mod seamfinder;
pub mod twodmap;

pub use energy::{build_energy, energy_to_image, EnergyMap};
pub use error::{Error, Result};
pub use seam::Seam;
pub use seamcarver::{
    default_mark, paint_seam, remove_n_seams, remove_vertical_seam, Carved, SeamCarver,
};
pub use seamfinder::{find_vertical_seam, SeamLattice};
pub use twodmap::TwoDimensionalMap;

/// An owned, row-major pixel buffer: the working image, the overlay,
/// and every result this crate hands back.
pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
