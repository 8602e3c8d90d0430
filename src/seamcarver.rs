// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The main loop
//!
//! Remove seams one at a time: build the energy map of the working
//! image, find its cheapest seam, paint the seam onto the overlay, cut
//! it out of the working image.  The energy map is rebuilt from scratch
//! on every pass, since cutting a seam changes the gradients on both
//! sides of it.

use crate::energy::build_energy;
use crate::error::{ensure_not_empty, Error, Result};
use crate::seam::Seam;
use crate::seamfinder::find_vertical_seam;
use crate::Image;
use image::{GenericImageView, ImageBuffer, Pixel, Primitive};
use num_traits::Zero;

/// Cut the seam out of the image, shifting every pixel to its right one
/// column left.  The image comes back one column narrower.
///
/// The buffer is reused: each row is compacted in place and the tail
/// truncated, so no second image is allocated.
pub fn remove_vertical_seam<P: Pixel>(image: Image<P>, seam: &Seam) -> Result<Image<P>> {
    let (width, height) = image.dimensions();
    ensure_not_empty((width, height))?;
    seam.check_fits((width, height))?;

    let channels = usize::from(P::CHANNEL_COUNT);
    let row_len = width as usize * channels;
    let mut samples = image.into_raw();
    let mut write = 0;
    for (y, &column) in seam.columns().iter().enumerate() {
        let row = y * row_len;
        let cut = row + column as usize * channels;
        let end = row + row_len;
        samples.copy_within(row..cut, write);
        write += cut - row;
        samples.copy_within(cut + channels..end, write);
        write += end - cut - channels;
    }
    samples.truncate(write);

    ImageBuffer::from_raw(width - 1, height, samples).ok_or(Error::InvalidDimensions {
        expected: (width - 1, height),
        actual: (width, height),
    })
}

/// Paint every pixel of the seam in `mark`, touching nothing else.
///
/// The overlay keeps the original's width while the working image
/// shrinks, so a seam found on a narrowed image lands where its column
/// indices fall on the full-width overlay, not where its pixels came
/// from in the original.  That drift is accepted; the overlay is a
/// picture of where the carver cut, not a map of the source.
pub fn paint_seam<P: Pixel>(overlay: &mut Image<P>, seam: &Seam, mark: P) -> Result<()> {
    seam.check_fits(overlay.dimensions())?;
    for (x, y) in seam.pixels() {
        overlay.put_pixel(x, y, mark);
    }
    Ok(())
}

/// The default seam colour: full-saturation green for colour pixels,
/// with any alpha opaque, and full white for grey ones.
pub fn default_mark<P: Pixel>() -> P {
    let mut channels = vec![P::Subpixel::DEFAULT_MAX_VALUE; usize::from(P::CHANNEL_COUNT)];
    if channels.len() >= 3 {
        channels[0] = P::Subpixel::zero();
        channels[2] = P::Subpixel::zero();
    }
    *P::from_slice(&channels)
}

/// What a carve hands back.
#[derive(Clone)]
pub struct Carved<P: Pixel> {
    /// The narrowed image.
    pub image: Image<P>,
    /// The original, full width, with every removed seam painted on it.
    pub overlay: Image<P>,
    /// The seams in the order they were removed, each in the column
    /// coordinates of the image it was removed from.
    pub seams: Vec<Seam>,
}

/// A struct for holding the image to be carved, and the colour to paint
/// its seams.
pub struct SeamCarver<'a, I, P>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
{
    image: &'a I,
    mark: P,
}

impl<'a, I, P> SeamCarver<'a, I, P>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
{
    /// Creates a new SeamCarver with an image to be carved, painting
    /// seams in [`default_mark`].
    pub fn new(image: &'a I) -> Self {
        Self {
            image,
            mark: default_mark(),
        }
    }

    /// Paint seams on the overlay in this colour instead.
    pub fn with_mark(mut self, mark: P) -> Self {
        self.mark = mark;
        self
    }

    /// Remove `seams` vertical seams, one at a time.
    ///
    /// At least one column must survive: asking for as many seams as
    /// the image has columns, or more, is `InvalidSeamCount`.  Zero
    /// seams returns a copy of the image and an unpainted overlay.  Any
    /// failure part way through aborts the whole carve.
    pub fn carve(&self, seams: u32) -> Result<Carved<P>> {
        let (width, height) = self.image.dimensions();
        ensure_not_empty((width, height))?;
        if seams >= width {
            return Err(Error::InvalidSeamCount {
                requested: seams,
                width,
            });
        }

        // Initialize the scratch space.
        let mut scratch = Image::<P>::new(width, height);
        self.image
            .pixels()
            .for_each(|(x, y, pixel)| scratch.put_pixel(x, y, pixel));
        let mut overlay = scratch.clone();
        let mut removed = Vec::with_capacity(seams as usize);

        for index in 1..=seams {
            let energy = build_energy(&scratch)?;
            let seam = find_vertical_seam(&scratch, &energy)?;
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "seam {}/{}: cost {}, {} columns left",
                    index,
                    seams,
                    seam.cost(&energy)?,
                    scratch.width() - 1
                );
            }
            paint_seam(&mut overlay, &seam, self.mark)?;
            scratch = remove_vertical_seam(scratch, &seam)?;
            removed.push(seam);
        }

        log::info!(
            "carved {}x{} down to {}x{}",
            width,
            height,
            scratch.width(),
            scratch.height()
        );
        Ok(Carved {
            image: scratch,
            overlay,
            seams: removed,
        })
    }
}

/// A convenience wrapper: remove `seams` vertical seams from an image,
/// painting them on the overlay in [`default_mark`].
pub fn remove_n_seams<I, P>(image: &I, seams: u32) -> Result<Carved<P>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
{
    SeamCarver::new(image).carve(seams)
}
