// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! The energy of a pixel is the mean of the absolute horizontal and
//! vertical 3×3 Sobel derivatives of the image's BT.601 luma, each saturated
//! to the 0..=255 range of an 8-bit channel.  Borders are reflected
//! without repeating the edge pixel (`gfedcb|abcdefgh|gfedcba`), so a
//! flat edge has no energy and a one-pixel-wide dimension has no
//! derivative along it.

use crate::error::{ensure_not_empty, Result};
use crate::ternary::cq;
use crate::twodmap::TwoDimensionalMap;
use crate::Image;
use image::{GenericImageView, Luma, Pixel, Primitive};

/// One `u8` of importance per pixel, the same shape as the image it
/// was built from.
pub type EnergyMap = TwoDimensionalMap<u8>;

/// Smoothing weights across the derivative's direction.
const SMOOTH: [i32; 3] = [1, 2, 1];

/// BT.601 luma weights for red, green and blue.
const LUMA: [f64; 3] = [0.299, 0.587, 0.114];

/// Pixel -> grey level, on the 0..=255 scale whatever the subpixel type.
#[inline]
fn intensity<P: Pixel>(p: &P) -> i32 {
    let rgb = p.to_rgb();
    let value: f64 = rgb
        .0
        .iter()
        .zip(LUMA)
        .map(|(&c, weight)| num_traits::cast::<_, f64>(c).unwrap_or(0.0) * weight)
        .sum();
    let max = num_traits::cast::<_, f64>(P::Subpixel::DEFAULT_MAX_VALUE).unwrap_or(255.0);
    (value * 255.0 / max).round().clamp(0.0, 255.0) as i32
}

// Reflect-101 border: -1 maps to 1, len maps to len - 2.  The clamp
// folds both back onto 0 when the dimension is a single pixel wide.
#[inline]
fn reflect_101(i: i64, len: u32) -> u32 {
    let len = i64::from(len);
    let i = cq!(i < 0, -i, cq!(i >= len, 2 * len - 2 - i, i));
    i.clamp(0, len - 1) as u32
}

#[inline]
fn saturate(derivative: i32) -> u32 {
    derivative.unsigned_abs().min(u32::from(u8::MAX))
}

// (a + b) / 2, rounding halves to even.
#[inline]
fn mean(a: u32, b: u32) -> u8 {
    let sum = a + b;
    let half = sum / 2;
    cq!(sum % 2 == 1 && half % 2 == 1, half + 1, half) as u8
}

fn pixel_energy(gray: &TwoDimensionalMap<i32>, x: u32, y: u32) -> u8 {
    let (width, height) = gray.dimensions();
    let (x, y) = (i64::from(x), i64::from(y));
    let (left, right) = (reflect_101(x - 1, width), reflect_101(x + 1, width));
    let (up, down) = (reflect_101(y - 1, height), reflect_101(y + 1, height));

    let (mut gx, mut gy) = (0, 0);
    for (offset, weight) in (-1..=1).zip(SMOOTH) {
        let row = reflect_101(y + offset, height);
        let column = reflect_101(x + offset, width);
        gx += weight * (gray[(right, row)] - gray[(left, row)]);
        gy += weight * (gray[(column, down)] - gray[(column, up)]);
    }
    mean(saturate(gx), saturate(gy))
}

// Image -> Energy Map

/// Compute the energy of every pixel in an image.  This is generic on
/// the image type: colour pixels are reduced to their luma first, and
/// 16-bit or floating point subpixels are rescaled to the 8-bit range,
/// so an image gives the same energy map whatever its storage.
///
/// Pure and deterministic.  Fails with `InvalidDimensions` on an image
/// with no rows or no columns.
pub fn build_energy<I, P>(image: &I) -> Result<EnergyMap>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
{
    let (width, height) = image.dimensions();
    ensure_not_empty((width, height))?;

    let gray = TwoDimensionalMap::from_fn(width, height, |x, y| intensity(&image.get_pixel(x, y)));
    Ok(EnergyMap::from_fn(width, height, |x, y| pixel_energy(&gray, x, y)))
}

/// Render an energy map as a greyscale image, bright where the energy
/// is high.  Useful for seeing what the carver is protecting.
pub fn energy_to_image(energy: &EnergyMap) -> Image<Luma<u8>> {
    let (width, height) = energy.dimensions();
    Image::from_fn(width, height, |x, y| Luma([energy[(x, y)]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    const IMAGE_DATA: [u8; 20] = [9, 9, 0, 9, 9, 9, 1, 9, 8, 9, 9, 9, 9, 9, 0, 9, 9, 9, 0, 9];
    const IMAGE_ENERGY: [u8; 20] = [0, 9, 7, 9, 0, 0, 9, 16, 0, 9, 8, 8, 1, 17, 8, 0, 0, 9, 9, 0];

    fn gray(width: u32, height: u32, data: &[u8]) -> Image<Luma<u8>> {
        ImageBuffer::from_raw(width, height, data.to_vec()).unwrap()
    }

    #[test]
    fn energy_generator_works() {
        let energy = build_energy(&gray(5, 4, &IMAGE_DATA)).unwrap();
        assert_eq!(energy.dimensions(), (5, 4));
        assert_eq!(energy.as_slice(), &IMAGE_ENERGY);
    }

    #[test]
    fn flat_edges_carry_no_energy() {
        let energy = build_energy(&gray(6, 1, &[0, 10, 20, 30, 40, 50])).unwrap();
        assert_eq!(energy.as_slice(), &[0, 40, 40, 40, 40, 0]);
    }

    #[test]
    fn single_column_only_sees_vertical_change() {
        let energy = build_energy(&gray(1, 3, &[50, 0, 200])).unwrap();
        assert_eq!(energy.as_slice(), &[0, 128, 0]);
        let energy = build_energy(&gray(1, 1, &[200])).unwrap();
        assert_eq!(energy.as_slice(), &[0]);
    }

    #[test]
    fn derivatives_saturate_instead_of_wrapping() {
        // A 255 step gives a raw derivative of 1020; it saturates to
        // 255, and the mean with a flat 0 rounds 127.5 to 128.
        let stripe: Vec<u8> = [0, 0, 255, 0, 0].repeat(4);
        let energy = build_energy(&gray(5, 4, &stripe)).unwrap();
        for y in 0..4 {
            assert_eq!(energy.row(y), &[0, 128, 0, 128, 0]);
        }
    }

    #[test]
    fn colour_and_deep_pixels_reduce_to_the_same_grey() {
        let rgb: Image<Rgb<u8>> = ImageBuffer::from_fn(5, 4, |x, y| {
            let v = IMAGE_DATA[(y * 5 + x) as usize];
            Rgb([v, v, v])
        });
        let deep: Image<Luma<u16>> = ImageBuffer::from_fn(5, 4, |x, y| {
            Luma([u16::from(IMAGE_DATA[(y * 5 + x) as usize]) * 257])
        });
        assert_eq!(build_energy(&rgb).unwrap().as_slice(), &IMAGE_ENERGY);
        assert_eq!(build_energy(&deep).unwrap().as_slice(), &IMAGE_ENERGY);
    }

    #[test]
    fn grey_levels_use_bt601_weights() {
        assert_eq!(intensity(&Rgb([255u8, 0, 0])), 76);
        assert_eq!(intensity(&Rgb([0u8, 255, 0])), 150);
        assert_eq!(intensity(&Rgb([0u8, 0, 255])), 29);
        assert_eq!(intensity(&Rgba([0u8, 255, 0, 0])), 150);
        assert_eq!(intensity(&Luma([77u8])), 77);
        assert_eq!(intensity(&Rgb([0.0f32, 1.0, 0.0])), 150);
    }

    #[test]
    fn colour_edges_follow_bt601_luma() {
        // Red (76) beside blue (29): the step in the middle of a 3x1
        // row is 4 * 47 = 188 raw, mean with no vertical change is 94.
        let row: Image<Rgb<u8>> = ImageBuffer::from_fn(3, 1, |x, _| {
            if x == 0 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
        });
        assert_eq!(build_energy(&row).unwrap().as_slice(), &[0, 94, 0]);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let image = gray(5, 4, &IMAGE_DATA);
        assert_eq!(build_energy(&image).unwrap(), build_energy(&image).unwrap());
    }

    #[test]
    fn empty_images_are_rejected() {
        let image: Image<Luma<u8>> = ImageBuffer::new(0, 3);
        assert!(build_energy(&image).is_err());
    }

    #[test]
    fn energy_renders_as_greyscale() {
        let energy = EnergyMap::from_vec(2, 1, vec![3, 250]).unwrap();
        let image = energy_to_image(&energy);
        assert_eq!(image.get_pixel(1, 0), &Luma([250]));
    }
}
