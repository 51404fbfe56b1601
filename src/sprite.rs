//! Bitmaps and one-bit opacity masks.
//!
//! Sprites are plain [`RgbaImage`]s. A [`Mask`] keeps one flag per pixel
//! (solid or not) and answers overlap queries between two masks placed at an
//! integer offset from each other, which is what the game uses for
//! pixel-accurate collisions.

use image::{Rgba, RgbaImage};

use crate::constants::game::MASK_THRESHOLD;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, bits: vec![false; (width * height) as usize] }
    }

    /// Builds a mask from the alpha channel: pixels with alpha above the
    /// threshold are solid.
    pub fn from_image(image: &RgbaImage) -> Self {
        Self::from_image_with_threshold(image, MASK_THRESHOLD)
    }

    pub fn from_image_with_threshold(image: &RgbaImage, threshold: u8) -> Self {
        let (width, height) = image.dimensions();
        let bits = image.pixels().map(|pixel| pixel[3] > threshold).collect();
        Self { width, height, bits }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        if x < self.width && y < self.height {
            self.bits[(y * self.width + x) as usize] = solid;
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    /// Returns the first solid pixel shared with `other`, in this mask's
    /// coordinates. `offset` is the position of `other`'s top-left corner
    /// relative to this mask's top-left corner.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> Option<(u32, u32)> {
        let (dx, dy) = offset;

        let left = dx.max(0);
        let top = dy.max(0);
        let right = (self.width as i32).min(dx + other.width as i32);
        let bottom = (self.height as i32).min(dy + other.height as i32);
        if left >= right || top >= bottom {
            return None;
        }

        for y in top..bottom {
            for x in left..right {
                if self.get(x as u32, y as u32) && other.get((x - dx) as u32, (y - dy) as u32) {
                    return Some((x as u32, y as u32));
                }
            }
        }
        None
    }
}

/// Rotates `image` counter-clockwise by `degrees`, growing the output so the
/// whole rotated image fits. Uncovered pixels are transparent. Sampling is
/// nearest neighbour so masks stay crisp.
pub fn rotate(image: &RgbaImage, degrees: f32) -> RgbaImage {
    if degrees.rem_euclid(360.0) == 0.0 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let (sin, cos) = degrees.to_radians().sin_cos();
    // Trim float noise so a quarter turn of 6x2 stays 2x6 instead of 3x7.
    let new_width = (width as f32 * cos.abs() + height as f32 * sin.abs() - 1e-3).ceil().max(1.0) as u32;
    let new_height = (width as f32 * sin.abs() + height as f32 * cos.abs() - 1e-3).ceil().max(1.0) as u32;

    let src_cx = width as f32 / 2.0;
    let src_cy = height as f32 / 2.0;
    let dst_cx = new_width as f32 / 2.0;
    let dst_cy = new_height as f32 / 2.0;

    let mut rotated = RgbaImage::from_pixel(new_width, new_height, Rgba([0, 0, 0, 0]));
    for (x, y, pixel) in rotated.enumerate_pixels_mut() {
        // Screen y points down, so a visual counter-clockwise turn maps a
        // destination point back through the transposed matrix.
        let px = x as f32 + 0.5 - dst_cx;
        let py = y as f32 + 0.5 - dst_cy;
        let sx = px * cos - py * sin + src_cx;
        let sy = px * sin + py * cos + src_cy;
        if sx >= 0.0 && sy >= 0.0 && sx < width as f32 && sy < height as f32 {
            *pixel = *image.get_pixel(sx as u32, sy as u32);
        }
    }
    rotated
}
