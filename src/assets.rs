//! Sprite registry.
//!
//! All bitmaps are drawn in code at the classic low resolution and then
//! doubled with nearest-neighbour scaling, so the registry is built once at
//! startup and shared read-only behind an `Arc`.

use image::{
    imageops::{self, FilterType},
    Rgba, RgbaImage,
};

use crate::sprite::Mask;

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const OUTLINE: Rgba<u8> = Rgba([83, 56, 70, 255]);

const BIRD_BODY: Rgba<u8> = Rgba([245, 200, 66, 255]);
const BIRD_BELLY: Rgba<u8> = Rgba([255, 225, 100, 255]);
const BIRD_WING: Rgba<u8> = Rgba([215, 165, 35, 255]);
const BIRD_EYE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BIRD_PUPIL: Rgba<u8> = Rgba([20, 20, 20, 255]);
const BIRD_BEAK: Rgba<u8> = Rgba([225, 75, 35, 255]);

const PIPE_DARK: Rgba<u8> = Rgba([74, 122, 26, 255]);
const PIPE_MID: Rgba<u8> = Rgba([100, 170, 40, 255]);
const PIPE_LIGHT: Rgba<u8> = Rgba([145, 215, 62, 255]);

const SKY_TOP: Rgba<u8> = Rgba([70, 180, 200, 255]);
const SKY_BOTTOM: Rgba<u8> = Rgba([190, 232, 245, 255]);
const CLOUD: Rgba<u8> = Rgba([234, 252, 219, 255]);
const CITY: Rgba<u8> = Rgba([160, 210, 190, 255]);
const BUSH: Rgba<u8> = Rgba([95, 175, 55, 255]);

const GRASS: Rgba<u8> = Rgba([84, 168, 55, 255]);
const GRASS_LIGHT: Rgba<u8> = Rgba([110, 200, 70, 255]);
const DIRT: Rgba<u8> = Rgba([222, 216, 149, 255]);

/// Wing row per animation frame: up, level, down.
const WING_ROWS: [u32; 3] = [8, 11, 14];

#[derive(Debug, Clone)]
pub struct Assets {
    pub bird_frames: [RgbaImage; 3],
    pub pipe: RgbaImage,
    pub pipe_flipped: RgbaImage,
    pub pipe_mask: Mask,
    pub pipe_flipped_mask: Mask,
    pub background: RgbaImage,
    pub base: RgbaImage,
}

impl Assets {
    pub fn new() -> Self {
        let bird_frames = WING_ROWS.map(|row| scale2x(&draw_bird(row)));
        let pipe = scale2x(&draw_pipe());
        let pipe_flipped = imageops::flip_vertical(&pipe);
        let pipe_mask = Mask::from_image(&pipe);
        let pipe_flipped_mask = Mask::from_image(&pipe_flipped);

        Self {
            bird_frames,
            pipe,
            pipe_flipped,
            pipe_mask,
            pipe_flipped_mask,
            background: scale2x(&draw_background()),
            base: scale2x(&draw_base()),
        }
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self::new()
    }
}

fn scale2x(image: &RgbaImage) -> RgbaImage {
    imageops::resize(image, image.width() * 2, image.height() * 2, FilterType::Nearest)
}

fn fill_rect(image: &mut RgbaImage, x: i32, y: i32, w: i32, h: i32, color: Rgba<u8>) {
    for py in y.max(0)..(y + h).min(image.height() as i32) {
        for px in x.max(0)..(x + w).min(image.width() as i32) {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn fill_ellipse(image: &mut RgbaImage, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgba<u8>) {
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = (x as f32 + 0.5 - cx) / rx;
        let dy = (y as f32 + 0.5 - cy) / ry;
        if dx * dx + dy * dy <= 1.0 {
            *pixel = color;
        }
    }
}

fn lerp(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let mix = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;
    Rgba([mix(0), mix(1), mix(2), 255])
}

// 34x24
fn draw_bird(wing_row: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(34, 24, CLEAR);

    fill_ellipse(&mut image, 16.0, 12.0, 13.0, 10.5, OUTLINE);
    fill_ellipse(&mut image, 16.0, 12.0, 12.0, 9.5, BIRD_BODY);
    fill_ellipse(&mut image, 17.0, 16.0, 8.0, 4.0, BIRD_BELLY);

    fill_ellipse(&mut image, 23.0, 8.0, 5.0, 5.0, OUTLINE);
    fill_ellipse(&mut image, 23.0, 8.0, 4.0, 4.0, BIRD_EYE);
    fill_rect(&mut image, 24, 6, 2, 3, BIRD_PUPIL);

    fill_rect(&mut image, 24, 13, 10, 6, OUTLINE);
    fill_rect(&mut image, 25, 14, 8, 2, BIRD_BEAK);
    fill_rect(&mut image, 25, 17, 7, 1, BIRD_BEAK);

    let wing_y = wing_row as f32 + 0.5;
    fill_ellipse(&mut image, 8.0, wing_y, 7.0, 4.0, OUTLINE);
    fill_ellipse(&mut image, 8.0, wing_y, 6.0, 3.0, BIRD_WING);

    image
}

// 52x320, cap at the top like the upright bottom pipe.
fn draw_pipe() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(52, 320, CLEAR);

    for x in 2..50 {
        let t = (x - 2) as f32 / 47.0;
        let color = if t < 0.15 {
            PIPE_DARK
        } else if t < 0.45 {
            lerp(PIPE_MID, PIPE_LIGHT, (t - 0.15) / 0.3)
        } else {
            lerp(PIPE_LIGHT, PIPE_DARK, (t - 0.45) / 0.55)
        };
        fill_rect(&mut image, x, 0, 1, 320, color);
    }
    fill_rect(&mut image, 2, 0, 1, 320, OUTLINE);
    fill_rect(&mut image, 49, 0, 1, 320, OUTLINE);

    fill_rect(&mut image, 0, 0, 52, 24, OUTLINE);
    fill_rect(&mut image, 1, 1, 50, 22, PIPE_MID);
    fill_rect(&mut image, 4, 1, 10, 22, PIPE_LIGHT);
    fill_rect(&mut image, 40, 1, 10, 22, PIPE_DARK);

    image
}

// 288x512
fn draw_background() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(288, 512, SKY_TOP);
    for y in 0..512u32 {
        let color = lerp(SKY_TOP, SKY_BOTTOM, y as f32 / 511.0);
        fill_rect(&mut image, 0, y as i32, 288, 1, color);
    }

    let clouds = [
        (30.0, 380.0, 26.0),
        (80.0, 372.0, 32.0),
        (150.0, 385.0, 24.0),
        (215.0, 375.0, 34.0),
        (270.0, 382.0, 25.0),
    ];
    for (cx, cy, r) in clouds {
        fill_ellipse(&mut image, cx, cy, r, r * 0.7, CLOUD);
    }
    fill_rect(&mut image, 0, 382, 288, 30, CLOUD);

    let towers = [
        (4, 22, 40),
        (30, 16, 58),
        (50, 26, 34),
        (82, 18, 62),
        (104, 24, 44),
        (134, 14, 52),
        (152, 30, 38),
        (190, 20, 56),
        (214, 28, 36),
        (246, 16, 60),
        (266, 22, 42),
    ];
    for (x, w, h) in towers {
        fill_rect(&mut image, x, 420 - h, w, h, CITY);
    }
    fill_rect(&mut image, 0, 420, 288, 10, CITY);

    for cx in (0..=288).step_by(24) {
        fill_ellipse(&mut image, cx as f32, 438.0, 16.0, 14.0, BUSH);
    }
    fill_rect(&mut image, 0, 438, 288, 74, BUSH);

    image
}

// 336x112, stripes slanted so scrolling is visible.
fn draw_base() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(336, 112, DIRT);
    fill_rect(&mut image, 0, 0, 336, 2, OUTLINE);
    for x in 0..336 {
        for y in 2..12 {
            let color = if (x + y) % 12 < 6 { GRASS_LIGHT } else { GRASS };
            image.put_pixel(x as u32, y as u32, color);
        }
    }
    fill_rect(&mut image, 0, 12, 336, 2, BIRD_WING);

    image
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sprite_sizes_are_doubled() {
        let assets = Assets::new();
        for frame in &assets.bird_frames {
            assert_eq!(frame.dimensions(), (68, 48));
        }
        assert_eq!(assets.pipe.dimensions(), (104, 640));
        assert_eq!(assets.pipe_flipped.dimensions(), (104, 640));
        assert_eq!(assets.background.dimensions(), (576, 1024));
        assert_eq!(assets.base.dimensions(), (672, 224));
    }

    #[test]
    fn test_flipped_pipe_has_cap_at_bottom() {
        let assets = Assets::new();
        let cap_row = assets.pipe.get_pixel(0, 2);
        assert_eq!(cap_row[3], 255);
        assert_eq!(assets.pipe_flipped.get_pixel(0, 637), cap_row);
        // Body is inset from the cap.
        assert_eq!(assets.pipe_flipped.get_pixel(0, 2)[3], 0);
    }

    #[test]
    fn test_bird_frames_differ_only_in_wing() {
        let assets = Assets::new();
        let [up, level, down] = &assets.bird_frames;
        assert_ne!(up, level);
        assert_ne!(level, down);
        assert_eq!(up.get_pixel(46, 16), level.get_pixel(46, 16));
    }

    #[test]
    fn test_masks_match_images() {
        let assets = Assets::new();
        assert_eq!(assets.pipe_mask, Mask::from_image(&assets.pipe));
        assert!(assets.pipe_mask.get(52, 639));
        assert!(!assets.pipe_mask.get(0, 639));
        let bird = Mask::from_image(&assets.bird_frames[0]);
        assert!(!bird.get(0, 0));
        assert!(bird.get(32, 24));
    }
}
