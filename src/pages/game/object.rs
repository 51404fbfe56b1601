use std::borrow::Cow;

use image::{imageops, RgbaImage};

use crate::sprite::Mask;

/// Anything that is blitted to the canvas and can take part in a collision.
pub trait Object {
    /// Top-left corner of the image on the canvas.
    fn get_pos(&self) -> (i32, i32);
    fn get_image(&self) -> &RgbaImage;

    /// Recomputed from the current image unless the implementor keeps one.
    fn get_mask(&self) -> Cow<'_, Mask> {
        Cow::Owned(Mask::from_image(self.get_image()))
    }

    fn draw(&self, canvas: &mut RgbaImage) {
        let (x, y) = self.get_pos();
        imageops::overlay(canvas, self.get_image(), x as i64, y as i64);
    }

    /// Pixel-accurate test: the masks are compared at the offset between the
    /// two image origins.
    fn collides_with<T: Object + ?Sized>(&self, other: &T) -> bool {
        let (self_x, self_y) = self.get_pos();
        let (other_x, other_y) = other.get_pos();
        let offset = (other_x - self_x, other_y - self_y);

        self.get_mask().overlap(&other.get_mask(), offset).is_some()
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    struct Block {
        pos: (i32, i32),
        image: RgbaImage,
    }

    impl Object for Block {
        fn get_pos(&self) -> (i32, i32) {
            self.pos
        }

        fn get_image(&self) -> &RgbaImage {
            &self.image
        }
    }

    fn block(x: i32, y: i32, w: u32, h: u32) -> Block {
        Block { pos: (x, y), image: RgbaImage::from_pixel(w, h, Rgba([255, 0, 255, 255])) }
    }

    #[test]
    fn test_collides_uses_relative_offset() {
        let a = block(100, 100, 10, 10);
        assert!(a.collides_with(&block(109, 109, 5, 5)));
        assert!(!a.collides_with(&block(110, 100, 5, 5)));
        assert!(block(109, 109, 5, 5).collides_with(&a));
    }

    #[test]
    fn test_draw_clips_to_canvas() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        block(2, -1, 5, 2).draw(&mut canvas);
        assert_eq!(canvas.get_pixel(2, 0), &Rgba([255, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(3, 0), &Rgba([255, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(1, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(2, 1), &Rgba([0, 0, 0, 255]));
    }
}
