use image::{Rgba, RgbaImage};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::pages::game::object::Object;

const UPPER_HALF_BLOCK: &str = "▀";

/// Off-screen frame the game draws into before it is shown.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])) }
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 255]);
        }
    }

    pub fn blit<T: Object + ?Sized>(&mut self, object: &T) {
        object.draw(&mut self.image);
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn view(&self) -> CanvasView<'_> {
        CanvasView::new(&self.image)
    }
}

/// Shows an image in the terminal, two pixels per cell.
///
/// The image is scaled uniformly with nearest-neighbour sampling so it fits
/// the area, and centred in it. Each cell prints an upper half block whose
/// foreground is the upper pixel and background the lower one.
#[derive(Debug, Clone, Copy)]
pub struct CanvasView<'a> {
    image: &'a RgbaImage,
}

impl<'a> CanvasView<'a> {
    pub fn new(image: &'a RgbaImage) -> Self {
        Self { image }
    }

    /// Scale factor and the size of the scaled image in pixels.
    fn fit(&self, area: Rect) -> Option<(f32, u32, u32)> {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 || area.width == 0 || area.height == 0 {
            return None;
        }

        let scale = (area.width as f32 / width as f32).min((area.height as f32 * 2.0) / height as f32);
        let scaled_width = ((width as f32 * scale).floor() as u32).clamp(1, area.width as u32);
        let scaled_height = ((height as f32 * scale).floor() as u32).clamp(1, area.height as u32 * 2);
        Some((scale, scaled_width, scaled_height))
    }

    fn sample(&self, scale: f32, x: u32, y: u32) -> Color {
        let (width, height) = self.image.dimensions();
        let src_x = (((x as f32 + 0.5) / scale) as u32).min(width - 1);
        let src_y = (((y as f32 + 0.5) / scale) as u32).min(height - 1);
        let Rgba([r, g, b, _]) = *self.image.get_pixel(src_x, src_y);
        Color::Rgb(r, g, b)
    }
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        let Some((scale, scaled_width, scaled_height)) = self.fit(area) else {
            return;
        };

        let columns = scaled_width as u16;
        let rows = scaled_height.div_ceil(2) as u16;
        let left = area.x + (area.width - columns) / 2;
        let top = area.y + (area.height - rows) / 2;

        for row in 0..rows {
            let upper = row as u32 * 2;
            let lower = upper + 1;
            for column in 0..columns {
                let fg = self.sample(scale, column as u32, upper);
                let bg = if lower < scaled_height { self.sample(scale, column as u32, lower) } else { Color::Reset };
                buf[(left + column, top + row)].set_symbol(UPPER_HALF_BLOCK).set_fg(fg).set_bg(bg);
            }
        }
    }
}
