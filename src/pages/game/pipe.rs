use std::{borrow::Cow, sync::Arc};

use image::RgbaImage;
use rand::Rng;

use crate::{assets::Assets, config::PipeConfig, pages::game::object::Object, sprite::Mask};

/// A pair of pipes sharing one x, with a fixed gap between them.
#[derive(Debug, Clone)]
pub struct Pipe {
    config: PipeConfig,
    assets: Arc<Assets>,
    x: f32,
    height: i32,
    top: i32,
    bottom: i32,
    pub passed: bool,
}

/// One half of a pipe, borrowed from the shared sprites.
pub struct PipeSegment<'a> {
    pos: (i32, i32),
    image: &'a RgbaImage,
    mask: &'a Mask,
}

impl Pipe {
    pub fn new<R: Rng + ?Sized>(x: f32, config: PipeConfig, assets: Arc<Assets>, rng: &mut R) -> Self {
        let height = if config.min_height < config.max_height {
            rng.gen_range(config.min_height..config.max_height)
        } else {
            config.min_height
        };
        Self::with_height(x, height, config, assets)
    }

    pub fn with_height(x: f32, height: i32, config: PipeConfig, assets: Arc<Assets>) -> Self {
        let top = height - assets.pipe_flipped.height() as i32;
        let bottom = height + config.gap;
        Pipe { config, assets, x, height, top, bottom, passed: false }
    }

    pub fn advance(&mut self) {
        self.x -= self.config.velocity;
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    /// Where the gap opens, measured from the top of the canvas.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> u32 {
        self.assets.pipe.width()
    }

    pub fn is_offscreen(&self) -> bool {
        self.x + (self.width() as f32) < 0.0
    }

    pub fn top_segment(&self) -> PipeSegment<'_> {
        PipeSegment {
            pos: (self.x.round() as i32, self.top),
            image: &self.assets.pipe_flipped,
            mask: &self.assets.pipe_flipped_mask,
        }
    }

    pub fn bottom_segment(&self) -> PipeSegment<'_> {
        PipeSegment {
            pos: (self.x.round() as i32, self.bottom),
            image: &self.assets.pipe,
            mask: &self.assets.pipe_mask,
        }
    }

    pub fn segments(&self) -> [PipeSegment<'_>; 2] {
        [self.top_segment(), self.bottom_segment()]
    }

    pub fn collides_with<T: Object + ?Sized>(&self, object: &T) -> bool {
        self.segments().iter().any(|segment| object.collides_with(segment))
    }

    pub fn draw(&self, canvas: &mut RgbaImage) {
        for segment in self.segments() {
            segment.draw(canvas);
        }
    }
}

impl Object for PipeSegment<'_> {
    fn get_pos(&self) -> (i32, i32) {
        self.pos
    }

    fn get_image(&self) -> &RgbaImage {
        self.image
    }

    fn get_mask(&self) -> Cow<'_, Mask> {
        Cow::Borrowed(self.mask)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{config::BirdConfig, pages::game::bird::Bird};

    fn assets() -> Arc<Assets> {
        Arc::new(Assets::new())
    }

    #[test]
    fn test_gap_invariant() {
        let assets = assets();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let pipe = Pipe::new(700.0, PipeConfig::default(), assets.clone(), &mut rng);
            assert!((50..450).contains(&pipe.height()));
            assert_eq!(pipe.bottom() - (pipe.top() + 640), 200);
            assert!(pipe.bottom() > pipe.top());
        }
    }

    #[test]
    fn test_same_seed_same_heights() {
        let assets = assets();
        let heights = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| Pipe::new(0.0, PipeConfig::default(), assets.clone(), &mut rng).height())
                .collect::<Vec<_>>()
        };
        assert_eq!(heights(9), heights(9));
    }

    #[test]
    fn test_advance_and_offscreen() {
        let mut pipe = Pipe::with_height(0.0, 200, PipeConfig::default(), assets());
        pipe.advance();
        assert_eq!(pipe.x(), -5.0);
        for _ in 0..19 {
            pipe.advance();
        }
        // x + 104 == 4
        assert_eq!(pipe.x(), -100.0);
        assert!(!pipe.is_offscreen());
        pipe.advance();
        assert!(pipe.is_offscreen());
    }

    #[test]
    fn test_bird_inside_top_pipe_collides() {
        let assets = assets();
        let mut pipe = Pipe::with_height(200.0, 300, PipeConfig::default(), assets.clone());
        let mut bird = Bird::new(BirdConfig::default(), assets);
        // Pipe body spans x 204..300, top sprite ends at y 300.
        bird.set_y(150.0);
        pipe.x = 200.0;
        assert!(pipe.collides_with(&bird));

        pipe.x = 10_200.0;
        assert!(!pipe.collides_with(&bird));
        bird.set_y(10_150.0);
        pipe.x = 200.0;
        assert!(!pipe.collides_with(&bird));
    }

    #[test]
    fn test_bird_on_bottom_pipe_collides() {
        let assets = assets();
        let pipe = Pipe::with_height(200.0, 100, PipeConfig::default(), assets.clone());
        let mut bird = Bird::new(BirdConfig::default(), assets);
        bird.set_y(pipe.bottom() as f32 + 10.0);
        assert!(pipe.collides_with(&bird));
    }

    #[test]
    fn test_bird_in_gap_never_collides() {
        let assets = assets();
        let mut bird = Bird::new(BirdConfig::default(), assets.clone());
        let pipe = Pipe::with_height(900.0, 250, PipeConfig::default(), assets.clone());
        let centred = Pipe::with_height(200.0, 250, PipeConfig::default(), assets);
        // Gap 250..450, the rotated bird stays under 90 px tall.
        bird.set_y(316.0);
        for tilt in [25.0, 5.0, -15.0, -35.0, -55.0, -75.0, -90.0] {
            bird.force_tilt(tilt);
            assert!(!pipe.collides_with(&bird), "far pipe, tilt {tilt}");
            assert!(!centred.collides_with(&bird), "centred pipe, tilt {tilt}");
        }
    }

    #[test]
    fn test_draw_leaves_gap_clear() {
        let pipe = Pipe::with_height(0.0, 300, PipeConfig::default(), assets());
        let mut canvas = RgbaImage::new(104, 800);
        pipe.draw(&mut canvas);
        // Inside the gap stays untouched.
        assert_eq!(canvas.get_pixel(52, 400)[3], 0);
        assert_eq!(canvas.get_pixel(52, 299)[3], 255);
        assert_eq!(canvas.get_pixel(52, 500)[3], 255);
    }
}
