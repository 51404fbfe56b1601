use std::sync::Arc;

use image::RgbaImage;

use crate::{assets::Assets, config::BirdConfig, pages::game::object::Object, sprite};

/// The player. Vertical motion is a parabola re-derived from the number of
/// ticks since the last jump, so position only depends on where the bird was
/// when it last jumped.
#[derive(Debug, Clone)]
pub struct Bird {
    config: BirdConfig,
    assets: Arc<Assets>,
    x: f32,
    y: f32,
    velocity: f32,
    tilt: f32,
    tick_count: u32,
    height: f32,
    img_count: u32,
    frame: usize,
    image: RgbaImage,
}

impl Bird {
    pub fn new(config: BirdConfig, assets: Arc<Assets>) -> Self {
        let image = assets.bird_frames[0].clone();
        Bird {
            x: config.start_x,
            y: config.start_y,
            velocity: 0.0,
            tilt: 0.0,
            tick_count: 0,
            height: config.start_y,
            img_count: 0,
            frame: 0,
            image,
            config,
            assets,
        }
    }

    pub fn jump(&mut self) {
        self.velocity = self.config.jump_velocity;
        self.tick_count = 0;
        self.height = self.y;
    }

    /// Physics step, once per tick.
    pub fn advance(&mut self) {
        self.tick_count += 1;

        let displacement = self.displacement();
        self.y += displacement;

        let tilt = if displacement < 0.0 || self.y < self.height + self.config.tilt_hold_height {
            self.config.max_rotation
        } else {
            (self.tilt - self.config.rotation_velocity).max(self.config.min_rotation)
        };
        self.set_tilt(tilt);
    }

    /// Vertical displacement for the current tick count.
    pub fn displacement(&self) -> f32 {
        let t = self.tick_count as f32;
        let mut displacement = self.velocity * t + self.config.gravity * t * t;

        if displacement >= self.config.terminal_displacement {
            displacement = self.config.terminal_displacement;
        }
        if displacement < 0.0 {
            displacement -= self.config.rise_bias;
        }
        displacement
    }

    /// Wing animation, once per tick.
    ///
    /// The cycle is up, level, down, level with `animation_time` ticks each.
    /// The counter only resets one tick after the last block ends, so the
    /// level frame is held for one extra tick per cycle.
    pub fn animate(&mut self) {
        let dwell = self.config.animation_time;
        self.img_count += 1;

        let mut frame = self.frame;
        // Saturating so a huge configured dwell only freezes the wings.
        let block = |n: u32| dwell.saturating_mul(n);
        if self.img_count < dwell {
            frame = 0;
        } else if self.img_count < block(2) {
            frame = 1;
        } else if self.img_count < block(3) {
            frame = 2;
        } else if self.img_count < block(4) {
            frame = 1;
        } else if self.img_count == block(4).saturating_add(1) {
            frame = 0;
            self.img_count = 0;
        }

        // Nose dive: glide on the level frame, and resume mid-cycle afterwards.
        if self.tilt <= self.config.nose_dive_tilt {
            frame = 1;
            self.img_count = block(2);
        }

        self.set_frame(frame);
    }

    fn set_tilt(&mut self, tilt: f32) {
        if tilt != self.tilt {
            self.tilt = tilt;
            self.refresh_image();
        }
    }

    fn set_frame(&mut self, frame: usize) {
        if frame != self.frame {
            self.frame = frame;
            self.refresh_image();
        }
    }

    fn refresh_image(&mut self) {
        self.image = sprite::rotate(&self.assets.bird_frames[self.frame], self.tilt);
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// y captured at the last jump.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Bottom edge of the unrotated sprite, used for the ground check.
    pub fn bottom(&self) -> f32 {
        self.y + self.assets.bird_frames[self.frame].height() as f32
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    #[cfg(test)]
    pub(crate) fn force_tilt(&mut self, tilt: f32) {
        self.set_tilt(tilt);
    }
}

impl Object for Bird {
    /// The rotated image stays centred on the unrotated sprite.
    fn get_pos(&self) -> (i32, i32) {
        let base = &self.assets.bird_frames[self.frame];
        let center_x = self.x + base.width() as f32 / 2.0;
        let center_y = self.y.round() + base.height() as f32 / 2.0;
        let x = center_x - self.image.width() as f32 / 2.0;
        let y = center_y - self.image.height() as f32 / 2.0;
        (x.round() as i32, y.round() as i32)
    }

    fn get_image(&self) -> &RgbaImage {
        &self.image
    }
}
