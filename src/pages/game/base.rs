use std::sync::Arc;

use image::{imageops, RgbaImage};

use crate::{assets::Assets, config::BaseConfig};

/// Scrolling ground made of two copies of the base tile laid end to end.
#[derive(Debug, Clone)]
pub struct Base {
    assets: Arc<Assets>,
    velocity: f32,
    y: f32,
    width: f32,
    x1: f32,
    x2: f32,
}

impl Base {
    pub fn new(config: BaseConfig, assets: Arc<Assets>) -> Self {
        let width = assets.base.width() as f32;
        Base { velocity: config.velocity, y: config.y, width, x1: 0.0, x2: width, assets }
    }

    /// Scrolls both tiles left and moves any tile that left the screen behind
    /// the other one.
    pub fn advance(&mut self) {
        self.x1 -= self.velocity;
        self.x2 -= self.velocity;

        if self.x1 + self.width < 0.0 {
            self.x1 = self.x2 + self.width;
        }
        if self.x2 + self.width < 0.0 {
            self.x2 = self.x1 + self.width;
        }
    }

    pub fn offsets(&self) -> (f32, f32) {
        (self.x1, self.x2)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Top edge of the ground.
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn draw(&self, canvas: &mut RgbaImage) {
        for x in [self.x1, self.x2] {
            imageops::overlay(canvas, &self.assets.base, x.round() as i64, self.y.round() as i64);
        }
    }
}
