pub const WINDOW_WIDTH: u32 = 500;
pub const WINDOW_HEIGHT: u32 = 800;

pub const BIRD_START_X: f32 = 230.0;
pub const BIRD_START_Y: f32 = 350.0;
pub const JUMP_VELOCITY: f32 = -10.5;
pub const GRAVITY: f32 = 1.5;
pub const TERMINAL_DISPLACEMENT: f32 = 16.0;
pub const RISE_BIAS: f32 = 2.0;
pub const MAX_ROTATION: f32 = 25.0;
pub const MIN_ROTATION: f32 = -90.0;
pub const ROTATION_VELOCITY: f32 = 20.0;
pub const NOSE_DIVE_TILT: f32 = -80.0;
pub const TILT_HOLD_HEIGHT: f32 = 50.0;
// Ticks each bird frame stays on screen.
pub const ANIMATION_TIME: u32 = 5;

pub const PIPE_VELOCITY: f32 = 5.0;
pub const PIPE_GAP: i32 = 200;
pub const PIPE_MIN_HEIGHT: i32 = 50;
pub const PIPE_MAX_HEIGHT: i32 = 450;
pub const PIPE_FIRST_X: f32 = 700.0;
pub const PIPE_SPAWN_X: f32 = 600.0;

pub const BASE_VELOCITY: f32 = 5.0;
pub const BASE_Y: f32 = 730.0;

pub const CEILING: f32 = -50.0;

// Alpha above this counts as solid in a collision mask.
pub const MASK_THRESHOLD: u8 = 127;
