pub mod game;
pub mod home;

pub use home::TITLE_TEXT;
