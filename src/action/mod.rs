mod game;
mod home;

use serde::Deserialize;
use strum::Display;

pub use crate::action::{game::GameAction, home::HomeAction};

/// Phase of a key binding: a click only ever produces `Start`, a hold
/// binding produces all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Deserialize, Default)]
pub enum ActionState {
    #[default]
    Start,
    Repeat,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Deserialize)]
pub enum Command {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    ToggleShowHelp,
    StartGame,
    ShowHome,
    // Page commands
    Home(HomeAction),
    Game(GameAction),
}

impl Command {
    /// Human readable name used by the help overlay.
    pub fn describe(&self) -> String {
        match self {
            Command::Home(action) => action.to_string(),
            Command::Game(action) => action.to_string(),
            command => command.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub command: Command,
    pub state: ActionState,
}

macro_rules! act {
    ($command:expr) => {
        $crate::action::Action { command: $command, state: $crate::action::ActionState::default() }
    };
    ($command:expr, $state:expr) => {
        $crate::action::Action { command: $command, state: $state }
    };
}

pub(crate) use act;
