use std::{collections::HashMap, fmt::Debug, path::PathBuf};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{
    de::{self, Deserializer},
    Deserialize,
};

use crate::{
    action::{Action, ActionState, Command, GameAction, HomeAction},
    constants::game,
    pages::PageId,
};

const CONFIG: &str = include_str!("../.config/config.yaml");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub game: GameConfig,
}

impl Config {
    pub fn new() -> Result<Self> {
        let default_config: Config = serde_yaml::from_str(CONFIG)?;
        let data_dir = crate::utils::get_data_dir();
        let config_dir = crate::utils::get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("_data_dir", data_dir.display().to_string())?
            .set_default("_config_dir", config_dir.display().to_string())?;

        let config_files = [("config.yaml", config::FileFormat::Yaml)];
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            log::info!("No user configuration found in {}, using defaults", config_dir.display());
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        for (scope, default_bindings) in default_config.keybindings.pages.iter() {
            let user_bindings = cfg.keybindings.pages.entry(scope.clone()).or_default();
            for (key, action) in default_bindings.iter() {
                user_bindings.entry(*key).or_insert_with(|| action.clone());
            }
        }
        let user_bindings = &mut cfg.keybindings.global;
        for (key, action) in default_config.keybindings.global.iter() {
            user_bindings.entry(*key).or_insert_with(|| action.clone());
        }

        Ok(cfg)
    }
}

/// Tuning for the whole round. Every value can be overridden from the
/// `game` section of the user configuration.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u32,
    pub height: u32,
    pub bird: BirdConfig,
    pub pipe: PipeConfig,
    pub base: BaseConfig,
    /// Leaving the playfield above this y ends the round.
    pub ceiling: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: game::WINDOW_WIDTH,
            height: game::WINDOW_HEIGHT,
            bird: BirdConfig::default(),
            pipe: PipeConfig::default(),
            base: BaseConfig::default(),
            ceiling: game::CEILING,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub terminal_displacement: f32,
    pub rise_bias: f32,
    pub max_rotation: f32,
    pub min_rotation: f32,
    pub rotation_velocity: f32,
    pub nose_dive_tilt: f32,
    pub tilt_hold_height: f32,
    pub animation_time: u32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            start_x: game::BIRD_START_X,
            start_y: game::BIRD_START_Y,
            jump_velocity: game::JUMP_VELOCITY,
            gravity: game::GRAVITY,
            terminal_displacement: game::TERMINAL_DISPLACEMENT,
            rise_bias: game::RISE_BIAS,
            max_rotation: game::MAX_ROTATION,
            min_rotation: game::MIN_ROTATION,
            rotation_velocity: game::ROTATION_VELOCITY,
            nose_dive_tilt: game::NOSE_DIVE_TILT,
            tilt_hold_height: game::TILT_HOLD_HEIGHT,
            animation_time: game::ANIMATION_TIME,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    pub velocity: f32,
    pub gap: i32,
    pub min_height: i32,
    pub max_height: i32,
    pub first_x: f32,
    pub spawn_x: f32,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            velocity: game::PIPE_VELOCITY,
            gap: game::PIPE_GAP,
            min_height: game::PIPE_MIN_HEIGHT,
            max_height: game::PIPE_MAX_HEIGHT,
            first_x: game::PIPE_FIRST_X,
            spawn_x: game::PIPE_SPAWN_X,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub velocity: f32,
    pub y: f32,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self { velocity: game::BASE_VELOCITY, y: game::BASE_Y }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawScopeKeyBindings {
    pub click: Option<HashMap<String, String>>,
    pub hold: Option<HashMap<String, String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawKeyBindings {
    #[serde(default)]
    pub global: RawScopeKeyBindings,
    #[serde(default)]
    pub pages: HashMap<String, RawScopeKeyBindings>,
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct PageKeyBindings(pub HashMap<KeyEvent, Action>);

#[derive(Clone, Debug, Default)]
pub struct KeyBindings {
    pub global: PageKeyBindings,
    pub pages: HashMap<PageId, PageKeyBindings>,
}

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawKeyBindings::deserialize(deserializer)?;

        let global = parse_scope_keybindings::<Command>(&raw.global).map_err(de::Error::custom)?;
        let global = PageKeyBindings(
            global.into_iter().map(|(event, (command, state))| (event, Action { command, state })).collect(),
        );

        let mut pages = HashMap::new();
        for (page, bindings) in raw.pages {
            let (page_id, bindings) = parse_page_keybindings(&page, &bindings).map_err(de::Error::custom)?;
            pages.insert(page_id, bindings);
        }

        Ok(KeyBindings { global, pages })
    }
}

/// Page scopes name their own action enum; wrap each into the matching
/// `Command` variant.
fn parse_page_keybindings(page: &str, raw: &RawScopeKeyBindings) -> Result<(PageId, PageKeyBindings), String> {
    let page_id: PageId = serde_yaml::from_str(page).map_err(|e| format!("Unknown page `{page}`: {e}"))?;
    let map = match page_id {
        PageId::Home => parse_scope_keybindings::<HomeAction>(raw)?
            .into_iter()
            .map(|(event, (action, state))| (event, Action { command: Command::Home(action), state }))
            .collect(),
        PageId::Game => parse_scope_keybindings::<GameAction>(raw)?
            .into_iter()
            .map(|(event, (action, state))| (event, Action { command: Command::Game(action), state }))
            .collect(),
    };
    Ok((page_id, PageKeyBindings(map)))
}

fn parse_binding_pairs<T>(map: &Option<HashMap<String, String>>) -> Result<HashMap<KeyEvent, T>, String>
where
    T: for<'de> Deserialize<'de>,
{
    let Some(inner_map) = map else {
        return Ok(HashMap::new());
    };
    inner_map
        .iter()
        .map(|(key_str, action_str)| {
            let action: T =
                serde_yaml::from_str(action_str).map_err(|e| format!("Unknown action `{action_str}`: {e}"))?;
            Ok((parse_key_event(key_str)?, action))
        })
        .collect()
}

fn parse_scope_keybindings<T>(raw: &RawScopeKeyBindings) -> Result<HashMap<KeyEvent, (T, ActionState)>, String>
where
    T: for<'de> Deserialize<'de> + Clone + Debug,
{
    let click = parse_binding_pairs::<T>(&raw.click)?;
    let hold = parse_binding_pairs::<T>(&raw.hold)?;

    Ok(merge_keybinding_maps(click, hold))
}

/// A hold binding fires `Start` on press, `Repeat` while held and `End` on
/// release; click bindings only fire on press.
fn merge_keybinding_maps<A: Clone>(
    click: HashMap<KeyEvent, A>,
    hold: HashMap<KeyEvent, A>,
) -> HashMap<KeyEvent, (A, ActionState)> {
    let mut merged: HashMap<KeyEvent, (A, ActionState)> =
        click.into_iter().map(|(event, command)| (event, (command, ActionState::default()))).collect();
    for (mut key_event, action) in hold {
        merged.insert(key_event, (action.clone(), ActionState::Start));
        key_event.kind = KeyEventKind::Release;
        merged.insert(key_event, (action.clone(), ActionState::End));
        key_event.kind = KeyEventKind::Repeat;
        merged.insert(key_event, (action, ActionState::Repeat));
    }

    merged
}

pub fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    if raw.chars().filter(|c| *c == '>').count() != raw.chars().filter(|c| *c == '<').count() {
        return Err(format!("Unable to parse `{}`", raw));
    }
    let raw = if !raw.contains("><") {
        let raw = raw.strip_prefix('<').unwrap_or(raw);
        raw.strip_prefix('>').unwrap_or(raw)
    } else {
        raw
    };
    let raw = raw.trim_start_matches('<').trim_end_matches('>');

    let raw_lower = raw.to_ascii_lowercase();
    let (remaining, modifiers) = extract_modifiers(&raw_lower);
    parse_key_code_with_modifiers(remaining, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
    let mut modifiers = KeyModifiers::empty();
    let mut current = raw;

    loop {
        if let Some(rest) = current.strip_prefix("ctrl-") {
            modifiers.insert(KeyModifiers::CONTROL);
            current = rest;
        } else if let Some(rest) = current.strip_prefix("alt-") {
            modifiers.insert(KeyModifiers::ALT);
            current = rest;
        } else if let Some(rest) = current.strip_prefix("shift-") {
            modifiers.insert(KeyModifiers::SHIFT);
            current = rest;
        } else {
            break;
        }
    }

    (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, mut modifiers: KeyModifiers) -> Result<KeyEvent, String> {
    let c = match raw {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "backtab" => {
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        },
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "hyphen" | "minus" => KeyCode::Char('-'),
        "tab" => KeyCode::Tab,
        f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
            Ok(n) if (1..=12).contains(&n) => KeyCode::F(n),
            _ => return Err(format!("Unable to parse {raw}")),
        },
        c if c.chars().count() == 1 => {
            let Some(mut c) = c.chars().next() else {
                return Err(format!("Unable to parse {raw}"));
            };
            if modifiers.contains(KeyModifiers::SHIFT) {
                c = c.to_ascii_uppercase();
            }
            KeyCode::Char(c)
        },
        _ => return Err(format!("Unable to parse {raw}")),
    };
    Ok(KeyEvent::new(c, modifiers))
}

/// Inverse of [`parse_key_event`], used by the help overlay.
pub fn key_event_to_string(key_event: &KeyEvent) -> String {
    let char;
    let key_code = match key_event.code {
        KeyCode::Backspace => "backspace",
        KeyCode::Enter => "enter",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Tab => "tab",
        KeyCode::BackTab => "backtab",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::F(c) => {
            char = format!("f{c}");
            &char
        },
        KeyCode::Char(' ') => "space",
        KeyCode::Char(c) => {
            char = c.to_ascii_lowercase().to_string();
            &char
        },
        KeyCode::Esc => "esc",
        _ => "",
    };

    let mut modifiers = Vec::with_capacity(3);

    if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
        modifiers.push("ctrl");
    }

    if key_event.modifiers.intersects(KeyModifiers::ALT) {
        modifiers.push("alt");
    }

    if key_event.modifiers.intersects(KeyModifiers::SHIFT) && key_event.code != KeyCode::BackTab {
        modifiers.push("shift");
    }

    let mut key = modifiers.join("-");

    if !key.is_empty() {
        key.push('-');
    }
    key.push_str(key_code);

    key
}
