pub mod base;
pub mod bird;
pub mod object;
pub mod pipe;

use std::{collections::HashMap, sync::Arc};

use color_eyre::eyre::Result;
use image::imageops;
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{prelude::*, widgets::*};
use strum::Display;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use super::{Frame, Page, PageId};
use crate::{
    action::{act, Action, ActionState, Command, GameAction},
    assets::Assets,
    components::canvas::Canvas,
    config::{key_event_to_string, GameConfig, PageKeyBindings},
    pages::game::{base::Base, bird::Bird, pipe::Pipe},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum State {
    /// Waiting for the first flap. The ground scrolls and the bird flaps in place.
    Ready,
    Playing,
    Paused,
    Dead,
}

pub struct GamePage {
    pub action_tx: Option<UnboundedSender<Action>>,
    pub keymap: PageKeyBindings,
    config: GameConfig,
    assets: Arc<Assets>,
    rng: StdRng,
    state: State,
    bird: Bird,
    pipes: Vec<Pipe>,
    base: Base,
    canvas: Canvas,
    round: u32,
}

impl GamePage {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Self {
        Self::with_assets(config, Arc::new(Assets::new()), seed)
    }

    pub fn with_assets(config: GameConfig, assets: Arc<Assets>, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pipes = vec![Pipe::new(config.pipe.first_x, config.pipe, assets.clone(), &mut rng)];

        GamePage {
            action_tx: None,
            keymap: PageKeyBindings::default(),
            state: State::Ready,
            bird: Bird::new(config.bird, assets.clone()),
            base: Base::new(config.base, assets.clone()),
            canvas: Canvas::new(config.width, config.height),
            pipes,
            config,
            assets,
            rng,
            round: 0,
        }
    }

    /// Starts a fresh round. The random stream carries on, so rounds differ.
    pub fn reset(&mut self) {
        self.round += 1;
        self.state = State::Ready;
        self.bird = Bird::new(self.config.bird, self.assets.clone());
        self.base = Base::new(self.config.base, self.assets.clone());
        let pipe = self.spawn_pipe(self.config.pipe.first_x);
        self.pipes = vec![pipe];
        info!("Round {} ready", self.round);
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    fn set_state(&mut self, state: State) {
        if self.state != state {
            debug!("Game state {} -> {}", self.state, state);
            self.state = state;
        }
    }

    fn spawn_pipe(&mut self, x: f32) -> Pipe {
        let pipe = Pipe::new(x, self.config.pipe, self.assets.clone(), &mut self.rng);
        debug!("Spawned pipe at x={} with gap at y={}", x, pipe.height());
        pipe
    }

    pub fn jump(&mut self) {
        match self.state {
            State::Ready => {
                self.set_state(State::Playing);
                self.bird.jump();
            },
            State::Playing => self.bird.jump(),
            State::Paused => {},
            State::Dead => self.reset(),
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            State::Playing => self.set_state(State::Paused),
            State::Paused => self.set_state(State::Playing),
            State::Ready | State::Dead => {},
        }
    }

    pub fn tick(&mut self) {
        match self.state {
            State::Ready => {
                self.bird.animate();
                self.base.advance();
            },
            State::Playing => self.step(),
            State::Paused | State::Dead => {},
        }
    }

    fn step(&mut self) {
        self.bird.advance();
        self.bird.animate();

        for pipe in self.pipes.iter_mut() {
            pipe.advance();
        }

        if self.pipes.iter().any(|pipe| pipe.collides_with(&self.bird)) {
            info!("Hit a pipe at y={:.1}", self.bird.y());
            self.set_state(State::Dead);
            return;
        }

        let bird_x = self.bird.x();
        let mut add_pipe = false;
        for pipe in self.pipes.iter_mut().filter(|pipe| !pipe.passed && pipe.x() < bird_x) {
            pipe.passed = true;
            add_pipe = true;
        }
        if add_pipe {
            let pipe = self.spawn_pipe(self.config.pipe.spawn_x);
            self.pipes.push(pipe);
        }
        self.pipes.retain(|pipe| !pipe.is_offscreen());

        self.base.advance();

        if self.bird.bottom() >= self.base.y() {
            info!("Hit the ground");
            self.set_state(State::Dead);
        } else if self.bird.y() < self.config.ceiling {
            info!("Flew off the top");
            self.set_state(State::Dead);
        }
    }

    /// Draws back to front: background, pipes, base, bird.
    pub fn render_canvas(&mut self) -> &Canvas {
        self.canvas.clear();
        imageops::overlay(self.canvas.image_mut(), &self.assets.background, 0, 0);
        for pipe in &self.pipes {
            pipe.draw(self.canvas.image_mut());
        }
        self.base.draw(self.canvas.image_mut());
        self.canvas.blit(&self.bird);
        &self.canvas
    }

    fn key_hint(&self, action: GameAction) -> String {
        self.keymap
            .iter()
            .filter(|(_, bound)| bound.command == Command::Game(action) && bound.state == ActionState::Start)
            .map(|(key, _)| key_event_to_string(key))
            .min()
            .unwrap_or_else(|| action.to_string().to_lowercase())
    }

    fn status(&self) -> Option<String> {
        match self.state {
            State::Ready => Some(format!("Press {} to flap", self.key_hint(GameAction::Jump))),
            State::Playing => None,
            State::Paused => Some(format!("Paused, {} to resume", self.key_hint(GameAction::Pause))),
            State::Dead => Some(format!("Game over, {} to retry", self.key_hint(GameAction::Jump))),
        }
    }
}

impl Page for GamePage {
    fn id(&self) -> PageId {
        PageId::Game
    }

    fn register_keymap(&mut self, keymaps: &HashMap<PageId, PageKeyBindings>) -> Result<()> {
        if let Some(keymap) = keymaps.get(&self.id()) {
            self.keymap = keymap.clone();
        }
        Ok(())
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.reset();
        Ok(())
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action.command {
            Command::Tick => self.tick(),
            Command::Game(command) if action.state == ActionState::Start => match command {
                GameAction::Jump => self.jump(),
                GameAction::Pause => self.toggle_pause(),
                GameAction::Back => return Ok(Some(act!(Command::ShowHome))),
            },
            _ => {},
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        f.render_widget(Clear, rect);
        let canvas = self.render_canvas();
        f.render_widget(canvas.view(), rect);

        if let Some(status) = self.status() {
            let [_, area, _] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(1), Constraint::Fill(3)]).areas(rect);
            let style = Style::default().fg(Color::White).bg(Color::Black).bold();
            let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {status} "), style))).centered();
            f.render_widget(paragraph, area);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::PipeConfig;

    fn page(config: GameConfig) -> GamePage {
        GamePage::new(config, Some(1))
    }

    /// Pipes that never reach the bird's lane.
    fn open_sky() -> GameConfig {
        GameConfig {
            pipe: PipeConfig { gap: 2_000, min_height: 50, max_height: 51, ..PipeConfig::default() },
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_new_round_is_ready() {
        let page = page(GameConfig::default());
        assert_eq!(page.state(), State::Ready);
        assert_eq!(page.pipes().len(), 1);
        assert_eq!(page.pipes()[0].x(), 700.0);
        assert_eq!((page.bird().x(), page.bird().y()), (230.0, 350.0));
    }

    #[test]
    fn test_ready_scrolls_ground_only() {
        let mut page = page(GameConfig::default());
        for _ in 0..10 {
            page.update(act!(Command::Tick)).unwrap();
        }
        assert_eq!(page.bird().y(), 350.0);
        assert_eq!(page.pipes()[0].x(), 700.0);
        assert_eq!(page.base().offsets().0, -50.0);
        assert_eq!(page.bird().frame(), 2);
    }

    #[test]
    fn test_first_jump_starts_playing() {
        let mut page = page(GameConfig::default());
        page.update(act!(Command::Game(GameAction::Jump))).unwrap();
        assert_eq!(page.state(), State::Playing);
        assert_eq!(page.bird().velocity(), -10.5);

        page.update(act!(Command::Tick)).unwrap();
        assert_eq!(page.bird().y(), 339.0);
        assert_eq!(page.pipes()[0].x(), 695.0);
    }

    #[test]
    fn test_released_keys_are_ignored() {
        let mut page = page(GameConfig::default());
        page.update(act!(Command::Game(GameAction::Jump), ActionState::End)).unwrap();
        assert_eq!(page.state(), State::Ready);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut page = page(open_sky());
        page.toggle_pause();
        assert_eq!(page.state(), State::Ready);

        page.jump();
        page.tick();
        page.update(act!(Command::Game(GameAction::Pause))).unwrap();
        assert_eq!(page.state(), State::Paused);

        let y = page.bird().y();
        let x = page.pipes()[0].x();
        for _ in 0..5 {
            page.tick();
            page.jump();
        }
        assert_eq!(page.bird().y(), y);
        assert_eq!(page.pipes()[0].x(), x);

        page.toggle_pause();
        assert_eq!(page.state(), State::Playing);
    }

    #[test]
    fn test_falling_to_the_ground_ends_round() {
        let mut page = page(open_sky());
        page.jump();
        let mut ticks = 0;
        while page.state() == State::Playing && ticks < 200 {
            page.tick();
            ticks += 1;
        }
        assert_eq!(page.state(), State::Dead);
        assert!(page.bird().bottom() >= 730.0);

        let y = page.bird().y();
        page.tick();
        assert_eq!(page.bird().y(), y);
    }

    #[test]
    fn test_flying_above_the_ceiling_ends_round() {
        let mut page = page(GameConfig { ceiling: 345.0, ..open_sky() });
        page.jump();
        page.tick();
        assert_eq!(page.state(), State::Dead);
    }

    #[test]
    fn test_jump_after_death_restarts() {
        let mut page = page(GameConfig { ceiling: 345.0, ..open_sky() });
        page.jump();
        page.tick();
        assert_eq!(page.state(), State::Dead);

        page.jump();
        assert_eq!(page.state(), State::Ready);
        assert_eq!(page.bird().y(), 350.0);
        assert_eq!(page.pipes().len(), 1);
        assert_eq!(page.pipes()[0].x(), 700.0);
    }

    #[test]
    fn test_pipe_collision_ends_round() {
        // Bottom pipe starts at y 300 right where the bird sits.
        let config = GameConfig {
            pipe: PipeConfig { min_height: 100, max_height: 101, first_x: 200.0, ..PipeConfig::default() },
            ..GameConfig::default()
        };
        let mut page = page(config);
        page.jump();
        page.tick();
        assert_eq!(page.state(), State::Dead);
    }

    #[test]
    fn test_passing_a_pipe_spawns_the_next() {
        let mut page = page(GameConfig {
            pipe: PipeConfig { first_x: 240.0, ..open_sky().pipe },
            ..open_sky()
        });
        page.jump();
        page.tick();
        page.tick();
        assert_eq!(page.pipes().len(), 1);
        assert!(!page.pipes()[0].passed);

        page.tick();
        assert_eq!(page.pipes().len(), 2);
        assert!(page.pipes()[0].passed);
        assert_eq!(page.pipes()[1].x(), 600.0);
        assert!(!page.pipes()[1].passed);
    }

    #[test]
    fn test_offscreen_pipes_are_dropped() {
        let mut page = page(GameConfig {
            pipe: PipeConfig { first_x: -100.0, ..open_sky().pipe },
            ..open_sky()
        });
        page.jump();
        page.tick();
        assert_eq!(page.pipes().len(), 1);
        assert_eq!(page.pipes()[0].x(), 600.0);
    }

    #[test]
    fn test_back_goes_home() {
        let mut page = page(GameConfig::default());
        let next = page.update(act!(Command::Game(GameAction::Back))).unwrap();
        assert_eq!(next, Some(act!(Command::ShowHome)));
    }

    #[test]
    fn test_seed_repeats_pipes() {
        let heights = || {
            let mut page = page(GameConfig::default());
            let mut heights = vec![page.pipes()[0].height()];
            for _ in 0..5 {
                page.reset();
                heights.push(page.pipes()[0].height());
            }
            heights
        };
        assert_eq!(heights(), heights());
    }

    #[test]
    fn test_render_draws_bird_over_background() {
        let mut page = page(GameConfig::default());
        let behind_bird = *page.assets.background.get_pixel(264, 374);
        let corner = *page.assets.background.get_pixel(10, 10);

        let canvas = page.render_canvas();
        assert_eq!(canvas.image().dimensions(), (500, 800));
        assert_ne!(*canvas.image().get_pixel(264, 374), behind_bird);
        assert_eq!(*canvas.image().get_pixel(10, 10), corner);
    }

    #[test]
    fn test_status_names_bound_keys() {
        let mut page = page(GameConfig::default());
        page.keymap.insert(KeyEvent::from(KeyCode::Char(' ')), act!(Command::Game(GameAction::Jump)));
        page.keymap.insert(KeyEvent::from(KeyCode::Up), act!(Command::Game(GameAction::Jump)));
        assert_eq!(page.status(), Some("Press space to flap".to_string()));

        page.jump();
        assert_eq!(page.status(), None);
        page.toggle_pause();
        assert_eq!(page.status(), Some("Paused, pause to resume".to_string()));
    }
}
