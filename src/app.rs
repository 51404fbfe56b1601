use color_eyre::eyre::{eyre, Result};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Margin, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info};

use crate::{
    action::{act, Action, Command},
    components::help::Help,
    config::Config,
    pages::{game::GamePage, home::HomePage, Page, PageId},
    tui::{self, Lifecycle},
};

pub struct App {
    config: Config,
    tick_rate: f64,
    frame_rate: f64,
    should_quit: bool,
    should_suspend: bool,
    show_help: bool,
    pages: Vec<Box<dyn Page>>,
    active_page: PageId,
}

impl App {
    pub fn new(config: Config, tick_rate: f64, frame_rate: f64, seed: Option<u64>) -> Result<Self> {
        let home_page = HomePage::new()?;
        let game_page = GamePage::new(config.game, seed);

        Ok(Self {
            tick_rate,
            frame_rate,
            should_quit: false,
            should_suspend: false,
            show_help: false,
            config,
            pages: vec![Box::new(home_page), Box::new(game_page)],
            active_page: PageId::Home,
        })
    }

    fn get_active_page(&mut self) -> Result<&mut Box<dyn Page>> {
        let id = self.active_page;
        self.pages.iter_mut().find(|page| page.id() == id).ok_or_else(|| eyre!("No page registered for {id}"))
    }

    fn set_active_page(&mut self, id: PageId) -> Result<()> {
        if self.active_page != id {
            info!("Switching to page {id}");
        }
        self.active_page = id;
        self.get_active_page()?.enter()
    }

    /// Page bindings first, global bindings win on conflicts.
    fn map_key(&self, key: KeyEvent) -> Option<Action> {
        let mut action = self.config.keybindings.pages.get(&self.active_page).and_then(|keymap| keymap.get(&key));
        if let Some(global) = self.config.keybindings.global.get(&key) {
            action = Some(global);
        }
        action.cloned()
    }

    /// App level handling. Page specific handling happens afterwards.
    fn update(&mut self, action: &Action) -> Result<()> {
        match &action.command {
            Command::Quit => self.should_quit = true,
            Command::Suspend => self.should_suspend = true,
            Command::Resume => self.should_suspend = false,
            Command::ToggleShowHelp => self.show_help = !self.show_help,
            Command::StartGame => self.set_active_page(PageId::Game)?,
            Command::ShowHome => self.set_active_page(PageId::Home)?,
            Command::Error(message) => error!("{message}"),
            _ => {},
        }
        Ok(())
    }

    fn start_tui(&self) -> Result<tui::Tui> {
        let mut tui = tui::Tui::new()?;
        tui.tick_rate(self.tick_rate);
        tui.frame_rate(self.frame_rate);
        tui.enter()?;
        Ok(tui)
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let mut tui = self.start_tui()?;

        for page in self.pages.iter_mut() {
            page.register_keymap(&self.config.keybindings.pages)?;
            page.register_action_handler(action_tx.clone())?;
            page.init()?;
        }

        loop {
            if let Some(e) = tui.next().await {
                match e {
                    tui::Event::Tick => action_tx.send(act!(Command::Tick))?,
                    tui::Event::Render => action_tx.send(act!(Command::Render))?,
                    tui::Event::Resize(x, y) => action_tx.send(act!(Command::Resize(x, y)))?,
                    tui::Event::Key(key) => {
                        if let Some(action) = self.map_key(key) {
                            debug!("Got action: {action:?}");
                            action_tx.send(action)?;
                        }
                    },
                    _ => {},
                }
                if let Some(action) = self.get_active_page()?.handle_events(Some(e))? {
                    action_tx.send(action)?;
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                match action.command {
                    Command::Tick | Command::Render => {},
                    ref command => debug!("{command:?}"),
                }
                match action.command {
                    Command::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.render(&mut tui, &action_tx)?;
                    },
                    Command::Render => self.render(&mut tui, &action_tx)?,
                    _ => {},
                }
                self.update(&action)?;
                if !self.show_help {
                    if let Some(action) = self.get_active_page()?.update(action)? {
                        action_tx.send(action)?
                    }
                }
            }

            if self.settle(&mut tui, &action_tx)? {
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    /// Suspends and resumes the same terminal, or stops it on quit.
    /// Returns true once the loop should end.
    fn settle<T: Lifecycle>(&mut self, tui: &mut T, action_tx: &UnboundedSender<Action>) -> Result<bool> {
        if self.should_suspend {
            tui.suspend()?;
            tui.resume()?;
            action_tx.send(act!(Command::Resume))?;
        } else if self.should_quit {
            tui.stop()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn render(&mut self, tui: &mut tui::Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        let mut failures = Vec::new();
        tui.draw(|f| {
            let area = f.area();
            let border = Block::default()
                .title(format!(" {} ", env!("CARGO_PKG_NAME")))
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().bg(Color::Black));
            f.render_widget(border, area);
            let area = area.inner(Margin { horizontal: 1, vertical: 1 });

            match self.get_active_page() {
                Ok(page) => {
                    if let Err(e) = page.draw(f, area) {
                        failures.push(format!("Failed to draw: {e:?}"));
                    }
                },
                Err(e) => failures.push(e.to_string()),
            }

            if self.show_help {
                self.draw_help(f, area);
            }
        })?;

        for failure in failures {
            action_tx.send(act!(Command::Error(failure)))?;
        }
        Ok(())
    }

    fn draw_help(&self, f: &mut Frame<'_>, rect: Rect) {
        let mut groups = vec![("System".to_string(), self.config.keybindings.global.clone())];
        if let Some(keymap) = self.config.keybindings.pages.get(&self.active_page) {
            groups.push((self.active_page.to_string(), keymap.clone()));
        }
        f.render_widget(Help::new(groups), rect);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::action::{GameAction, HomeAction};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Lifecycle for Recorder {
        fn suspend(&mut self) -> Result<()> {
            self.calls.push("suspend");
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            self.calls.push("resume");
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.calls.push("stop");
            Ok(())
        }
    }

    fn app() -> App {
        App::new(Config::new().unwrap(), 30.0, 30.0, Some(3)).unwrap()
    }

    #[test]
    fn test_keys_follow_active_page() {
        let mut app = app();
        let space = KeyEvent::from(KeyCode::Char(' '));
        let up = KeyEvent::from(KeyCode::Up);

        assert_eq!(app.map_key(space), None);
        assert_eq!(app.map_key(up), Some(act!(Command::Home(HomeAction::Up))));

        app.update(&act!(Command::StartGame)).unwrap();
        assert_eq!(app.active_page, PageId::Game);
        assert_eq!(app.map_key(space), Some(act!(Command::Game(GameAction::Jump))));
        assert_eq!(app.map_key(up), Some(act!(Command::Game(GameAction::Jump))));
    }

    #[test]
    fn test_global_keys_everywhere() {
        let mut app = app();
        let quit = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(app.map_key(quit), Some(act!(Command::Quit)));
        app.update(&act!(Command::StartGame)).unwrap();
        assert_eq!(app.map_key(quit), Some(act!(Command::Quit)));
    }

    #[test]
    fn test_app_commands() {
        let mut app = app();
        app.update(&act!(Command::ToggleShowHelp)).unwrap();
        assert!(app.show_help);
        app.update(&act!(Command::ToggleShowHelp)).unwrap();
        assert!(!app.show_help);

        app.update(&act!(Command::StartGame)).unwrap();
        app.update(&act!(Command::ShowHome)).unwrap();
        assert_eq!(app.active_page, PageId::Home);

        app.update(&act!(Command::Quit)).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_suspend_resumes_same_terminal() {
        let mut app = app();
        let mut terminal = Recorder::default();
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        assert!(!app.settle(&mut terminal, &action_tx).unwrap());
        assert!(terminal.calls.is_empty());

        app.update(&act!(Command::Suspend)).unwrap();
        assert!(!app.settle(&mut terminal, &action_tx).unwrap());
        assert_eq!(terminal.calls, vec!["suspend", "resume"]);

        let resume = action_rx.try_recv().unwrap();
        assert_eq!(resume, act!(Command::Resume));
        app.update(&resume).unwrap();
        assert!(!app.should_suspend);
    }

    #[test]
    fn test_quit_stops_terminal() {
        let mut app = app();
        let mut terminal = Recorder::default();
        let (action_tx, _action_rx) = mpsc::unbounded_channel();

        app.update(&act!(Command::Quit)).unwrap();
        assert!(app.settle(&mut terminal, &action_tx).unwrap());
        assert_eq!(terminal.calls, vec!["stop"]);
    }
}
