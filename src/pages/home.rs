use std::collections::HashMap;

use color_eyre::eyre::Result;
use derive_builder::Builder;
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;

use super::{Frame, Page, PageId};
use crate::{
    action::{act, Action, ActionState, Command, HomeAction},
    config::PageKeyBindings,
    constants::{home::OPTION_PADDING, TITLE_TEXT},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OptionItem {
    Start,
    Quit,
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct HomePage {
    #[builder(default)]
    pub action_tx: Option<UnboundedSender<Action>>,
    #[builder(default)]
    pub keymap: PageKeyBindings,
    options: Vec<(OptionItem, &'static str)>,
    #[builder(default)]
    selected_option_index: usize,
}

impl HomePage {
    pub fn new() -> Result<Self> {
        let page = Self::builder()
            .options(vec![(OptionItem::Start, "Start playing"), (OptionItem::Quit, "Quit")])
            .build()?;
        Ok(page)
    }

    pub fn builder() -> HomePageBuilder {
        HomePageBuilder::default()
    }

    /// Moves the highlight one entry towards the top of the menu.
    pub fn up(&mut self) {
        self.selected_option_index = self.selected_option_index.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected_option_index + 1 < self.options.len() {
            self.selected_option_index += 1;
        }
    }

    fn select(&self) -> Option<Action> {
        let (item, _) = self.options.get(self.selected_option_index)?;
        let command = match item {
            OptionItem::Start => Command::StartGame,
            OptionItem::Quit => Command::Quit,
        };
        Some(act!(command))
    }

    fn padded_titles(&self) -> Vec<String> {
        let width = self.options.iter().map(|(_, title)| title.len()).max().unwrap_or(0);
        let pad = " ".repeat(OPTION_PADDING);
        self.options.iter().map(|(_, title)| format!("{pad}{title:<width$}{pad}")).collect()
    }
}

impl Page for HomePage {
    fn id(&self) -> PageId {
        PageId::Home
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

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action.state != ActionState::Start {
            return Ok(None);
        }
        if let Command::Home(command) = action.command {
            match command {
                HomeAction::Up => self.up(),
                HomeAction::Down => self.down(),
                HomeAction::Select => return Ok(self.select()),
            }
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        f.render_widget(Clear, rect);

        let title_lines: Vec<&str> = TITLE_TEXT.lines().filter(|s| !s.is_empty()).collect();
        let num_title_lines = title_lines.len() as u16;
        let option_height = (self.options.len() * 2).saturating_sub(1) as u16;

        let [title_area, option_area] =
            Layout::vertical([Constraint::Length(num_title_lines), Constraint::Length(option_height)])
                .flex(layout::Flex::SpaceAround)
                .areas(rect);

        let lines = title_lines.into_iter().map(Line::from).collect::<Vec<_>>();
        let paragraph = Paragraph::new(lines).style(Style::default().fg(Color::Yellow)).alignment(Alignment::Center);
        f.render_widget(paragraph, title_area);

        let titles = self.padded_titles();
        let option_width = titles.iter().map(|title| title.len()).max().unwrap_or(0) as u16;
        let [option_area] =
            Layout::horizontal([Constraint::Length(option_width)]).flex(layout::Flex::Center).areas(option_area);

        // Blank line between entries.
        let mut lines = Vec::with_capacity(titles.len() * 2);
        for (index, title) in titles.into_iter().enumerate() {
            if index > 0 {
                lines.push(Line::from(""));
            }
            let style = if index == self.selected_option_index {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            lines.push(Line::from(title).style(style));
        }

        let paragraph = Paragraph::new(lines).style(Style::default().fg(Color::White));
        f.render_widget(paragraph, option_area);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn home_action(action: HomeAction) -> Action {
        act!(Command::Home(action))
    }

    #[test]
    fn test_menu_navigation_is_clamped() {
        let mut home = HomePage::new().unwrap();
        home.update(home_action(HomeAction::Up)).unwrap();
        assert_eq!(home.selected_option_index, 0);
        for _ in 0..5 {
            home.update(home_action(HomeAction::Down)).unwrap();
        }
        assert_eq!(home.selected_option_index, 1);
        home.update(home_action(HomeAction::Up)).unwrap();
        assert_eq!(home.selected_option_index, 0);
    }

    #[test]
    fn test_select_emits_command() {
        let mut home = HomePage::new().unwrap();
        let next = home.update(home_action(HomeAction::Select)).unwrap();
        assert_eq!(next, Some(act!(Command::StartGame)));

        home.down();
        let next = home.update(home_action(HomeAction::Select)).unwrap();
        assert_eq!(next, Some(act!(Command::Quit)));
    }

    #[test]
    fn test_builder() {
        let home = HomePage::builder().options(vec![(OptionItem::Quit, "Leave")]).build().unwrap();
        assert_eq!(home.selected_option_index, 0);
        assert_eq!(home.select(), Some(act!(Command::Quit)));
    }

    #[test]
    fn test_titles_are_padded_to_same_width() {
        let titles = HomePage::new().unwrap().padded_titles();
        assert_eq!(titles, vec!["  Start playing  ".to_string(), format!("  {:<13}  ", "Quit")]);
    }

    #[test]
    fn test_draw_shows_menu() {
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        let mut home = HomePage::new().unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                home.draw(f, area).unwrap();
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Start playing"));
        assert!(text.contains("Quit"));
    }
}
