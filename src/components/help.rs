use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Borders, Clear, Padding, Row, Table, Widget},
};

use crate::{
    action::ActionState,
    config::{key_event_to_string, PageKeyBindings},
};

type Bindings = Vec<(String, String)>;

/// Key binding cheat sheet, one bordered table per scope.
#[derive(Debug)]
pub struct Help {
    keybinding_groups: Vec<(String, Bindings)>,
    column_spacing: u16,
    margin_vertical: u16,
    margin_horizontal: u16,
}

impl Help {
    pub fn new(keybinding_groups: Vec<(String, PageKeyBindings)>) -> Self {
        let groups = keybinding_groups
            .into_iter()
            .map(|(group_name, keybindings)| {
                // Hold bindings show up once, under their press.
                let mut keybindings: Bindings = keybindings
                    .0
                    .into_iter()
                    .filter(|(_, action)| action.state == ActionState::Start)
                    .map(|(event, action)| (key_event_to_string(&event), action.command.describe()))
                    .collect();
                keybindings.sort();
                (group_name, keybindings)
            })
            .collect();

        Self { keybinding_groups: groups, column_spacing: 5, margin_vertical: 1, margin_horizontal: 2 }
    }

    pub fn groups(&self) -> &[(String, Bindings)] {
        &self.keybinding_groups
    }

    fn render_group(&self, area: Rect, buf: &mut Buffer, group_name: &str, keybindings: &Bindings, key_length: u16) {
        let rows: Vec<Row> = keybindings.iter().map(|(key, val)| Row::new(vec![key.clone(), val.clone()])).collect();

        let table = Table::new(rows, [Constraint::Length(key_length), Constraint::Fill(1)])
            .column_spacing(self.column_spacing)
            .header(Row::new(vec!["Key", "Command"]).style(Style::new().bold()).bottom_margin(1))
            .block(
                Block::new()
                    .title(group_name.to_string())
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::new().bold().fg(Color::Cyan))
                    .padding(Padding::symmetric(self.margin_horizontal, self.margin_vertical)),
            );

        Clear.render(area, buf);
        table.render(area, buf);
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_length = self
            .keybinding_groups
            .iter()
            .flat_map(|(_, bindings)| bindings.iter().map(|(key, _)| key.len()))
            .chain(std::iter::once("Key".len()))
            .max()
            .unwrap_or(0) as u16;
        let val_length = self
            .keybinding_groups
            .iter()
            .flat_map(|(_, bindings)| bindings.iter().map(|(_, val)| val.len()))
            .chain(std::iter::once("Command".len()))
            .max()
            .unwrap_or(0) as u16;

        // + column spacing + padding + border
        let width = key_length + val_length + self.column_spacing + (self.margin_horizontal * 2) + 2;
        // + padding + header with its margin + border
        let heights = self
            .keybinding_groups
            .iter()
            .map(|(_, bindings)| Constraint::Length(bindings.len() as u16 + (self.margin_vertical * 2) + 2 + 2));

        let [area] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(area);
        let areas = Layout::vertical(heights).flex(Flex::Center).split(area);

        for ((name, bindings), area) in self.keybinding_groups.iter().zip(areas.iter()) {
            self.render_group(*area, buf, name, bindings, key_length);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::Config, pages::PageId};

    fn help() -> Help {
        let config = Config::new().unwrap();
        Help::new(vec![
            ("System".to_string(), config.keybindings.global.clone()),
            ("Game".to_string(), config.keybindings.pages[&PageId::Game].clone()),
        ])
    }

    #[test]
    fn test_groups_are_sorted_and_described() {
        let help = help();
        let (name, game) = &help.groups()[1];
        assert_eq!(name, "Game");
        assert_eq!(
            game,
            &vec![
                ("esc".to_string(), "Back".to_string()),
                ("p".to_string(), "Pause".to_string()),
                ("space".to_string(), "Jump".to_string()),
                ("up".to_string(), "Jump".to_string()),
            ]
        );
    }

    #[test]
    fn test_renders_group_titles() {
        let area = Rect::new(0, 0, 60, 40);
        let mut buf = Buffer::empty(area);
        help().render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("System"));
        assert!(text.contains("Game"));
        assert!(text.contains("ToggleShowHelp"));
    }
}
