use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::domain::Control;
use crate::model::{Model, UIData};
use crate::record::COLUMN_NAMES;
use crate::render::EMPTY_STATE_TEXT;

pub const FILTER_BAR_HEIGHT: u16 = 3;
pub const STATUSLINE_HEIGHT: u16 = 1;
// Filter bar, table borders, table header and status line.
pub const TABLE_CHROME_HEIGHT: usize = (FILTER_BAR_HEIGHT + 2 + 1 + STATUSLINE_HEIGHT) as usize;

const SELECT_WIDTH: u16 = 20;
const RESET_WIDTH: u16 = 9;

#[derive(Debug, Default)]
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only place that touches the terminal: everything shown comes
    /// from the model's `UIData`.
    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [filter_area, table_area, status_area] = Layout::vertical([
            Constraint::Length(FILTER_BAR_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.draw_filter_bar(uidata, frame, filter_area);
        self.draw_table(uidata, frame, table_area);
        self.draw_statusline(uidata, frame, status_area);

        if uidata.show_popup {
            self.draw_popup(&uidata.popup_message, frame);
        }
    }

    fn control_block(title: &str, focused: bool) -> Block<'_> {
        let block = Block::bordered().title(title.to_string());
        if focused {
            block
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(Color::Yellow))
        } else {
            block.border_style(Style::default().fg(Color::DarkGray))
        }
    }

    fn draw_filter_bar(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let [search_area, category_area, type_area, status_area, reset_area] =
            Layout::horizontal([
                Constraint::Min(20),
                Constraint::Length(SELECT_WIDTH),
                Constraint::Length(SELECT_WIDTH),
                Constraint::Length(SELECT_WIDTH),
                Constraint::Length(RESET_WIDTH),
            ])
            .areas(area);

        let search_focused = uidata.focus == Control::Search;
        let search = if uidata.search.input.is_empty() && !search_focused {
            Line::from("name or email".dark_gray().italic())
        } else {
            Line::from(uidata.search.input.as_str())
        };
        frame.render_widget(
            Paragraph::new(search).block(TableUI::control_block(" Search ", search_focused)),
            search_area,
        );
        if search_focused && !uidata.show_popup {
            let max_offset = search_area.width.saturating_sub(2);
            let offset = uidata.search.curser_pos.min(max_offset as usize) as u16;
            let x = search_area.x.saturating_add(1).saturating_add(offset);
            frame.set_cursor_position((x, search_area.y + 1));
        }

        let selects = [
            (" Category ", &uidata.category, Control::Category, category_area),
            (" Type ", &uidata.kind, Control::Type, type_area),
            (" Status ", &uidata.status, Control::Status, status_area),
        ];
        for (title, value, control, select_area) in selects {
            let focused = uidata.focus == control;
            let label = if value.is_empty() { "All" } else { value.as_str() };
            let line = if focused {
                Line::from(vec!["◀ ".yellow(), label.bold(), " ▶".yellow()])
            } else {
                Line::from(label)
            };
            frame.render_widget(
                Paragraph::new(line)
                    .alignment(Alignment::Center)
                    .block(TableUI::control_block(title, focused)),
                select_area,
            );
        }

        let reset_focused = uidata.focus == Control::Reset;
        let reset = if reset_focused {
            "Reset".bold().reversed()
        } else {
            "Reset".into()
        };
        frame.render_widget(
            Paragraph::new(Line::from(reset))
                .alignment(Alignment::Center)
                .block(TableUI::control_block("", reset_focused)),
            reset_area,
        );
    }

    fn status_style(status: &str) -> Style {
        match status.to_lowercase().as_str() {
            "active" => Style::default().fg(Color::Green),
            "inactive" => Style::default().fg(Color::Red),
            "pending" => Style::default().fg(Color::Yellow),
            _ => Style::default(),
        }
    }

    fn draw_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title(Line::from(format!(" {} ", uidata.name).bold()).centered())
            .border_type(BorderType::Rounded);

        if uidata.show_empty_state {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let [placeholder] = Layout::vertical([Constraint::Length(1)])
                .flex(Flex::Center)
                .areas(inner);
            frame.render_widget(
                Paragraph::new(EMPTY_STATE_TEXT.dark_gray().italic()).alignment(Alignment::Center),
                placeholder,
            );
            return;
        }

        let header = COLUMN_NAMES
            .iter()
            .map(|name| Cell::from(*name))
            .collect::<Row>()
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = uidata.rows.iter().map(|cells| {
            Row::new(cells.iter().enumerate().map(|(idx, value)| match idx {
                2 => Cell::from(Span::styled(value.clone(), Style::default().fg(Color::Cyan))),
                4 => Cell::from(Span::styled(value.clone(), TableUI::status_style(value))),
                _ => Cell::from(value.clone()),
            }))
        });

        let widths = [
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(13),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        self.table_state.select(Some(uidata.selected_row));
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let [counter_area, message_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                " Showing ".into(),
                uidata.counter.filtered.to_string().bold(),
                " of ".into(),
                uidata.counter.total.to_string().bold(),
                " records".into(),
            ])),
            counter_area,
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                uidata.status_message.as_str().dark_gray(),
                "  F1 help ".blue(),
            ]))
            .alignment(Alignment::Right),
            message_area,
        );
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame) {
        let [area] = Layout::vertical([Constraint::Percentage(60)])
            .flex(Flex::Center)
            .areas(frame.area());
        let [area] = Layout::horizontal([Constraint::Percentage(60)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(message)
                .wrap(Wrap { trim: false })
                .block(
                    Block::bordered()
                        .title(Line::from(" Help ".bold()).centered())
                        .title_bottom(Line::from(" <Esc> close ".blue()).centered())
                        .border_type(BorderType::Thick),
                ),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, TableConfig};
    use crate::table::Dataset;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        let mut ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn model() -> Model {
        Model::init(&TableConfig::default(), Dataset::builtin().unwrap()).unwrap()
    }

    #[test]
    fn draws_rows_and_counter() {
        let screen = render(&model());
        assert!(screen.contains("Alice Johnson"));
        assert!(screen.contains("Jan 15, 2024"));
        assert!(screen.contains("Showing 10 of 10 records"));
        assert!(!screen.contains(EMPTY_STATE_TEXT));
    }

    #[test]
    fn draws_empty_state() {
        let mut model = model();
        model.set_filters("zzz-no-match", "", "", "").unwrap();
        let screen = render(&model);
        assert!(screen.contains(EMPTY_STATE_TEXT));
        assert!(screen.contains("Showing 0 of 10 records"));
        assert!(!screen.contains("Alice"));
    }

    #[test]
    fn draws_selected_option() {
        let mut model = model();
        model.set_filters("", "Premium", "", "").unwrap();
        let screen = render(&model);
        assert!(screen.contains("Premium"));
        assert!(screen.contains("Bob Smith"));
        assert!(!screen.contains("Alice Johnson"));
    }

    #[test]
    fn long_search_text_keeps_cursor_inside_the_field() {
        let mut model = model();
        model.set_filters(&"x".repeat(70_000), "", "", "").unwrap();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        let mut ui = TableUI::new();
        terminal.draw(|f| ui.draw(&model, f)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        // Search field spans what the three selects and reset leave over.
        assert!(cursor.x < 120 - 3 * SELECT_WIDTH - RESET_WIDTH);
        assert_eq!(cursor.y, 1);
    }

    #[test]
    fn draws_help_popup() {
        let mut model = model();
        model.update(Some(Message::Help)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("Help"));
        assert!(screen.contains("Reset all filters"));
    }
}
