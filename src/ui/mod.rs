pub mod chat_panel;
pub mod command_bar;
pub mod detail_panel;
pub mod footer;
pub mod metrics_panel;
pub mod theme;
pub mod ticket_list;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    // Command bar (3) when input is active, else footer (1)
    let bottom_height = if app.input_active { 3 } else { 1 };
    let show_chat = !app.chat_messages.is_empty() || app.input_active;
    let chat_height = if show_chat { 12 } else { 0 };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(chat_height),
            Constraint::Length(bottom_height),
        ])
        .split(size);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ])
        .split(vertical[0]);

    ticket_list::render(f, horizontal[0], app);
    detail_panel::render(f, horizontal[1], app);
    metrics_panel::render(f, horizontal[2], app);

    if show_chat {
        chat_panel::render(f, vertical[1], app);
    }

    if app.input_active {
        command_bar::render(f, vertical[2], app);
    } else {
        footer::render(f, vertical[2], app);
    }
}
