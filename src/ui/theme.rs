use ratatui::style::Color;

use crate::model::ticket::StatusCategory;

const TEAM_PALETTE: [Color; 6] = [
    Color::Rgb(0x4F, 0xC3, 0xF7),
    Color::Rgb(0xFF, 0x70, 0x43),
    Color::Rgb(0x81, 0xC7, 0x84),
    Color::Rgb(0xCE, 0x93, 0xD8),
    Color::Rgb(0xFF, 0xD5, 0x4F),
    Color::Rgb(0x90, 0xA4, 0xAE),
];

pub fn status_color(category: StatusCategory) -> Color {
    match category {
        StatusCategory::ToDo => Color::Gray,
        StatusCategory::InProgress => Color::Cyan,
        StatusCategory::Done => Color::Green,
    }
}

pub fn priority_color(priority: &str) -> Color {
    match priority {
        "Highest" | "Blocker" | "Critical" => Color::Red,
        "High" => Color::Yellow,
        "Medium" => Color::Blue,
        _ => Color::Gray,
    }
}

/// Stable per-team color so a team keeps its color across refreshes.
pub fn team_color(team: &str) -> Color {
    let sum: usize = team.bytes().map(usize::from).sum();
    TEAM_PALETTE[sum % TEAM_PALETTE.len()]
}
