pub mod help;
pub mod section_table;
pub mod statusbar;
pub mod tabs;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    tabs::render(
        frame,
        chunks[0],
        app.selected_tab,
        &app.theme,
        app.border_style,
    );
    section_table::render(
        frame,
        chunks[1],
        app.snapshot.section(app.selected_section()),
        &app.theme,
        app.border_style,
    );
    statusbar::render(frame, chunks[2], app.snapshot.captured_at(), &app.theme);

    // Help overlay last so it draws on top
    if app.show_help() {
        help::render(
            frame,
            frame.area(),
            &app.keybinds.help_groups(),
            app.selected_section(),
            &app.theme,
            app.border_style,
        );
    }
}

#[cfg(test)]
mod tests;
