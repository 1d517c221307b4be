use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Clear, Row, Table};

use crate::app::HelpGroup;
use crate::system::snapshot::SectionKind;
use crate::ui::theme::{BorderStyle, Theme};

const KEY_WIDTH: u16 = 8;
const WIDTH: u16 = 36;

/// Key help drawn over the middle of `area`. The row for the section on
/// screen is highlighted so the digit keys read as a map of the tabs.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    groups: &[HelpGroup],
    current: SectionKind,
    theme: &Theme,
    border_style: BorderStyle,
) {
    let rows = help_rows(groups, current, theme);
    // Borders plus a blank line between groups
    let height = (rows.len() as u16 + 2).min(area.height);
    let width = WIDTH.min(area.width);
    let overlay = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_style.border_type())
        .border_style(Style::default().fg(theme.overlay_border))
        .style(Style::default().bg(theme.surface_bg))
        .title(Span::styled(
            " Help ",
            Style::default()
                .fg(theme.label_fg)
                .add_modifier(Modifier::BOLD),
        ));

    let table = Table::new(rows, [Constraint::Length(KEY_WIDTH), Constraint::Min(1)])
        .column_spacing(2)
        .block(block);

    frame.render_widget(Clear, overlay);
    frame.render_widget(table, overlay);
}

fn help_rows<'a>(groups: &'a [HelpGroup], current: SectionKind, theme: &Theme) -> Vec<Row<'a>> {
    let key_style = Style::default()
        .fg(theme.pill_key_fg)
        .bg(theme.pill_key_bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(theme.pill_desc_fg);
    let current_style = Style::default()
        .fg(theme.tab_active_fg)
        .bg(theme.tab_active_bg)
        .add_modifier(Modifier::BOLD);

    let mut rows = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            rows.push(Row::new(vec![""]));
        }
        rows.push(Row::new(vec![Span::styled(
            group.title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::UNDERLINED),
        )]));
        for line in &group.lines {
            let style = if line.description == current.title() {
                current_style
            } else {
                desc_style
            };
            rows.push(Row::new(vec![
                Span::styled(format!("{:>w$}", line.key, w = KEY_WIDTH as usize), key_style),
                Span::styled(line.description, style),
            ]));
        }
    }
    rows
}
