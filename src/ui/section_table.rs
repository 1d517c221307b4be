use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};

use crate::format::truncate_unicode;
use crate::system::snapshot::{Field, Section, SectionKind};
use crate::ui::theme::{BorderStyle, Theme};

/// Width of the label column, wide enough for the longest fixed label.
const LABEL_WIDTH: u16 = 18;

/// Plain `label: value` lines for a section, the same text the table shows.
pub fn section_lines(section: &Section) -> Vec<String> {
    if section.is_empty() {
        return vec![empty_message(section.kind()).to_string()];
    }
    section
        .entries()
        .iter()
        .map(|e| format!("{}: {}", e.label, field_text(&e.field)))
        .collect()
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    section: &Section,
    theme: &Theme,
    border_style: BorderStyle,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_style.border_type())
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" {} ", section.kind().title()),
            Style::default()
                .fg(theme.label_fg)
                .add_modifier(Modifier::BOLD),
        ));

    if section.is_empty() {
        let line = Line::from(Span::styled(
            empty_message(section.kind()),
            Style::default().fg(theme.text_secondary),
        ));
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let value_width = area.width.saturating_sub(LABEL_WIDTH + 3) as usize;
    let rows: Vec<Row> = section
        .entries()
        .iter()
        .map(|entry| {
            let value_style = if entry.field.is_unavailable() {
                Style::default().fg(theme.unavailable_fg)
            } else {
                Style::default().fg(theme.value_fg)
            };
            Row::new(vec![
                Span::styled(
                    entry.label,
                    Style::default()
                        .fg(theme.label_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    truncate_unicode(&field_text(&entry.field), value_width),
                    value_style,
                ),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(LABEL_WIDTH), Constraint::Min(1)])
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn field_text(field: &Field) -> String {
    match field {
        Field::Value(v) => v.clone(),
        Field::Unavailable(reason) => format!("Unavailable ({reason})"),
    }
}

fn empty_message(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Gpu => "No GPU detected",
        _ => "No data",
    }
}
