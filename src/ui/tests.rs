use chrono::{Local, TimeZone};
use insta::assert_snapshot;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::app::App;
use crate::config::Config;
use crate::system::snapshot::{Field, Section, SectionKind, TelemetrySnapshot};
use crate::ui::section_table::section_lines;
use crate::ui::theme::{BorderStyle, ColorSupport, Theme};
use crate::ui::{draw, section_table, statusbar, tabs};

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    let buf = terminal.backend().buffer();
    buffer_to_string(buf)
}

fn make_theme() -> Theme {
    Theme::from_config("dark", ColorSupport::Truecolor)
}

fn ram_section() -> Section {
    Section::new(SectionKind::Ram)
        .with("Total", Field::value("8.00 GB"))
        .with("Available", Field::value("4.00 GB"))
        .with("Used", Field::value("4.00 GB"))
        .with("Percentage", Field::value("50.0%"))
}

fn disk_section_denied() -> Section {
    Section::new(SectionKind::Disk)
        .with("Device", Field::value("/dev/sda1"))
        .with("Mountpoint", Field::value("/"))
        .with("Total Size", Field::unavailable("permission denied"))
}

fn make_snapshot() -> TelemetrySnapshot {
    TelemetrySnapshot::new(
        Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        Section::new(SectionKind::System).with("System", Field::value("Linux")),
        Section::new(SectionKind::Cpu).with("Total Cores", Field::value("8")),
        ram_section(),
        Section::new(SectionKind::Gpu),
        disk_section_denied(),
        Section::new(SectionKind::Network).with("Interface", Field::value("eth0")),
    )
}

#[test]
fn ram_section_lines() {
    let text = section_lines(&ram_section()).join("\n");
    assert_snapshot!(text, @r"
    Total: 8.00 GB
    Available: 4.00 GB
    Used: 4.00 GB
    Percentage: 50.0%
    ");
}

#[test]
fn unavailable_lines_carry_reason() {
    let text = section_lines(&disk_section_denied()).join("\n");
    assert_snapshot!(text, @r"
    Device: /dev/sda1
    Mountpoint: /
    Total Size: Unavailable (permission denied)
    ");
}

#[test]
fn empty_gpu_section_lines() {
    let lines = section_lines(&Section::new(SectionKind::Gpu));
    assert_eq!(lines, vec!["No GPU detected".to_string()]);
}

#[test]
fn section_table_shows_labels_and_values() {
    let output = render_to_string(50, 6, |frame| {
        section_table::render(
            frame,
            Rect::new(0, 0, 50, 6),
            &ram_section(),
            &make_theme(),
            BorderStyle::Rounded,
        );
    });

    assert!(output.contains(" RAM "));
    assert!(output.contains("Total"));
    assert!(output.contains("8.00 GB"));
    assert!(output.contains("Percentage"));
    assert!(output.contains("50.0%"));
}

#[test]
fn empty_gpu_table_renders_message() {
    let output = render_to_string(40, 3, |frame| {
        section_table::render(
            frame,
            Rect::new(0, 0, 40, 3),
            &Section::new(SectionKind::Gpu),
            &make_theme(),
            BorderStyle::Thin,
        );
    });

    assert!(output.contains("No GPU detected"));
}

#[test]
fn unavailable_value_uses_error_color() {
    let theme = make_theme();
    let backend = TestBackend::new(60, 5);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            section_table::render(
                frame,
                Rect::new(0, 0, 60, 5),
                &disk_section_denied(),
                &theme,
                BorderStyle::Rounded,
            );
        })
        .unwrap();
    let buf = terminal.backend().buffer();
    let output = buffer_to_string(buf);
    let row = output.lines().nth(3).unwrap();
    let col = row.chars().position(|c| c == 'U').unwrap() as u16;
    assert_eq!(buf.cell((col, 3)).unwrap().fg, theme.unavailable_fg);
}

#[test]
fn tab_bar_lists_all_sections() {
    let output = render_to_string(80, 3, |frame| {
        tabs::render(
            frame,
            Rect::new(0, 0, 80, 3),
            2,
            &make_theme(),
            BorderStyle::Rounded,
        );
    });

    for (i, kind) in SectionKind::ALL.iter().enumerate() {
        assert!(output.contains(&format!("{} {}", i + 1, kind.title())));
    }
    assert!(output.contains("hostscan"));
}

#[test]
fn statusbar_shows_capture_time() {
    let captured_at = Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    let output = render_to_string(100, 1, |frame| {
        statusbar::render(frame, Rect::new(0, 0, 100, 1), captured_at, &make_theme());
    });

    assert!(output.contains("Quit"));
    assert!(output.contains("Captured 2024-05-01 12:30:00"));
}

#[test]
fn full_frame_follows_selected_tab() {
    let mut app = App::new(make_snapshot(), &Config::default());
    app.selected_tab = 2;

    let output = render_to_string(80, 12, |frame| draw(frame, &app));
    assert!(output.contains("8.00 GB"));
    assert!(!output.contains("eth0"));

    app.selected_tab = 5;
    let output = render_to_string(80, 12, |frame| draw(frame, &app));
    assert!(output.contains("eth0"));
}

#[test]
fn help_overlay_draws_on_top() {
    let mut app = App::new(make_snapshot(), &Config::default());
    app.dispatch(crate::action::Action::ToggleHelp);

    let output = render_to_string(80, 20, |frame| draw(frame, &app));
    assert!(output.contains(" Help "));
    assert!(output.contains("Tabs"));
    assert!(output.contains("General"));
    assert!(output.contains("Next section"));
    assert!(output.contains("Toggle this help"));
}

#[test]
fn help_overlay_marks_current_section() {
    let mut app = App::new(make_snapshot(), &Config::default());
    app.selected_tab = 4;
    app.dispatch(crate::action::Action::ToggleHelp);

    let theme = app.theme.clone();
    let backend = TestBackend::new(80, 20);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| draw(frame, &app)).unwrap();
    let buf = terminal.backend().buffer();
    let output = buffer_to_string(buf);

    let find = |needle: &str| {
        output.lines().enumerate().find_map(|(y, row)| {
            let idx = row.find(needle)?;
            Some((row[..idx].chars().count() as u16, y as u16))
        })
    };
    // Rows read "       5  Disk" inside the overlay; the tab bar uses "5 Disk"
    let (x, y) = find("5  Disk").unwrap();
    assert_eq!(buf.cell((x + 3, y)).unwrap().bg, theme.tab_active_bg);
    let (x, y) = find("4  GPU").unwrap();
    assert_ne!(buf.cell((x + 3, y)).unwrap().bg, theme.tab_active_bg);
}
