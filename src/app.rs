use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::system::snapshot::{SectionKind, TelemetrySnapshot};
use crate::ui::theme::{BorderStyle, Theme, resolve_color_support};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub next_tab: KeyCode,
    pub prev_tab: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            next_tab: parse_key(&kb.next_tab).unwrap_or(KeyCode::Tab),
            prev_tab: parse_key(&kb.prev_tab).unwrap_or(KeyCode::BackTab),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Key help split by what the keys act on: tab navigation first, then the rest.
    pub fn help_groups(&self) -> [HelpGroup; 2] {
        let mut tabs = vec![
            HelpLine::new(key_label(self.next_tab), "Next section"),
            HelpLine::new(key_label(self.prev_tab), "Previous section"),
            HelpLine::new("\u{2190}\u{2192}", "Previous / next section"),
        ];
        tabs.extend(
            SectionKind::ALL
                .iter()
                .enumerate()
                .map(|(i, kind)| HelpLine::new((i + 1).to_string(), kind.title())),
        );

        [
            HelpGroup {
                title: "Tabs",
                lines: tabs,
            },
            HelpGroup {
                title: "General",
                lines: vec![
                    HelpLine::new(key_label(self.help), "Toggle this help"),
                    HelpLine::new(key_label(self.quit), "Quit"),
                    HelpLine::new("Ctrl+C", "Quit (always)"),
                ],
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpLine {
    pub key: String,
    pub description: &'static str,
}

impl HelpLine {
    fn new(key: impl Into<String>, description: &'static str) -> Self {
        HelpLine {
            key: key.into(),
            description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HelpGroup {
    pub title: &'static str,
    pub lines: Vec<HelpLine>,
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "S-Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        _ => "?".to_string(),
    }
}

/// View state over a snapshot that never changes.
pub struct App {
    pub running: bool,
    pub snapshot: TelemetrySnapshot,
    pub selected_tab: usize,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub border_style: BorderStyle,
    pub keybinds: ResolvedKeybinds,
}

impl App {
    pub fn new(snapshot: TelemetrySnapshot, config: &Config) -> Self {
        let color_support = resolve_color_support(&config.general.color_support);
        App {
            running: true,
            snapshot,
            selected_tab: 0,
            input_mode: InputMode::Normal,
            theme: Theme::from_config(&config.general.theme, color_support),
            border_style: BorderStyle::from_config_str(&config.general.border_style),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        }
    }

    pub fn selected_section(&self) -> SectionKind {
        SectionKind::ALL[self.selected_tab]
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Arrow and digit keys are hardwired (not configurable)
        match code {
            KeyCode::Right => return Action::NextTab,
            KeyCode::Left => return Action::PrevTab,
            KeyCode::Char(c @ '1'..='6') => {
                return Action::SelectTab(c as usize - '1' as usize);
            }
            _ => {}
        }

        if code == kb.quit || code == KeyCode::Esc {
            return Action::Quit;
        }
        if code == kb.next_tab {
            return Action::NextTab;
        }
        if code == kb.prev_tab {
            return Action::PrevTab;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        let tab_count = SectionKind::ALL.len();
        match action {
            Action::Quit => self.running = false,
            Action::NextTab => {
                self.selected_tab = (self.selected_tab + 1) % tab_count;
            }
            Action::PrevTab => {
                self.selected_tab = (self.selected_tab + tab_count - 1) % tab_count;
            }
            Action::SelectTab(index) => {
                if index < tab_count {
                    self.selected_tab = index;
                }
            }
            Action::ToggleHelp => {
                self.input_mode = match self.input_mode {
                    InputMode::Help => InputMode::Normal,
                    InputMode::Normal => InputMode::Help,
                };
            }
            Action::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::snapshot::Section;
    use chrono::Local;

    fn make_app() -> App {
        let snapshot = TelemetrySnapshot::new(
            Local::now(),
            Section::new(SectionKind::System),
            Section::new(SectionKind::Cpu),
            Section::new(SectionKind::Ram),
            Section::new(SectionKind::Gpu),
            Section::new(SectionKind::Disk),
            Section::new(SectionKind::Network),
        );
        App::new(snapshot, &Config::default())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn tabs_wrap_in_both_directions() {
        let mut app = make_app();
        app.dispatch(Action::PrevTab);
        assert_eq!(app.selected_section(), SectionKind::Network);
        app.dispatch(Action::NextTab);
        assert_eq!(app.selected_section(), SectionKind::System);
    }

    #[test]
    fn digit_keys_jump_to_tab() {
        let mut app = make_app();
        let action = app.map_key(press(KeyCode::Char('4')));
        assert_eq!(action, Action::SelectTab(3));
        app.dispatch(action);
        assert_eq!(app.selected_section(), SectionKind::Gpu);
    }

    #[test]
    fn out_of_range_select_is_ignored() {
        let mut app = make_app();
        app.dispatch(Action::SelectTab(2));
        app.dispatch(Action::SelectTab(9));
        assert_eq!(app.selected_tab, 2);
    }

    #[test]
    fn help_mode_swallows_navigation() {
        let mut app = make_app();
        app.dispatch(app.map_key(press(KeyCode::Char('?'))));
        assert!(app.show_help());
        assert_eq!(app.map_key(press(KeyCode::Right)), Action::None);
        assert_eq!(app.map_key(press(KeyCode::Esc)), Action::ToggleHelp);
    }

    #[test]
    fn help_groups_list_every_section() {
        let app = make_app();
        let [tabs, general] = app.keybinds.help_groups();
        assert_eq!(tabs.title, "Tabs");
        for (i, kind) in SectionKind::ALL.iter().enumerate() {
            assert!(
                tabs.lines
                    .iter()
                    .any(|l| l.key == (i + 1).to_string() && l.description == kind.title())
            );
        }
        assert_eq!(general.title, "General");
        assert_eq!(general.lines[0].key, "?");
        assert_eq!(general.lines[1].key, "q");
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = make_app();
        app.dispatch(Action::ToggleHelp);
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(key), Action::Quit);
        app.dispatch(Action::Quit);
        assert!(!app.running);
    }

    #[test]
    fn default_keybinds_map() {
        let app = make_app();
        assert_eq!(app.map_key(press(KeyCode::Tab)), Action::NextTab);
        assert_eq!(app.map_key(press(KeyCode::BackTab)), Action::PrevTab);
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Char('x'))), Action::None);
    }
}
