use ratatui::style::Color;
use ratatui::widgets::BorderType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorSupport::Mono;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Rounded,
    Thin,
}

impl BorderStyle {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "thin" | "plain" => BorderStyle::Thin,
            _ => BorderStyle::Rounded,
        }
    }

    pub fn border_type(self) -> BorderType {
        match self {
            BorderStyle::Rounded => BorderType::Rounded,
            BorderStyle::Thin => BorderType::Plain,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub tab_active_bg: Color,
    pub tab_active_fg: Color,
    pub tab_inactive_fg: Color,
    pub label_fg: Color,
    pub value_fg: Color,
    pub unavailable_fg: Color,
    pub overlay_border: Color,
    pub statusbar_bg: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub text_secondary: Color,
}

impl Theme {
    pub fn from_config(theme_name: &str, support: ColorSupport) -> Self {
        if support == ColorSupport::Mono {
            return Self::mono();
        }
        let mut theme = match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        };
        theme.apply_color_support(support);
        theme
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.tab_active_bg = map(self.tab_active_bg);
        self.tab_active_fg = map(self.tab_active_fg);
        self.tab_inactive_fg = map(self.tab_inactive_fg);
        self.label_fg = map(self.label_fg);
        self.value_fg = map(self.value_fg);
        self.unavailable_fg = map(self.unavailable_fg);
        self.overlay_border = map(self.overlay_border);
        self.statusbar_bg = map(self.statusbar_bg);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.surface_bg = map(self.surface_bg);
        self.text_secondary = map(self.text_secondary);
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            tab_active_bg: Color::Rgb(103, 232, 249),
            tab_active_fg: Color::Black,
            tab_inactive_fg: Color::Gray,
            label_fg: Color::Rgb(192, 132, 252),
            value_fg: Color::White,
            unavailable_fg: Color::Rgb(248, 113, 113),
            overlay_border: Color::DarkGray,
            statusbar_bg: Color::DarkGray,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            text_secondary: Color::Gray,
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            tab_active_bg: Color::Blue,
            tab_active_fg: Color::White,
            tab_inactive_fg: Color::DarkGray,
            label_fg: Color::Rgb(124, 58, 237),
            value_fg: Color::Black,
            unavailable_fg: Color::Rgb(185, 28, 28),
            overlay_border: Color::Gray,
            statusbar_bg: Color::Gray,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Gray,
            text_secondary: Color::DarkGray,
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            tab_active_bg: Color::White,
            tab_active_fg: Color::Black,
            tab_inactive_fg: Color::Gray,
            label_fg: Color::Gray,
            value_fg: Color::White,
            unavailable_fg: Color::DarkGray,
            overlay_border: Color::Gray,
            statusbar_bg: Color::Black,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            text_secondary: Color::Gray,
        }
    }
}

fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match support {
        ColorSupport::Truecolor | ColorSupport::Auto => color,
        ColorSupport::Color256 => match color {
            Color::Rgb(r, g, b) => Color::Indexed(rgb_to_ansi256(r, g, b)),
            _ => color,
        },
        ColorSupport::Mono => match color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                if luminance > 128.0 {
                    Color::White
                } else {
                    Color::Black
                }
            }
            Color::White | Color::Black | Color::Gray | Color::DarkGray => color,
            _ => Color::White,
        },
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let r = (r as f32 / 255.0 * 5.0).round() as u8;
    let g = (g as f32 / 255.0 * 5.0).round() as u8;
    let b = (b as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * r + 6 * g + b
}
