use console::Style;
use notekeeper::config::Theme;
use once_cell::sync::Lazy;

/// Styles used when rendering a note in the terminal.
pub struct Palette {
    pub heading: Style,
    pub quote: Style,
    pub marker: Style,
    pub title: Style,
    pub muted: Style,
    pub locked: Style,
}

static LIGHT: Lazy<Palette> = Lazy::new(|| Palette {
    heading: Style::new().blue(),
    quote: Style::new().color256(240),
    marker: Style::new().blue(),
    title: Style::new().bold(),
    muted: Style::new().color256(244).italic(),
    locked: Style::new().red(),
});

static DARK: Lazy<Palette> = Lazy::new(|| Palette {
    heading: Style::new().cyan(),
    quote: Style::new().color256(250),
    marker: Style::new().yellow(),
    title: Style::new().bold().white(),
    muted: Style::new().color256(246).italic(),
    locked: Style::new().magenta(),
});

pub fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Light => &LIGHT,
        Theme::Dark => &DARK,
    }
}
