use hanzi_config::popup::PopupConfig;

use crate::dictionary::DictionaryEntry;

/// Where the popup should appear
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupAnchor<N> {
    pub element: N,
    pub x: f64,
    pub y: f64,
}

/// Receives popup output from the hover session
pub trait RenderSink<N> {
    fn render(&mut self, html: &str, anchor: &PopupAnchor<N>);

    fn hide(&mut self);

    /// A user-visible failure, such as a dictionary that would not load
    fn error(&mut self, message: &str) {
        tracing::error!("{}", message);
    }

    /// Lookups were switched on or off
    fn session_changed(&mut self, _enabled: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupPosition {
    pub left: f64,
    pub top: f64,
}

/// Format entries as popup HTML
pub fn render_html(entries: &[DictionaryEntry]) -> String {
    let mut html = String::new();

    for entry in entries {
        html.push_str("<div class=\"entry\">");
        html.push_str("<span class=\"w-hanzi\">");
        html.push_str(&escape(&entry.simplified));
        html.push_str("</span>");
        if entry.traditional != entry.simplified {
            html.push_str("&nbsp;<span class=\"w-hanzi\">");
            html.push_str(&escape(&entry.traditional));
            html.push_str("</span>");
        }
        html.push_str("&nbsp;<span class=\"w-pinyin\">");
        html.push_str(&escape(&entry.pinyin));
        html.push_str("</span><br><span class=\"w-def\">");
        let definitions: Vec<String> = entry.definitions.iter().map(|d| escape(d)).collect();
        html.push_str(&definitions.join(" \u{25c6} "));
        html.push_str("</span></div>");
    }

    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Position a popup of the measured size next to the pointer, flipping
/// left or up when it would overflow the viewport.
pub fn place(
    x: f64,
    y: f64,
    measured_width: f64,
    measured_height: f64,
    viewport: &Viewport,
    config: &PopupConfig,
) -> PopupPosition {
    let width = if measured_width > 0.0 {
        measured_width
    } else {
        config.default_width
    };
    let height = if measured_height > 0.0 {
        measured_height
    } else {
        config.default_height
    };

    let mut left = x + config.offset_x;
    if left + width > viewport.width {
        left = (x - config.offset_x - width).max(0.0);
    }

    let mut top = y + config.offset_y;
    if top + height > viewport.height {
        top = (y - config.offset_y - height).max(0.0);
    }

    PopupPosition {
        left: left + viewport.scroll_x,
        top: top + viewport.scroll_y,
    }
}
