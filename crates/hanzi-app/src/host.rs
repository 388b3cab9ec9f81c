//! A stand-in page for running the content script outside a browser: text
//! lines laid out on a fixed character grid.

use std::sync::{Arc, Mutex};

use hanzi_config::popup::PopupConfig;
use hanzi_core::dom::{
    CaretResolver, Document, MemorySelection, NodeId, Selection, TextDocument, TextPosition,
    TextRange,
};
use hanzi_core::popup::{self, PopupAnchor, PopupPosition, RenderSink, Viewport};

/// One character cell on the grid
#[derive(Debug, Clone, Copy)]
struct Cell {
    element: NodeId,
    text: NodeId,
    offset: usize,
}

#[derive(Debug, Clone)]
struct Line {
    element: NodeId,
    cells: Vec<Cell>,
}

/// Monospace layout: every character is `cell_width` wide, every line
/// `line_height` tall.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub cell_width: f64,
    pub line_height: f64,
    lines: Vec<Line>,
}

impl GridLayout {
    /// Build a document with one `<p>` per line. `|` splits a line into
    /// separate `<span>` runs.
    pub fn build<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        cell_width: f64,
        line_height: f64,
    ) -> (Document, GridLayout) {
        let mut doc = Document::new();
        let mut layout = Vec::new();

        for line in lines {
            let p = doc.append_element(doc.root(), "p");
            let mut cells = Vec::new();
            let runs: Vec<&str> = line.split('|').collect();

            for run in runs {
                if run.is_empty() {
                    continue;
                }
                let (element, text) = if line.contains('|') {
                    let span = doc.append_element(p, "span");
                    (span, doc.append_text(span, run))
                } else {
                    (p, doc.append_text(p, run))
                };
                cells.extend((0..run.chars().count()).map(|offset| Cell {
                    element,
                    text,
                    offset,
                }));
            }

            layout.push(Line { element: p, cells });
        }

        (
            doc,
            GridLayout {
                cell_width,
                line_height,
                lines: layout,
            },
        )
    }

    /// Centre of the character cell at (`line`, `column`)
    pub fn point(&self, line: usize, column: usize) -> (f64, f64) {
        (
            (column as f64 + 0.5) * self.cell_width,
            (line as f64 + 0.5) * self.line_height,
        )
    }

    pub fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map(|l| l.cells.len()).unwrap_or(0)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_at(&self, y: f64) -> Option<&Line> {
        if y < 0.0 {
            return None;
        }
        self.lines.get((y / self.line_height) as usize)
    }

    fn cell_at(&self, x: f64, y: f64) -> Option<Cell> {
        if x < 0.0 {
            return None;
        }
        self.line_at(y)?
            .cells
            .get((x / self.cell_width) as usize)
            .copied()
    }
}

impl CaretResolver<Document> for GridLayout {
    fn element_at(&self, _doc: &Document, x: f64, y: f64) -> Option<NodeId> {
        match self.cell_at(x, y) {
            Some(cell) => Some(cell.element),
            None => self.line_at(y).map(|line| line.element),
        }
    }

    fn caret_at(&self, _doc: &Document, x: f64, y: f64) -> Option<TextPosition<NodeId>> {
        self.cell_at(x, y)
            .map(|cell| TextPosition::new(cell.text, cell.offset))
    }
}

/// What the render sink was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Show { html: String, position: PopupPosition },
    Hide,
    Error(String),
    SessionChanged(bool),
}

/// Render sink forwarding everything onto a channel
pub struct ChannelRender {
    tx: kanal::Sender<RenderEvent>,
    viewport: Viewport,
    config: PopupConfig,
}

impl ChannelRender {
    pub fn new(viewport: Viewport, config: PopupConfig) -> (Self, kanal::Receiver<RenderEvent>) {
        let (tx, rx) = kanal::unbounded();
        (
            Self {
                tx,
                viewport,
                config,
            },
            rx,
        )
    }

    fn emit(&self, event: RenderEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Render receiver dropped");
        }
    }
}

impl RenderSink<NodeId> for ChannelRender {
    fn render(&mut self, html: &str, anchor: &PopupAnchor<NodeId>) {
        // Nothing is measured off-browser, so placement falls back to the default size
        let position = popup::place(anchor.x, anchor.y, 0.0, 0.0, &self.viewport, &self.config);
        self.emit(RenderEvent::Show {
            html: html.to_string(),
            position,
        });
    }

    fn hide(&mut self) {
        self.emit(RenderEvent::Hide);
    }

    fn error(&mut self, message: &str) {
        tracing::error!("{}", message);
        self.emit(RenderEvent::Error(message.to_string()));
    }

    fn session_changed(&mut self, enabled: bool) {
        self.emit(RenderEvent::SessionChanged(enabled));
    }
}

/// Selection shared with whoever drives the page
#[derive(Debug, Clone, Default)]
pub struct SharedSelection(Arc<Mutex<MemorySelection<NodeId>>>);

impl SharedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> Option<TextRange<NodeId>> {
        self.0.lock().ok().and_then(|s| s.range())
    }

    /// Select as the user would
    pub fn user_select(&self, doc: &Document, range: TextRange<NodeId>) {
        if let Ok(mut selection) = self.0.lock() {
            selection.select(doc, range);
        }
    }
}

impl Selection<Document> for SharedSelection {
    fn is_collapsed(&self) -> bool {
        self.0
            .lock()
            .map(|s| Selection::<Document>::is_collapsed(&*s))
            .unwrap_or(true)
    }

    fn text(&self, doc: &Document) -> String {
        self.0
            .lock()
            .map(|s| Selection::<Document>::text(&*s, doc))
            .unwrap_or_default()
    }

    fn select(&mut self, doc: &Document, range: TextRange<NodeId>) {
        if let Ok(mut selection) = self.0.lock() {
            selection.select(doc, range);
        }
    }

    fn clear(&mut self) {
        if let Ok(mut selection) = self.0.lock() {
            Selection::<Document>::clear(&mut *selection);
        }
    }
}

/// Plain text of a document, for log lines
pub fn document_text(doc: &Document) -> String {
    let mut out = String::new();
    let mut cursor = doc.next_text_node(doc.root());
    while let Some(node) = cursor {
        out.push_str(doc.text(node).unwrap_or_default());
        cursor = doc.next_text_node(node);
    }
    out
}
