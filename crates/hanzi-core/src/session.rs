//! Hover session controller.
//!
//! [`Session::handle`] is a pure transition: it reads the document, updates
//! its own state and returns the side effects for the host to carry out.
//! Timers, the search round trip, rendering and the selection all live on the
//! host side.

use std::time::Duration;

use hanzi_config::hover::HoverConfig;
use hanzi_types::{SearchRequest, SearchResponse};

use crate::dom::{Selection, TextDocument, TextPosition, TextRange};
use crate::highlight;
use crate::popup::{self, PopupAnchor};
use crate::preprocess::{DefaultPreprocessor, Preprocessor, is_lookup_candidate};
use crate::projector;
use crate::span::{self, TextCheckpoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activation {
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PendingLookup(Pending),
    ShowingPopup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// Debounce timer armed
    Timer { generation: u64 },
    /// Timer fired, waiting on the search response
    Search,
}

/// Lookup sent to the background, kept until its response arrives
#[derive(Debug, Clone)]
struct InFlight<N> {
    request: SearchRequest,
    start: TextPosition<N>,
    checkpoints: Vec<TextCheckpoint<N>>,
}

#[derive(Debug, Clone)]
pub struct HoverState<N> {
    pub target_element: Option<N>,
    pub anchor: Option<TextPosition<N>>,
    /// Pointer position when the current lookup was armed
    pub last_popup: Option<(f64, f64)>,
    /// Text of the selection this session made, if any
    pub current_selection_text: Option<String>,
    in_flight: Option<InFlight<N>>,
}

impl<N> Default for HoverState<N> {
    fn default() -> Self {
        Self {
            target_element: None,
            anchor: None,
            last_popup: None,
            current_selection_text: None,
            in_flight: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent<N> {
    Enable,
    Disable,
    MouseMove {
        x: f64,
        y: f64,
        target: Option<N>,
        caret: Option<TextPosition<N>>,
    },
    TimerFired {
        generation: u64,
    },
    SearchResult(SearchResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect<N> {
    ArmTimer { generation: u64, delay: Duration },
    CancelTimer { generation: u64 },
    Search(SearchRequest),
    Render { html: String, anchor: PopupAnchor<N> },
    HidePopup,
    Highlight(TextRange<N>),
    ClearHighlight,
}

pub struct Session<N> {
    activation: Activation,
    phase: Phase,
    hover: HoverState<N>,
    config: HoverConfig,
    generation: u64,
    popup_visible: bool,
}

impl<N: Copy + Eq + std::fmt::Debug> Session<N> {
    pub fn new(config: HoverConfig) -> Self {
        Self {
            activation: Activation::Disabled,
            phase: Phase::Idle,
            hover: HoverState::default(),
            config,
            generation: 0,
            popup_visible: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.activation == Activation::Enabled
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hover(&self) -> &HoverState<N> {
        &self.hover
    }

    pub fn handle<D>(&mut self, doc: &D, event: SessionEvent<N>) -> Vec<Effect<N>>
    where
        D: TextDocument<Node = N> + ?Sized,
    {
        match event {
            SessionEvent::Enable => {
                if !self.is_enabled() {
                    tracing::info!("Hover lookups enabled");
                    self.activation = Activation::Enabled;
                }
                Vec::new()
            }
            SessionEvent::Disable => self.disable(),
            SessionEvent::MouseMove {
                x,
                y,
                target,
                caret,
            } => {
                if !self.is_enabled() {
                    return Vec::new();
                }
                self.mouse_move(doc, x, y, target, caret)
            }
            SessionEvent::TimerFired { generation } => {
                if !self.is_enabled() {
                    return Vec::new();
                }
                self.timer_fired(doc, generation)
            }
            SessionEvent::SearchResult(response) => {
                if !self.is_enabled() {
                    return Vec::new();
                }
                self.search_result(response)
            }
        }
    }

    fn disable(&mut self) -> Vec<Effect<N>> {
        let mut effects = Vec::new();
        if let Phase::PendingLookup(Pending::Timer { generation }) = self.phase {
            effects.push(Effect::CancelTimer { generation });
        }
        effects.push(Effect::HidePopup);
        effects.push(Effect::ClearHighlight);

        if self.is_enabled() {
            tracing::info!("Hover lookups disabled");
        }
        self.activation = Activation::Disabled;
        self.phase = Phase::Idle;
        self.popup_visible = false;
        // The selection text is still needed to clear our highlight
        self.hover = HoverState {
            current_selection_text: self.hover.current_selection_text.take(),
            ..HoverState::default()
        };

        effects
    }

    fn mouse_move<D>(
        &mut self,
        doc: &D,
        x: f64,
        y: f64,
        target: Option<N>,
        caret: Option<TextPosition<N>>,
    ) -> Vec<Effect<N>>
    where
        D: TextDocument<Node = N> + ?Sized,
    {
        let position = caret
            .and_then(|c| span::advance_to_text(doc, c.node, c.offset))
            .filter(|p| target.is_some() && doc.parent(p.node) == target);

        if position.is_some() && position == self.hover.anchor && self.phase != Phase::Idle {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if let Phase::PendingLookup(Pending::Timer { generation }) = self.phase {
            effects.push(Effect::CancelTimer { generation });
        }
        self.hover.in_flight = None;
        self.hover.target_element = target;
        self.hover.anchor = position;

        if position.is_some() {
            self.generation += 1;
            self.phase = Phase::PendingLookup(Pending::Timer {
                generation: self.generation,
            });
            self.hover.last_popup = Some((x, y));
            effects.push(Effect::ArmTimer {
                generation: self.generation,
                delay: Duration::from_millis(self.config.delay_ms),
            });
            return effects;
        }

        // Off text: keep a popup the pointer has barely left
        let distance = self
            .hover
            .last_popup
            .map(|(px, py)| ((px - x).powi(2) + (py - y).powi(2)).sqrt())
            .unwrap_or(f64::INFINITY);

        if self.popup_visible && distance <= self.config.hide_distance_px {
            self.phase = Phase::ShowingPopup;
        } else {
            if self.popup_visible {
                effects.push(Effect::ClearHighlight);
                effects.push(Effect::HidePopup);
                self.popup_visible = false;
            }
            self.phase = Phase::Idle;
        }

        effects
    }

    fn timer_fired<D>(&mut self, doc: &D, generation: u64) -> Vec<Effect<N>>
    where
        D: TextDocument<Node = N> + ?Sized,
    {
        if self.phase != Phase::PendingLookup(Pending::Timer { generation }) {
            tracing::debug!("Ignoring superseded timer {}", generation);
            return Vec::new();
        }

        let Some(anchor) = self.hover.anchor else {
            return self.dismiss();
        };

        let span = match span::collect(doc, anchor.node, anchor.offset, self.config.max_length) {
            Ok(span) => span,
            Err(e) => {
                tracing::debug!("Nothing to collect at {:?}: {}", anchor, e);
                return self.dismiss();
            }
        };

        let text = DefaultPreprocessor.process(&span.buffer);
        if !text.chars().next().is_some_and(is_lookup_candidate) {
            tracing::debug!("Not a lookup candidate: {:?}", span.buffer);
            return self.dismiss();
        }

        let request = SearchRequest {
            text,
            original_text: span.buffer,
            sel_start_offset: anchor.offset,
        };
        tracing::debug!("Searching {:?}", request.text);

        self.hover.in_flight = Some(InFlight {
            request: request.clone(),
            start: anchor,
            checkpoints: span.checkpoints,
        });
        self.phase = Phase::PendingLookup(Pending::Search);

        vec![Effect::Search(request)]
    }

    fn search_result(&mut self, response: SearchResponse) -> Vec<Effect<N>> {
        let current = self.phase == Phase::PendingLookup(Pending::Search)
            && self.hover.in_flight.as_ref().is_some_and(|f| {
                f.request.original_text == response.original_text
                    && f.request.sel_start_offset == response.sel_start_offset
            });
        if !current {
            tracing::debug!("Discarding stale search response");
            return Vec::new();
        }

        let Some(in_flight) = self.hover.in_flight.take() else {
            return Vec::new();
        };

        if !response.is_match() {
            tracing::debug!("No match for {:?}", in_flight.request.text);
            return self.dismiss();
        }

        let length = projector::highlight_length(&in_flight.request.original_text, response.match_len);
        let (x, y) = self.hover.last_popup.unwrap_or_default();
        let anchor = PopupAnchor {
            element: self.hover.target_element.unwrap_or(in_flight.start.node),
            x,
            y,
        };

        let mut effects = vec![Effect::Render {
            html: popup::render_html(&response.data),
            anchor,
        }];
        if let Some(range) = projector::project(
            length,
            &in_flight.checkpoints,
            in_flight.start.node,
            in_flight.start.offset,
        ) {
            effects.push(Effect::Highlight(range));
        }

        self.popup_visible = true;
        self.phase = Phase::ShowingPopup;
        effects
    }

    /// No match: hide and clear, back to idle
    fn dismiss(&mut self) -> Vec<Effect<N>> {
        self.phase = Phase::Idle;
        self.hover.in_flight = None;
        self.popup_visible = false;
        vec![Effect::HidePopup, Effect::ClearHighlight]
    }

    /// Carry out [`Effect::Highlight`] against the page selection
    pub fn apply_highlight<D, S>(&mut self, doc: &D, selection: &mut S, range: TextRange<N>) -> bool
    where
        D: TextDocument<Node = N> + ?Sized,
        S: Selection<D> + ?Sized,
    {
        highlight::apply_highlight(doc, selection, range, &mut self.hover.current_selection_text)
    }

    /// Carry out [`Effect::ClearHighlight`] against the page selection
    pub fn clear_highlight<D, S>(&mut self, doc: &D, selection: &mut S)
    where
        D: TextDocument<Node = N> + ?Sized,
        S: Selection<D> + ?Sized,
    {
        highlight::clear_highlight(doc, selection, &mut self.hover.current_selection_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{DictionaryEntry, DictionaryIndex, RawEntry};
    use crate::dom::{Document, MemorySelection, NodeId};
    use crate::resolver;

    struct Page {
        doc: Document,
        element: NodeId,
        text: NodeId,
    }

    fn page(content: &str) -> Page {
        let mut doc = Document::new();
        let element = doc.append_element(doc.root(), "p");
        let text = doc.append_text(element, content);
        Page { doc, element, text }
    }

    fn dictionary() -> DictionaryIndex {
        DictionaryIndex::build(vec![
            RawEntry::new("你好", "你好", "nǐ hǎo", vec!["hello".to_string()]),
            RawEntry::new("中", "中", "zhōng", vec!["middle".to_string()]),
            RawEntry::new("中国", "中國", "Zhōng guó", vec!["China".to_string()]),
        ])
        .unwrap()
    }

    /// Stand-in for the background context
    fn answer(request: &SearchRequest, dict: &DictionaryIndex) -> SearchResponse {
        match resolver::resolve(&request.text, dict) {
            Some(found) => SearchResponse {
                data: found.entries.to_vec(),
                match_len: found.match_len,
                original_text: request.original_text.clone(),
                sel_start_offset: request.sel_start_offset,
            },
            None => SearchResponse::no_match(request),
        }
    }

    fn enabled_session() -> Session<NodeId> {
        let mut session = Session::new(HoverConfig::default());
        session.handle(&Document::new(), SessionEvent::Enable);
        session
    }

    fn hover(page: &Page, offset: usize, x: f64) -> SessionEvent<NodeId> {
        SessionEvent::MouseMove {
            x,
            y: 10.0,
            target: Some(page.element),
            caret: Some(TextPosition::new(page.text, offset)),
        }
    }

    fn armed_generation(effects: &[Effect<NodeId>]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::ArmTimer { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("timer armed")
    }

    fn search_request(effects: &[Effect<NodeId>]) -> SearchRequest {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Search(request) => Some(request.clone()),
                _ => None,
            })
            .expect("search issued")
    }

    /// Drive one hover through timer, search and response
    fn run_lookup(
        session: &mut Session<NodeId>,
        page: &Page,
        offset: usize,
        dict: &DictionaryIndex,
    ) -> Vec<Effect<NodeId>> {
        let effects = session.handle(&page.doc, hover(page, offset, 20.0));
        let generation = armed_generation(&effects);
        let effects = session.handle(&page.doc, SessionEvent::TimerFired { generation });
        let request = search_request(&effects);
        session.handle(&page.doc, SessionEvent::SearchResult(answer(&request, dict)))
    }

    #[test]
    fn disabled_session_ignores_pointer() {
        let page = page("你好吗");
        let mut session = Session::new(HoverConfig::default());
        assert!(session.handle(&page.doc, hover(&page, 0, 1.0)).is_empty());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn hover_over_word_renders_and_highlights() {
        let page = page("你好吗");
        let dict = dictionary();
        let mut session = enabled_session();

        let effects = session.handle(&page.doc, hover(&page, 0, 20.0));
        assert_eq!(
            effects,
            vec![Effect::ArmTimer {
                generation: 1,
                delay: Duration::from_millis(50)
            }]
        );
        assert_eq!(session.phase(), Phase::PendingLookup(Pending::Timer { generation: 1 }));

        let effects = session.handle(&page.doc, SessionEvent::TimerFired { generation: 1 });
        let request = search_request(&effects);
        assert_eq!(request.text, "你好吗");
        assert_eq!(request.sel_start_offset, 0);

        let effects = session.handle(&page.doc, SessionEvent::SearchResult(answer(&request, &dict)));
        assert_eq!(session.phase(), Phase::ShowingPopup);
        assert!(matches!(
            &effects[0],
            Effect::Render { html, anchor } if html.contains("nǐ hǎo") && anchor.element == page.element
        ));
        assert_eq!(
            effects[1],
            Effect::Highlight(TextRange {
                start: TextPosition::new(page.text, 0),
                end: TextPosition::new(page.text, 2),
            })
        );
    }

    #[test]
    fn latin_text_hides_without_searching() {
        let page = page("abc");
        let mut session = enabled_session();

        let effects = session.handle(&page.doc, hover(&page, 0, 20.0));
        let generation = armed_generation(&effects);
        let effects = session.handle(&page.doc, SessionEvent::TimerFired { generation });

        assert_eq!(effects, vec![Effect::HidePopup, Effect::ClearHighlight]);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn unmatched_han_text_hides_popup() {
        let page = page("吗");
        let dict = dictionary();
        let mut session = enabled_session();

        let effects = run_lookup(&mut session, &page, 0, &dict);
        assert_eq!(effects, vec![Effect::HidePopup, Effect::ClearHighlight]);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn moving_before_timer_cancels_it() {
        let page = page("你好中国");
        let mut session = enabled_session();

        session.handle(&page.doc, hover(&page, 0, 20.0));
        let effects = session.handle(&page.doc, hover(&page, 2, 60.0));
        assert_eq!(effects[0], Effect::CancelTimer { generation: 1 });
        assert_eq!(armed_generation(&effects), 2);

        // The first timer firing late changes nothing
        assert!(session.handle(&page.doc, SessionEvent::TimerFired { generation: 1 }).is_empty());
    }

    #[test]
    fn same_position_does_not_rearm() {
        let page = page("你好");
        let mut session = enabled_session();

        session.handle(&page.doc, hover(&page, 0, 20.0));
        assert!(session.handle(&page.doc, hover(&page, 0, 21.0)).is_empty());
    }

    #[test]
    fn stale_response_is_discarded() {
        let page = page("你好中国");
        let dict = dictionary();
        let mut session = enabled_session();

        let effects = session.handle(&page.doc, hover(&page, 0, 20.0));
        let generation = armed_generation(&effects);
        let effects = session.handle(&page.doc, SessionEvent::TimerFired { generation });
        let old_request = search_request(&effects);

        // Pointer moves on before the answer arrives
        session.handle(&page.doc, hover(&page, 2, 60.0));
        let effects = session.handle(
            &page.doc,
            SessionEvent::SearchResult(answer(&old_request, &dict)),
        );
        assert!(effects.is_empty());
        assert!(matches!(session.phase(), Phase::PendingLookup(Pending::Timer { .. })));
    }

    #[test]
    fn response_for_other_text_is_discarded() {
        let page = page("你好");
        let dict = dictionary();
        let mut session = enabled_session();

        let effects = session.handle(&page.doc, hover(&page, 0, 20.0));
        let generation = armed_generation(&effects);
        session.handle(&page.doc, SessionEvent::TimerFired { generation });

        let mut response = answer(
            &SearchRequest {
                text: "中国".to_string(),
                original_text: "中国".to_string(),
                sel_start_offset: 0,
            },
            &dict,
        );
        response.sel_start_offset = 0;
        assert!(session.handle(&page.doc, SessionEvent::SearchResult(response)).is_empty());
    }

    #[test]
    fn small_drift_off_text_keeps_popup() {
        let page = page("你好");
        let dict = dictionary();
        let mut session = enabled_session();
        run_lookup(&mut session, &page, 0, &dict);

        let near = SessionEvent::MouseMove {
            x: 23.0,
            y: 10.0,
            target: Some(page.element),
            caret: None,
        };
        assert!(session.handle(&page.doc, near).is_empty());
        assert_eq!(session.phase(), Phase::ShowingPopup);

        let far = SessionEvent::MouseMove {
            x: 40.0,
            y: 10.0,
            target: None,
            caret: None,
        };
        let effects = session.handle(&page.doc, far);
        assert_eq!(effects, vec![Effect::ClearHighlight, Effect::HidePopup]);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn new_word_while_showing_rearms_and_keeps_popup() {
        let page = page("你好中国");
        let dict = dictionary();
        let mut session = enabled_session();
        run_lookup(&mut session, &page, 0, &dict);

        let effects = session.handle(&page.doc, hover(&page, 2, 60.0));
        assert!(!effects.contains(&Effect::HidePopup));
        assert_eq!(session.phase(), Phase::PendingLookup(Pending::Timer { generation: 2 }));
    }

    #[test]
    fn caret_outside_target_element_does_not_qualify() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.root(), "p");
        let text = doc.append_text(p, "你好");
        let other = doc.append_element(doc.root(), "div");
        let mut session = enabled_session();

        let effects = session.handle(
            &doc,
            SessionEvent::MouseMove {
                x: 0.0,
                y: 0.0,
                target: Some(other),
                caret: Some(TextPosition::new(text, 0)),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn caret_at_end_of_node_moves_to_next_text() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.root(), "p");
        let first = doc.append_text(p, "我");
        let second = doc.append_text(p, "你好");
        let mut session = enabled_session();

        session.handle(
            &doc,
            SessionEvent::MouseMove {
                x: 0.0,
                y: 0.0,
                target: Some(p),
                caret: Some(TextPosition::new(first, 1)),
            },
        );
        assert_eq!(session.hover().anchor, Some(TextPosition::new(second, 0)));
    }

    #[test]
    fn disable_while_pending_cancels_timer() {
        let page = page("你好");
        let mut session = enabled_session();
        session.handle(&page.doc, hover(&page, 0, 20.0));

        let effects = session.handle(&page.doc, SessionEvent::Disable);
        assert_eq!(
            effects,
            vec![
                Effect::CancelTimer { generation: 1 },
                Effect::HidePopup,
                Effect::ClearHighlight
            ]
        );
        assert!(!session.is_enabled());
        assert!(session.handle(&page.doc, SessionEvent::TimerFired { generation: 1 }).is_empty());
    }

    #[test]
    fn non_joiner_extends_highlight() {
        let page = page("中\u{200c}国人");
        let dict = dictionary();
        let mut session = enabled_session();

        let effects = run_lookup(&mut session, &page, 0, &dict);
        assert!(effects.contains(&Effect::Highlight(TextRange {
            start: TextPosition::new(page.text, 0),
            end: TextPosition::new(page.text, 3),
        })));
    }

    #[test]
    fn highlight_crosses_inline_markup() {
        let mut doc = Document::new();
        let p = doc.append_element(doc.root(), "p");
        let first = doc.append_text(p, "我是中");
        let b = doc.append_element(p, "b");
        let second = doc.append_text(b, "国");
        let page = Page {
            doc,
            element: p,
            text: first,
        };
        let dict = dictionary();
        let mut session = enabled_session();

        let effects = run_lookup(&mut session, &page, 2, &dict);
        assert!(effects.contains(&Effect::Highlight(TextRange {
            start: TextPosition::new(first, 2),
            end: TextPosition::new(second, 1),
        })));
    }

    #[test]
    fn repeated_lookups_give_identical_results() {
        let page = page("中国人");
        let dict = dictionary();
        let mut first = enabled_session();
        let mut second = enabled_session();

        let a = run_lookup(&mut first, &page, 0, &dict);
        let b = run_lookup(&mut second, &page, 0, &dict);
        assert_eq!(a, b);

        let span_a = span::collect(&page.doc, page.text, 0, 7).unwrap();
        let span_b = span::collect(&page.doc, page.text, 0, 7).unwrap();
        assert_eq!(span_a, span_b);
        let entries: Vec<DictionaryEntry> = resolver::resolve(&span_a.buffer, &dict)
            .unwrap()
            .entries
            .to_vec();
        assert_eq!(entries[0].simplified, "中国");
    }

    #[test]
    fn highlight_round_trip_through_selection() {
        let page = page("你好吗");
        let dict = dictionary();
        let mut session = enabled_session();
        let mut selection = MemorySelection::new();

        for effect in run_lookup(&mut session, &page, 0, &dict) {
            if let Effect::Highlight(range) = effect {
                assert!(session.apply_highlight(&page.doc, &mut selection, range));
            }
        }
        assert_eq!(session.hover().current_selection_text.as_deref(), Some("你好"));

        session.handle(&page.doc, SessionEvent::Disable);
        session.clear_highlight(&page.doc, &mut selection);
        assert_eq!(selection.range(), None);
    }
}
