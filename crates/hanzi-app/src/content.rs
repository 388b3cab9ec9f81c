//! Page-side runtime: feeds pointer input and background replies into the
//! hover [`Session`] and carries out the effects it returns.

use hanzi_core::dom::{CaretResolver, Selection, TextDocument};
use hanzi_core::popup::RenderSink;
use hanzi_core::session::{Effect, Session, SessionEvent};
use hanzi_types::{ExtensionMessage, PageMessage};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::background::{Envelope, PageId};

/// Input from the hosting page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    MouseMove { x: f64, y: f64 },
}

/// Armed debounce timer
struct Timer {
    generation: u64,
    token: CancellationToken,
}

pub struct ContentScript<D, C, S, R>
where
    D: TextDocument,
{
    pub page: PageId,
    pub document: D,
    pub resolver: C,
    pub selection: S,
    pub render: R,
    pub session: Session<D::Node>,
    pub outbox: AsyncSender<Envelope>,
    pub cancel: CancellationToken,
}

impl<D, C, S, R> ContentScript<D, C, S, R>
where
    D: TextDocument + Send + 'static,
    D::Node: Send + Sync + 'static,
    C: CaretResolver<D> + Send + 'static,
    S: Selection<D> + Send + 'static,
    R: RenderSink<D::Node> + Send + 'static,
{
    pub async fn run(
        mut self,
        host_rx: AsyncReceiver<HostEvent>,
        inbox: AsyncReceiver<String>,
    ) -> anyhow::Result<()> {
        let (timer_tx, timer_rx) = kanal::unbounded_async::<u64>();
        let mut timer: Option<Timer> = None;

        tracing::info!("[PAGE {}] Content script running", self.page.0);
        loop {
            let event = tokio::select! {
                _ = self.cancel.cancelled() => break,
                host = host_rx.recv() => match host {
                    Ok(HostEvent::MouseMove { x, y }) => SessionEvent::MouseMove {
                        x,
                        y,
                        target: self.resolver.element_at(&self.document, x, y),
                        caret: self.resolver.caret_at(&self.document, x, y),
                    },
                    Err(_) => break,
                },
                payload = inbox.recv() => match payload {
                    Ok(payload) => match self.page_message(&payload) {
                        Some(event) => event,
                        None => continue,
                    },
                    Err(_) => break,
                },
                fired = timer_rx.recv() => match fired {
                    Ok(generation) => SessionEvent::TimerFired { generation },
                    Err(_) => break,
                },
            };

            let effects = self.session.handle(&self.document, event);
            for effect in effects {
                self.apply(effect, &mut timer, &timer_tx).await?;
            }
        }

        if let Some(timer) = timer.take() {
            timer.token.cancel();
        }
        let _ = self.outbox.try_send(Envelope::Disconnect { page: self.page });
        tracing::info!("[PAGE {}] Content script stopped", self.page.0);
        Ok(())
    }

    /// Decode a background message; `None` when there is nothing for the session
    pub(crate) fn page_message(&mut self, payload: &str) -> Option<SessionEvent<D::Node>> {
        match serde_json::from_str::<PageMessage>(payload) {
            Ok(PageMessage::Enable) => {
                self.render.session_changed(true);
                Some(SessionEvent::Enable)
            }
            Ok(PageMessage::Disable) => {
                self.render.session_changed(false);
                Some(SessionEvent::Disable)
            }
            Ok(PageMessage::Search(response)) => Some(SessionEvent::SearchResult(response)),
            Ok(PageMessage::Error { message }) => {
                self.render.error(&message);
                None
            }
            Err(e) => {
                tracing::warn!("[PAGE {}] Ignoring malformed message: {}", self.page.0, e);
                None
            }
        }
    }

    async fn apply(
        &mut self,
        effect: Effect<D::Node>,
        timer: &mut Option<Timer>,
        timer_tx: &AsyncSender<u64>,
    ) -> anyhow::Result<()> {
        match effect {
            Effect::ArmTimer { generation, delay } => {
                if let Some(old) = timer.take() {
                    old.token.cancel();
                }
                let token = self.cancel.child_token();
                let fired = token.clone();
                let tx = timer_tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = fired.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            let _ = tx.send(generation).await;
                        }
                    }
                });
                *timer = Some(Timer { generation, token });
            }
            Effect::CancelTimer { generation } => {
                if timer.as_ref().is_some_and(|t| t.generation == generation) {
                    if let Some(t) = timer.take() {
                        t.token.cancel();
                    }
                }
            }
            Effect::Search(request) => {
                let payload = serde_json::to_string(&ExtensionMessage::Search(request))?;
                self.outbox
                    .send(Envelope::Message {
                        page: self.page,
                        payload,
                    })
                    .await?;
            }
            Effect::Render { html, anchor } => self.render.render(&html, &anchor),
            Effect::HidePopup => self.render.hide(),
            Effect::Highlight(range) => {
                self.session
                    .apply_highlight(&self.document, &mut self.selection, range);
            }
            Effect::ClearHighlight => {
                self.session
                    .clear_highlight(&self.document, &mut self.selection);
            }
        }
        Ok(())
    }
}
