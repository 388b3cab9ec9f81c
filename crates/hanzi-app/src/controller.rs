use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hanzi_core::dom::{CaretResolver, Selection, TextDocument};
use hanzi_core::popup::RenderSink;
use hanzi_core::session::Session;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::background::{Envelope, PageId, background_loop};
use crate::content::{ContentScript, HostEvent};
use crate::state::AppState;

/// Handle the host uses to drive one page
#[derive(Clone)]
pub struct PageHandle {
    pub id: PageId,
    pub host_tx: AsyncSender<HostEvent>,
}

impl PageHandle {
    pub async fn mouse_move(&self, x: f64, y: f64) -> anyhow::Result<()> {
        self.host_tx.send(HostEvent::MouseMove { x, y }).await?;
        Ok(())
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    state: Arc<AppState>,
    inbox: (AsyncSender<Envelope>, AsyncReceiver<Envelope>),
    cancel_token: CancellationToken,
    next_page: AtomicUsize,
    tasks: JoinSet<anyhow::Result<()>>,
}

impl AppController {
    pub async fn new(state: Arc<AppState>) -> Self {
        let capacity = state.config.read().await.channel_capacity;
        Self {
            state,
            inbox: kanal::bounded_async(capacity),
            cancel_token: CancellationToken::new(),
            next_page: AtomicUsize::new(0),
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn_background(&mut self) {
        self.tasks.spawn(background_loop(
            self.state.clone(),
            self.inbox.1.clone(),
            self.cancel_token.child_token(),
        ));
    }

    /// Start a content script for a page and register it with the background
    pub async fn connect_page<D, C, S, R>(
        &mut self,
        document: D,
        resolver: C,
        selection: S,
        render: R,
    ) -> anyhow::Result<PageHandle>
    where
        D: TextDocument + Send + 'static,
        D::Node: Send + Sync + 'static,
        C: CaretResolver<D> + Send + 'static,
        S: Selection<D> + Send + 'static,
        R: RenderSink<D::Node> + Send + 'static,
    {
        let (hover, capacity) = {
            let config = self.state.config.read().await;
            (config.hover.clone(), config.channel_capacity)
        };

        let page = PageId(self.next_page.fetch_add(1, Ordering::Relaxed));
        let (reply_tx, reply_rx) = kanal::bounded_async::<String>(capacity);
        let (host_tx, host_rx) = kanal::bounded_async::<HostEvent>(capacity);

        let script = ContentScript {
            page,
            document,
            resolver,
            selection,
            render,
            session: Session::new(hover),
            outbox: self.inbox.0.clone(),
            cancel: self.cancel_token.child_token(),
        };

        self.inbox
            .0
            .send(Envelope::Connect {
                page,
                reply: reply_tx,
            })
            .await?;
        self.tasks.spawn(script.run(host_rx, reply_rx));

        Ok(PageHandle { id: page, host_tx })
    }

    /// Toolbar action: switch lookups on or off for every page
    pub async fn set_enabled(&self, enabled: bool) -> anyhow::Result<()> {
        self.inbox.0.send(Envelope::Toggle(enabled)).await?;
        Ok(())
    }

    /// Raw message into the background, as a page would send it
    pub async fn send_raw(&self, page: PageId, payload: impl Into<String>) -> anyhow::Result<()> {
        self.inbox
            .0
            .send(Envelope::Message {
                page,
                payload: payload.into(),
            })
            .await?;
        Ok(())
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// Wait for every task after [`shutdown`](Self::shutdown)
    pub async fn join(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Task failed: {:#}", e),
                Err(e) => tracing::error!("Task panicked: {}", e),
            }
        }
    }
}
