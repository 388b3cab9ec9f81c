use std::collections::HashMap;
use std::sync::Arc;

use hanzi_core::language::LanguageProcessor;
use hanzi_lang_chinese::ChineseProcessor;
use hanzi_types::{ActionIcon, ExtensionMessage, PageMessage, SearchResponse};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(pub usize);

/// Traffic into the background context
#[derive(Debug, Clone)]
pub enum Envelope {
    /// A page context came up and listens on `reply`
    Connect {
        page: PageId,
        reply: AsyncSender<String>,
    },
    Disconnect {
        page: PageId,
    },
    /// Serialized [`ExtensionMessage`] from a page
    Message {
        page: PageId,
        payload: String,
    },
    /// Toolbar action clicked
    Toggle(bool),
}

/// Dictionary host and enable/disable broadcaster
struct Background {
    state: Arc<AppState>,
    pages: HashMap<PageId, AsyncSender<String>>,
    processor: Option<Arc<dyn LanguageProcessor>>,
    icon: ActionIcon,
}

pub async fn background_loop(
    state: Arc<AppState>,
    inbox: AsyncReceiver<Envelope>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut background = Background {
        state,
        pages: HashMap::new(),
        processor: None,
        icon: ActionIcon::Off,
    };

    tracing::info!("[BACKGROUND] Waiting for messages");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[BACKGROUND] Stopping");
                break;
            }
            envelope = inbox.recv() => match envelope {
                Ok(envelope) => background.handle(envelope).await,
                Err(_) => break,
            }
        }
    }

    Ok(())
}

impl Background {
    async fn handle(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::Connect { page, reply } => {
                tracing::debug!("Page {:?} connected", page);
                if self.icon == ActionIcon::On {
                    send(&reply, &PageMessage::Enable);
                }
                self.pages.insert(page, reply);
            }
            Envelope::Disconnect { page } => {
                tracing::debug!("Page {:?} disconnected", page);
                self.pages.remove(&page);
            }
            Envelope::Toggle(enabled) => self.set_enabled(enabled).await,
            Envelope::Message { page, payload } => {
                match serde_json::from_str::<ExtensionMessage>(&payload) {
                    Ok(ExtensionMessage::Enable) => self.set_enabled(true).await,
                    Ok(ExtensionMessage::Disable) => self.set_enabled(false).await,
                    Ok(ExtensionMessage::Search(request)) => {
                        let response = match &self.processor {
                            Some(processor) => processor.search(&request),
                            None => SearchResponse::no_match(&request),
                        };
                        if let Some(reply) = self.pages.get(&page) {
                            send(reply, &PageMessage::Search(response));
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring malformed message from {:?}: {}", page, e);
                    }
                }
            }
        }
    }

    async fn set_enabled(&mut self, enabled: bool) {
        if enabled == (self.icon == ActionIcon::On) {
            return;
        }

        if !enabled {
            self.icon = ActionIcon::Off;
            tracing::info!("Action icon: {:?}", self.icon);
            self.broadcast(&PageMessage::Disable);
            return;
        }

        if self.processor.is_none() {
            match self.load_dictionary().await {
                Ok(processor) => self.processor = Some(processor),
                Err(e) => {
                    tracing::error!("Failed to load dictionary: {:#}", e);
                    self.broadcast(&PageMessage::Error {
                        message: format!("Dictionary failed to load: {e}"),
                    });
                    return;
                }
            }
        }

        self.icon = ActionIcon::On;
        tracing::info!("Action icon: {:?}", self.icon);
        self.broadcast(&PageMessage::Enable);
    }

    async fn load_dictionary(&self) -> anyhow::Result<Arc<dyn LanguageProcessor>> {
        let config = self.state.config.read().await.dictionary.clone();
        let processor =
            tokio::task::spawn_blocking(move || ChineseProcessor::from_config(&config)).await??;
        Ok(Arc::new(processor))
    }

    fn broadcast(&self, message: &PageMessage) {
        for reply in self.pages.values() {
            send(reply, message);
        }
    }
}

/// Never waits on a page: a page may itself be blocked sending to us
fn send(reply: &AsyncSender<String>, message: &PageMessage) {
    match serde_json::to_string(message) {
        Ok(payload) => match reply.try_send(payload) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Page inbox full, dropping message"),
            Err(e) => tracing::debug!("Page went away: {}", e),
        },
        Err(e) => tracing::error!("Failed to serialize page message: {}", e),
    }
}
