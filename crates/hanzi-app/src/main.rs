use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hanzi_core::popup::Viewport;
use tracing_subscriber::EnvFilter;

pub mod background;
pub mod content;
pub mod controller;
pub mod host;
pub mod profile;
pub mod state;


use self::controller::AppController;
use self::host::{ChannelRender, GridLayout, RenderEvent, SharedSelection};
use self::state::AppState;

/// Hover over Chinese text and print the dictionary popup for each position
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON config file; environment variables are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// CC-CEDICT file to load instead of the bundled sample
    #[arg(long)]
    dict: Option<String>,

    /// Lines of page text; `|` splits a line into separate inline runs
    #[arg(required = true)]
    text: Vec<String>,
}

const CELL_WIDTH: f64 = 16.0;
const LINE_HEIGHT: f64 = 24.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = profile::load_config(args.config.as_deref())?;
    if let Some(dict) = args.dict {
        config.dictionary.path = Some(dict);
    }
    init_tracing(config.log_json);

    let popup_config = config.popup.clone();
    let wait = Duration::from_millis(config.hover.delay_ms * 4 + 500);
    let state = Arc::new(AppState::new(config));

    let mut controller = AppController::new(state).await;
    controller.spawn_background();

    let (document, layout) = GridLayout::build(args.text.iter().map(String::as_str), CELL_WIDTH, LINE_HEIGHT);
    tracing::info!("Page text: {}", host::document_text(&document));

    let viewport = Viewport {
        width: 800.0,
        height: 600.0,
        scroll_x: 0.0,
        scroll_y: 0.0,
    };
    let (render, render_rx) = ChannelRender::new(viewport, popup_config);
    let render_rx = render_rx.to_async();
    let page = controller
        .connect_page(document, layout.clone(), SharedSelection::new(), render)
        .await?;

    controller.set_enabled(true).await?;
    match tokio::time::timeout(wait, render_rx.recv()).await {
        Ok(Ok(RenderEvent::SessionChanged(true))) => {}
        Ok(Ok(RenderEvent::Error(message))) => anyhow::bail!(message),
        other => anyhow::bail!("page never enabled: {:?}", other),
    }

    for line in 0..layout.line_count() {
        for column in 0..layout.line_len(line) {
            let (x, y) = layout.point(line, column);
            page.mouse_move(x, y).await?;

            match tokio::time::timeout(wait, render_rx.recv()).await {
                Ok(Ok(RenderEvent::Show { html, position })) => {
                    println!(
                        "[{line}:{column}] popup at ({:.0}, {:.0})\n{html}",
                        position.left, position.top
                    );
                    // Move off the text and wait for the popup to go away
                    page.mouse_move(-100.0, -100.0).await?;
                    let _ = tokio::time::timeout(wait, render_rx.recv()).await;
                }
                Ok(Ok(RenderEvent::Hide)) => println!("[{line}:{column}] no match"),
                Ok(Ok(event)) => tracing::debug!("[{line}:{column}] {:?}", event),
                Ok(Err(e)) => anyhow::bail!("render channel closed: {e}"),
                Err(_) => println!("[{line}:{column}] no response"),
            }
        }
    }

    controller.shutdown();
    controller.join().await;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr));

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
