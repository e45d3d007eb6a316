//! Watch command implementation

use crate::config::Config;
use crate::feed::{ConnectionState, PriceFeedConnection};
use crate::pipeline::DisplayPipeline;
use crate::project::{Direction, DisplayValue};
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Override the configured trading pair (e.g. ethusdt)
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration: Option<u64>,
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Neutral => " ",
    }
}

fn render(widget: &str, value: &DisplayValue) -> String {
    format!(
        "{:<12} {} {:>16} {:>+8}% vol {}",
        widget,
        arrow(value.direction),
        value.price,
        value.change_percent.round_dp(2),
        value.volume.round_dp(0)
    )
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(symbol) = &self.symbol {
            config.feed.symbol = symbol.clone();
        }

        let feed = PriceFeedConnection::new(config.ws_config());
        tracing::info!(url = %feed.url(), widgets = config.widgets.len(), "Watching price feed");

        let pipelines: Vec<DisplayPipeline> = config
            .widgets
            .iter()
            .map(|w| DisplayPipeline::attach(&w.name, &feed, w.projection, config.flash.reset_after()))
            .collect();

        let mut printers = Vec::new();
        for pipeline in &pipelines {
            let mut rx = pipeline.watch();
            let name = pipeline.name().to_string();
            printers.push(tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let value = rx.borrow_and_update().clone();
                    if let Some(value) = value {
                        println!("{}", render(&name, &value));
                    }
                }
            }));
        }

        let mut state_rx = feed.watch_state();
        printers.push(tokio::spawn(async move {
            while state_rx.changed().await.is_ok() {
                let state = *state_rx.borrow_and_update();
                match state {
                    ConnectionState::Connected => println!("● LIVE"),
                    ConnectionState::Connecting => println!("○ connecting..."),
                    ConnectionState::Disconnected => println!("○ offline, retrying"),
                }
            }
        }));

        match self.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => tokio::signal::ctrl_c().await?,
        }

        tracing::info!("Shutting down");
        for pipeline in &pipelines {
            pipeline.close();
        }
        for printer in printers {
            printer.abort();
        }

        Ok(())
    }
}
