//! Terminal binding for the counter reactor.
//!
//! Type `+` or `-` (or `plus` / `minus`) and press enter. The value line and
//! the busy indicator are rendered from separate distinct projections of the
//! state stream, the same way a label and a spinner would be bound in a UI.

use futures::StreamExt;
use oxide_reactor::{Container, CounterLogic, CounterState, SpawnedFuture};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

fn spawner(future: SpawnedFuture) {
    tokio::spawn(future);
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let container = Container::new(CounterState::default(), CounterLogic::default(), spawner);

    let mut values = container.observe().distinct_by(|state| state.value);
    let value_label = tokio::spawn(async move {
        while let Some(value) = values.next().await {
            println!("value: {value}");
        }
    });

    let mut loading = container.observe().distinct_by(|state| state.is_loading);
    let busy_indicator = tokio::spawn(async move {
        while let Some(is_loading) = loading.next().await {
            println!("{}", if is_loading { "[working...]" } else { "[idle]" });
        }
    });

    let dispatcher = container.dispatcher();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "q" || line == "quit" {
            break;
        }
        if let Err(err) = dispatcher.submit_tagged(line) {
            eprintln!("{err}");
        }
    }

    drop(container);
    let (value_label, busy_indicator) = tokio::join!(value_label, busy_indicator);
    for (binding, result) in [("value label", value_label), ("busy indicator", busy_indicator)] {
        if let Err(err) = result {
            tracing::error!(binding, %err, "binding task failed");
        }
    }
    Ok(())
}
