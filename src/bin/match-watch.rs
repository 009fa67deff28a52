//! Follow a match by share code from the terminal until it stops being live.
//!
//! Usage: `match-watch <base-url> <share-code> [interval-secs]`

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "sync-client")]
    {
        watch::run()?;
    }
    Ok(())
}

#[cfg(feature = "sync-client")]
mod watch {
    use std::{env, sync::Arc, time::Duration};

    use anyhow::{Context, bail};
    use tracing::info;
    use turf_live_back::{
        client::{
            http::HttpMatchSource,
            poller::{MatchPoller, PollState},
        },
        config::DEFAULT_POLL_INTERVAL,
        dto::matches::PublicMatchView,
    };

    pub fn run() -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();

        let mut args = env::args().skip(1);
        let (Some(base_url), Some(code)) = (args.next(), args.next()) else {
            bail!("usage: match-watch <base-url> <share-code> [interval-secs]");
        };
        let interval = match args.next() {
            Some(raw) => Duration::from_secs(raw.parse().context("parsing interval-secs")?),
            None => DEFAULT_POLL_INTERVAL,
        };
        if interval.is_zero() {
            bail!("interval-secs must be positive");
        }

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("building tokio runtime")?
            .block_on(follow(base_url, code, interval))
    }

    async fn follow(base_url: String, code: String, interval: Duration) -> anyhow::Result<()> {
        let source = Arc::new(HttpMatchSource::new(base_url));
        let mut poller = MatchPoller::load(source, code, interval)
            .await
            .context("loading match")?;

        print_view(&poller.snapshot());
        let mut snapshots = poller.subscribe();
        let mut state = poller.state_watcher();

        loop {
            let current = *state.borrow();
            if let PollState::Stopped(reason) = current {
                info!(?reason, "stopped following match");
                break;
            }
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    print_view(&snapshots.borrow_and_update());
                }
                _ = state.changed() => {}
                _ = tokio::signal::ctrl_c() => {
                    poller.stop().await;
                    break;
                }
            }
        }
        Ok(())
    }

    fn print_view(view: &PublicMatchView) {
        let score = view
            .teams
            .iter()
            .map(|team| format!("{} {}", team.name, team.score))
            .collect::<Vec<_>>()
            .join(" - ");
        println!("[{:?}] {} | {}", view.status, view.name, score);
        if let Some(latest) = view.events.first() {
            println!("    {} {}", latest.time_label, latest.description);
        }
    }
}
