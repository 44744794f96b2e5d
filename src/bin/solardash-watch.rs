use std::sync::Arc;

use tracing::info;

use solardash::adapters::{HttpFeed, TracingSink};
use solardash::application::{ClientState, PollingClient};
use solardash::config::Config;
use solardash::logging;

fn report(state: &ClientState) {
    let Some(current) = &state.current else {
        return;
    };
    let power = &current.power_generation;
    let trends = state.power_trends().unwrap_or_else(solardash::domain::PowerTrends::flat);

    info!(
        "☀ solar {:.2} kW ({:+.2}%) | 🌬 wind {:.2} kW ({:+.2}%) | total {:.2} kW ({:+.2}%) | SOC {}%",
        power.solar_power(),
        trends.solar,
        power.wind_power(),
        trends.wind,
        power.total_power(),
        trends.total,
        current.battery_status.soc,
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load()?;
    logging::init(&config.log_level);

    let feed = HttpFeed::new(&config.base_url, config.request_timeout())?;
    info!("🚀 Watching {} every {} ms", feed.base_url(), config.poll_interval_ms);

    let client = PollingClient::new(Arc::new(feed), Arc::new(TracingSink), config.polling());
    let mut updates = client.subscribe();
    let handle = client.start(config.poll_interval());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                report(&updates.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    client.stop(&handle);
    Ok(())
}
