use std::sync::Arc;

use dotenvy::dotenv;
use executor_watch::error::WatchError;
use executor_watch::notify::{DiscordClient, Notifier};
use executor_watch::scheduler::{await_ready, Scheduler, TrackerStatus};
use executor_watch::state::{AppConfig, BotConfig, READY_RETRY_DELAY};
use executor_watch::status::StatusFetcher;
use executor_watch::{dashboard, logs, AppState};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Sin configuración completa el proceso no arranca
    let config = AppConfig::from_env()?;
    let hub = logs::init_logging(config.log_level)?;
    log::info!("🔧 Configuration loaded: {:?}", config.bot);

    let (status_tx, status_rx) = watch::channel(TrackerStatus::default());
    let state = Arc::new(AppState::new(hub, status_rx));

    let fetcher = Arc::new(StatusFetcher::new(&config.status_api)?);
    let discord = Arc::new(DiscordClient::new(config.bot.token.clone())?);

    // El bot y el panel corren en paralelo, como dos servicios del mismo proceso
    let bot = tokio::spawn(run_bot(discord, fetcher, config.bot.clone(), status_tx));
    let server = dashboard::serve(config.dashboard.listen_addr, state);

    tokio::select! {
        res = server => {
            res?;
        }
        res = bot => {
            match res {
                Ok(Ok(())) => log::warn!("⚠️ Scheduler stopped"),
                Ok(Err(e)) => {
                    log::error!("❌ Fatal bot error: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    log::error!("❌ Bot task aborted: {}", e);
                    return Err(e.into());
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("👋 Shutdown signal received, exiting");
        }
    }

    Ok(())
}

async fn run_bot(
    discord: Arc<DiscordClient>,
    fetcher: Arc<StatusFetcher>,
    bot: BotConfig,
    status_tx: watch::Sender<TrackerStatus>,
) -> Result<(), WatchError> {
    let identity = await_ready(discord.as_ref(), READY_RETRY_DELAY).await?;
    status_tx.send_modify(|status| {
        status.ready = true;
        status.bot_user = Some(identity.username.clone());
    });

    log::info!("📡 Polling {}", fetcher.url());
    let notifier = Notifier::new(discord, bot.channel_id, bot.public_url, &identity);
    Scheduler::new(fetcher, notifier, status_tx).run().await;
    Ok(())
}
