use std::sync::Arc;
use sticker_bot::discord::{Handler, StickerRouter};
use sticker_bot::logging;
use sticker_bot::prelude::*;
use tracing::*;
use serenity::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optionally load the .env file
    let dotenv = dotenv::dotenv();

    let config = Config::from_env()?;
    let log_path = logging::init(&config.logs_dir, config.log_level)?;
    info!("logs will be written to {}", log_path.display());
    if let Err(e) = dotenv {
        debug!("no .env file loaded: {e}");
    }

    let gate = match &config.sticker_root {
        Some(root) => StickerGate::with_root(root),
        None => StickerGate::new(),
    };
    let registry = gate.get_or_init().await?;

    let router = StickerRouter::new(config.command_prefix.as_str(), Arc::new(HttpFetcher::default()));
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(router))
        .await?;
    client.data.write().await.insert::<RegistryHandle>(registry);

    info!("bot is now running, press CTRL-C to exit");
    if let Err(why) = client.start().await {
        error!("Client error: {why:?}");
    }
    Ok(())
}
