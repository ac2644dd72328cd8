use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

use doorman::api::content::ContentClient;
use doorman::api::quotes::QuoteClient;
use doorman::api::storage::StorageClient;
use doorman::commands;
use doorman::config::Config;
use doorman::{Data, Error};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,serenity=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config_path =
        std::env::var("DOORMAN_CONFIG").unwrap_or_else(|_| "doorman.toml".to_string());
    let config = Config::load(std::path::Path::new(&config_path))?;
    info!(config = %config_path, "starting doorman");

    let http = reqwest::Client::builder()
        .user_agent(concat!("doorman/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let token = config.discord_token.clone();
    let data = Data {
        content: ContentClient::new(http.clone(), config.content.base_url.clone()),
        quotes: QuoteClient::new(http.clone(), config.quotes.base_url.clone()),
        storage: StorageClient::new(
            http,
            config.ledger.storage_base_url.clone(),
            config.ledger.storage_token.clone(),
        ),
        config,
    };

    let options: poise::FrameworkOptions<Data, Error> = poise::FrameworkOptions {
        commands: commands::get_commands(),
        on_error: |err| {
            Box::pin(async move {
                if let Err(e) = poise::builtins::on_error(err).await {
                    error!("error while handling command error: {e}");
                }
            })
        },
        ..Default::default()
    };

    let framework = poise::Framework::builder()
        .options(options)
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("{} is online", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    // Commands are slash-only; no privileged intents needed.
    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .context("failed to create Discord client")?;

    client.start().await.context("client error")?;
    Ok(())
}
