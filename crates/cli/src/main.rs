use std::sync::Arc;

use {
    clap::Parser,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    bookferry_config::BotMode,
    bookferry_mailer::SmtpMailer,
    bookferry_pipeline::pipeline::IngestionPipeline,
    bookferry_telegram::{HandlerContext, TelegramFileSource, bot, webhook},
};

#[derive(Parser)]
#[command(
    name = "bookferry",
    about = "Forward Telegram book uploads to a PocketBook mailbox"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "bookferry starting");

    let config = bookferry_config::from_env()?;
    std::fs::create_dir_all(&config.service.download_dir)?;

    let telegram_bot = bot::build_bot(&config.telegram)?;

    let source = Arc::new(TelegramFileSource::new(
        telegram_bot.clone(),
        config.telegram.fetch_timeout,
    )?);
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    let pipeline = Arc::new(IngestionPipeline::new(
        config.telegram.allowed_user_ids.clone(),
        &config.service.download_dir,
        source,
        mailer,
    ));
    let ctx = Arc::new(HandlerContext {
        bot: telegram_bot,
        pipeline,
    });

    match config.telegram.mode {
        BotMode::Webhook => {
            info!("starting in webhook mode");
            let url = config
                .telegram
                .webhook_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("webhook mode without WEBHOOK_URL"))?;
            webhook::serve(ctx, url, config.telegram.port).await?;
        },
        BotMode::Polling => {
            info!("starting in polling mode");
            let cancel = bot::start_polling(ctx).await?;
            tokio::signal::ctrl_c().await?;
            info!("shutting down");
            cancel.cancel();
        },
    }

    Ok(())
}
