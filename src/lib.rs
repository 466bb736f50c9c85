pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;

use anyhow::Context;
use clients::kitsu::KitsuClient;
pub use config::Config;
use db::Store;
use services::{ImportPipeline, ImportSummary, PipelineContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber: env-filtered fmt output, plus a
/// Loki layer when enabled.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder();
        for (key, value) in &config.observability.loki_labels {
            builder = builder.label(key.as_str(), value.as_str())?;
        }
        let (layer, task) = builder.build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

/// Runs one import with an already-connected store and source.
pub async fn import(
    store: &Store,
    client: &KitsuClient,
    config: &Config,
) -> anyhow::Result<ImportSummary> {
    let mut ctx = PipelineContext::new();
    let summary = ImportPipeline::new(client, store, config)
        .run(&mut ctx)
        .await
        .context("Import aborted")?;
    Ok(summary)
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config)?;
    config.validate()?;

    let store = Store::connect(&config.database)
        .await
        .with_context(|| format!("Could not open database {}", config.database.url))?;

    if config.database.create_schema {
        store.create_schema().await?;
    }

    let client = KitsuClient::new(&config.kitsu).context("Failed to build Kitsu client")?;

    let result = import(&store, &client, &config).await;
    store.conn.close().await?;

    let summary = result?;
    println!("Imported {} anime into db", summary.imported);
    Ok(())
}
