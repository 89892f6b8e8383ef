//! dqpulse — data-quality metrics runner.

use std::sync::Arc;

use prometheus::Registry;
use tracing::{error, info};

use dq_pulse::cli::{self, Cli, Command};
use dq_pulse::config::Config;
use dq_pulse::error::PulseError;
use dq_pulse::gateway::{GatewayClient, GatewayConfig};
use dq_pulse::metrics::{self, PrometheusSink};
use dq_pulse::pipeline::Pipeline;
use dq_pulse::store::{QueryDefinition, QueryStore, SqliteStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    dq_pulse::logging::init();

    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides();
    cli.apply_overrides(&mut config);

    let store = Arc::new(SqliteStore::open(&config.store.path).await?);

    match &cli.command {
        Command::Run { print_metrics } => {
            let registry = Registry::new();
            let pipeline = build_pipeline(&config, store, &registry)?;

            let summary = pipeline.run_all().await?;
            for outcome in &summary.outcomes {
                match &outcome.result {
                    Ok(value) => println!("{}: {value}", outcome.name),
                    Err(failure) => println!("{}: FAILED ({failure})", outcome.name),
                }
            }
            println!(
                "{} succeeded, {} failed",
                summary.succeeded(),
                summary.failed()
            );

            if *print_metrics {
                print!("{}", metrics::encode_text(&registry)?);
            }
        }

        Command::Exec {
            template,
            query_id,
            params,
        } => {
            let registry = Registry::new();
            let pipeline = build_pipeline(&config, store, &registry)?;

            let value = match (template, query_id) {
                (Some(template), None) => {
                    let params = cli::parse_params(params)?;
                    pipeline.run_once(template, &params).await?
                }
                (None, Some(id)) => pipeline.run_stored(*id).await?,
                _ => {
                    return Err(PulseError::config(
                        "exec requires either --template or --query-id",
                    )
                    .into())
                }
            };
            println!("{value}");
        }

        Command::Add {
            name,
            description,
            template,
            params,
            product_id,
        } => {
            let params = cli::parse_params(params)?;
            let definition =
                QueryDefinition::new(name, description, template, params, *product_id);
            store.insert(&definition).await?;
            println!("{}", definition.query_id);
        }

        Command::List => {
            for definition in store.fetch_all().await? {
                println!(
                    "{}  {}  [{}]  {}",
                    definition.query_id,
                    definition.name,
                    definition.product_id,
                    definition.template
                );
            }
        }
    }

    Ok(())
}

/// Wires the pipeline over the configured gateway and a sink registered on
/// the given registry. The registry lifecycle stays here, at the entry
/// point; the pipeline only ever sees the sink handle.
fn build_pipeline(
    config: &Config,
    store: Arc<SqliteStore>,
    registry: &Registry,
) -> Result<Pipeline, PulseError> {
    let sink = Arc::new(PrometheusSink::new(registry)?);
    let gateway = GatewayClient::new(
        GatewayConfig::new(&config.gateway.url).with_timeout(config.gateway.timeout_secs),
    )?;
    Ok(Pipeline::new(store, Arc::new(gateway), sink))
}
