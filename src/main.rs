use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rocket::{catchers, routes};
use tracing::info;

mod config;
use config::RelayConfig;

mod notifier;
use notifier::Notifier;

mod webhooks;
use webhooks::{github_webhook, index, missing_mortem};

#[derive(Parser)]
#[clap(version = "0.1")]
struct Opts {
    /// Configuration file for gitcord
    #[clap(short, long, parse(from_os_str))]
    config: PathBuf,
}

#[rocket::catch(500)]
fn internal_error() -> &'static str {
    ""
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = Opts::parse();
    let config_file = File::open(&opts.config)
        .with_context(|| format!("couldn't open {}:", opts.config.display()))?;
    let config: RelayConfig = serde_yaml::from_reader(BufReader::new(config_file))
        .context("couldn't parse config file")?;

    let figment = rocket::Config::figment().merge(("port", config.port));
    info!("relaying webhooks on port {}", config.port);

    let rocket = rocket::custom(figment)
        .mount("/", routes![index, missing_mortem, github_webhook])
        .register("/", catchers![internal_error])
        .manage(config)
        .manage(Notifier::new());
    rocket.launch().await.map_err(|err| anyhow::anyhow!(err))?;

    Ok(())
}
