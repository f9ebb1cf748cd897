#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use argh::FromArgs;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::command::server;
use crate::configuration::Configuration;

mod command;
mod configuration;
mod secret;

fn set_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

#[derive(FromArgs, PartialEq, Debug)]
/// Authenticated management listener for an HTTP ingester
struct GlobalArguments {
    #[argh(option, short = 'c', default = "String::from(\"config.toml\")")]
    /// the path to the configuration file, defaults to `config.toml`
    config: String,

    #[argh(subcommand)]
    subcommand: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Serve(server::Options),
}

fn main() -> Result<(), command::Error> {
    let cli_args: GlobalArguments = argh::from_env();

    let config = Configuration::load(&cli_args.config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_command(cli_args, config))
}

async fn run_command(
    cli_args: GlobalArguments,
    config: Configuration,
) -> Result<(), command::Error> {
    set_tracing();

    match cli_args.subcommand {
        SubCommand::Serve(_) => {
            let server = server::Command::new(&config)?;
            server.run().await?;
        }
    }

    Ok(())
}
