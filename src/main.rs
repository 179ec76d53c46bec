mod cli;

use std::convert::Infallible;
use std::env;

use appmgmt::config::{Config, PlatformEnv};
use appmgmt::startup::{self, SystemLauncher};
use appmgmt::{droplet, handlers, observability};
use clap::Parser;
use cli::{Cli, Commands};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AnyError> {
    observability::init_tracing();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Start) {
        Commands::Start => match start().await? {},
        Commands::Plan => {
            let config = Config::load()?;
            let decision = startup::plan(&config, &PlatformEnv::from_env())?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Commands::Config => println!("{}", Config::load()?.to_toml()?),
        Commands::HandlerConfig(args) => {
            let settings = handlers::handler_settings(&args.name, |var| env::var(var).ok());
            println!("{}", serde_json::to_string(&settings)?);
        }
        Commands::StartCommand => {
            let config = Config::load()?;
            println!("{}", droplet::find_start_command(&config.layout.app_dir)?);
        }
        Commands::FindPort(args) => println!("{}", droplet::find_port(args.start, args.end).await?),
    }

    Ok(())
}

/// Boot path; on success this process becomes the runtime or the proxy.
async fn start() -> startup::Result<Infallible> {
    let config = Config::load()?;
    let platform = PlatformEnv::from_env();
    let launcher = SystemLauncher::new(config.launch.shell.clone());

    startup::boot(&config, &platform, &launcher).await
}
