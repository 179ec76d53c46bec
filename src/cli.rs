use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "appmgmt")]
#[command(about = "Application management startup orchestrator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decide how to boot and launch (the default when no command is given)
    Start,
    /// Print the boot decision as JSON without running anything
    Plan,
    /// Print the effective configuration as TOML
    Config,
    /// Print a handler's user configuration as JSON
    HandlerConfig(HandlerConfigArgs),
    /// Print the web start command declared in the Procfile
    StartCommand,
    /// Print the first free local port in a range
    FindPort(FindPortArgs),
}

#[derive(clap::Args, Debug)]
pub struct HandlerConfigArgs {
    /// Handler name, e.g. "shell"
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct FindPortArgs {
    /// First port to try
    #[arg(long, default_value_t = 8080)]
    pub start: u16,

    /// Port after the last one to try
    #[arg(long, default_value_t = 9080)]
    pub end: u16,
}
