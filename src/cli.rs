use std::path::PathBuf;

mod render;
mod run;
mod shell;
mod terminal;

use clap::ArgAction;
use registrar::{Config, Registrar};
use run::Run;
use shell::Shell;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML config file overriding the store's fixed sizes
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path).map_err(|e| anyhow::anyhow!(e))?,
            None => Config::default(),
        };
        tracing::debug!(?config, "configuration loaded");
        let registrar = Registrar::new(config);

        self.command
            .unwrap_or_else(|| Command::Shell(Shell::default()))
            .run(registrar)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Apply the steps of a scenario file in order
    Run(Run),

    /// Interactive menu (default)
    Shell(Shell),
}

impl Command {
    fn run(self, registrar: Registrar) -> anyhow::Result<()> {
        match self {
            Self::Run(command) => command.run(registrar)?,
            Self::Shell(command) => command.run(registrar)?,
        }
        Ok(())
    }
}
