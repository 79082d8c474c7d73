//! `registrar`: run scripted sessions against, or interactively drive, an
//! in-memory academic records store.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
