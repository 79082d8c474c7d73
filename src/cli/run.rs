use std::{path::PathBuf, process};

use clap::Parser;
use registrar::{Registrar, Scenario};
use tracing::instrument;

use super::{render, terminal::Tone};

#[derive(Debug, Parser)]
#[command(about = "Apply the steps of a scenario file in order")]
pub struct Run {
    /// The scenario file
    scenario: PathBuf,

    /// Stop at the first step that fails
    #[arg(long)]
    fail_fast: bool,

    /// Print one JSON object per step instead of text
    #[arg(long)]
    json: bool,
}

impl Run {
    #[instrument(level = "debug", skip(self, registrar), fields(scenario = %self.scenario.display()))]
    pub fn run(self, mut registrar: Registrar) -> anyhow::Result<()> {
        let scenario = Scenario::load(&self.scenario)?;
        let total = scenario.steps.len();
        let mut failed = 0;

        for (index, step) in scenario.steps.into_iter().enumerate() {
            let number = index + 1;
            tracing::info!(step = number, ?step, "applying step");
            let result = step.apply(&mut registrar);

            if self.json {
                println!("{}", render::json(number, &result)?);
            } else {
                println!(
                    "{} {}",
                    Tone::Muted.paint(format!("[{number}/{total}]")),
                    render::text(&result)
                );
            }

            if result.is_err() {
                failed += 1;
                if self.fail_fast {
                    break;
                }
            }
        }

        if !self.json {
            println!();
            if failed == 0 {
                println!("{}", Tone::Success.paint(format!("✅ {total} steps applied")));
            } else {
                println!(
                    "{}",
                    Tone::Warning.paint(format!("⚠️  {failed} of {total} steps failed"))
                );
            }
        }

        // Exit with a non-zero code when any step failed.
        if failed > 0 {
            process::exit(2);
        }
        Ok(())
    }
}
