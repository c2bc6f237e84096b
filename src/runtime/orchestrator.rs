use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::{
    app::{load_config, load_config_file, Config},
    cli::{handle_command, Cli},
    responders::{Responder, ResponderFactory},
    utils::log_warn,
    voice::UnsupportedRecognizer,
};

use super::non_interactive::NonInteractiveRunner;
use super::repl::Repl;
use super::shell::Shell;

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = if let Some(config_path) = &cli.config {
            load_config_file(config_path)?
        } else {
            match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    log_warn("⚠️", format!("Failed to load config: {}. Using defaults.", e));
                    eprintln!("⚠️  Failed to load config: {}. Using defaults.", e);
                    Config::default()
                }
            }
        };

        if let Some(locale) = cli.locale {
            config.locale = locale;
        }
        if let Some(kind) = cli.responder {
            config.responder.kind = kind;
        }

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the orchestrator
    ///
    /// Returns `false` when a non-interactive answer came back as a failure.
    pub async fn run(self) -> Result<bool> {
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(true);
            }
        }

        let responder = self.build_responder()?;

        if let Some(prompt) = self.cli.prompt.clone() {
            let runner = NonInteractiveRunner::new(responder, &self.config);
            let result = runner.execute(prompt).await?;
            println!("{}", runner.format_result(&result, self.cli.output_format));
            return Ok(!result.failed);
        }

        println!(
            "🌱 Starting Agrimate ({} responder, {})",
            responder.name().green(),
            self.config.locale.language_name()
        );

        let shell = Shell::new(&self.config, responder, Arc::new(UnsupportedRecognizer));
        Repl::new(shell).run().await?;
        Ok(true)
    }

    fn build_responder(&self) -> Result<Arc<dyn Responder>> {
        ResponderFactory::create(&self.config).with_context(|| {
            format!(
                "Failed to initialize the {:?} responder",
                self.config.responder.kind
            )
        })
    }
}
