#![allow(missing_docs)]

//! Straylight CLI — compose campaign emails from the command line.
//!
//! One-shot subcommands (`audiences`, `inspect`, `compose`) log to stderr
//! only; `batch` adds a rotated JSON log file so campaign runs stay
//! auditable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use straylight::blocks::repository::BlockRepository;
use straylight::blocks::Tone;
use straylight::compose::{ComposeOptions, Composer, Contact};
use straylight::config::{CampaignConfig, Settings};

#[derive(Parser)]
#[command(name = "straylight", version, about = "Block-based campaign email composer")]
struct Cli {
    /// Settings file path (default: $STRAYLIGHT_CONFIG_PATH or ./config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List configured audience types.
    Audiences,
    /// Load the block repository and report per-category counts.
    Inspect,
    /// Compose a single email from a contact JSON file and print it as JSON.
    Compose {
        /// Contact record (JSON object).
        #[arg(long)]
        contact: PathBuf,
        /// Tone override: formal, casual, or personal.
        #[arg(long)]
        tone: Option<String>,
        /// Fail on unresolved placeholders.
        #[arg(long)]
        strict: bool,
        /// Keep unresolved placeholders verbatim.
        #[arg(long)]
        keep_placeholders: bool,
    },
    /// Compose a batch from a contacts JSON array.
    Batch {
        /// Contact records (JSON array).
        #[arg(long)]
        contacts: PathBuf,
        /// Write results here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Fail individual contacts on unresolved placeholders.
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path).context("failed to load settings")?,
        None => Settings::load().context("failed to load settings")?,
    };

    // Batch runs get the rotated JSON file layer; everything else is
    // console-only.
    let _guard = match &cli.command {
        Command::Batch { .. } => {
            Some(straylight::logging::init_batch(Path::new(&settings.paths.logs_dir))?)
        }
        _ => {
            straylight::logging::init_cli(&settings.log_level);
            None
        }
    };

    run(cli.command, &settings)
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Audiences => {
            let config = load_campaign(settings)?;
            for audience_type in config.audience_types() {
                println!("{audience_type}");
            }
            Ok(())
        }
        Command::Inspect => {
            let repository = BlockRepository::load_dir(&settings.paths.blocks_dir)
                .context("failed to load block repository")?;
            for (category, count) in repository.category_counts() {
                println!("{category}: {count}");
            }
            println!("total: {}", repository.len());
            Ok(())
        }
        Command::Compose {
            contact,
            tone,
            strict,
            keep_placeholders,
        } => {
            let composer = build_composer(settings)?;
            let contact: Contact = read_json(&contact).context("failed to read contact file")?;
            let options = ComposeOptions {
                tone: tone
                    .as_deref()
                    .map(str::parse::<Tone>)
                    .transpose()
                    .map_err(|e| anyhow::anyhow!(e))?,
                strict: strict || settings.compose.strict,
                keep_placeholders: keep_placeholders || settings.compose.keep_placeholders,
                ..ComposeOptions::default()
            };
            let email = composer
                .compose_email(&contact, &options)
                .context("composition failed")?;
            println!("{}", serde_json::to_string_pretty(&email)?);
            Ok(())
        }
        Command::Batch {
            contacts,
            output,
            strict,
        } => {
            let composer = build_composer(settings)?;
            let contacts: Vec<Contact> =
                read_json(&contacts).context("failed to read contacts file")?;
            let options = ComposeOptions {
                strict: strict || settings.compose.strict,
                keep_placeholders: settings.compose.keep_placeholders,
                ..ComposeOptions::default()
            };
            let per_contact: Option<&HashMap<String, ComposeOptions>> = None;
            let results = composer
                .compose_batch(&contacts, &options, per_contact)
                .context("batch composition failed")?;

            let failed = results.iter().filter(|r| r.error.is_some()).count();
            let succeeded = results.iter().filter(|r| r.error.is_none()).count();
            info!(total = results.len(), succeeded, failed, "batch composed");

            let rendered = serde_json::to_string_pretty(&results)?;
            match output {
                Some(path) => std::fs::write(&path, rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{rendered}"),
            }
            Ok(())
        }
    }
}

fn load_campaign(settings: &Settings) -> Result<CampaignConfig> {
    CampaignConfig::load(
        Path::new(&settings.paths.audiences_file),
        Path::new(&settings.paths.event_file),
    )
    .context("failed to load campaign data")
}

fn build_composer(settings: &Settings) -> Result<Composer> {
    let config = load_campaign(settings)?;
    let mut composer = Composer::new(config, &settings.paths.blocks_dir);
    composer.initialize().context("failed to load blocks")?;
    Ok(composer)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
