use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use tong_translate_core::glossary::now_iso;
use tong_translate_core::{
    verified_terms_block, AppConfig, DropboxStore, GlossaryStore, OpenAiClient,
    TranslationPipeline,
};

#[derive(Parser)]
#[command(
    name = "tong-translate",
    about = "Chinese→English translation with glossary-backed terminology",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a Chinese text file (reads stdin when no file is given)
    Translate {
        input: Option<PathBuf>,
        /// Cap on how many unknown terms are verified this run
        #[arg(long)]
        batch: Option<usize>,
        /// Write the translation to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect or edit the shared glossary
    Glossary {
        #[command(subcommand)]
        action: GlossaryAction,
    },
}

#[derive(Subcommand)]
enum GlossaryAction {
    /// Print all glossary rows
    Show,
    /// Add a term, or update it in place if it already exists
    Set {
        source: String,
        target: String,
        #[arg(long, default_value = "KNOWN")]
        status: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("incomplete configuration")?;

    match cli.command {
        Command::Translate {
            input,
            batch,
            output,
        } => translate(&config, input.as_deref(), batch, output.as_deref()).await,
        Command::Glossary { action } => glossary(&config, action).await,
    }
}

async fn translate(
    config: &AppConfig,
    input: Option<&Path>,
    batch: Option<usize>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let text = read_input(input)?;
    if text.trim().is_empty() {
        anyhow::bail!("input text is empty");
    }

    let client = Arc::new(OpenAiClient::new(&config.openai));
    let pipeline = TranslationPipeline::new(
        Box::new(DropboxStore::new(&config.dropbox)),
        Box::new(client.clone()),
        Box::new(client.clone()),
        Box::new(client),
        batch.map(Some).unwrap_or(config.verify_batch_limit),
    );

    let report = pipeline.run(&text).await?;

    match output {
        Some(path) => {
            std::fs::write(path, &report.translation)
                .with_context(|| format!("write {}", path.display()))?;
            println!("translation written to {}", path.display());
        }
        None => println!("{}", report.translation),
    }

    println!();
    println!(
        "terms: {} matched, {} unmatched, {} verified, {} added to glossary",
        report.matched, report.unmatched, report.verified, report.appended
    );
    println!("{}", verified_terms_block(&report.terms));
    Ok(())
}

async fn glossary(config: &AppConfig, action: GlossaryAction) -> anyhow::Result<()> {
    let store = DropboxStore::new(&config.dropbox);
    match action {
        GlossaryAction::Show => {
            let table = store.load().await?;
            for row in table.rows() {
                let edited = if row.edited { " *edited" } else { "" };
                println!(
                    "{} → {} ({}) [{}]{}",
                    row.source_term, row.target_term, row.status, row.source, edited
                );
            }
            println!("{} rows", table.len());
        }
        GlossaryAction::Set {
            source,
            target,
            status,
        } => {
            let mut table = store.load().await?;
            let updated = table.apply_edit(&source, &target, &status, &now_iso());
            store.save(&table).await?;
            println!(
                "{} {} → {}",
                if updated { "updated" } else { "added" },
                source,
                target
            );
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("read stdin")?;
            Ok(buffer)
        }
    }
}
