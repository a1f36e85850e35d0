mod catalog;
mod document;
mod error;
mod parser;
mod settings;

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use catalog::{Binding, CatalogStats};
use document::Document;
use parser::toc::Section;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "builtins_catalog",
    about = "Extract the built-in object catalog from the language specification HTML"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and write the table of contents only
    Toc {
        /// Specification HTML (default: settings `input`)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Build the catalog and write both the TOC and catalog files
    Build {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Build the catalog in memory and print per-kind counts
    Stats {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = settings::load().context("Failed to load settings")?;

    let result = match cli.command {
        Commands::Toc { input, output_dir } => {
            settings.override_paths(input, output_dir);
            let pb = stage_bar(2)?;
            let doc = load_document(settings.input(), &pb).await?;
            let toc = parser::toc::build_toc(&doc);
            pb.inc(1);
            pb.finish_and_clear();

            create_output_dir(&settings.output_dir).await?;
            catalog::write_toc(&settings.toc_path(), &toc).await?;
            println!("{} top-level clauses -> {}", toc.len(), settings.toc_path().display());
            Ok(())
        }
        Commands::Build { input, output_dir } => {
            settings.override_paths(input, output_dir);
            let (toc, bindings) = run_pipeline(&settings).await?;

            // Nothing is written until the whole catalog has been built.
            create_output_dir(&settings.output_dir).await?;
            let toc_path = settings.toc_path();
            let catalog_path = settings.catalog_path();
            tokio::try_join!(
                catalog::write_toc(&toc_path, &toc),
                catalog::write_catalog(&catalog_path, &bindings),
            )?;
            CatalogStats::of(&bindings).print();
            Ok(())
        }
        Commands::Stats { input } => {
            settings.override_paths(input, None);
            let (_, bindings) = run_pipeline(&settings).await?;
            CatalogStats::of(&bindings).print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn stage_bar(stages: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(stages);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

async fn load_document(path: &Path, pb: &ProgressBar) -> anyhow::Result<Document> {
    pb.set_message("parsing document");
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = Document::parse(&html);
    pb.inc(1);
    Ok(doc)
}

async fn run_pipeline(settings: &Settings) -> anyhow::Result<(Vec<Rc<Section>>, Vec<Binding>)> {
    let pb = stage_bar(3)?;
    let doc = load_document(settings.input(), &pb).await?;

    pb.set_message("building TOC");
    let toc = parser::toc::build_toc(&doc);
    pb.inc(1);

    pb.set_message("assembling catalog");
    let bindings = parser::build_catalog(&doc, &toc, &settings.anchors())
        .with_context(|| format!("Integrity check failed for {}", settings.input().display()))?;
    pb.inc(1);

    pb.finish_and_clear();
    Ok((toc, bindings))
}

async fn create_output_dir(dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
