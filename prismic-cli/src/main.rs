//! `prismic`: build-time tooling for normalized Prismic content.
//!
//! Usage:
//!   prismic derive --models ./customtypes --out ./public/static
//!   prismic source --config prismic.json --out ./.cache/prismic
//!   prismic merge --static page-data.json --preview preview.json
//!   prismic serve --dir ./public/static --port 8000

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use prismic_cli::{
    build_router, derive_type_paths, load_models, merge_files, run_source, write_type_paths,
    ServeState,
};
use prismic_runtime::MergeStrategy;
use prismic_source::FieldNameStyle;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "prismic")]
#[command(about = "Derive type paths, source Prismic content and merge previews")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive the type path file from Custom Type and Shared Slice models
    Derive {
        /// Directory of model JSON files
        #[arg(short, long)]
        models: PathBuf,

        /// Output directory for the type path file
        #[arg(short, long)]
        out: PathBuf,

        /// Keep dashes in field ids instead of replacing them with underscores
        #[arg(long)]
        keep_field_names: bool,
    },

    /// Fetch and normalize every document of a repository
    Source {
        /// Plugin options JSON file
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for nodes, type paths and files
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Merge a preview payload into static data and print the result
    Merge {
        /// Static data JSON file
        #[arg(long = "static")]
        static_data: PathBuf,

        /// Preview payload JSON file
        #[arg(long)]
        preview: PathBuf,

        #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
        strategy: StrategyArg,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Serve type path files over HTTP
    Serve {
        /// Directory holding type path files
        #[arg(short, long)]
        dir: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Auto,
    DeepMerge,
    TraverseAndReplace,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => MergeStrategy::Auto,
            StrategyArg::DeepMerge => MergeStrategy::DeepMerge,
            StrategyArg::TraverseAndReplace => MergeStrategy::TraverseAndReplace,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Derive {
            models,
            out,
            keep_field_names,
        } => {
            let style = if keep_field_names {
                FieldNameStyle::Identity
            } else {
                FieldNameStyle::Underscore
            };
            let models = load_models(&models)?;
            let type_paths = derive_type_paths(&models, style);
            let path = write_type_paths(&type_paths, &out)?;
            println!("{}", path.display());
        }
        Command::Source { config, out } => {
            let summary = run_source(&config, &out).await?;
            info!(
                "Sourced {} documents into {} nodes",
                summary.documents, summary.nodes
            );
            println!("{}", summary.nodes_file.display());
            println!("{}", summary.type_paths_file.display());
        }
        Command::Merge {
            static_data,
            preview,
            strategy,
            out,
        } => {
            let merged = merge_files(&static_data, &preview, strategy.into())?;
            let text = serde_json::to_string_pretty(&merged)?;
            match out {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{text}"),
            }
        }
        Command::Serve { dir, port } => {
            let app = build_router(Arc::new(ServeState { dir: dir.clone() }));
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
                .await
                .with_context(|| format!("Failed to bind port {port}"))?;
            info!("Serving type paths from {} on port {}", dir.display(), port);
            axum::serve(listener, app).await.context("HTTP server failed")?;
        }
    }

    Ok(())
}
