//! Sources Prismic content into a host build system.
//!
//! - [`PrismicClient`]: the REST API v2 behind the [`ContentApi`] trait
//! - [`NodeHost`]: the host's node store, with [`MemoryHost`] for in-process
//!   builds
//! - [`source_nodes`]: fetch, normalize and create every document node
//! - [`handle_webhook`]: incremental updates from Prismic webhooks
//! - [`download_files`]: `localFile` downloads, de-duplicated by URL
//! - [`HttpPreviewApi`]: what a preview session fetches over HTTP
//!
//! # Example
//!
//! ```no_run
//! use prismic_source::{source_nodes, HttpDownloader, MemoryHost, PluginOptions, PrismicClient};
//!
//! # async fn run() -> prismic_source::SourceResult<()> {
//! let options = PluginOptions::new("my-repo");
//! let client = PrismicClient::from_options(&options)?;
//! let host = MemoryHost::new();
//! let downloader = HttpDownloader::new("public/static")?;
//!
//! let report = source_nodes(&options, &client, &host, &downloader).await?;
//! println!("{} documents", report.documents);
//! # Ok(())
//! # }
//! ```

pub mod api;
mod config;
pub mod downloads;
mod error;
pub mod host;
mod preview;
pub mod sourcing;
pub mod webhook;

pub use api::{ApiRef, ClientConfig, ContentApi, PrismicClient, RepositoryMetadata};
pub use config::{FieldNameStyle, ModelTabs, PluginOptions};
pub use downloads::{download_files, DownloadReport, FileDownloader, HttpDownloader};
pub use error::{SourceError, SourceResult};
pub use host::{MemoryHost, NodeHost};
pub use preview::HttpPreviewApi;
pub use sourcing::{load_type_paths, persist_type_paths, source_nodes, SourceReport};
pub use webhook::{handle_webhook, WebhookKind, WebhookOutcome, WebhookPayload};
