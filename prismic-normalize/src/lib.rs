//! Type-path driven normalization of Prismic documents.
//!
//! Raw documents from the content API are walked once, field by field. At each
//! location the dispatcher looks the path up in a [`TypePathLookup`] and hands
//! the value to the normalizer for that kind:
//!
//! - links gain a resolved `url` and the linked `document`
//! - images gain Imgix URLs, responsive helpers and normalized thumbnails
//! - rich text gains rendered `html` and `text`
//! - embeds and integration fields become synthetic nodes
//!
//! Everything is synchronous and free of I/O. Side effects (synthetic nodes,
//! file download intents) are reported through a [`NodeSink`].

mod deps;
mod dispatch;
mod error;
mod image;
pub mod imgix;
mod link;
mod naming;
mod node;
mod options;
pub mod rich_text;
mod structured_text;

pub use deps::{
    CollectingSink, DownloadRequest, NodeLookup, NodeSink, NormalizeDeps, NullSink,
    TypePathLookup,
};
pub use dispatch::{normalize, normalize_document, normalize_or_raw};
pub use error::{NormalizeError, NormalizeResult};
pub use imgix::{ImageUrlBuilder, ImgixUrlBuilder};
pub use naming::{document_type_name, pascal_case};
pub use options::{
    DownloadPredicate, DownloadRule, ElementSerializer, HtmlElement, HtmlSerializer, LinkResolver,
    LinkedDocuments, NormalizeOptions, ShouldDownloadFiles,
};
