//! Runtime side of the Prismic normalization engine.
//!
//! - [`Runtime`]: a registry of type paths and normalized documents with
//!   change subscribers
//! - [`merge_preview_data`]: reconciles a previewed document with data built
//!   ahead of time
//! - [`PreviewSession`]: the resolve/bootstrap state machine driven by a
//!   preview link

mod error;
pub mod merge;
pub mod preview;
mod runtime;

pub use error::{RuntimeError, RuntimeResult};
pub use merge::{merge_preview_data, MergeStrategy};
pub use preview::{PreviewApi, PreviewFailure, PreviewParams, PreviewSession, PreviewState, PreviewToken};
pub use runtime::{Runtime, RuntimeEvent, SubscriptionId};
