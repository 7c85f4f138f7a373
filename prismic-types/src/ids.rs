//! Deterministic node identifiers.
//!
//! Node ids are UUID v5 values derived from a seed string, so the same seed
//! (e.g. `"page XYZ"`) always produces the same id in every process: build
//! time and preview time agree without sharing state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace for all node ids minted by this workspace.
const NODE_NAMESPACE: Uuid = Uuid::from_u128(0x8f3c_4b1e_2d6a_5c70_9e41_b7d2_a5f0_1c38);

/// Identifier of a node handed to the host build system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Derives a node id from an arbitrary seed.
    #[must_use]
    pub fn from_seed(seed: &str) -> Self {
        Self(Uuid::new_v5(&NODE_NAMESPACE, seed.as_bytes()))
    }

    /// Node id of a Prismic document, seeded by its type and API id.
    #[must_use]
    pub fn for_document(document_type: &str, prismic_id: &str) -> Self {
        Self::from_seed(&format!("{document_type} {prismic_id}"))
    }

    /// Node id of a remote file, seeded by its URL.
    #[must_use]
    pub fn for_remote_file(url: &str) -> Self {
        Self::from_seed(&format!("file-node-{url}"))
    }

    /// Creates a node id from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a node id from a string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
