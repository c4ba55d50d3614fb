//
// Copyright 2025 The CTFE Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interfaces onto the node's collaborators: the Merkle tree store, the
//! entry database, the cluster controller, the signing frontend and the
//! proxy's peer selection. The front-end only consumes these; it never
//! mutates the log itself.

use url::Url;

use crate::entry::{LogEntry, LoggedEntry, QueueOutcome};

/// The most recent signed tree head served by this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTreeHead {
    pub tree_size: u64,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    pub sha256_root_hash: [u8; 32],
    /// Serialized digitally-signed struct, embedded in replies verbatim.
    pub signature: Vec<u8>,
}

/// An inclusion proof for a known leaf hash.
#[derive(Debug, Clone)]
pub struct AuditProof {
    pub leaf_index: u64,
    pub audit_path: Vec<Vec<u8>>,
}

/// The Merkle tree store and proof engine.
pub trait LogLookup: Send + Sync {
    fn latest_sth(&self) -> SignedTreeHead;

    /// `None` when the hash is not a leaf of the tree at `tree_size`.
    fn audit_proof(&self, leaf_hash: &[u8], tree_size: u64) -> Option<AuditProof>;

    /// May be empty for trivial size pairs.
    fn consistency_proof(&self, first: u64, second: u64) -> Vec<Vec<u8>>;
}

/// Read-only access to the sequenced entries.
pub trait EntryStore: Send + Sync {
    /// Iterates entries with sequence numbers `>= start`, in order.
    fn scan_entries(&self, start: u64) -> Box<dyn Iterator<Item = LoggedEntry> + '_>;
}

/// The cluster state controller's view of this node.
pub trait ClusterStateController: Send + Sync {
    /// May block on the cluster-state lock; call from a worker thread.
    fn node_is_stale(&self) -> bool;
}

/// The signing frontend: queues accepted entries and hands back SCTs.
/// Implementations must be callable from any worker thread.
pub trait SigningFrontend: Send + Sync {
    fn queue_entry(&self, entry: &LogEntry) -> QueueOutcome;
}

/// Chooses a fresh peer to forward requests to when this node is stale.
pub trait PeerSelector: Send + Sync {
    /// May block on the cluster-state lock; call from a worker thread.
    fn next_peer(&self) -> Option<Url>;
}
