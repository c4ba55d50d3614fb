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

//! Submission front-end of a Certificate Transparency log node.
//!
//! Clients submit X.509 certificates, precertificates or generic signed
//! blobs; the front-end validates them against the trust store, turns them
//! into canonical [`entry::LogEntry`] values and hands them to the signing
//! frontend, which answers with a Signed Certificate Timestamp. The same
//! dispatcher serves the RFC 6962 read endpoints from the tree store, and
//! forwards everything to a fresh peer while this node is stale relative to
//! the cluster's serving tree.
//!
//! The log itself (tree construction, signing, persistence) lives behind
//! the interfaces in [`lookup`].

pub mod cert;
pub mod config;
pub mod entry;
pub mod errors;
pub mod lookup;
pub mod serialization;
pub mod server;
pub mod submission;

pub use cert::{CertChain, CertChecker, Certificate, PreCertChain, SignedData, TbsCertificateView};
pub use config::Config;
pub use entry::{LogEntry, LoggedEntry, QueueOutcome, SignedCertificateTimestamp};
pub use errors::{CtError, ErrorClass, Result};
pub use lookup::{
    AuditProof, ClusterStateController, EntryStore, LogLookup, PeerSelector, SignedTreeHead,
    SigningFrontend,
};
pub use server::{build_router, AppState, HttpFrontend};
pub use submission::{x509_chain_to_entry, SubmissionHandler};
