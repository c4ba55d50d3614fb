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

//! Canonical JSON replies and error responses. Binary fields are base64;
//! errors carry a short message and never leak internal state.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use tracing::{error, warn};

use crate::entry::{QueueOutcome, SignedCertificateTimestamp};
use crate::errors::{CtError, ErrorClass};
use crate::lookup::{AuditProof, SignedTreeHead};

#[derive(Serialize)]
struct ErrorBody {
    error_message: String,
}

pub fn json_reply<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

pub fn error_reply(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error_message: message.to_string(),
        }),
    )
        .into_response()
}

/// Maps a processing failure onto the RFC 6962 reply conventions: client
/// faults (including trust failures and misses) are 400s, anything that
/// breaks an invariant after validation is a 500 and gets logged loudly.
pub fn error_for(err: &CtError) -> Response {
    match err.class() {
        ErrorClass::Internal => {
            error!(error = %err, "internal error while handling request");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
        _ => error_reply(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

/// The add-chain/add-pre-chain/add-signed-data success body.
#[derive(Serialize)]
pub struct SctReply {
    sct_version: u8,
    id: String,
    timestamp: u64,
    extensions: String,
    signature: String,
}

impl From<&SignedCertificateTimestamp> for SctReply {
    fn from(sct: &SignedCertificateTimestamp) -> Self {
        Self {
            sct_version: sct.version,
            id: BASE64.encode(sct.log_id),
            timestamp: sct.timestamp,
            extensions: BASE64.encode(&sct.extensions),
            signature: BASE64.encode(&sct.signature),
        }
    }
}

/// Maps the signing queue's verdict onto an HTTP reply. A duplicate replies
/// exactly as if the entry were newly added.
pub fn add_chain_reply(outcome: QueueOutcome) -> Response {
    match outcome {
        QueueOutcome::Queued(sct) | QueueOutcome::AlreadyExists(sct) => {
            json_reply(SctReply::from(&sct))
        }
        QueueOutcome::ResourceExhausted(message) => {
            warn!(message = %message, "signing queue saturated");
            error_reply(StatusCode::SERVICE_UNAVAILABLE, &message)
        }
        QueueOutcome::Rejected(message) => error_reply(StatusCode::BAD_REQUEST, &message),
    }
}

#[derive(Serialize)]
pub struct SthReply {
    tree_size: u64,
    timestamp: u64,
    sha256_root_hash: String,
    tree_head_signature: String,
}

impl From<&SignedTreeHead> for SthReply {
    fn from(sth: &SignedTreeHead) -> Self {
        Self {
            tree_size: sth.tree_size,
            timestamp: sth.timestamp,
            sha256_root_hash: BASE64.encode(sth.sha256_root_hash),
            tree_head_signature: BASE64.encode(&sth.signature),
        }
    }
}

#[derive(Serialize)]
pub struct ProofByHashReply {
    leaf_index: u64,
    audit_path: Vec<String>,
}

impl From<&AuditProof> for ProofByHashReply {
    fn from(proof: &AuditProof) -> Self {
        Self {
            leaf_index: proof.leaf_index,
            audit_path: proof.audit_path.iter().map(|node| BASE64.encode(node)).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct ConsistencyReply {
    pub consistency: Vec<String>,
}

#[derive(Serialize)]
pub struct RootsReply {
    pub certificates: Vec<String>,
}

#[derive(Serialize)]
pub struct EntriesReply {
    pub entries: Vec<EntryReply>,
}

#[derive(Serialize)]
pub struct EntryReply {
    pub leaf_input: String,
    pub extra_data: String,
    /// Only present for `include_scts=true` requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sct: Option<String>,
}
