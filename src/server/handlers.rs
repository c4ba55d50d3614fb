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

//! The RFC 6962 endpoint handlers.
//!
//! Handlers run short prologues (query parsing, body decoding, sanity
//! checks) on the reactor and push chain validation, database scans and
//! queueing onto the blocking pool. Submissions are moved into the worker
//! closure, so a cancelled request drops them with the task.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::task::JoinError;
use tracing::warn;

use crate::cert::PreCertChain;
use crate::entry::QueueOutcome;
use crate::errors::{CtError, Result};
use crate::serialization;
use crate::server::decode;
use crate::server::reply::{
    self, ConsistencyReply, EntriesReply, EntryReply, ProofByHashReply, RootsReply, SthReply,
};
use crate::server::AppState;

pub async fn get_sth(State(state): State<Arc<AppState>>) -> Response {
    reply::json_reply(SthReply::from(&state.lookup.latest_sth()))
}

pub async fn get_roots(State(state): State<Arc<AppState>>) -> Response {
    let Some(checker) = &state.checker else {
        // get-roots is only routed when a trust store exists.
        return reply::error_reply(StatusCode::INTERNAL_SERVER_ERROR, "No trust store.");
    };
    let certificates = checker
        .trusted_certificates()
        .map(|cert| BASE64.encode(cert.to_der()))
        .collect();
    reply::json_reply(RootsReply { certificates })
}

pub async fn get_entries(State(state): State<Arc<AppState>>, RawQuery(raw): RawQuery) -> Response {
    let query = decode::parse_query(raw.as_deref());

    let start = decode::get_int_param(&query, "start");
    if start < 0 {
        return reply::error_reply(
            StatusCode::BAD_REQUEST,
            "Missing or invalid \"start\" parameter.",
        );
    }
    let mut end = decode::get_int_param(&query, "end");
    if end < start {
        return reply::error_reply(
            StatusCode::BAD_REQUEST,
            "Missing or invalid \"end\" parameter.",
        );
    }
    // Cap the number of entries handed out in a single response.
    end = end.min(start.saturating_add(state.config.max_leaf_entries_per_response as i64 - 1));

    // Non-standard: other log nodes ask for the stored SCTs when following
    // this node to fetch data from it.
    let include_scts = decode::get_bool_param(&query, "include_scts");

    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        blocking_get_entries(&worker_state, start as u64, end as u64, include_scts)
    })
    .await;

    result.unwrap_or_else(worker_failed)
}

fn blocking_get_entries(state: &AppState, start: u64, end: u64, include_scts: bool) -> Response {
    let mut entries = Vec::new();
    let mut scan = state.store.scan_entries(start);
    for sequence in start..=end {
        let Some(logged) = scan.next() else { break };
        if logged.sequence != sequence {
            // A gap means the tail is not sequenced yet; truncate here.
            break;
        }

        let serialized: Result<(Vec<u8>, Vec<u8>)> = serialization::serialize_leaf(&logged)
            .and_then(|leaf| {
                serialization::serialize_extra_data(&logged.entry).map(|extra| (leaf, extra))
            });
        let (leaf_input, extra_data) = match serialized {
            Ok(blobs) => blobs,
            Err(err) => return serialization_failed(sequence, &err),
        };
        let sct = if include_scts {
            match serialization::serialize_sct(&logged.sct) {
                Ok(bytes) => Some(BASE64.encode(bytes)),
                Err(err) => return serialization_failed(sequence, &err),
            }
        } else {
            None
        };

        entries.push(EntryReply {
            leaf_input: BASE64.encode(leaf_input),
            extra_data: BASE64.encode(extra_data),
            sct,
        });
    }

    if entries.is_empty() {
        return reply::error_for(&CtError::EntryNotFound);
    }
    reply::json_reply(EntriesReply { entries })
}

pub async fn get_proof_by_hash(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = decode::parse_query(raw.as_deref());

    let Some(b64_hash) = decode::get_param(&query, "hash") else {
        return reply::error_reply(
            StatusCode::BAD_REQUEST,
            "Missing or invalid \"hash\" parameter.",
        );
    };
    let hash = match BASE64.decode(b64_hash.as_bytes()) {
        Ok(hash) if !hash.is_empty() => hash,
        _ => {
            return reply::error_reply(StatusCode::BAD_REQUEST, "Invalid \"hash\" parameter.");
        }
    };

    let tree_size = decode::get_int_param(&query, "tree_size");
    if tree_size < 0 || tree_size as u64 > state.lookup.latest_sth().tree_size {
        return reply::error_reply(
            StatusCode::BAD_REQUEST,
            "Missing or invalid \"tree_size\" parameter.",
        );
    }

    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        worker_state.lookup.audit_proof(&hash, tree_size as u64)
    })
    .await;

    match result {
        Ok(Some(proof)) => reply::json_reply(ProofByHashReply::from(&proof)),
        Ok(None) => reply::error_for(&CtError::HashNotFound),
        Err(err) => worker_failed(err),
    }
}

pub async fn get_sth_consistency(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = decode::parse_query(raw.as_deref());

    let first = decode::get_int_param(&query, "first");
    if first < 0 {
        return reply::error_reply(
            StatusCode::BAD_REQUEST,
            "Missing or invalid \"first\" parameter.",
        );
    }
    let second = decode::get_int_param(&query, "second");
    if second < first {
        return reply::error_reply(
            StatusCode::BAD_REQUEST,
            "Missing or invalid \"second\" parameter.",
        );
    }

    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        worker_state
            .lookup
            .consistency_proof(first as u64, second as u64)
    })
    .await;

    match result {
        Ok(proof) => reply::json_reply(ConsistencyReply {
            consistency: proof.iter().map(|node| BASE64.encode(node)).collect(),
        }),
        Err(err) => worker_failed(err),
    }
}

pub async fn add_chain(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let chain = match decode::extract_chain(&body) {
        Ok(chain) => chain,
        Err(err) => return reply::error_for(&err),
    };
    let (submissions, frontend) = submission_backends(&state);

    let result = tokio::task::spawn_blocking(move || {
        let mut chain = chain;
        let entry = submissions.process_x509(&mut chain)?;
        Ok(frontend.queue_entry(&entry))
    })
    .await;

    finish_add(result)
}

pub async fn add_pre_chain(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let chain = match decode::extract_chain(&body) {
        Ok(chain) => chain,
        Err(err) => return reply::error_for(&err),
    };
    let (submissions, frontend) = submission_backends(&state);

    let result = tokio::task::spawn_blocking(move || {
        let mut chain = PreCertChain::from_chain(chain);
        let entry = submissions.process_precert(&mut chain)?;
        Ok(frontend.queue_entry(&entry))
    })
    .await;

    finish_add(result)
}

pub async fn add_signed_data(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let data = match decode::extract_signed_data(&body) {
        Ok(data) => data,
        Err(err) => return reply::error_for(&err),
    };
    let (submissions, frontend) = submission_backends(&state);

    let result = tokio::task::spawn_blocking(move || {
        let entry = submissions.process_signed_data(&data)?;
        Ok(frontend.queue_entry(&entry))
    })
    .await;

    finish_add(result)
}

type SubmissionBackends = (
    Arc<crate::submission::SubmissionHandler>,
    Arc<dyn crate::lookup::SigningFrontend>,
);

// The add endpoints are only routed when both backends exist.
fn submission_backends(state: &AppState) -> SubmissionBackends {
    (
        state
            .submissions
            .clone()
            .expect("add endpoint routed without a submission handler"),
        state
            .frontend
            .clone()
            .expect("add endpoint routed without a signing frontend"),
    )
}

fn finish_add(result: std::result::Result<Result<QueueOutcome>, JoinError>) -> Response {
    match result {
        Ok(Ok(outcome)) => reply::add_chain_reply(outcome),
        Ok(Err(err)) => reply::error_for(&err),
        Err(err) => worker_failed(err),
    }
}

fn worker_failed(err: JoinError) -> Response {
    warn!(error = %err, "worker task failed");
    reply::error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal error.")
}

fn serialization_failed(sequence: u64, err: &CtError) -> Response {
    warn!(sequence, error = %err, "failed to serialize entry");
    reply::error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed.")
}
