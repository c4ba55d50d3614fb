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

//! Forwarding requests to a fresh peer while this node is stale.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::lookup::PeerSelector;
use crate::server::reply::error_reply;
use crate::server::AppState;

// Submissions are small; anything larger than this is not worth relaying.
const MAX_PROXIED_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Relays requests to a peer picked by the cluster's proxy component.
pub struct Proxy {
    client: reqwest::Client,
    selector: Arc<dyn PeerSelector>,
}

impl Proxy {
    pub fn new(selector: Arc<dyn PeerSelector>) -> Self {
        Self {
            client: reqwest::Client::new(),
            selector,
        }
    }

    /// Forwards the request and relays the peer's status and body verbatim.
    pub async fn forward(&self, request: Request) -> Response {
        // Peer selection may block on the cluster-state lock; keep it off
        // the reactor.
        let selector = self.selector.clone();
        let peer = match tokio::task::spawn_blocking(move || selector.next_peer()).await {
            Ok(Some(peer)) => peer,
            Ok(None) => {
                warn!("no fresh peer available for proxying");
                return error_reply(StatusCode::SERVICE_UNAVAILABLE, "No fresh node available.");
            }
            Err(err) => {
                warn!(error = %err, "peer selection failed");
                return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Proxying failed.");
            }
        };

        let (parts, body) = request.into_parts();
        let body = match axum::body::to_bytes(body, MAX_PROXIED_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => return error_reply(StatusCode::BAD_REQUEST, "Unable to read request body."),
        };

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = match peer.join(path_and_query) {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "could not build peer url");
                return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Proxying failed.");
            }
        };

        debug!(%target, "forwarding request to fresh peer");

        let mut upstream = self.client.request(parts.method, target).body(body);
        if let Some(content_type) = parts.headers.get(CONTENT_TYPE) {
            upstream = upstream.header(CONTENT_TYPE, content_type);
        }

        match upstream.send().await {
            Ok(peer_response) => {
                let status = peer_response.status();
                let content_type = peer_response.headers().get(CONTENT_TYPE).cloned();
                let bytes = match peer_response.bytes().await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!(error = %err, "failed to read peer response");
                        return error_reply(StatusCode::BAD_GATEWAY, "Proxying failed.");
                    }
                };

                let mut builder = Response::builder().status(status);
                if let Some(content_type) = content_type {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
                builder
                    .body(Body::from(bytes))
                    .unwrap_or_else(|_| {
                        error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Proxying failed.")
                    })
            }
            Err(err) => {
                warn!(error = %err, "proxied request failed");
                error_reply(StatusCode::BAD_GATEWAY, "Proxying failed.")
            }
        }
    }
}

/// Runs in front of every handler: serve locally when fresh, otherwise hand
/// the whole request to a fresh peer. Staleness does not distinguish
/// endpoints.
pub async fn proxy_interceptor(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.staleness.is_stale() {
        debug!(path = request.uri().path(), "node is stale, proxying");
        state.proxy.forward(request).await
    } else {
        next.run(request).await
    }
}
