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

//! The HTTP dispatcher: routes the RFC 6962 endpoints, wraps every handler
//! in the latency observer and the proxy interceptor, and owns the
//! staleness monitor.

pub mod decode;
pub mod handlers;
pub mod proxy;
pub mod reply;
pub mod staleness;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::cert::CertChecker;
use crate::config::Config;
use crate::lookup::{ClusterStateController, EntryStore, LogLookup, PeerSelector, SigningFrontend};
use crate::submission::SubmissionHandler;

use self::proxy::Proxy;
use self::staleness::{StalenessHandle, StalenessMonitor};

/// Shared state behind every handler. Handlers only read it; the staleness
/// flag is the one value mutated at runtime, by the monitor.
pub struct AppState {
    pub(crate) config: Config,
    pub(crate) lookup: Arc<dyn LogLookup>,
    pub(crate) store: Arc<dyn EntryStore>,
    pub(crate) checker: Option<Arc<CertChecker>>,
    pub(crate) submissions: Option<Arc<SubmissionHandler>>,
    pub(crate) frontend: Option<Arc<dyn SigningFrontend>>,
    pub(crate) proxy: Proxy,
    pub(crate) staleness: StalenessHandle,
}

/// The submission front-end: the router plus its staleness monitor.
pub struct HttpFrontend {
    state: Arc<AppState>,
    monitor: StalenessMonitor,
}

impl HttpFrontend {
    /// Wires the front-end together.
    ///
    /// A `None` checker runs the node as a mirror: no trust store, no
    /// get-roots and no local validation. A `None` frontend disables the
    /// add endpoints entirely.
    pub fn new(
        config: Config,
        lookup: Arc<dyn LogLookup>,
        store: Arc<dyn EntryStore>,
        controller: Arc<dyn ClusterStateController>,
        checker: Option<Arc<CertChecker>>,
        frontend: Option<Arc<dyn SigningFrontend>>,
        peers: Arc<dyn PeerSelector>,
    ) -> Self {
        let monitor = StalenessMonitor::spawn(controller, config.staleness_check_delay);
        let submissions = checker
            .clone()
            .map(|checker| Arc::new(SubmissionHandler::new(checker)));
        let state = Arc::new(AppState {
            config,
            lookup,
            store,
            checker,
            submissions,
            frontend,
            proxy: Proxy::new(peers),
            staleness: monitor.handle(),
        });
        Self { state, monitor }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Raises the monitor's shutdown sentinel and joins it.
    pub async fn shutdown(self) {
        self.monitor.shutdown().await;
    }
}

/// Registers the endpoint handlers. Method discipline (405 for anything but
/// the registered verb) comes from the method routers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/ct/v1/get-entries", get(handlers::get_entries))
        .route("/ct/v1/get-proof-by-hash", get(handlers::get_proof_by_hash))
        .route("/ct/v1/get-sth", get(handlers::get_sth))
        .route("/ct/v1/get-sth-consistency", get(handlers::get_sth_consistency));

    // Mirror nodes have no trust store and do not serve get-roots.
    if state.checker.is_some() {
        router = router.route("/ct/v1/get-roots", get(handlers::get_roots));
    }

    if state.frontend.is_some() && state.submissions.is_some() {
        if state.config.accept_certificates {
            router = router
                .route("/ct/v1/add-chain", post(handlers::add_chain))
                .route("/ct/v1/add-pre-chain", post(handlers::add_pre_chain));
        }
        if state.config.accept_signed_data {
            router = router.route("/ct/v1/add-signed-data", post(handlers::add_signed_data));
        }
    }

    // Outermost first: latency observer, then the proxy interceptor.
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            proxy::proxy_interceptor,
        ))
        .layer(middleware::from_fn(latency_observer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Total request latency broken down by path.
async fn latency_observer(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let start = Instant::now();
    let response = next.run(request).await;
    debug!(
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "http request"
    );
    response
}
