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

//! Periodic refresh of the node staleness flag from the cluster controller.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::lookup::ClusterStateController;

/// Read side of the staleness flag, consulted on every proxied request.
///
/// Readers observe the most recent completed controller observation; the
/// mutex is held only across the flag read or write.
#[derive(Clone)]
pub struct StalenessHandle(Arc<Mutex<bool>>);

impl StalenessHandle {
    pub fn is_stale(&self) -> bool {
        *self.0.lock().expect("staleness flag lock poisoned")
    }
}

/// A self-rescheduling task that re-evaluates local freshness.
///
/// The flag is seeded with one synchronous controller query at construction,
/// so requests arriving before the first tick already see a real value.
pub struct StalenessMonitor {
    flag: Arc<Mutex<bool>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl StalenessMonitor {
    pub fn spawn(controller: Arc<dyn ClusterStateController>, period: Duration) -> Self {
        let flag = Arc::new(Mutex::new(controller.node_is_stale()));
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let shared = flag.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately; the flag
            // was already seeded above.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                if *shutdown_rx.borrow() {
                    break;
                }

                // The controller may block on the cluster-state lock; keep
                // that off the reactor.
                let controller = controller.clone();
                match tokio::task::spawn_blocking(move || controller.node_is_stale()).await {
                    Ok(stale) => {
                        *shared.lock().expect("staleness flag lock poisoned") = stale;
                        debug!(stale, "refreshed node staleness");
                    }
                    Err(err) => warn!(error = %err, "staleness check failed"),
                }
            }
        });

        Self {
            flag,
            shutdown,
            task,
        }
    }

    pub fn handle(&self) -> StalenessHandle {
        StalenessHandle(self.flag.clone())
    }

    /// Raises the shutdown sentinel and waits for any in-flight tick to
    /// return before dropping the task.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fresh on the synchronous startup query, stale on every later tick.
    struct FlippingController {
        calls: AtomicUsize,
    }

    impl ClusterStateController for FlippingController {
        fn node_is_stale(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst) > 0
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tracks_the_controller_and_joins_on_shutdown() {
        let controller = Arc::new(FlippingController {
            calls: AtomicUsize::new(0),
        });
        let monitor = StalenessMonitor::spawn(controller.clone(), Duration::from_millis(10));
        let handle = monitor.handle();

        // Seeded from the synchronous query.
        assert!(!handle.is_stale());

        let mut waited = Duration::ZERO;
        while !handle.is_stale() && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }
        assert!(handle.is_stale());

        monitor.shutdown().await;
        let calls_after_shutdown = controller.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        // No ticks fire once the sentinel is raised.
        assert_eq!(controller.calls.load(Ordering::SeqCst), calls_after_shutdown);
    }
}
