use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use ckrv_core::spec::SpecSummary;
use ckrv_core::task::Task;

use crate::ApiClient;

// ─── Poller ───────────────────────────────────────────────────────────────

/// Handle to a fixed-interval list poller.
///
/// Each snapshot is published on a watch channel; the receiver always
/// sees the latest value. Fetch failures degrade silently to an empty
/// list — the dashboard renders empty panels rather than an error. The
/// task is aborted when the handle drops, so teardown is total.
pub struct Poller<T> {
    rx: watch::Receiver<Vec<T>>,
    handle: JoinHandle<()>,
}

impl<T: Clone> Poller<T> {
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.rx.clone()
    }

    pub fn latest(&self) -> Vec<T> {
        self.rx.borrow().clone()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Poll `GET /api/specs` every `interval`. The first fetch fires
/// immediately.
pub fn spawn_specs_poller(api: ApiClient, interval: Duration) -> Poller<SpecSummary> {
    spawn_poller(interval, move || {
        let api = api.clone();
        async move {
            match api.list_specs().await {
                Ok(list) => list.specs,
                Err(e) => {
                    tracing::debug!("specs poll failed, degrading to empty list: {e}");
                    Vec::new()
                }
            }
        }
    })
}

/// Poll `GET /api/tasks` every `interval`.
pub fn spawn_tasks_poller(api: ApiClient, interval: Duration) -> Poller<Task> {
    spawn_poller(interval, move || {
        let api = api.clone();
        async move {
            match api.list_tasks().await {
                Ok(list) => list.tasks,
                Err(e) => {
                    tracing::debug!("tasks poll failed, degrading to empty list: {e}");
                    Vec::new()
                }
            }
        }
    })
}

fn spawn_poller<T, F, Fut>(interval: Duration, fetch: F) -> Poller<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Vec<T>> + Send,
{
    let (tx, rx) = watch::channel(Vec::new());

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let snapshot = fetch().await;
            if tx.send(snapshot).is_err() {
                break; // All receivers dropped
            }
        }
    });

    Poller { rx, handle }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn specs_poller_publishes_snapshots() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/specs")
            .with_status(200)
            .with_body(r#"{"specs":[{"name":"auth","path":"specs/auth.md"}],"count":1}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let api = ApiClient::new(server.url());
        let poller = spawn_specs_poller(api, Duration::from_secs(30));

        let mut rx = poller.subscribe();
        // First tick fires immediately; wait for the first non-initial value.
        rx.changed().await.unwrap();
        let specs = rx.borrow().clone();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "auth");
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tasks")
            .with_status(500)
            .expect_at_least(1)
            .create_async()
            .await;

        let api = ApiClient::new(server.url());
        let poller = spawn_tasks_poller(api, Duration::from_secs(30));

        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn dropping_poller_aborts_task() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/specs")
            .with_status(200)
            .with_body(r#"{"specs":[],"count":0}"#)
            .create_async()
            .await;

        let api = ApiClient::new(server.url());
        let poller = spawn_specs_poller(api, Duration::from_millis(10));
        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();

        drop(poller);
        // After the abort the sender side is gone; changed() must error
        // rather than hang.
        tokio::time::timeout(Duration::from_secs(1), async {
            while rx.changed().await.is_ok() {}
        })
        .await
        .expect("poller task should stop after drop");
    }
}
