//! Startup connectivity probe.
//!
//! A one-shot reachability check against the host's data store, run before
//! the tick loop starts. Logged and never fatal: an unreachable store does
//! not affect simulation behavior.

use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{info, warn};

/// Attempts a TCP connect to `addr` within `timeout`.
///
/// Returns whether the endpoint was reachable.
pub async fn check(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => {
            info!(%addr, "connectivity probe succeeded");
            true
        }
        Ok(Err(e)) => {
            warn!(%addr, "connectivity probe failed: {e}");
            false
        }
        Err(_) => {
            warn!(%addr, timeout_ms = timeout.as_millis() as u64,
                "connectivity probe timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_reaches_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        assert!(check(&addr, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_probe_reports_unreachable() {
        // Bind to learn a free port, then drop the listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(!check(&addr, Duration::from_secs(1)).await);
    }
}
