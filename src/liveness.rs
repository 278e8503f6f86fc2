// liveness.rs - Concurrent live subdomain probing
// Purpose: Determine which candidate subdomains answer with HTTP 200 on
//          their HTTPS root, keeping at most a fixed number of requests
//          in flight so huge candidate lists never open unbounded
//          connections.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::reporter::Reporter;

// ═══════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Maximum number of probes in flight at once
    pub concurrency: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// URL scheme used to build probe targets, normally "https"
    pub scheme: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout: Duration::from_secs(10),
            scheme: "https".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// RESULT TYPES
// ═══════════════════════════════════════════════════════════════════

/// Why a host was classified as not live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotLiveReason {
    /// Responded, but with a status other than 200
    Status { code: u16 },
    /// No response within the configured timeout
    Timeout,
    /// Transport-level failure (DNS, connect, TLS, ...)
    Error { message: String },
}

impl fmt::Display for NotLiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotLiveReason::Status { code } => write!(f, "status code {}", code),
            NotLiveReason::Timeout => write!(f, "timeout"),
            NotLiveReason::Error { message } => write!(f, "error: {}", message),
        }
    }
}

/// Outcome of probing a single hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Live(String),
    NotLive(String, NotLiveReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotLiveEntry {
    pub host: String,
    pub reason: NotLiveReason,
}

/// Partition of the probed hostnames. Every input hostname lands in
/// exactly one of the two collections; duplicates in the input are
/// probed independently and recorded independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    pub live: Vec<String>,
    pub not_live: Vec<NotLiveEntry>,
}

impl ProbeResult {
    pub fn total(&self) -> usize {
        self.live.len() + self.not_live.len()
    }
}

// ═══════════════════════════════════════════════════════════════════
// PROBING
// ═══════════════════════════════════════════════════════════════════

/// Probe every candidate hostname concurrently, capped by
/// `config.concurrency`, and partition them into live / not-live.
///
/// Individual probe failures (timeouts, refused connections, bad
/// status codes) are data, not errors: they classify the host as
/// not-live and never abort the overall operation. Returns only after
/// every probe has finished.
pub async fn probe_all(
    client: &Client,
    hosts: Vec<String>,
    config: &ProbeConfig,
    reporter: Reporter,
) -> ProbeResult {
    let mut result = ProbeResult::default();
    if hosts.is_empty() {
        return result;
    }

    reporter.info(&format!(
        "Checking {} subdomains for live HTTPS services (max {} concurrent)",
        hosts.len(),
        config.concurrency
    ));

    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let mut handles = Vec::with_capacity(hosts.len());

    for host in hosts {
        let semaphore = Arc::clone(&semaphore);
        let client = client.clone();
        let url = format!("{}://{}/", config.scheme, host);
        let timeout = config.timeout;
        let task_host = host.clone();

        let handle = tokio::spawn(async move {
            // Holding the permit across the whole request enforces the
            // in-flight ceiling.
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let response = client.get(&url).timeout(timeout).send().await;
            classify(task_host, response)
        });

        handles.push((host, handle));
    }

    // Fan-in: the single awaiting task is the only writer, so no
    // additional locking is needed around the aggregates.
    for (host, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => ProbeOutcome::NotLive(
                host,
                NotLiveReason::Error {
                    message: format!("probe task failed: {}", e),
                },
            ),
        };

        match outcome {
            ProbeOutcome::Live(host) => {
                reporter.hit(&format!("{} is live!", host));
                result.live.push(host);
            }
            ProbeOutcome::NotLive(host, reason) => {
                match &reason {
                    NotLiveReason::Status { code } => {
                        reporter.miss(&format!("{} returned status code {}", host, code))
                    }
                    NotLiveReason::Timeout => {
                        reporter.miss(&format!("Timeout occurred while checking {}", host))
                    }
                    NotLiveReason::Error { message } => reporter.miss(&format!(
                        "Error occurred while checking {}: {}",
                        host, message
                    )),
                }
                result.not_live.push(NotLiveEntry { host, reason });
            }
        }
    }

    reporter.hit(&format!(
        "Liveness check completed: {} live, {} not live",
        result.live.len(),
        result.not_live.len()
    ));

    result
}

fn classify(host: String, response: Result<reqwest::Response, reqwest::Error>) -> ProbeOutcome {
    match response {
        Ok(resp) => classify_status(host, resp.status().as_u16()),
        Err(e) if e.is_timeout() => ProbeOutcome::NotLive(host, NotLiveReason::Timeout),
        Err(e) => ProbeOutcome::NotLive(
            host,
            NotLiveReason::Error {
                message: e.to_string(),
            },
        ),
    }
}

/// Only an exact 200 counts as live; redirects and auth walls are
/// recorded with their status so the user can follow up manually.
fn classify_status(host: String, code: u16) -> ProbeOutcome {
    if code == 200 {
        ProbeOutcome::Live(host)
    } else {
        ProbeOutcome::NotLive(host, NotLiveReason::Status { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_reporter() -> Reporter {
        Reporter::new(false)
    }

    fn http_config(timeout: Duration) -> ProbeConfig {
        ProbeConfig {
            timeout,
            scheme: "http".to_string(),
            ..ProbeConfig::default()
        }
    }

    /// Strips the scheme off a wiremock URI, leaving "127.0.0.1:port".
    fn host_of(server: &MockServer) -> String {
        server
            .uri()
            .trim_start_matches("http://")
            .to_string()
    }

    #[test]
    fn test_classify_status_only_200_is_live() {
        assert_eq!(
            classify_status("a.example.com".to_string(), 200),
            ProbeOutcome::Live("a.example.com".to_string())
        );

        for code in [201, 301, 302, 403, 404, 500, 503] {
            assert_eq!(
                classify_status("a.example.com".to_string(), code),
                ProbeOutcome::NotLive(
                    "a.example.com".to_string(),
                    NotLiveReason::Status { code }
                )
            );
        }
    }

    #[test]
    fn test_classify_status_is_deterministic() {
        let first = classify_status("b.example.com".to_string(), 404);
        let second = classify_status("b.example.com".to_string(), 404);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_partition() {
        let client = Client::new();
        let result = probe_all(
            &client,
            Vec::new(),
            &ProbeConfig::default(),
            test_reporter(),
        )
        .await;

        assert!(result.live.is_empty());
        assert!(result.not_live.is_empty());
    }

    #[tokio::test]
    async fn test_live_not_live_and_timeout_partition() {
        // a: 200, b: 404, c: answers after the timeout has expired
        let server_a = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server_a)
            .await;

        let server_b = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server_b)
            .await;

        let server_c = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server_c)
            .await;

        let host_a = host_of(&server_a);
        let host_b = host_of(&server_b);
        let host_c = host_of(&server_c);

        let client = Client::new();
        let start = Instant::now();
        let result = probe_all(
            &client,
            vec![host_a.clone(), host_b.clone(), host_c.clone()],
            &http_config(Duration::from_secs(1)),
            test_reporter(),
        )
        .await;
        let elapsed = start.elapsed();

        assert_eq!(result.live, vec![host_a]);
        assert_eq!(result.not_live.len(), 2);
        assert!(result.not_live.contains(&NotLiveEntry {
            host: host_b,
            reason: NotLiveReason::Status { code: 404 },
        }));
        assert!(result.not_live.contains(&NotLiveEntry {
            host: host_c,
            reason: NotLiveReason::Timeout,
        }));

        // The slow host is abandoned at the 1s timeout, well before its
        // 5s response would arrive.
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_local_error() {
        // Nothing listens on the port wiremock just released. An
        // exclusive (non-pooled) server is required here: pooled
        // servers keep listening after drop.
        let server = MockServer::builder().start().await;
        let host = host_of(&server);
        drop(server);

        let client = Client::new();
        let result = probe_all(
            &client,
            vec![host.clone()],
            &http_config(Duration::from_secs(2)),
            test_reporter(),
        )
        .await;

        assert!(result.live.is_empty());
        assert_eq!(result.not_live.len(), 1);
        assert_eq!(result.not_live[0].host, host);
        assert!(matches!(
            result.not_live[0].reason,
            NotLiveReason::Error { .. }
        ));
    }

    #[tokio::test]
    async fn test_partition_is_complete_for_many_hosts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let host = host_of(&server);
        let hosts: Vec<String> = (0..50).map(|_| host.clone()).collect();

        let client = Client::new();
        let result = probe_all(
            &client,
            hosts.clone(),
            &http_config(Duration::from_secs(5)),
            test_reporter(),
        )
        .await;

        // Duplicates are probed independently: all 50 entries come back.
        assert_eq!(result.total(), hosts.len());
        assert_eq!(result.live.len(), 50);
        assert!(result.not_live.is_empty());
    }

    /// Minimal HTTP server that tracks how many requests it is serving
    /// at once, so the concurrency ceiling can be asserted directly.
    async fn counting_server(
        delay: Duration,
    ) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind counting server");
        let addr = listener.local_addr().expect("local addr");
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));
        let hw = Arc::clone(&high_water);
        let inf = Arc::clone(&in_flight);

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let inf = Arc::clone(&inf);
                let hw = Arc::clone(&hw);
                tokio::spawn(async move {
                    let now = inf.fetch_add(1, Ordering::SeqCst) + 1;
                    hw.fetch_max(now, Ordering::SeqCst);

                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    tokio::time::sleep(delay).await;
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                        )
                        .await;

                    inf.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        (format!("{}", addr), high_water)
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_ceiling() {
        let (host, high_water) = counting_server(Duration::from_millis(100)).await;
        let hosts: Vec<String> = (0..30).map(|_| host.clone()).collect();

        let config = ProbeConfig {
            concurrency: 10,
            timeout: Duration::from_secs(10),
            scheme: "http".to_string(),
        };

        let client = Client::new();
        let result = probe_all(&client, hosts, &config, test_reporter()).await;

        assert_eq!(result.total(), 30);
        let peak = high_water.load(Ordering::SeqCst);
        assert!(peak <= 10, "in-flight high-water mark was {}", peak);
        // Sanity: the limit should actually be exercised by 30 hosts.
        assert!(peak >= 2, "probes never overlapped (peak {})", peak);
    }
}
