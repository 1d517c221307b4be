use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::Instrument;

use crate::config::ProbeConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("speed test disabled")]
    Disabled,
    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("cancelled")]
    Cancelled,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no data transferred")]
    Empty,
}

/// Active bandwidth measurement.
pub trait BandwidthProbe {
    fn measure(&self) -> impl Future<Output = Result<Throughput, ProbeError>>;
}

/// Runs `probe` bounded by `timeout`, giving up early when `cancel` resolves.
pub async fn run_probe<P, C>(probe: &P, timeout: Duration, cancel: C) -> Result<Throughput, ProbeError>
where
    P: BandwidthProbe,
    C: Future<Output = ()>,
{
    let measured = async {
        tokio::select! {
            result = tokio::time::timeout(timeout, probe.measure()) => {
                result.unwrap_or(Err(ProbeError::TimedOut(timeout)))
            }
            () = cancel => Err(ProbeError::Cancelled),
        }
    };
    measured
        .instrument(tracing::info_span!("probe.measure", timeout_secs = timeout.as_secs()))
        .await
}

/// Starts watching `signal` right away and returns a future that resolves once
/// it has fired. A signal raised while the blocking sections are being read is
/// kept and cancels the speed test as soon as it starts.
pub async fn cancel_on<S>(signal: S) -> impl Future<Output = ()> + Send + 'static
where
    S: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        signal.await;
        let _ = tx.send(());
    });
    // One poll of the watcher installs the handler before any blocking work
    tokio::task::yield_now().await;

    async move {
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Megabits per second for `bytes` moved in `elapsed`.
pub fn mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / secs / 1_000_000.0
}

/// HTTP download/upload probe against a speed-test endpoint.
pub struct HttpProbe {
    client: reqwest::Client,
    download_url: String,
    upload_url: String,
    upload_bytes: usize,
}

impl HttpProbe {
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hostscan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpProbe {
            client,
            download_url: config.download_url.clone(),
            upload_url: config.upload_url.clone(),
            upload_bytes: config.upload_bytes,
        })
    }

    async fn download(&self) -> Result<f64, ProbeError> {
        let start = Instant::now();
        let mut response = self
            .client
            .get(&self.download_url)
            .send()
            .await?
            .error_for_status()?;
        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            received += chunk.len() as u64;
        }
        if received == 0 {
            return Err(ProbeError::Empty);
        }
        let rate = mbps(received, start.elapsed());
        tracing::debug!(bytes = received, mbps = rate, "download finished");
        Ok(rate)
    }

    async fn upload(&self) -> Result<f64, ProbeError> {
        if self.upload_bytes == 0 {
            return Err(ProbeError::Empty);
        }
        let payload = vec![0u8; self.upload_bytes];
        let start = Instant::now();
        self.client
            .post(&self.upload_url)
            .body(payload)
            .send()
            .await?
            .error_for_status()?;
        let rate = mbps(self.upload_bytes as u64, start.elapsed());
        tracing::debug!(bytes = self.upload_bytes, mbps = rate, "upload finished");
        Ok(rate)
    }
}

impl BandwidthProbe for HttpProbe {
    async fn measure(&self) -> Result<Throughput, ProbeError> {
        let download_mbps = self.download().await?;
        let upload_mbps = self.upload().await?;
        Ok(Throughput {
            download_mbps,
            upload_mbps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(Throughput);

    impl BandwidthProbe for FixedProbe {
        async fn measure(&self) -> Result<Throughput, ProbeError> {
            Ok(self.0)
        }
    }

    struct HangingProbe;

    impl BandwidthProbe for HangingProbe {
        async fn measure(&self) -> Result<Throughput, ProbeError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn signal_before_measurement_cancels_it() {
        let (fire, fired) = tokio::sync::oneshot::channel::<()>();
        let cancel = cancel_on(async move {
            let _ = fired.await;
        })
        .await;

        // Raised while other sections are still being read
        fire.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(10));

        let result = run_probe(&HangingProbe, Duration::from_secs(60), cancel).await;
        assert!(matches!(result, Err(ProbeError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_signal_leaves_timeout_in_charge() {
        let cancel = cancel_on(std::future::pending::<()>()).await;
        let result = run_probe(&HangingProbe, Duration::from_secs(5), cancel).await;
        assert!(matches!(result, Err(ProbeError::TimedOut(d)) if d == Duration::from_secs(5)));
    }

    #[test]
    fn mbps_conversion() {
        assert!((mbps(12_500_000, Duration::from_secs(1)) - 100.0).abs() < 1e-9);
        assert_eq!(mbps(1000, Duration::ZERO), 0.0);
    }

    #[tokio::test]
    async fn completes_before_timeout() {
        let expected = Throughput {
            download_mbps: 94.5,
            upload_mbps: 12.0,
        };
        let result = run_probe(
            &FixedProbe(expected),
            Duration::from_secs(5),
            std::future::pending(),
        )
        .await;
        assert_eq!(result.unwrap(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_probe_times_out() {
        let result = run_probe(
            &HangingProbe,
            Duration::from_secs(30),
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(ProbeError::TimedOut(d)) if d == Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn cancel_signal_wins() {
        let result = run_probe(&HangingProbe, Duration::from_secs(30), async {}).await;
        assert!(matches!(result, Err(ProbeError::Cancelled)));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ProbeError::TimedOut(Duration::from_secs(30)).to_string(),
            "timed out after 30s"
        );
        assert_eq!(ProbeError::Disabled.to_string(), "speed test disabled");
    }
}
