use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::info;

/// One unit per inserted row. Bounded, so loaders block when the monitor
/// falls behind.
pub type ProgressSender = mpsc::Sender<()>;
pub type ProgressReceiver = mpsc::Receiver<()>;

pub fn progress_channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Counts completed rows across every loader and reports the aggregate rate
/// on a fixed interval. Finishes once all senders are dropped.
pub struct ThroughputMonitor {
    interval: Duration,
}

impl ThroughputMonitor {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn spawn(self, progress: ProgressReceiver) -> JoinHandle<u64> {
        tokio::spawn(self.run(progress))
    }

    /// Returns the total number of rows counted
    pub async fn run(self, mut progress: ProgressReceiver) -> u64 {
        let start = Instant::now();
        let mut ticker = interval_at(start + self.interval, self.interval);
        let mut count = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    info!("count is {}. rate is {:.1} rows/s", count, rate(count, start.elapsed()));
                }
                signal = progress.recv() => match signal {
                    Some(()) => count += 1,
                    None => break,
                },
            }
        }

        info!(
            "Loaded {} rows in {:.1}s ({:.1} rows/s)",
            count,
            start.elapsed().as_secs_f64(),
            rate(count, start.elapsed())
        );
        count
    }
}

fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_until_closed() {
        let (tx, rx) = progress_channel(16);
        let monitor = ThroughputMonitor::new(Duration::from_secs(5)).spawn(rx);

        let mut producers = Vec::new();
        for _ in 0..4 {
            let tx = tx.clone();
            producers.push(tokio::spawn(async move {
                for _ in 0..250 {
                    tx.send(()).await.unwrap();
                }
            }));
        }
        drop(tx);

        for producer in producers {
            producer.await.unwrap();
        }
        assert_eq!(monitor.await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_full_channel_blocks_sender() {
        let (tx, mut rx) = progress_channel(2);
        tx.send(()).await.unwrap();
        tx.send(()).await.unwrap();
        assert!(tx.try_send(()).is_err());

        rx.recv().await.unwrap();
        assert!(tx.try_send(()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_on_interval() {
        let (tx, rx) = progress_channel(16);
        let monitor = ThroughputMonitor::new(Duration::from_secs(5)).spawn(rx);

        tx.send(()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(12)).await;
        tx.send(()).await.unwrap();
        drop(tx);

        assert_eq!(monitor.await.unwrap(), 2);
    }

    #[test]
    fn test_rate() {
        assert_eq!(rate(100, Duration::from_secs(4)), 25.0);
        assert_eq!(rate(100, Duration::ZERO), 0.0);
    }
}
