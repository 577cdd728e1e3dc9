//! Offloads pyramid building and hashing to the blocking pool.
//!
//! Frames go in through a bounded channel and are analysed concurrently, at
//! most `concurrency` at a time. Reports come back in completion order, which
//! need not match submission order; consumers that care use
//! [`LatestReportFilter`] to drop stale results by timestamp.
//!
//! Worker reports are stateless: they carry no motif history, so no evidence
//! and a zero stability.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EvidenceConfig, Frame, MotifHistory, Report, SamplingConfig, WorkerConfig};

use super::motif_hasher::sample_frame;
use super::report_generator::{generate_report, ReportContext};

/// Analyse one frame without history.
pub fn analyze_frame(frame: &Frame, config: &SamplingConfig) -> Report {
    let (pyramid, samples) = sample_frame(frame, config.levels, config.grid);
    let history = MotifHistory::new(1);
    let evidence = EvidenceConfig::default();
    let ctx = ReportContext {
        t: frame.t,
        window_ms: config.report_every_ms,
        base_level: pyramid.base(),
        motif_history: &history,
        stability: 0.0,
        top_k: config.top_motifs,
        motif_digits: config.motif_digits,
        evidence: &evidence,
    };
    generate_report(&samples, &ctx)
}

/// Analyzes frames off the caller's task with bounded concurrency.
#[derive(Debug, Clone)]
pub struct SamplingWorker {
    config: Arc<SamplingConfig>,
    concurrency: usize,
    queue_depth: usize,
}

impl SamplingWorker {
    /// Concurrency and queue depth are raised to at least 1.
    pub fn new(config: SamplingConfig, worker: &WorkerConfig) -> Self {
        Self {
            config: Arc::new(config),
            concurrency: worker.concurrency.max(1),
            queue_depth: worker.queue_depth.max(1),
        }
    }

    /// Start the dispatch loop. The report receiver closes once the handle is
    /// shut down (or dropped) and every in-flight frame has finished.
    pub fn spawn(self) -> (WorkerHandle, mpsc::Receiver<Report>) {
        let (frame_tx, frame_rx) = mpsc::channel(self.queue_depth);
        let (report_tx, report_rx) = mpsc::channel(self.queue_depth);

        info!(concurrency = self.concurrency, "sampling worker started");
        let task = tokio::spawn(self.dispatch(frame_rx, report_tx));

        (WorkerHandle { frames: frame_tx, task }, report_rx)
    }

    async fn dispatch(self, mut frames: mpsc::Receiver<Frame>, reports: mpsc::Sender<Report>) -> u64 {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut in_flight = JoinSet::new();
        let mut processed = 0u64;

        while let Some(frame) = frames.recv().await {
            let Ok(permit) = permits.clone().acquire_owned().await else {
                break;
            };
            let config = self.config.clone();
            let reports = reports.clone();

            in_flight.spawn(async move {
                let _permit = permit;
                let t = frame.t;
                match tokio::task::spawn_blocking(move || analyze_frame(&frame, &config)).await {
                    Ok(report) => {
                        if reports.send(report).await.is_err() {
                            debug!(t, "report receiver dropped");
                        }
                    }
                    Err(err) => warn!(t, error = %err, "frame analysis failed"),
                }
            });
            processed += 1;

            // reap finished tasks so the set stays small
            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}
        info!(processed, "sampling worker stopped");
        processed
    }

    /// Analyse `frames` concurrently and return the reports in submission
    /// order. Frames whose analysis panics are left out.
    pub async fn analyze_batch(&self, frames: Vec<Frame>) -> Vec<Report> {
        let permits = Arc::new(Semaphore::new(self.concurrency));

        let jobs = frames.into_iter().map(|frame| {
            let permits = permits.clone();
            let config = self.config.clone();
            async move {
                let _permit = permits.acquire_owned().await.ok()?;
                let t = frame.t;
                tokio::task::spawn_blocking(move || analyze_frame(&frame, &config))
                    .await
                    .map_err(|err| warn!(t, error = %err, "frame analysis failed"))
                    .ok()
            }
        });

        join_all(jobs).await.into_iter().flatten().collect()
    }
}

/// Submission side of a running [`SamplingWorker`].
pub struct WorkerHandle {
    frames: mpsc::Sender<Frame>,
    task: JoinHandle<u64>,
}

impl WorkerHandle {
    /// Queue a frame, waiting while the queue is full.
    pub async fn submit(&self, frame: Frame) -> DomainResult<()> {
        self.frames
            .send(frame)
            .await
            .map_err(|_| DomainError::WorkerStopped)
    }

    /// Stop accepting frames and wait for in-flight ones. Returns the number
    /// of frames dispatched.
    pub async fn shutdown(self) -> DomainResult<u64> {
        drop(self.frames);
        self.task.await.map_err(|_| DomainError::WorkerStopped)
    }
}

/// Accepts only reports strictly newer than the last accepted one.
#[derive(Debug, Clone, Default)]
pub struct LatestReportFilter {
    last_t: Option<f64>,
}

impl LatestReportFilter {
    /// Filter that accepts the first report it sees.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `report` is newer than every accepted report.
    pub fn accept(&mut self, report: &Report) -> bool {
        match self.last_t {
            Some(last) if report.t <= last => false,
            _ => {
                self.last_t = Some(report.t);
                true
            }
        }
    }

    /// Timestamp of the newest accepted report.
    pub fn last_t(&self) -> Option<f64> {
        self.last_t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_at(t: f64) -> Report {
        analyze_frame(
            &Frame::solid(t, 0, 8, 8, [10, 10, 10, 255]),
            &SamplingConfig::default(),
        )
    }

    #[test]
    fn test_filter_drops_stale_reports() {
        let mut filter = LatestReportFilter::new();
        assert!(filter.accept(&report_at(2.0)));
        assert!(!filter.accept(&report_at(1.0)));
        assert!(!filter.accept(&report_at(2.0)));
        assert!(filter.accept(&report_at(3.0)));
        assert_eq!(filter.last_t(), Some(3.0));
    }

    #[test]
    fn test_analyze_frame_has_no_evidence() {
        let report = report_at(5.0);
        assert!(report.evidence.is_empty());
        assert!(report.metrics.stability.abs() < f64::EPSILON);
        assert_eq!(report.observations.len(), 4);
        assert!((report.t - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_spawned_worker_delivers_every_report() {
        let worker = SamplingWorker::new(SamplingConfig::default(), &WorkerConfig::default());
        let (handle, mut reports) = worker.spawn();

        for i in 0..6 {
            handle
                .submit(Frame::solid(f64::from(i), 0, 16, 16, [200, 10, 10, 255]))
                .await
                .unwrap();
        }
        assert_eq!(handle.shutdown().await.unwrap(), 6);

        let mut seen = Vec::new();
        while let Some(report) = reports.recv().await {
            seen.push(report.t as i64);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_batch_preserves_submission_order() {
        let worker = SamplingWorker::new(
            SamplingConfig::default(),
            &WorkerConfig {
                concurrency: 3,
                ..WorkerConfig::default()
            },
        );
        let frames: Vec<Frame> = [9.0, 3.0, 7.0, 1.0]
            .into_iter()
            .map(|t| Frame::solid(t, 0, 8, 8, [0, 0, 0, 255]))
            .collect();
        let reports = worker.analyze_batch(frames).await;
        let order: Vec<f64> = reports.iter().map(|r| r.t).collect();
        assert_eq!(order, vec![9.0, 3.0, 7.0, 1.0]);
    }
}
