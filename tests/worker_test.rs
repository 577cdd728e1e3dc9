use glyph_operator::domain::models::{Frame, SamplingConfig, WorkerConfig};
use glyph_operator::infrastructure::SierpinskiField;
use glyph_operator::services::{analyze_frame, LatestReportFilter, SamplingWorker};

fn frames(count: usize) -> Vec<Frame> {
    SierpinskiField::new(48, 48).frames(0.0, 40.0, count).collect()
}

#[tokio::test]
async fn test_worker_matches_direct_analysis() {
    let config = SamplingConfig::default();
    let expected: Vec<_> = frames(8).iter().map(|f| analyze_frame(f, &config)).collect();

    let worker = SamplingWorker::new(config, &WorkerConfig::default());
    let (handle, mut receiver) = worker.spawn();
    for frame in frames(8) {
        handle.submit(frame).await.unwrap();
    }
    assert_eq!(handle.shutdown().await.unwrap(), 8);

    let mut received = Vec::new();
    while let Some(report) = receiver.recv().await {
        received.push(report);
    }
    received.sort_by(|a, b| a.t.total_cmp(&b.t));
    assert_eq!(received, expected);
}

#[tokio::test]
async fn test_filter_yields_increasing_timestamps() {
    let worker = SamplingWorker::new(
        SamplingConfig::default(),
        &WorkerConfig {
            concurrency: 4,
            queue_depth: 2,
        },
    );
    let (handle, mut receiver) = worker.spawn();

    let collector = tokio::spawn(async move {
        let mut filter = LatestReportFilter::new();
        let mut accepted = Vec::new();
        let mut total = 0;
        while let Some(report) = receiver.recv().await {
            total += 1;
            if filter.accept(&report) {
                accepted.push(report.t);
            }
        }
        (accepted, total)
    });

    for frame in frames(20) {
        handle.submit(frame).await.unwrap();
    }
    handle.shutdown().await.unwrap();

    let (accepted, total) = collector.await.unwrap();
    assert_eq!(total, 20);
    assert!(!accepted.is_empty());
    assert!(accepted.windows(2).all(|w| w[1] > w[0]));
}

#[tokio::test]
async fn test_batch_keeps_order_and_drops_nothing() {
    let worker = SamplingWorker::new(SamplingConfig::default(), &WorkerConfig::default());
    let mut input = frames(6);
    input.reverse();

    let reports = worker.analyze_batch(input).await;
    let ts: Vec<f64> = reports.iter().map(|r| r.t).collect();
    assert_eq!(ts, vec![200.0, 160.0, 120.0, 80.0, 40.0, 0.0]);
    assert!(reports.iter().all(|r| r.evidence.is_empty()));
}

#[tokio::test]
async fn test_worker_drains_without_receiver() {
    let worker = SamplingWorker::new(SamplingConfig::default(), &WorkerConfig::default());
    let (handle, receiver) = worker.spawn();
    drop(receiver);

    // reports are discarded once the receiver is gone, frames still drain
    handle.submit(Frame::solid(0.0, 0, 4, 4, [0, 0, 0, 255])).await.unwrap();
    assert_eq!(handle.shutdown().await.unwrap(), 1);
}
