pub mod divergence_analyzer;
pub mod evidence_scorer;
pub mod motif_hasher;
pub mod peak_detector;
pub mod pyramid_builder;
pub mod report_generator;
pub mod sampling_operator;
pub mod sampling_worker;
pub mod session_recorder;
pub mod stability_tracker;
pub mod strategies;

pub use divergence_analyzer::{align_buckets, bucketize, compute_divergence, divergence_mse, pairwise_divergences};
pub use evidence_scorer::{compute_evidence, evidence_stats, format_evidence_bullets};
pub use motif_hasher::{base32_to_hash, hash_to_base32, phash, sample_frame};
pub use peak_detector::{export_peak_csv, find_peaks, summarize_peaks};
pub use pyramid_builder::build_pyramid;
pub use report_generator::{generate_report, ReportContext};
pub use sampling_operator::{CadenceReason, OperatorEvent, SamplingOperator};
pub use sampling_worker::{analyze_frame, LatestReportFilter, SamplingWorker, WorkerHandle};
pub use session_recorder::{
    extract_convergence_series, find_peak_divergence, find_peaks_in_session, replay_session,
    ConvergenceSeries, DivergenceInterval, SessionRecorder,
};
pub use stability_tracker::StabilityTracker;
pub use strategies::{
    compare_ensemble_results, create_ensemble_report, run_ensemble, EnsembleReport, SamplingStrategy,
};
