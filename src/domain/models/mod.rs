pub mod config;
pub mod divergence;
pub mod evidence;
pub mod frame;
pub mod motif_history;
pub mod report;
pub mod sample;
pub mod session;

pub use config::{AdaptiveCadenceConfig, Config, LoggingConfig, SamplingConfig, WorkerConfig};
pub use divergence::{
    BucketPoint, BucketedSeries, DivergencePoint, Peak, PeakParams, RunSample, TimedDivergence,
};
pub use evidence::{EvidenceBullet, EvidenceConfig, EvidenceStats};
pub use frame::{Frame, Pyramid, PyramidLevel, CHANNELS};
pub use motif_history::{MotifHistory, MotifWindow};
pub use report::{MotifCount, Report, ReportMetrics};
pub use sample::{MotifHash, Observation, ViewSample};
pub use session::{Session, SessionEvent, SessionMetadata};
