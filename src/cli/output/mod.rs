pub mod progress;

pub use progress::{create_progress_bar, hidden_progress_bar, ProgressBarExt};
