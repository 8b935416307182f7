//! Progress reporting for the cleaning pipeline.
//!
//! Each uploaded file walks through the same stages. Reporters are called
//! synchronously on the thread running the file.
//!
//! # Example
//!
//! ```rust,ignore
//! use data_sweeper::Pipeline;
//!
//! let pipeline = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{}] {:?}: {}", update.file_name, update.stage, update.message);
//!     })
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages a single file passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Parsing the uploaded bytes into a table
    Loading,
    /// Running the requested cleaning operations
    Cleaning,
    /// Keeping the requested columns
    Projecting,
    /// Computing summary statistics and correlations
    Analyzing,
    /// Building the requested chart
    Charting,
    /// Encoding the table for download
    Encoding,
    /// File processed
    Complete,
    /// File could not be loaded
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading File",
            Self::Cleaning => "Cleaning Data",
            Self::Projecting => "Selecting Columns",
            Self::Analyzing => "Computing Statistics",
            Self::Charting => "Building Chart",
            Self::Encoding => "Converting File",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of a file's work spent in this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.25,
            Self::Cleaning => 0.25,
            Self::Projecting => 0.05,
            Self::Analyzing => 0.20,
            Self::Charting => 0.10,
            Self::Encoding => 0.15,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.25,
            Self::Projecting => 0.50,
            Self::Analyzing => 0.55,
            Self::Charting => 0.75,
            Self::Encoding => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A progress notification for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Name of the file being processed
    pub file_name: String,

    /// Current stage
    pub stage: PipelineStage,

    /// Progress through this file (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates an update `stage_progress` of the way through `stage`.
    pub fn new(
        file_name: impl Into<String>,
        stage: PipelineStage,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        let progress = stage.base_progress() + stage.weight() * stage_progress.clamp(0.0, 1.0);
        Self {
            file_name: file_name.into(),
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion update.
    pub fn complete(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            stage: PipelineStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failure update.
    pub fn failed(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            stage: PipelineStage::Failed,
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates while files are processed.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved to a
/// worker thread.
pub trait ProgressReporter: Send + Sync {
    /// Called at each stage boundary. Keep it cheap.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const STAGES: [PipelineStage; 6] = [
        PipelineStage::Loading,
        PipelineStage::Cleaning,
        PipelineStage::Projecting,
        PipelineStage::Analyzing,
        PipelineStage::Charting,
        PipelineStage::Encoding,
    ];

    #[test]
    fn test_stage_weights_sum() {
        let total: f32 = STAGES.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0;
        for stage in STAGES {
            assert!((stage.base_progress() - expected).abs() < 1e-6, "{:?}", stage);
            expected += stage.weight();
        }
    }

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new("a.csv", PipelineStage::Cleaning, 0.5, "Cleaning");
        assert_eq!(update.file_name, "a.csv");
        assert!((update.progress - 0.375).abs() < 1e-6);

        let clamped = ProgressUpdate::new("a.csv", PipelineStage::Encoding, 7.0, "Done");
        assert!((clamped.progress - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_updates() {
        assert_eq!(ProgressUpdate::complete("a.csv", "ok").progress, 1.0);
        let failed = ProgressUpdate::failed("a.csv", "bad bytes");
        assert_eq!(failed.stage, PipelineStage::Failed);
        assert_eq!(failed.message, "bad bytes");
    }

    #[test]
    fn test_closure_progress_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            seen_clone.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new("a.csv", PipelineStage::Loading, 0.0, "x"));
        reporter.report(ProgressUpdate::complete("a.csv", "y"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![PipelineStage::Loading, PipelineStage::Complete]
        );
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let reporter: Arc<dyn ProgressReporter> =
            Arc::new(ClosureProgressReporter::new(move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let reporter = reporter.clone();
                std::thread::spawn(move || {
                    reporter.report(ProgressUpdate::new(
                        format!("{}.csv", i),
                        PipelineStage::Analyzing,
                        1.0,
                        "done",
                    ));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_stage_json_values() {
        assert_eq!(
            serde_json::to_string(&PipelineStage::Projecting).unwrap(),
            "\"projecting\""
        );
    }
}
