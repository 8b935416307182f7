//! Main pipeline module.
//!
//! This module provides the `Pipeline` struct and its builder. A pipeline
//! runs each uploaded file through load, clean, project, analyze, chart and
//! encode. Files never share state, so one file failing to load leaves the
//! rest of the batch untouched.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::charts::ChartBuilder;
use crate::cleaner::DataCleaner;
use crate::config::SweepConfig;
use crate::encoder::TableEncoder;
use crate::error::{Result, ResultExt, SweepError};
use crate::loader::TableLoader;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::projector::ColumnProjector;
use crate::types::{BatchReport, FileOutcome, FileReport, FileRequest, TableFormat, UploadedFile};
use crate::utils::table_preview;

/// The cleaning and conversion pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use data_sweeper::{CleaningOperation, FileRequest, Pipeline, TableFormat, UploadedFile};
///
/// let pipeline = Pipeline::builder()
///     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
///     .build()?;
///
/// let request = FileRequest::new()
///     .operation(CleaningOperation::RemoveDuplicates)
///     .convert_to(TableFormat::Excel);
///
/// let batch = pipeline.process_batch(&files, &request);
/// println!("{} of {} files processed", batch.processed_count(), batch.files.len());
/// ```
pub struct Pipeline {
    config: SweepConfig,
    loader: TableLoader,
    cleaner: DataCleaner,
    encoder: TableEncoder,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Hosts may run each file on its own thread
static_assertions::assert_impl_all!(Pipeline: Send);
static_assertions::assert_impl_all!(FileReport: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Process every file with the same request, in upload order.
    ///
    /// Files that fail to load are recorded as [`FileOutcome::Failed`];
    /// the remaining files are still processed.
    pub fn process_batch(&self, files: &[UploadedFile], request: &FileRequest) -> BatchReport {
        info!("Processing batch of {} files", files.len());

        let files = files
            .iter()
            .map(|file| match self.process_file(file, request) {
                Ok(report) => FileOutcome::Processed(Box::new(report)),
                Err(e) => {
                    error!("Failed to process {}: {}", file.name, e);
                    FileOutcome::Failed {
                        file_name: file.name.clone(),
                        error: e,
                    }
                }
            })
            .collect();

        BatchReport {
            generated_at: Utc::now(),
            files,
        }
    }

    /// Process one uploaded file.
    ///
    /// # Errors
    ///
    /// Only load failures ([`SweepError::UnsupportedFormat`],
    /// [`SweepError::ParseFailure`]) fail the file. Projection, correlation,
    /// chart and export errors are stored in the returned [`FileReport`].
    pub fn process_file(&self, file: &UploadedFile, request: &FileRequest) -> Result<FileReport> {
        match self.process_internal(file, request) {
            Ok(report) => {
                self.report_progress(ProgressUpdate::complete(
                    &file.name,
                    format!("Processed {} in {} ms", file.name, report.duration_ms),
                ));
                Ok(report)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(&file.name, e.to_string()));
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn stage(&self, file: &UploadedFile, stage: PipelineStage, message: impl Into<String>) {
        self.report_progress(ProgressUpdate::new(&file.name, stage, 0.0, message));
    }

    fn process_internal(&self, file: &UploadedFile, request: &FileRequest) -> Result<FileReport> {
        let start_time = Instant::now();
        let mut warnings = Vec::new();

        // Step 1: Load
        self.stage(file, PipelineStage::Loading, format!("Loading {}...", file.name));
        let format = TableFormat::from_extension(&file.extension())?;
        let df = self.loader.load(file)?;
        let (rows_before, columns_before) = df.shape();
        info!(
            "Loaded {}: {} rows, {} columns",
            file.name, rows_before, columns_before
        );

        // Step 2: Clean
        self.stage(file, PipelineStage::Cleaning, "Applying cleaning operations...");
        let (df, operations) = self
            .cleaner
            .apply_all(&df, &request.operations)
            .context(format!("Cleaning {}", file.name))?;
        for outcome in &operations {
            for column in &outcome.untouched_columns {
                warnings.push(format!(
                    "Column '{}' has no values to average and was left unchanged",
                    column
                ));
            }
        }

        // Step 3: Project
        self.stage(file, PipelineStage::Projecting, "Selecting columns...");
        let (df, projection_error) = match &request.columns {
            Some(columns) => match ColumnProjector::project(&df, columns.as_slice()) {
                Ok(projected) => (projected, None),
                Err(e) => {
                    warn!("Projection skipped for {}: {}", file.name, e);
                    warnings.push(format!("Column selection skipped: {}", e));
                    (df, Some(e))
                }
            },
            None => (df, None),
        };

        // Step 4: Analyze (read-only)
        self.stage(file, PipelineStage::Analyzing, "Computing statistics...");
        let summary = DataProfiler::summary(&df).unwrap_or_else(|e| {
            warn!("Summary statistics failed for {}: {}", file.name, e);
            warnings.push(format!("Summary statistics unavailable: {}", e));
            Vec::new()
        });
        let correlation = DataProfiler::correlation(&df);
        if let Err(e) = &correlation {
            debug!("No correlation matrix for {}: {}", file.name, e);
        }

        // Step 5: Chart (read-only)
        let chart = request.chart.as_ref().map(|chart| {
            self.stage(
                file,
                PipelineStage::Charting,
                format!("Building {}...", chart.kind),
            );
            ChartBuilder::build(&df, chart).inspect_err(|e| {
                warn!("Chart skipped for {}: {}", file.name, e);
            })
        });

        // Step 6: Encode
        let export = request.convert_to.map(|target| {
            self.stage(
                file,
                PipelineStage::Encoding,
                format!("Converting to {}...", target),
            );
            self.encoder
                .encode(&df, target, &file.name, &file.extension())
                .inspect_err(|e| error!("Export failed for {}: {}", file.name, e))
        });

        let preview = table_preview(&df, self.config.preview_rows).unwrap_or_else(|e| {
            warnings.push(format!("Preview unavailable: {}", e));
            Default::default()
        });
        let (rows_after, columns_after) = df.shape();
        let duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Finished {}: {} rows, {} columns ({} ms)",
            file.name, rows_after, columns_after, duration_ms
        );

        Ok(FileReport {
            file_name: file.name.clone(),
            size_kb: file.size_kb(),
            format,
            rows_before,
            columns_before,
            rows_after,
            columns_after,
            operations,
            projection_error,
            table: df,
            preview,
            summary,
            correlation,
            chart,
            export,
            warnings,
            duration_ms,
        })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<SweepConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: SweepConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns [`SweepError::InvalidConfig`] if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(SweepError::from)?;

        Ok(Pipeline {
            loader: TableLoader::new(config.clone()),
            cleaner: DataCleaner,
            encoder: TableEncoder::new(config.clone()),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
