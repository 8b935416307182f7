//! CLI entry point for the cleaning and conversion pipeline.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use data_sweeper::{
    BatchReport, ChartKind, ChartRequest, ChartSeries, CleaningOperation, FileOutcome,
    FileReport, FileRequest, Pipeline, SweepConfig, TableFormat, UploadedFile,
};
use tracing::{error, info, warn};

/// CLI-compatible chart kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartKind {
    Bar,
    Line,
    Histogram,
    Scatter,
    Pie,
    Box,
}

impl From<CliChartKind> for ChartKind {
    fn from(cli: CliChartKind) -> Self {
        match cli {
            CliChartKind::Bar => ChartKind::Bar,
            CliChartKind::Line => ChartKind::Line,
            CliChartKind::Histogram => ChartKind::Histogram,
            CliChartKind::Scatter => ChartKind::Scatter,
            CliChartKind::Pie => ChartKind::Pie,
            CliChartKind::Box => ChartKind::Box,
        }
    }
}

/// CLI-compatible output format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// Comma-separated text (.csv)
    Csv,
    /// Excel workbook (.xlsx)
    Excel,
}

impl From<CliFormat> for TableFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Csv => TableFormat::Csv,
            CliFormat::Excel => TableFormat::Excel,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean, analyze and convert CSV and Excel files",
    long_about = "Cleans tabular files, prints summary statistics and chart data, \
                  and converts between CSV and Excel.\n\n\
                  EXAMPLES:\n  \
                  # Summarize two files\n  \
                  data-sweeper -i sales.csv -i stock.xlsx\n\n  \
                  # Deduplicate, fill numeric gaps and convert to Excel\n  \
                  data-sweeper -i sales.csv --remove-duplicates --fill-missing --convert excel\n\n  \
                  # Keep two columns and build a scatter chart\n  \
                  data-sweeper -i sales.csv --columns units,price --chart scatter --x units --y price"
)]
struct Args {
    /// Files to process (.csv or .xlsx)
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Remove duplicate rows, keeping the first occurrence
    #[arg(long)]
    remove_duplicates: bool,

    /// Fill missing numeric cells with the column mean
    #[arg(long)]
    fill_missing: bool,

    /// Remove rows with any missing cell
    #[arg(long)]
    drop_missing: bool,

    /// Columns to keep, comma separated
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Chart to build from the cleaned table
    #[arg(long, value_enum)]
    chart: Option<CliChartKind>,

    /// Chart x-axis column (defaults to the first numeric column)
    #[arg(long, requires = "chart")]
    x: Option<String>,

    /// Chart y-axis column (defaults to the second numeric column)
    #[arg(long, requires = "chart")]
    y: Option<String>,

    /// Convert each file to this format
    #[arg(long, value_enum)]
    convert: Option<CliFormat>,

    /// Output directory for converted files
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Number of rows shown in each preview
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Worksheet name for Excel output
    #[arg(long, default_value = "Sheet1")]
    sheet_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and results)
    #[arg(short, long)]
    quiet: bool,

    /// Output the batch report as JSON instead of a human-readable summary
    ///
    /// Disables all logs so stdout carries only the JSON document.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn file_request(&self) -> FileRequest {
        let mut request = FileRequest::new();
        for (enabled, operation) in [
            (self.remove_duplicates, CleaningOperation::RemoveDuplicates),
            (self.fill_missing, CleaningOperation::FillMissingNumeric),
            (self.drop_missing, CleaningOperation::DropIncompleteRows),
        ] {
            if enabled {
                request = request.operation(operation);
            }
        }

        if let Some(columns) = &self.columns {
            request = request.columns(columns.iter().map(|c| c.trim().to_string()));
        }

        if let Some(kind) = self.chart {
            let mut chart = ChartRequest::new(kind.into());
            if let Some(x) = &self.x {
                chart = chart.with_x(x);
            }
            if let Some(y) = &self.y {
                chart = chart.with_y(y);
            }
            request = request.chart(chart);
        }

        if let Some(format) = self.convert {
            request = request.convert_to(format.into());
        }
        request
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = SweepConfig::builder()
        .preview_rows(args.preview_rows)
        .sheet_name(&args.sheet_name)
        .build()?;

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {} - {}: {}",
                update.progress * 100.0,
                update.file_name,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let inputs = read_inputs(&args.input);
    let batch = pipeline.process_batch(&inputs.files, &args.file_request());

    let exported = write_exports(&batch, &args.output, &inputs.paths)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        print_human_readable_summary(&batch, &exported, &inputs.unreadable);
    }

    if batch.processed_count() == 0 {
        return Err(anyhow!(
            "None of the {} input files could be processed",
            args.input.len()
        ));
    }
    Ok(())
}

/// Input files read from disk.
struct Inputs {
    files: Vec<UploadedFile>,
    /// Name and error of every path that could not be read.
    unreadable: Vec<(String, String)>,
    /// Canonical paths of the inputs, which exports must never replace.
    paths: HashSet<PathBuf>,
}

/// Read every input path. Unreadable paths are recorded with their error
/// so the remaining files still run.
fn read_inputs(paths: &[PathBuf]) -> Inputs {
    let mut inputs = Inputs {
        files: Vec::with_capacity(paths.len()),
        unreadable: Vec::new(),
        paths: HashSet::new(),
    };

    for path in paths {
        let name = file_name(path);
        match std::fs::read(path) {
            Ok(bytes) => {
                inputs.files.push(UploadedFile::new(name, bytes));
                inputs.paths.insert(canonical(path));
            }
            Err(e) => {
                error!("Could not read {}: {}", path.display(), e);
                inputs.unreadable.push((name, e.to_string()));
            }
        }
    }
    inputs
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Write every successful export to `output_dir`, keyed by batch position.
///
/// Exports with the same name, or whose name matches an input file, are
/// written as `<stem> (<n>).<ext>` instead.
fn write_exports(
    batch: &BatchReport,
    output_dir: &Path,
    inputs: &HashSet<PathBuf>,
) -> Result<HashMap<usize, PathBuf>> {
    let mut written = HashMap::new();
    let mut taken = HashSet::new();

    for (idx, outcome) in batch.files.iter().enumerate() {
        let Some(report) = outcome.report() else {
            continue;
        };
        let Some(Ok(export)) = &report.export else {
            continue;
        };

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
            info!("Created output directory: {}", output_dir.display());
        }

        let path = unique_export_path(output_dir, &export.file_name, &taken, inputs);
        taken.insert(path.clone());
        match std::fs::write(&path, &export.bytes) {
            Ok(()) => {
                info!("Wrote {} ({} bytes)", path.display(), export.size_bytes);
                written.insert(idx, path);
            }
            Err(e) => warn!("Could not write {}: {}", path.display(), e),
        }
    }
    Ok(written)
}

/// First free path for `file_name` in `dir` that is neither already written
/// in this run nor one of the input files.
fn unique_export_path(
    dir: &Path,
    file_name: &str,
    taken: &HashSet<PathBuf>,
    inputs: &HashSet<PathBuf>,
) -> PathBuf {
    let is_free = |path: &PathBuf| !taken.contains(path) && !inputs.contains(&canonical(path));

    let path = dir.join(file_name);
    if is_free(&path) {
        return path;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
        _ => (file_name, String::new()),
    };
    (1..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
        .find(is_free)
        .unwrap_or(path)
}

/// Print a human-readable summary of every file in the batch.
fn print_human_readable_summary(
    batch: &BatchReport,
    exported: &HashMap<usize, PathBuf>,
    unreadable: &[(String, String)],
) {
    for (idx, outcome) in batch.files.iter().enumerate() {
        println!();
        println!("{}", "=".repeat(80));
        match outcome {
            FileOutcome::Processed(report) => print_file_report(report, exported.get(&idx)),
            FileOutcome::Failed { file_name, error } => {
                println!("FAILED: {}", file_name);
                println!("  [{}] {}", error.error_code(), error);
            }
        }
    }
    for (name, reason) in unreadable {
        println!();
        println!("{}", "=".repeat(80));
        println!("FAILED: {}", name);
        println!("  {}", reason);
    }

    println!("{}", "=".repeat(80));
    println!(
        "{} processed, {} failed",
        batch.processed_count(),
        batch.failed_count() + unreadable.len()
    );
    println!("Use --json for machine-readable output");
}

fn print_file_report(report: &FileReport, exported: Option<&PathBuf>) {
    println!("{} ({:.2} KB, {})", report.file_name, report.size_kb, report.format);
    println!("{}", "=".repeat(80));
    println!(
        "  Rows: {} -> {} ({} removed)",
        report.rows_before,
        report.rows_after,
        report.rows_removed()
    );
    println!(
        "  Columns: {} -> {}",
        report.columns_before, report.columns_after
    );
    println!("  Duration: {}ms", report.duration_ms);
    println!();

    if !report.operations.is_empty() {
        println!("Cleaning:");
        for outcome in &report.operations {
            println!("  - {}", outcome.describe());
        }
        println!();
    }

    println!("Preview:");
    println!("  {}", report.preview.columns.join(" | "));
    for row in &report.preview.rows {
        let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
        println!("  {}", cells.join(" | "));
    }
    println!();

    println!("Summary Statistics:");
    if report.summary.is_empty() {
        println!("  No numeric columns");
    } else {
        println!(
            "  {:<20} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for stats in &report.summary {
            println!(
                "  {:<20} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                truncate_str(&stats.column, 19),
                stats.count,
                fmt_stat(stats.mean),
                fmt_stat(stats.std),
                fmt_stat(stats.min),
                fmt_stat(stats.p25),
                fmt_stat(stats.p50),
                fmt_stat(stats.p75),
                fmt_stat(stats.max),
            );
        }
    }
    println!();

    println!("Correlation:");
    match &report.correlation {
        Ok(matrix) => {
            let header: Vec<String> = matrix
                .columns
                .iter()
                .map(|c| format!("{:>10}", truncate_str(c, 10)))
                .collect();
            println!("  {:<12}{}", "", header.join(""));
            for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                let cells: Vec<String> = row.iter().map(|v| format!("{:>10}", fmt_stat(Some(*v)))).collect();
                println!("  {:<12}{}", truncate_str(name, 11), cells.join(""));
            }
        }
        Err(e) => println!("  {}", e),
    }
    println!();

    if let Some(chart) = &report.chart {
        println!("Chart:");
        match chart {
            Ok(spec) => {
                let shape = match &spec.series {
                    ChartSeries::Xy { .. } => "points",
                    ChartSeries::Distribution { .. } => "values",
                    ChartSeries::Categorical { .. } => "slices",
                    ChartSeries::Box { .. } => "observations",
                };
                println!("  {} ({} {})", spec.title, spec.series.len(), shape);
            }
            Err(e) => println!("  ! {}", e),
        }
        println!();
    }

    if let Some(export) = &report.export {
        println!("Export:");
        match (export, exported) {
            (Ok(table), Some(path)) => {
                println!("  {} ({}, {} bytes)", path.display(), table.mime_type, table.size_bytes)
            }
            (Ok(table), None) => println!("  {} was not written", table.file_name),
            (Err(e), _) => println!("  ! {}", e),
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }
}

fn fmt_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_nan() => "NaN".to_string(),
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("data-sweeper-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn convert_to_csv(files: &[UploadedFile]) -> BatchReport {
        let pipeline = Pipeline::builder().build().unwrap();
        let request = FileRequest::new().convert_to(TableFormat::Csv);
        pipeline.process_batch(files, &request)
    }

    #[test]
    fn test_same_named_exports_are_kept_apart() {
        let dir = scratch_dir("same-name");
        let files = [
            UploadedFile::new("x.csv", b"a\n1\n".to_vec()),
            UploadedFile::new("x.csv", b"a\n2\n".to_vec()),
        ];
        let batch = convert_to_csv(&files);

        let written = write_exports(&batch, &dir, &HashSet::new()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[&0], dir.join("x.csv"));
        assert_eq!(written[&1], dir.join("x (1).csv"));
        assert!(std::fs::read_to_string(&written[&0]).unwrap().contains('1'));
        assert!(std::fs::read_to_string(&written[&1]).unwrap().contains('2'));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_never_replaces_an_input() {
        let dir = scratch_dir("input");
        let source = dir.join("sales.csv");
        std::fs::write(&source, "units,price\n1,2.5\n1,2.5\n").unwrap();

        let inputs = read_inputs(std::slice::from_ref(&source));
        let pipeline = Pipeline::builder().build().unwrap();
        let request = FileRequest::new()
            .operation(CleaningOperation::RemoveDuplicates)
            .convert_to(TableFormat::Csv);
        let batch = pipeline.process_batch(&inputs.files, &request);

        let written = write_exports(&batch, &dir, &inputs.paths).unwrap();
        assert_eq!(written[&0], dir.join("sales (1).csv"));
        assert_eq!(
            std::fs::read_to_string(&source).unwrap(),
            "units,price\n1,2.5\n1,2.5\n"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unique_export_path_without_extension() {
        let dir = Path::new("/nonexistent-out");
        let taken = HashSet::from([dir.join("report")]);
        let path = unique_export_path(dir, "report", &taken, &HashSet::new());
        assert_eq!(path, dir.join("report (1)"));
    }
}
