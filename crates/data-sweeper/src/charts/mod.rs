//! Declarative chart specifications.
//!
//! The builder validates the requested axes and copies the series straight
//! from the table's current rows. It never sorts, buckets or aggregates:
//! histogram binning and pie slice totals are left to the renderer. The one
//! derived series is the five-number summary attached to box charts.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SweepError};
use crate::types::ChartRequest;
use crate::utils::{
    is_numeric_dtype, numeric_column_names, numeric_values, observed_values, quantile_sorted,
    sort_floats, text_values,
};

/// Supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Histogram,
    Scatter,
    Pie,
    Box,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Box,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bar => "Bar Chart",
            Self::Line => "Line Chart",
            Self::Histogram => "Histogram",
            Self::Scatter => "Scatter Plot",
            Self::Pie => "Pie Chart",
            Self::Box => "Box Plot",
        }
    }

    /// Whether the chart plots a second (y) column.
    pub fn uses_y_axis(&self) -> bool {
        !matches!(self, Self::Histogram)
    }

    /// Whether the x axis must be numeric; pie slices accept any labels.
    fn numeric_x(&self) -> bool {
        !matches!(self, Self::Pie)
    }

    /// Kinds whose marks are coloured by the x column.
    fn colors_by_x(&self) -> bool {
        matches!(self, Self::Bar | Self::Line | Self::Histogram | Self::Scatter)
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Five-number summary for a box chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxPlotSummary {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        sort_floats(&mut values);
        Some(Self {
            min: *values.first()?,
            q1: quantile_sorted(&values, 0.25)?,
            median: quantile_sorted(&values, 0.5)?,
            q3: quantile_sorted(&values, 0.75)?,
            max: *values.last()?,
        })
    }
}

/// Data handed to the renderer, one entry per table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSeries {
    /// Paired points for bar, line and scatter charts.
    Xy {
        x: Vec<Option<f64>>,
        y: Vec<Option<f64>>,
    },
    /// Raw values for a histogram.
    Distribution { values: Vec<Option<f64>> },
    /// Slice labels and sizes for a pie chart.
    Categorical {
        labels: Vec<Option<String>>,
        values: Vec<Option<f64>>,
    },
    /// Points for a box chart plus the summary of `y`.
    Box {
        x: Vec<Option<f64>>,
        y: Vec<Option<f64>>,
        summary: Option<BoxPlotSummary>,
    },
}

impl ChartSeries {
    /// Number of rows in the series.
    pub fn len(&self) -> usize {
        match self {
            Self::Xy { x, .. } | Self::Box { x, .. } => x.len(),
            Self::Distribution { values } | Self::Categorical { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A render-ready chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_by: Option<String>,
    pub series: ChartSeries,
}

/// Builds chart specifications from a table.
pub struct ChartBuilder;

impl ChartBuilder {
    /// Build a chart, filling omitted axes with defaults.
    ///
    /// Defaults: x is the first numeric column (the first column of any
    /// type for pie charts); y is the second numeric column, or the same
    /// column as x when only one exists (the first numeric column for pie).
    pub fn build(df: &DataFrame, request: &ChartRequest) -> Result<ChartSpec> {
        let (x, y) = Self::resolve_axes(df, request)?;
        Self::build_with_axes(df, request.kind, &x, y.as_deref())
    }

    /// Build a chart for explicit axes.
    ///
    /// `y` is required for every kind except histogram, where it is ignored.
    ///
    /// # Errors
    ///
    /// - [`SweepError::InvalidColumn`] when an axis names an unknown column
    /// - [`SweepError::InvalidAxis`] when `y` is missing or an axis column
    ///   is not numeric
    pub fn build_with_axes(
        df: &DataFrame,
        kind: ChartKind,
        x: &str,
        y: Option<&str>,
    ) -> Result<ChartSpec> {
        let x_series = Self::axis_series(df, "x", x, kind.numeric_x())?;

        let y_series = if kind.uses_y_axis() {
            let y = y.ok_or_else(|| {
                SweepError::invalid_axis("y", "", format!("{} requires a y column", kind))
            })?;
            Some(Self::axis_series(df, "y", y, true)?)
        } else {
            None
        };

        let series = match y_series {
            None => ChartSeries::Distribution {
                values: numeric_values(x_series)?,
            },
            Some(y_series) if kind == ChartKind::Pie => ChartSeries::Categorical {
                labels: text_values(x_series)?,
                values: numeric_values(y_series)?,
            },
            Some(y_series) if kind == ChartKind::Box => ChartSeries::Box {
                x: numeric_values(x_series)?,
                y: numeric_values(y_series)?,
                summary: BoxPlotSummary::from_values(observed_values(y_series)?),
            },
            Some(y_series) => ChartSeries::Xy {
                x: numeric_values(x_series)?,
                y: numeric_values(y_series)?,
            },
        };

        let y_column = y_series.map(|s| s.name().to_string());
        let title = match &y_column {
            Some(y) => format!("{}: {} vs {}", kind, y, x),
            None => format!("{}: {}", kind, x),
        };

        debug!("Built {} with {} rows", kind, series.len());
        Ok(ChartSpec {
            kind,
            title,
            x_column: x.to_string(),
            y_column,
            color_by: kind.colors_by_x().then(|| x.to_string()),
            series,
        })
    }

    fn resolve_axes(df: &DataFrame, request: &ChartRequest) -> Result<(String, Option<String>)> {
        let numeric = numeric_column_names(df);
        let no_numeric = || {
            SweepError::invalid_axis(
                "x",
                "",
                "no numeric columns found for visualization",
            )
        };

        let x = match (&request.x, request.kind) {
            (Some(x), _) => x.clone(),
            (None, ChartKind::Pie) => df
                .get_column_names()
                .first()
                .map(|name| name.to_string())
                .ok_or_else(|| SweepError::invalid_axis("x", "", "table has no columns"))?,
            (None, _) => numeric.first().cloned().ok_or_else(no_numeric)?,
        };

        if !request.kind.uses_y_axis() {
            return Ok((x, None));
        }

        let y = match (&request.y, request.kind) {
            (Some(y), _) => y.clone(),
            (None, ChartKind::Pie) => numeric.first().cloned().ok_or_else(|| {
                SweepError::invalid_axis("y", "", "no numeric columns found for visualization")
            })?,
            (None, _) => numeric
                .get(1)
                .or_else(|| numeric.first())
                .cloned()
                .ok_or_else(no_numeric)?,
        };

        Ok((x, Some(y)))
    }

    fn axis_series<'a>(
        df: &'a DataFrame,
        axis: &str,
        name: &str,
        numeric: bool,
    ) -> Result<&'a Series> {
        let column = df
            .column(name)
            .map_err(|_| SweepError::InvalidColumn(name.to_string()))?;

        if numeric && !is_numeric_dtype(column.dtype()) {
            return Err(SweepError::invalid_axis(
                axis,
                name,
                format!("expected a numeric column, found {}", column.dtype()),
            ));
        }
        Ok(column.as_materialized_series())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DataFrame {
        df! {
            "city" => ["Oslo", "Rome", "Lima"],
            "temp" => [Some(4.0f64), None, Some(19.5)],
            "visits" => [10i64, 20, 30],
        }
        .unwrap()
    }

    #[test]
    fn test_scatter_with_explicit_axes() {
        let spec = ChartBuilder::build_with_axes(&sample(), ChartKind::Scatter, "visits", Some("temp"))
            .unwrap();

        assert_eq!(spec.x_column, "visits");
        assert_eq!(spec.y_column.as_deref(), Some("temp"));
        assert_eq!(spec.color_by.as_deref(), Some("visits"));
        assert_eq!(
            spec.series,
            ChartSeries::Xy {
                x: vec![Some(10.0), Some(20.0), Some(30.0)],
                y: vec![Some(4.0), None, Some(19.5)],
            }
        );
    }

    #[test]
    fn test_histogram_ignores_y() {
        let spec =
            ChartBuilder::build_with_axes(&sample(), ChartKind::Histogram, "temp", Some("city"))
                .unwrap();
        assert_eq!(spec.y_column, None);
        assert_eq!(
            spec.series,
            ChartSeries::Distribution {
                values: vec![Some(4.0), None, Some(19.5)]
            }
        );
    }

    #[test]
    fn test_pie_accepts_text_labels() {
        let spec =
            ChartBuilder::build_with_axes(&sample(), ChartKind::Pie, "city", Some("visits")).unwrap();
        assert_eq!(spec.color_by, None);
        match spec.series {
            ChartSeries::Categorical { labels, values } => {
                assert_eq!(labels[1].as_deref(), Some("Rome"));
                assert_eq!(values, vec![Some(10.0), Some(20.0), Some(30.0)]);
            }
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn test_box_summary() {
        let spec =
            ChartBuilder::build_with_axes(&sample(), ChartKind::Box, "temp", Some("visits")).unwrap();
        match spec.series {
            ChartSeries::Box { summary, .. } => {
                let summary = summary.unwrap();
                assert_eq!(summary.min, 10.0);
                assert_eq!(summary.median, 20.0);
                assert_eq!(summary.max, 30.0);
            }
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn test_text_axis_is_invalid() {
        let err = ChartBuilder::build_with_axes(&sample(), ChartKind::Bar, "city", Some("temp"))
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidAxis { ref axis, .. } if axis == "x"));

        let err = ChartBuilder::build_with_axes(&sample(), ChartKind::Pie, "city", Some("city"))
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidAxis { ref axis, .. } if axis == "y"));
    }

    #[test]
    fn test_missing_y_is_invalid() {
        let err = ChartBuilder::build_with_axes(&sample(), ChartKind::Line, "temp", None).unwrap_err();
        assert!(matches!(err, SweepError::InvalidAxis { .. }));
    }

    #[test]
    fn test_unknown_column() {
        let err = ChartBuilder::build_with_axes(&sample(), ChartKind::Line, "nope", Some("temp"))
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidColumn(ref c) if c == "nope"));
    }

    #[test]
    fn test_default_axes() {
        let spec = ChartBuilder::build(&sample(), &ChartRequest::new(ChartKind::Line)).unwrap();
        assert_eq!(spec.x_column, "temp");
        assert_eq!(spec.y_column.as_deref(), Some("visits"));

        let pie = ChartBuilder::build(&sample(), &ChartRequest::new(ChartKind::Pie)).unwrap();
        assert_eq!(pie.x_column, "city");
        assert_eq!(pie.y_column.as_deref(), Some("temp"));
    }

    #[test]
    fn test_default_axes_single_numeric_column() {
        let df = df! { "name" => ["a", "b"], "n" => [1i64, 2] }.unwrap();
        let spec = ChartBuilder::build(&df, &ChartRequest::new(ChartKind::Bar)).unwrap();
        assert_eq!(spec.x_column, "n");
        assert_eq!(spec.y_column.as_deref(), Some("n"));
    }

    #[test]
    fn test_no_numeric_columns() {
        let df = df! { "name" => ["a", "b"] }.unwrap();
        let err = ChartBuilder::build(&df, &ChartRequest::new(ChartKind::Scatter)).unwrap_err();
        assert!(matches!(err, SweepError::InvalidAxis { .. }));
    }
}
