//! Categorical count charts: occurrences of each distinct value of one column.

use polars::prelude::*;
use std::collections::HashMap;

use crate::data::has_column;
use crate::error::{ConfigurationIssue, RenderError};
use crate::views::{BarColors, CountSpec, Orientation};

/// Label used for rows whose value is null.
pub const MISSING_LABEL: &str = "(missing)";

#[derive(Debug, Clone, PartialEq)]
pub struct CountBar {
    pub label: String,
    pub count: u64,
}

/// Bar chart of value counts for a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct CountChart {
    pub title: String,
    pub column: String,
    pub orientation: Orientation,
    pub colors: BarColors,
    pub bars: Vec<CountBar>,
}

impl CountChart {
    /// Count the distinct values of `spec.column`.
    ///
    /// Numeric columns are ordered by value, everything else by first
    /// appearance. Nulls are counted under [`MISSING_LABEL`], so the bar
    /// counts always sum to the table height.
    pub fn build(df: &DataFrame, spec: &CountSpec) -> Result<Self, RenderError> {
        if !has_column(df, spec.column) {
            return Err(ConfigurationIssue::MissingColumn {
                view: spec.title,
                column: spec.column,
            }
            .into());
        }

        let column = df.column(spec.column)?;
        let labels = column.cast(&DataType::String)?;
        let labels = labels.str()?;

        // First-appearance order: bars hold the counts, index maps label -> bar
        let mut bars: Vec<CountBar> = Vec::new();
        // Keyed on the raw value so a literal "(missing)" cell stays apart from nulls
        let mut index: HashMap<Option<&str>, usize> = HashMap::new();
        for value in labels.into_iter() {
            match index.get(&value).copied() {
                Some(i) => bars[i].count += 1,
                None => {
                    index.insert(value, bars.len());
                    bars.push(CountBar {
                        label: value.unwrap_or(MISSING_LABEL).to_string(),
                        count: 1,
                    });
                }
            }
        }

        if is_numeric(column.dtype()) {
            bars.sort_by(|a, b| numeric_key(&a.label).total_cmp(&numeric_key(&b.label)));
        }

        tracing::debug!(
            column = spec.column,
            categories = bars.len(),
            "count chart built"
        );

        Ok(Self {
            title: spec.title.to_string(),
            column: spec.column.to_string(),
            orientation: spec.orientation,
            colors: spec.colors,
            bars,
        })
    }

    pub fn total(&self) -> u64 {
        self.bars.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.bars.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Sort key for a numeric label; the missing bucket goes last.
fn numeric_key(label: &str) -> f64 {
    label.parse::<f64>().unwrap_or(f64::INFINITY)
}
