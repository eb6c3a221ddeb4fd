//! Grouped summaries over the filtered snapshot.
//!
//! Every chart is fed by one [`Reducer`]: a group key, the measures to fold,
//! how to fold them and how to order the groups. The six reducers the
//! dashboard uses are the `const` values at the bottom of this module; each
//! can be run on its own.

use std::collections::BTreeMap;

use log::debug;
use polars::prelude::*;
use serde::Serialize;

use crate::error::{require_columns, RentalError, Result};
use crate::record::{
    CASUAL, DATE, MONTH, MONTH_LABELS, REGISTERED, SEASON, SEASON_LABELS, TOTAL, WEEKDAY,
    WEEKDAY_LABELS,
};

const ORDER_COLUMN: &str = "__order";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
}

impl Aggregation {
    fn apply(self, expr: Expr) -> Expr {
        match self {
            Aggregation::Sum => expr.sum(),
        }
    }
}

/// How the groups of a result are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Ascending by group key.
    ByKey,
    /// In the order of these categories; only groups present in the input
    /// appear, groups outside the list are discarded.
    Ranked(&'static [&'static str]),
    /// Exactly these categories in this order. Groups absent from the input
    /// are filled with zero, groups outside the list are discarded.
    Fixed(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reducer {
    pub name: &'static str,
    pub key: &'static str,
    pub measures: &'static [&'static str],
    pub aggregation: Aggregation,
    pub ordering: Ordering,
}

impl Reducer {
    pub fn reduce(&self, df: &DataFrame) -> Result<AggregateTable> {
        let mut columns = vec![self.key];
        columns.extend_from_slice(self.measures);
        require_columns(df, &columns)?;

        let aggs: Vec<Expr> = self
            .measures
            .iter()
            .copied()
            .map(|m| self.aggregation.apply(col(m)))
            .collect();

        let q = df.clone().lazy();
        let q = match self.ordering {
            Ordering::ByKey => q
                .group_by([col(self.key)])
                .agg(aggs)
                .sort([self.key], SortMultipleOptions::default()),
            Ordering::Ranked(categories) => {
                let grouped = q.group_by([col(self.key)]).agg(aggs);
                category_order(self.key, categories)?
                    .lazy()
                    .inner_join(grouped, col(self.key), col(self.key))
                    .sort([ORDER_COLUMN], SortMultipleOptions::default())
                    .select(self.output_columns(|m| col(m)))
            }
            Ordering::Fixed(categories) => {
                let grouped = q.group_by([col(self.key)]).agg(aggs);
                category_order(self.key, categories)?
                    .lazy()
                    .left_join(grouped, col(self.key), col(self.key))
                    .sort([ORDER_COLUMN], SortMultipleOptions::default())
                    .select(self.output_columns(|m| col(m).fill_null(lit(0i64))))
            }
        };

        let frame = q.collect()?;
        debug!(
            "{}: {} input rows -> {} groups",
            self.name,
            df.height(),
            frame.height()
        );
        Ok(AggregateTable {
            name: self.name,
            key: self.key,
            measures: self.measures,
            frame,
        })
    }

    /// The key column followed by `measure` applied to each measure column.
    fn output_columns(&self, measure: impl Fn(&str) -> Expr) -> Vec<Expr> {
        let mut columns = vec![col(self.key)];
        columns.extend(self.measures.iter().copied().map(measure));
        columns
    }
}

/// `key` holding `categories`, ranked by position in `ORDER_COLUMN`.
fn category_order(key: &str, categories: &[&str]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(key, categories),
        Series::new(
            ORDER_COLUMN,
            (0..categories.len() as u32).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

pub const DAILY_TOTAL: Reducer = Reducer {
    name: "daily_total",
    key: DATE,
    measures: &[TOTAL],
    aggregation: Aggregation::Sum,
    ordering: Ordering::ByKey,
};

pub const DAILY_CASUAL: Reducer = Reducer {
    name: "daily_casual",
    key: DATE,
    measures: &[CASUAL],
    aggregation: Aggregation::Sum,
    ordering: Ordering::ByKey,
};

pub const DAILY_REGISTERED: Reducer = Reducer {
    name: "daily_registered",
    key: DATE,
    measures: &[REGISTERED],
    aggregation: Aggregation::Sum,
    ordering: Ordering::ByKey,
};

pub const SEASON_SPLIT: Reducer = Reducer {
    name: "season_split",
    key: SEASON,
    measures: &[REGISTERED, CASUAL],
    aggregation: Aggregation::Sum,
    ordering: Ordering::Ranked(&SEASON_LABELS),
};

pub const MONTHLY_TOTAL: Reducer = Reducer {
    name: "monthly_total",
    key: MONTH,
    measures: &[TOTAL],
    aggregation: Aggregation::Sum,
    ordering: Ordering::Fixed(&MONTH_LABELS),
};

pub const WEEKDAY_TOTAL: Reducer = Reducer {
    name: "weekday_total",
    key: WEEKDAY,
    measures: &[TOTAL],
    aggregation: Aggregation::Sum,
    ordering: Ordering::Ranked(&WEEKDAY_LABELS),
};

/// Read-only result of a [`Reducer`]: the key column followed by one column
/// per measure.
#[derive(Debug, Clone)]
pub struct AggregateTable {
    name: &'static str,
    key: &'static str,
    measures: &'static [&'static str],
    frame: DataFrame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub label: String,
    pub values: BTreeMap<&'static str, i64>,
}

impl AggregateTable {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn measures(&self) -> &'static [&'static str] {
        self.measures
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Group keys rendered as text; dates come out as `YYYY-MM-DD`.
    pub fn labels(&self) -> Result<Vec<String>> {
        let keys = self.frame.column(self.key)?.cast(&DataType::String)?;
        Ok(keys
            .str()?
            .into_iter()
            .map(|k| k.unwrap_or_default().to_string())
            .collect())
    }

    pub fn values(&self, measure: &str) -> Result<Vec<i64>> {
        let column = self.frame.column(measure).map_err(|_| RentalError::Schema {
            column: measure.to_string(),
        })?;
        Ok(column.i64()?.into_iter().map(|v| v.unwrap_or(0)).collect())
    }

    pub fn sum(&self, measure: &str) -> Result<i64> {
        Ok(self.values(measure)?.into_iter().sum())
    }

    pub fn rows(&self) -> Result<Vec<AggregateRow>> {
        let labels = self.labels()?;
        let mut rows: Vec<AggregateRow> = labels
            .into_iter()
            .map(|label| AggregateRow {
                label,
                values: BTreeMap::new(),
            })
            .collect();
        for &measure in self.measures {
            for (row, value) in rows.iter_mut().zip(self.values(measure)?) {
                row.values.insert(measure, value);
            }
        }
        Ok(rows)
    }
}
