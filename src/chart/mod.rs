//! Derived chart entities, computed on demand from primary collections.

pub mod aggregate;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Series name used for single-series charts.
pub const MAIN_SERIES: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// X coordinate: a unix timestamp for time series, a label for categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartX {
    Time(i64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: ChartX,
    pub y: f64,
}

impl ChartPoint {
    pub fn time(x: i64, y: f64) -> Self {
        Self { x: ChartX::Time(x), y }
    }

    pub fn label(x: impl Into<String>, y: f64) -> Self {
        Self {
            x: ChartX::Label(x.into()),
            y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub item_id: String,
    pub item_type: String,
    pub chart_type: ChartKind,
    pub data: BTreeMap<String, Vec<ChartPoint>>,
    pub timestamp: DateTime<Utc>,
}

impl Chart {
    /// A chart stamped now.
    pub fn new(
        item_id: impl Into<String>,
        item_type: impl Into<String>,
        chart_type: ChartKind,
        data: BTreeMap<String, Vec<ChartPoint>>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            item_type: item_type.into(),
            chart_type,
            data,
            timestamp: Utc::now(),
        }
    }

    /// A chart with one series under [`MAIN_SERIES`], stamped now.
    pub fn single(
        item_id: impl Into<String>,
        item_type: impl Into<String>,
        chart_type: ChartKind,
        points: Vec<ChartPoint>,
    ) -> Self {
        Self::new(
            item_id,
            item_type,
            chart_type,
            BTreeMap::from([(MAIN_SERIES.to_string(), points)]),
        )
    }

    pub fn main(&self) -> &[ChartPoint] {
        self.data.get(MAIN_SERIES).map(Vec::as_slice).unwrap_or(&[])
    }
}
