// Chart series: labels plus positionally aligned data series.
// The renderer styles series by index, so series order is part of the contract.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<u64>,
}

/// Built once per refresh and shared read-only (`Arc<ChartSeries>`) after publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSeries {
    /// Chart with no points and one empty series per name, in the given order.
    pub fn empty(names: &[&str]) -> Self {
        Self::with_capacity(names, 0)
    }

    pub fn with_capacity(names: &[&str], points: usize) -> Self {
        Self {
            labels: Vec::with_capacity(points),
            series: names
                .iter()
                .map(|name| Series {
                    name: (*name).to_string(),
                    data: Vec::with_capacity(points),
                })
                .collect(),
        }
    }

    /// Appends one point: a label and one value per series, in series order.
    pub(crate) fn push<const N: usize>(&mut self, label: String, values: [u64; N]) {
        debug_assert_eq!(N, self.series.len(), "one value per series");
        self.labels.push(label);
        for (series, value) in self.series.iter_mut().zip(values) {
            series.data.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// True when every series has exactly one value per label.
    pub fn is_well_formed(&self) -> bool {
        self.series.iter().all(|s| s.data.len() == self.labels.len())
    }
}
