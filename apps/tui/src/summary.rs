// Derived figures for the result screens

use crate::api::models::{ClusterResult, ClusterStatistics, MetricNode, MetricResult};
use std::collections::BTreeMap;

pub const DEFAULT_WINDOW_SIZE: usize = 50;
pub const MIN_WINDOW_SIZE: usize = 5;
pub const MAX_WINDOW_SIZE: usize = 200;

/// Size distribution of the communities found by one clustering run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommunitySizes {
    pub communities: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Node count per cluster id, ascending by id.
pub fn cluster_counts(result: &ClusterResult) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for node in &result.nodes {
        *counts.entry(node.cluster_id).or_insert(0) += 1;
    }
    counts
}

#[allow(clippy::cast_precision_loss)]
pub fn community_sizes(result: &ClusterResult) -> Option<CommunitySizes> {
    let mut sizes: Vec<usize> = cluster_counts(result).into_values().collect();
    if sizes.is_empty() {
        return None;
    }
    sizes.sort_unstable();

    let communities = sizes.len();
    let total: usize = sizes.iter().sum();
    let mean = total as f64 / communities as f64;
    let median = if communities % 2 == 0 {
        (sizes[communities / 2 - 1] + sizes[communities / 2]) as f64 / 2.0
    } else {
        sizes[communities / 2] as f64
    };
    let variance = sizes
        .iter()
        .map(|&size| (size as f64 - mean).powi(2))
        .sum::<f64>()
        / communities as f64;

    Some(CommunitySizes {
        communities,
        min: sizes[0],
        max: sizes[communities - 1],
        mean,
        median,
        std_dev: variance.sqrt(),
    })
}

pub fn format_statistic(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_string(), |value| format!("{value:.2}"))
}

/// Label/value rows for the quality statistics the backend reported.
pub fn quality_rows(statistics: Option<&ClusterStatistics>) -> Vec<(&'static str, String)> {
    let stats = statistics.cloned().unwrap_or_default();
    vec![
        ("Modularity", format_statistic(stats.modularity)),
        ("Silhouette", format_statistic(stats.silhouette)),
        ("Conductance", format_statistic(stats.conductance)),
        ("Coverage", format_statistic(stats.coverage)),
    ]
}

/// Metric values: zero prints as `0`, tiny values in exponent form.
pub fn format_metric(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() < 0.001 {
        format!("{value:.2e}")
    } else {
        format!("{value:.4}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedNode {
    pub id: String,
    pub name: String,
    pub metric: f64,
    /// `metric / max`, in `0.0..=1.0`.
    pub norm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub nodes: usize,
    pub max: f64,
    /// Highest metric first.
    pub ranked: Vec<RankedNode>,
}

impl MetricSummary {
    pub fn from_result(result: &MetricResult) -> Self {
        let max = result
            .nodes
            .iter()
            .map(|node| node.metric)
            .fold(0.0_f64, f64::max);

        Self {
            nodes: result.nodes.len(),
            max,
            ranked: ranked_nodes(&result.nodes, max),
        }
    }
}

fn ranked_nodes(nodes: &[MetricNode], max: f64) -> Vec<RankedNode> {
    let mut ranked: Vec<RankedNode> = nodes
        .iter()
        .map(|node| RankedNode {
            id: node.id.clone(),
            name: node.name.clone(),
            metric: node.metric,
            norm: if max > 0.0 { node.metric / max } else { 0.0 },
        })
        .collect();
    ranked.sort_by(|a, b| b.metric.total_cmp(&a.metric));
    ranked
}

/// A sliding view over the ranked nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramWindow {
    pub start: usize,
    pub size: usize,
}

impl Default for HistogramWindow {
    fn default() -> Self {
        Self {
            start: 0,
            size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl HistogramWindow {
    fn max_start(self, total: usize) -> usize {
        total.saturating_sub(self.size)
    }

    const fn step(self) -> usize {
        let step = self.size / 4;
        if step == 0 {
            1
        } else {
            step
        }
    }

    pub fn shift_left(&mut self) {
        self.start = self.start.saturating_sub(self.step());
    }

    pub fn shift_right(&mut self, total: usize) {
        self.start = (self.start + self.step()).min(self.max_start(total));
    }

    /// Resizes within the allowed range, pulling `start` back so the window
    /// stays full when possible.
    pub fn resize(&mut self, size: usize, total: usize) {
        self.size = size.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE);
        self.start = self.start.min(self.max_start(total));
    }

    pub fn grow(&mut self, total: usize) {
        self.resize(self.size + MIN_WINDOW_SIZE, total);
    }

    pub fn shrink(&mut self, total: usize) {
        self.resize(self.size.saturating_sub(MIN_WINDOW_SIZE), total);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Index range into a list of `total` entries.
    pub fn bounds(self, total: usize) -> std::ops::Range<usize> {
        let start = self.start.min(total);
        let end = (start + self.size).min(total);
        start..end
    }

    pub fn slice<T>(self, items: &[T]) -> &[T] {
        &items[self.bounds(items.len())]
    }
}
