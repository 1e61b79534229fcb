use crate::api::models::{AnalysisKey, AnalysisResult, ClusterResult, MetricResult};
use crate::domain::{AnalysisType, ClusterMethod, MetricType};
use std::collections::BTreeMap;

/// Everything fetched so far for one dataset.
///
/// `clusters` and `metrics` fill independently; neither ever clears the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetAnalysis {
    pub clusters: BTreeMap<ClusterMethod, ClusterResult>,
    pub metrics: BTreeMap<MetricType, MetricResult>,
}

impl DatasetAnalysis {
    pub fn cluster(&self, method: ClusterMethod) -> Option<&ClusterResult> {
        self.clusters.get(&method)
    }

    pub fn metric(&self, metric: MetricType) -> Option<&MetricResult> {
        self.metrics.get(&metric)
    }

    pub fn contains(&self, key: AnalysisKey) -> bool {
        match key {
            AnalysisKey::Cluster(method) => self.clusters.contains_key(&method),
            AnalysisKey::Metric(metric) => self.metrics.contains_key(&metric),
        }
    }

    /// Keys `analysis_type` still needs, in request order.
    pub fn missing(&self, analysis_type: AnalysisType) -> Vec<AnalysisKey> {
        AnalysisKey::required_for(analysis_type)
            .into_iter()
            .filter(|key| !self.contains(*key))
            .collect()
    }

    pub fn is_complete(&self, analysis_type: AnalysisType) -> bool {
        self.missing(analysis_type).is_empty()
    }

    /// Top-level merge: each sub-map is extended key by key, never replaced.
    pub fn merge(&mut self, fragment: AnalysisFragment) {
        self.clusters.extend(fragment.clusters);
        self.metrics.extend(fragment.metrics);
    }
}

/// A partial update for one dataset's cache entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisFragment {
    pub clusters: BTreeMap<ClusterMethod, ClusterResult>,
    pub metrics: BTreeMap<MetricType, MetricResult>,
}

impl AnalysisFragment {
    #[must_use]
    pub fn with_cluster(mut self, method: ClusterMethod, result: ClusterResult) -> Self {
        self.clusters.insert(method, result);
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: MetricType, result: MetricResult) -> Self {
        self.metrics.insert(metric, result);
        self
    }

    pub fn insert(&mut self, result: AnalysisResult) {
        match result {
            AnalysisResult::Cluster(method, result) => {
                self.clusters.insert(method, result);
            }
            AnalysisResult::Metric(metric, result) => {
                self.metrics.insert(metric, result);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.metrics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clusters.len() + self.metrics.len()
    }

    pub fn keys(&self) -> Vec<AnalysisKey> {
        self.clusters
            .keys()
            .copied()
            .map(AnalysisKey::Cluster)
            .chain(self.metrics.keys().copied().map(AnalysisKey::Metric))
            .collect()
    }
}

impl From<AnalysisResult> for AnalysisFragment {
    fn from(result: AnalysisResult) -> Self {
        let mut fragment = Self::default();
        fragment.insert(result);
        fragment
    }
}
