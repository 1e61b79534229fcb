use crate::domain::{AnalysisType, ClusterMethod, MetricType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A stop assigned to a community by one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub id: String,
    pub name: String,
    pub cluster_id: i64,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

/// Partition quality scores. The backend omits any it could not compute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatistics {
    #[serde(default)]
    pub modularity: Option<f64>,
    #[serde(default)]
    pub silhouette: Option<f64>,
    #[serde(default)]
    pub conductance: Option<f64>,
    #[serde(default)]
    pub coverage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    #[serde(default)]
    pub dataset_id: String,
    pub nodes: Vec<ClusterNode>,
    #[serde(default)]
    pub statistics: Option<ClusterStatistics>,
}

/// A stop with one centrality value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricNode {
    pub id: String,
    pub name: String,
    pub metric: f64,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    #[serde(default)]
    pub dataset_id: String,
    pub nodes: Vec<MetricNode>,
}

/// One cached sub-result, addressed by analysis family and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisKey {
    Cluster(ClusterMethod),
    Metric(MetricType),
}

impl AnalysisKey {
    /// Every key an analysis type needs, in request order.
    pub fn required_for(analysis_type: AnalysisType) -> Vec<Self> {
        match analysis_type {
            AnalysisType::Clustering => ClusterMethod::ALL.into_iter().map(Self::Cluster).collect(),
            AnalysisType::Heatmap => MetricType::ALL.into_iter().map(Self::Metric).collect(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cluster(method) => method.as_str(),
            Self::Metric(metric) => metric.as_str(),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cluster(method) => method.label(),
            Self::Metric(metric) => metric.label(),
        }
    }

    /// Name of the operation in user-facing error messages.
    pub fn operation(self) -> String {
        match self {
            Self::Cluster(method) => format!("Clustering with {}", method.label()),
            Self::Metric(metric) => format!("Computing {}", metric.label()),
        }
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated backend result tagged with the key it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Cluster(ClusterMethod, ClusterResult),
    Metric(MetricType, MetricResult),
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidResult {
    #[error("node {id} has invalid coordinates [{lon}, {lat}]")]
    Coordinates { id: String, lon: f64, lat: f64 },
    #[error("node {id} has a non-finite metric value")]
    Metric { id: String },
}

fn check_coordinates(id: &str, [lon, lat]: [f64; 2]) -> Result<(), InvalidResult> {
    let valid = lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat);

    if valid {
        Ok(())
    } else {
        Err(InvalidResult::Coordinates {
            id: id.to_string(),
            lon,
            lat,
        })
    }
}

impl ClusterResult {
    pub fn validate(&self) -> Result<(), InvalidResult> {
        self.nodes
            .iter()
            .try_for_each(|node| check_coordinates(&node.id, node.coordinates))
    }

    /// Number of distinct communities in the partition.
    pub fn cluster_count(&self) -> usize {
        let mut ids: Vec<i64> = self.nodes.iter().map(|node| node.cluster_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

impl MetricResult {
    pub fn validate(&self) -> Result<(), InvalidResult> {
        self.nodes.iter().try_for_each(|node| {
            if !node.metric.is_finite() {
                return Err(InvalidResult::Metric {
                    id: node.id.clone(),
                });
            }
            check_coordinates(&node.id, node.coordinates)
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ClusterRequest<'a> {
    pub dataset_id: &'a str,
    pub method: ClusterMethod,
}

#[derive(Debug, Serialize)]
pub struct MetricRequest<'a> {
    pub dataset_id: &'a str,
    pub metric: MetricType,
}

#[derive(Debug, Serialize)]
pub struct CreateDatasetRequest<'a> {
    pub city: &'a str,
    pub transport_type: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateDatasetResponse {
    pub dataset_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A network the backend has built for the current user or guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub dataset_id: String,
    pub city: String,
    pub transport_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetList {
    #[serde(default)]
    pub datasets: Vec<DatasetInfo>,
}

#[derive(Debug, Serialize)]
pub struct RequestCodeRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyCodeResponse {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuestTokenResponse {
    pub token: String,
}

/// Error payload of a non-2xx response. FastAPI validation errors carry a
/// list here instead of a string.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
