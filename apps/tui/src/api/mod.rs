// Client side of the analysis service HTTP contract

pub mod client;
pub mod error;
pub mod models;

pub use client::{AnalysisBackend, DatasetBackend, HttpBackend};
pub use error::ApiError;
pub use models::{
    AnalysisKey, AnalysisResult, ClusterNode, ClusterResult, ClusterStatistics, DatasetInfo,
    MetricNode, MetricResult,
};
