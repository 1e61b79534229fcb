use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user wants to look at for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Clustering,
    Heatmap,
}

impl AnalysisType {
    pub const ALL: [Self; 2] = [Self::Clustering, Self::Heatmap];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clustering => "clustering",
            Self::Heatmap => "heatmap",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Clustering),
            1 => Some(Self::Heatmap),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Clustering => 0,
            Self::Heatmap => 1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "clustering" | "clusters" => Some(Self::Clustering),
            "heatmap" | "metrics" => Some(Self::Heatmap),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Clustering => "Clustering (Leiden, Louvain)",
            Self::Heatmap => "Heatmap (PageRank, Betweenness)",
        }
    }
}

/// Community detection algorithms offered by the backend.
///
/// Declaration order is the order results are requested in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    #[default]
    Leiden,
    Louvain,
}

impl ClusterMethod {
    pub const ALL: [Self; 2] = [Self::Leiden, Self::Louvain];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Leiden => "leiden",
            Self::Louvain => "louvain",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Leiden),
            1 => Some(Self::Louvain),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Leiden => 0,
            Self::Louvain => 1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "leiden" => Some(Self::Leiden),
            "louvain" => Some(Self::Louvain),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Leiden => "Leiden",
            Self::Louvain => "Louvain",
        }
    }
}

/// Node centrality measures offered by the backend.
///
/// Declaration order is the order results are requested in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    #[default]
    PageRank,
    Betweenness,
}

impl MetricType {
    pub const ALL: [Self; 2] = [Self::PageRank, Self::Betweenness];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageRank => "pagerank",
            Self::Betweenness => "betweenness",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::PageRank),
            1 => Some(Self::Betweenness),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::PageRank => 0,
            Self::Betweenness => 1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pagerank" => Some(Self::PageRank),
            "betweenness" => Some(Self::Betweenness),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PageRank => "PageRank",
            Self::Betweenness => "Betweenness",
        }
    }
}

/// Transport networks the backend knows how to build a graph for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Bus,
    Tram,
    Trolleybus,
    Minibus,
}

impl TransportType {
    pub const ALL: [Self; 4] = [Self::Bus, Self::Tram, Self::Trolleybus, Self::Minibus];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Tram => "tram",
            Self::Trolleybus => "trolleybus",
            Self::Minibus => "minibus",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Bus),
            1 => Some(Self::Tram),
            2 => Some(Self::Trolleybus),
            3 => Some(Self::Minibus),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bus" => Some(Self::Bus),
            "tram" => Some(Self::Tram),
            "trolleybus" | "trolley" => Some(Self::Trolleybus),
            "minibus" => Some(Self::Minibus),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bus => "Bus",
            Self::Tram => "Tram",
            Self::Trolleybus => "Trolleybus",
            Self::Minibus => "Minibus",
        }
    }

    /// Display label for a raw transport string coming from the backend.
    pub fn label_for(value: &str) -> String {
        Self::parse(value).map_or_else(|| value.to_string(), |t| t.label().to_string())
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cities offered by the picker. Anything else can still be typed in.
pub const KNOWN_CITIES: &[&str] = &[
    "Moscow",
    "Saint Petersburg",
    "Novosibirsk",
    "Yekaterinburg",
    "Kazan",
    "Nizhny Novgorod",
    "Chelyabinsk",
    "Samara",
    "Omsk",
    "Rostov-on-Don",
    "Ufa",
    "Krasnoyarsk",
    "Voronezh",
    "Perm",
    "Volgograd",
    "Krasnodar",
    "Saratov",
    "Tyumen",
    "Izhevsk",
    "Irkutsk",
    "Vladivostok",
    "Yaroslavl",
    "Tomsk",
    "Kaliningrad",
];
