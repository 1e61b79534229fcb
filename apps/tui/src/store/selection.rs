use crate::domain::{AnalysisType, ClusterMethod, MetricType};

/// The user's current choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub city: String,
    pub transport: String,
    pub analysis_type: Option<AnalysisType>,
    /// Assigned once a dataset has been created or picked.
    pub dataset_id: Option<String>,
    pub cluster_method: ClusterMethod,
    pub metric_type: MetricType,
}

/// Fields to merge into a [`Selection`] in one step. `None` leaves a field
/// untouched; the nested options of `analysis_type` and `dataset_id` can
/// also clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPatch {
    pub city: Option<String>,
    pub transport: Option<String>,
    pub analysis_type: Option<Option<AnalysisType>>,
    pub dataset_id: Option<Option<String>>,
    pub cluster_method: Option<ClusterMethod>,
    pub metric_type: Option<MetricType>,
}

impl SelectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    #[must_use]
    pub const fn analysis_type(mut self, analysis_type: AnalysisType) -> Self {
        self.analysis_type = Some(Some(analysis_type));
        self
    }

    #[must_use]
    pub const fn clear_analysis_type(mut self) -> Self {
        self.analysis_type = Some(None);
        self
    }

    #[must_use]
    pub fn dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(Some(dataset_id.into()));
        self
    }

    #[must_use]
    pub fn clear_dataset_id(mut self) -> Self {
        self.dataset_id = Some(None);
        self
    }

    #[must_use]
    pub const fn cluster_method(mut self, method: ClusterMethod) -> Self {
        self.cluster_method = Some(method);
        self
    }

    #[must_use]
    pub const fn metric_type(mut self, metric: MetricType) -> Self {
        self.metric_type = Some(metric);
        self
    }

    /// Whether applying this patch changes the identifying city/transport pair.
    pub fn changes_identity(&self, current: &Selection) -> bool {
        let city_changed = self
            .city
            .as_ref()
            .is_some_and(|city| *city != current.city);
        let transport_changed = self
            .transport
            .as_ref()
            .is_some_and(|transport| *transport != current.transport);

        city_changed || transport_changed
    }

    pub(crate) fn apply(self, selection: &mut Selection) {
        if let Some(city) = self.city {
            selection.city = city;
        }
        if let Some(transport) = self.transport {
            selection.transport = transport;
        }
        if let Some(analysis_type) = self.analysis_type {
            selection.analysis_type = analysis_type;
        }
        if let Some(dataset_id) = self.dataset_id {
            selection.dataset_id = dataset_id;
        }
        if let Some(method) = self.cluster_method {
            selection.cluster_method = method;
        }
        if let Some(metric) = self.metric_type {
            selection.metric_type = metric;
        }
    }
}
