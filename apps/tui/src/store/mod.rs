//! Selection state and the per-dataset analysis cache.
//!
//! [`SelectionStore`] is the single owner of both. The application root holds
//! it and every mutation goes through its methods, so the invalidation rules
//! live in one place:
//!
//! - changing the city or transport through [`SelectionStore::set_all`]
//!   drops the entry of the dataset that was current before the change;
//! - [`SelectionStore::reset_analysis_data`] drops the current entry and
//!   restores the default cluster/metric preferences;
//! - entries of other datasets are never touched by either.
//!
//! Background fetches are tied to a [`FetchTicket`]. Dropping an entry or
//! starting a newer fetch for the same dataset and analysis family makes
//! older tickets stale, and their results are discarded instead of merged.

mod cache;
mod selection;

pub use cache::{AnalysisFragment, DatasetAnalysis};
pub use selection::{Selection, SelectionPatch};

use crate::api::models::{AnalysisKey, ClusterResult, MetricResult};
use crate::domain::{AnalysisType, ClusterMethod, MetricType};
use std::collections::HashMap;
use tracing::debug;

/// Identifies one fetch batch for a dataset and analysis family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub dataset_id: String,
    pub family: AnalysisType,
    generation: u64,
}

impl FetchTicket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// The sub-results still missing for a dataset, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub ticket: FetchTicket,
    pub pending: Vec<AnalysisKey>,
}

impl FetchPlan {
    pub fn dataset_id(&self) -> &str {
        &self.ticket.dataset_id
    }

    pub const fn analysis_type(&self) -> AnalysisType {
        self.ticket.family
    }
}

#[derive(Debug, Default)]
pub struct SelectionStore {
    selection: Selection,
    cache: HashMap<String, DatasetAnalysis>,
    generations: HashMap<(String, AnalysisType), u64>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn city(&self) -> &str {
        &self.selection.city
    }

    pub fn transport(&self) -> &str {
        &self.selection.transport
    }

    pub const fn analysis_type(&self) -> Option<AnalysisType> {
        self.selection.analysis_type
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.selection.dataset_id.as_deref()
    }

    pub const fn cluster_method(&self) -> ClusterMethod {
        self.selection.cluster_method
    }

    pub const fn metric_type(&self) -> MetricType {
        self.selection.metric_type
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.selection.city = city.into();
    }

    pub fn set_transport(&mut self, transport: impl Into<String>) {
        self.selection.transport = transport.into();
    }

    pub fn set_analysis_type(&mut self, analysis_type: Option<AnalysisType>) {
        self.selection.analysis_type = analysis_type;
    }

    pub fn set_dataset_id(&mut self, dataset_id: Option<String>) {
        self.selection.dataset_id = dataset_id;
    }

    pub fn set_cluster_method(&mut self, method: ClusterMethod) {
        self.selection.cluster_method = method;
    }

    pub fn set_metric_type(&mut self, metric: MetricType) {
        self.selection.metric_type = metric;
    }

    /// Merges several fields at once.
    ///
    /// When the patch changes the city or the transport, the entry of the
    /// dataset that was current before the merge is dropped in the same step.
    pub fn set_all(&mut self, patch: SelectionPatch) {
        if patch.changes_identity(&self.selection) {
            if let Some(dataset_id) = self.selection.dataset_id.clone() {
                self.invalidate(&dataset_id);
            }
        }
        patch.apply(&mut self.selection);
    }

    /// Merges `fragment` into the entry for `dataset_id`, creating it if needed.
    pub fn set_analysis_data(&mut self, dataset_id: &str, fragment: AnalysisFragment) {
        debug!(dataset_id, keys = ?fragment.keys(), "caching analysis results");
        self.cache
            .entry(dataset_id.to_string())
            .or_default()
            .merge(fragment);
    }

    pub fn analysis_data(&self, dataset_id: &str) -> Option<&DatasetAnalysis> {
        self.cache.get(dataset_id)
    }

    /// Drops the current dataset's entry and restores default preferences.
    pub fn reset_analysis_data(&mut self) {
        if let Some(dataset_id) = self.selection.dataset_id.clone() {
            self.invalidate(&dataset_id);
        }
        self.selection.cluster_method = ClusterMethod::default();
        self.selection.metric_type = MetricType::default();
    }

    /// Explicit "start over": drops the current entry and every selected field.
    pub fn clear_selection(&mut self) {
        self.reset_analysis_data();
        self.selection = Selection::default();
    }

    /// Forgets a dataset that no longer exists on the backend.
    pub fn discard_dataset(&mut self, dataset_id: &str) {
        self.invalidate(dataset_id);
        if self.selection.dataset_id.as_deref() == Some(dataset_id) {
            self.selection.dataset_id = None;
            self.selection.analysis_type = None;
        }
    }

    pub fn current_analysis(&self) -> Option<&DatasetAnalysis> {
        self.dataset_id().and_then(|id| self.cache.get(id))
    }

    /// Result for the current dataset and preferred cluster method.
    pub fn current_cluster(&self) -> Option<&ClusterResult> {
        self.current_analysis()?.cluster(self.cluster_method())
    }

    /// Result for the current dataset and preferred metric.
    pub fn current_metric(&self) -> Option<&MetricResult> {
        self.current_analysis()?.metric(self.metric_type())
    }

    /// Keys `analysis_type` still needs for `dataset_id`, in request order.
    pub fn missing(&self, dataset_id: &str, analysis_type: AnalysisType) -> Vec<AnalysisKey> {
        self.cache.get(dataset_id).map_or_else(
            || AnalysisKey::required_for(analysis_type),
            |entry| entry.missing(analysis_type),
        )
    }

    pub fn missing_clusters(&self, dataset_id: &str) -> Vec<ClusterMethod> {
        self.missing(dataset_id, AnalysisType::Clustering)
            .into_iter()
            .filter_map(|key| match key {
                AnalysisKey::Cluster(method) => Some(method),
                AnalysisKey::Metric(_) => None,
            })
            .collect()
    }

    pub fn missing_metrics(&self, dataset_id: &str) -> Vec<MetricType> {
        self.missing(dataset_id, AnalysisType::Heatmap)
            .into_iter()
            .filter_map(|key| match key {
                AnalysisKey::Metric(metric) => Some(metric),
                AnalysisKey::Cluster(_) => None,
            })
            .collect()
    }

    pub fn cached_dataset_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Starts a fetch for `dataset_id`, superseding any earlier ticket for
    /// the same analysis family.
    pub fn begin_fetch(&mut self, dataset_id: &str, family: AnalysisType) -> FetchTicket {
        let generation = self
            .generations
            .entry((dataset_id.to_string(), family))
            .or_insert(0);
        *generation += 1;

        FetchTicket {
            dataset_id: dataset_id.to_string(),
            family,
            generation: *generation,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.generations
            .get(&(ticket.dataset_id.clone(), ticket.family))
            .is_some_and(|generation| *generation == ticket.generation)
    }

    /// Plans the requests needed to show `analysis_type` for `dataset_id`.
    /// Returns `None` when everything is already cached.
    pub fn plan_fetch(&mut self, dataset_id: &str, analysis_type: AnalysisType) -> Option<FetchPlan> {
        let pending = self.missing(dataset_id, analysis_type);
        if pending.is_empty() {
            debug!(dataset_id, %analysis_type, "analysis fully cached");
            return None;
        }

        let ticket = self.begin_fetch(dataset_id, analysis_type);
        Some(FetchPlan { ticket, pending })
    }

    fn invalidate(&mut self, dataset_id: &str) {
        if self.cache.remove(dataset_id).is_some() {
            debug!(dataset_id, "dropped cached analysis");
        }
        for family in AnalysisType::ALL {
            *self
                .generations
                .entry((dataset_id.to_string(), family))
                .or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ClusterNode, MetricNode};
    use proptest::prelude::*;

    fn cluster(dataset_id: &str, cluster_id: i64) -> ClusterResult {
        ClusterResult {
            dataset_id: dataset_id.to_string(),
            nodes: vec![ClusterNode {
                id: "1".to_string(),
                name: "Central".to_string(),
                cluster_id,
                coordinates: [37.62, 55.75],
            }],
            statistics: None,
        }
    }

    fn metric(dataset_id: &str, value: f64) -> MetricResult {
        MetricResult {
            dataset_id: dataset_id.to_string(),
            nodes: vec![MetricNode {
                id: "1".to_string(),
                name: "Central".to_string(),
                metric: value,
                coordinates: [37.62, 55.75],
            }],
        }
    }

    fn store_with_dataset(id: &str) -> SelectionStore {
        let mut store = SelectionStore::new();
        store.set_all(
            SelectionPatch::new()
                .city("Moscow")
                .transport("bus")
                .dataset_id(id),
        );
        store.set_analysis_data(
            id,
            AnalysisFragment::default().with_cluster(ClusterMethod::Leiden, cluster(id, 0)),
        );
        store
    }

    #[test]
    fn fragments_merge_instead_of_overwriting() {
        let mut store = SelectionStore::new();
        let x = cluster("d1", 3);
        let y = metric("d1", 0.25);

        store.set_analysis_data(
            "d1",
            AnalysisFragment::default().with_cluster(ClusterMethod::Leiden, x.clone()),
        );
        store.set_analysis_data(
            "d1",
            AnalysisFragment::default().with_metric(MetricType::PageRank, y.clone()),
        );

        let entry = store.analysis_data("d1").unwrap();
        assert_eq!(entry.cluster(ClusterMethod::Leiden), Some(&x));
        assert_eq!(entry.metric(MetricType::PageRank), Some(&y));
    }

    #[test]
    fn sub_map_is_extended_not_replaced() {
        let mut store = store_with_dataset("d1");
        store.set_analysis_data(
            "d1",
            AnalysisFragment::default().with_cluster(ClusterMethod::Louvain, cluster("d1", 1)),
        );

        let entry = store.analysis_data("d1").unwrap();
        assert!(entry.is_complete(AnalysisType::Clustering));
    }

    #[test]
    fn missing_entry_reads_as_absent() {
        let store = SelectionStore::new();
        assert!(store.analysis_data("nope").is_none());
        assert!(store.current_cluster().is_none());
        assert_eq!(
            store.missing("nope", AnalysisType::Clustering),
            AnalysisKey::required_for(AnalysisType::Clustering)
        );
    }

    #[test]
    fn changing_city_drops_current_entry_only() {
        let mut store = store_with_dataset("d1");
        store.set_analysis_data(
            "d0",
            AnalysisFragment::default().with_metric(MetricType::PageRank, metric("d0", 1.0)),
        );

        store.set_all(SelectionPatch::new().city("Kazan"));

        assert!(store.analysis_data("d1").is_none());
        assert!(store.analysis_data("d0").is_some());
        assert_eq!(store.city(), "Kazan");
    }

    #[test]
    fn same_city_and_transport_keep_entry() {
        let mut store = store_with_dataset("d1");
        store.set_all(
            SelectionPatch::new()
                .city("Moscow")
                .transport("bus")
                .analysis_type(AnalysisType::Heatmap),
        );

        assert!(store.analysis_data("d1").is_some());
        assert_eq!(store.analysis_type(), Some(AnalysisType::Heatmap));
    }

    #[test]
    fn invalidation_uses_dataset_before_merge() {
        let mut store = store_with_dataset("d1");
        store.set_analysis_data(
            "d2",
            AnalysisFragment::default().with_cluster(ClusterMethod::Leiden, cluster("d2", 0)),
        );

        store.set_all(
            SelectionPatch::new()
                .city("Kazan")
                .transport("tram")
                .dataset_id("d2"),
        );

        assert!(store.analysis_data("d1").is_none());
        assert!(store.analysis_data("d2").is_some());
        assert_eq!(store.dataset_id(), Some("d2"));
    }

    #[test]
    fn single_field_setters_do_not_invalidate() {
        let mut store = store_with_dataset("d1");
        store.set_city("Omsk");
        store.set_transport("tram");

        assert!(store.analysis_data("d1").is_some());
    }

    #[test]
    fn reset_clears_entry_and_preferences() {
        let mut store = store_with_dataset("d1");
        store.set_cluster_method(ClusterMethod::Louvain);
        store.set_metric_type(MetricType::Betweenness);

        store.reset_analysis_data();

        assert!(store.analysis_data("d1").is_none());
        assert_eq!(store.cluster_method(), ClusterMethod::Leiden);
        assert_eq!(store.metric_type(), MetricType::PageRank);
        assert_eq!(store.dataset_id(), Some("d1"));
    }

    #[test]
    fn clear_selection_forgets_everything_selected() {
        let mut store = store_with_dataset("d1");
        store.clear_selection();

        assert_eq!(store.selection(), &Selection::default());
        assert!(store.cached_dataset_ids().is_empty());
    }

    #[test]
    fn current_cluster_follows_preference() {
        let mut store = store_with_dataset("d1");
        assert_eq!(store.current_cluster().unwrap().nodes[0].cluster_id, 0);

        store.set_cluster_method(ClusterMethod::Louvain);
        assert!(store.current_cluster().is_none());
    }

    #[test]
    fn plan_is_empty_when_fully_cached() {
        let mut store = store_with_dataset("d1");
        store.set_analysis_data(
            "d1",
            AnalysisFragment::default().with_cluster(ClusterMethod::Louvain, cluster("d1", 1)),
        );

        assert!(store.plan_fetch("d1", AnalysisType::Clustering).is_none());
    }

    #[test]
    fn plan_lists_only_missing_keys() {
        let mut store = store_with_dataset("d1");
        let plan = store.plan_fetch("d1", AnalysisType::Clustering).unwrap();

        assert_eq!(plan.pending, vec![AnalysisKey::Cluster(ClusterMethod::Louvain)]);
        assert_eq!(plan.dataset_id(), "d1");
        assert!(store.is_current(&plan.ticket));
    }

    #[test]
    fn missing_helpers_keep_declaration_order() {
        let store = store_with_dataset("d1");

        assert_eq!(store.missing_clusters("d1"), vec![ClusterMethod::Louvain]);
        assert_eq!(
            store.missing_metrics("d1"),
            vec![MetricType::PageRank, MetricType::Betweenness]
        );
        assert_eq!(
            store.missing_clusters("unknown"),
            vec![ClusterMethod::Leiden, ClusterMethod::Louvain]
        );
    }

    #[test]
    fn newer_fetch_supersedes_older_ticket() {
        let mut store = SelectionStore::new();
        let first = store.begin_fetch("d1", AnalysisType::Heatmap);
        let other_family = store.begin_fetch("d1", AnalysisType::Clustering);
        let second = store.begin_fetch("d1", AnalysisType::Heatmap);

        assert!(!store.is_current(&first));
        assert!(store.is_current(&second));
        assert!(store.is_current(&other_family));
    }

    #[test]
    fn invalidation_makes_tickets_stale() {
        let mut store = store_with_dataset("d1");
        let ticket = store.begin_fetch("d1", AnalysisType::Clustering);

        store.set_all(SelectionPatch::new().transport("tram"));

        assert!(!store.is_current(&ticket));
    }

    #[test]
    fn discard_dataset_clears_matching_selection() {
        let mut store = store_with_dataset("d1");
        store.set_analysis_type(Some(AnalysisType::Clustering));

        store.discard_dataset("d1");

        assert!(store.analysis_data("d1").is_none());
        assert_eq!(store.dataset_id(), None);
        assert_eq!(store.analysis_type(), None);
        assert_eq!(store.city(), "Moscow");
    }

    #[derive(Debug, Clone)]
    enum Step {
        Patch {
            city: Option<String>,
            transport: Option<String>,
            dataset: Option<String>,
        },
        Cache(String),
    }

    fn step() -> impl Strategy<Value = Step> {
        let city = proptest::option::of(prop_oneof![Just("Moscow"), Just("Kazan"), Just("Omsk")]);
        let transport = proptest::option::of(prop_oneof![Just("bus"), Just("tram")]);
        let dataset = proptest::option::of(prop_oneof![Just("d0"), Just("d1"), Just("d2")]);
        let cached = prop_oneof![Just("d0"), Just("d1"), Just("d2")];

        prop_oneof![
            (city, transport, dataset).prop_map(|(city, transport, dataset)| Step::Patch {
                city: city.map(str::to_string),
                transport: transport.map(str::to_string),
                dataset: dataset.map(str::to_string),
            }),
            cached.prop_map(|id| Step::Cache(id.to_string())),
        ]
    }

    proptest! {
        #[test]
        fn identity_change_always_drops_previous_entry(steps in proptest::collection::vec(step(), 1..40)) {
            let mut store = SelectionStore::new();

            for step in steps {
                match step {
                    Step::Cache(id) => {
                        store.set_analysis_data(
                            &id,
                            AnalysisFragment::default().with_metric(MetricType::PageRank, metric(&id, 0.5)),
                        );
                    }
                    Step::Patch { city, transport, dataset } => {
                        let mut patch = SelectionPatch::new();
                        patch.city = city;
                        patch.transport = transport;
                        if let Some(id) = dataset {
                            patch = patch.dataset_id(id);
                        }

                        let before = store.dataset_id().map(str::to_string);
                        let untouched: Vec<String> = store
                            .cached_dataset_ids()
                            .into_iter()
                            .filter(|id| Some(*id) != before.as_deref())
                            .map(str::to_string)
                            .collect();
                        let changes = patch.changes_identity(store.selection());

                        store.set_all(patch);

                        if let (true, Some(previous)) = (changes, before) {
                            prop_assert!(store.analysis_data(&previous).is_none());
                        }
                        for id in untouched {
                            prop_assert!(store.analysis_data(&id).is_some());
                        }
                    }
                }
            }
        }
    }
}
