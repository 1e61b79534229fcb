use crate::api::{AnalysisKey, DatasetInfo};
use crate::app::actions::AppActions;
use crate::app::fetch::{apply_batch, selected_target, BatchOutcome, FetchBatch, FetchError};
use crate::domain::{AnalysisType, ClusterMethod, MetricType, TransportType, KNOWN_CITIES};
use crate::store::{FetchTicket, SelectionPatch, SelectionStore};
use crate::summary::HistogramWindow;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Parameters,
    Datasets,
    AnalysisType,
    Clustering,
    Metrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsField {
    City,
    Transport,
}

/// The city/transport picker.
#[derive(Debug, Clone)]
pub struct ParamsForm {
    pub field: ParamsField,
    pub city_query: String,
    /// Index into [`ParamsForm::matching_cities`].
    pub city_index: usize,
    pub transport_index: usize,
}

impl Default for ParamsForm {
    fn default() -> Self {
        Self {
            field: ParamsField::City,
            city_query: String::new(),
            city_index: 0,
            transport_index: 0,
        }
    }
}

impl ParamsForm {
    /// Known cities ranked by fuzzy score against the query.
    pub fn matching_cities(&self) -> Vec<&'static str> {
        let query = self.city_query.trim();
        if query.is_empty() {
            return KNOWN_CITIES.to_vec();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &'static str)> = KNOWN_CITIES
            .iter()
            .filter_map(|city| matcher.fuzzy_match(city, query).map(|score| (score, *city)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, city)| city).collect()
    }

    /// The highlighted match, or the typed text when nothing matches.
    pub fn selected_city(&self) -> Option<String> {
        let matches = self.matching_cities();
        if let Some(city) = matches.get(self.city_index).or_else(|| matches.first()) {
            return Some((*city).to_string());
        }
        let typed = self.city_query.trim();
        (!typed.is_empty()).then(|| typed.to_string())
    }

    pub fn selected_transport(&self) -> TransportType {
        TransportType::from_index(self.transport_index).unwrap_or(TransportType::Bus)
    }

    pub fn is_valid(&self) -> bool {
        self.selected_city().is_some_and(|city| !city.trim().is_empty())
    }

    pub fn push_char(&mut self, ch: char) {
        self.city_query.push(ch);
        self.city_index = 0;
    }

    pub fn pop_char(&mut self) {
        self.city_query.pop();
        self.city_index = 0;
    }

    /// Pre-fills the form from an existing selection.
    pub fn load(&mut self, city: &str, transport: &str) {
        self.city_query = city.to_string();
        self.city_index = 0;
        self.transport_index = TransportType::parse(transport)
            .and_then(|t| TransportType::ALL.iter().position(|other| *other == t))
            .unwrap_or(0);
    }
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub store: SelectionStore,
    pub actions: AppActions,
    pub params: ParamsForm,
    pub datasets: Vec<DatasetInfo>,
    pub selected_dataset_index: usize,
    pub confirm_delete: bool,
    pub analysis_type_index: usize,
    pub cluster_row_index: usize,
    pub histogram: HistogramWindow,
    pub status_message: String,
    pub error_popup: Option<String>,
    pub show_help: bool,
    pub throbber: ThrobberState,
    in_flight: Option<FetchTicket>,
    fetch_tx: UnboundedSender<FetchBatch>,
    fetch_rx: UnboundedReceiver<FetchBatch>,
}

impl App {
    pub fn new(actions: AppActions) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            screen: AppScreen::Parameters,
            store: SelectionStore::new(),
            actions,
            params: ParamsForm::default(),
            datasets: Vec::new(),
            selected_dataset_index: 0,
            confirm_delete: false,
            analysis_type_index: 0,
            cluster_row_index: 0,
            histogram: HistogramWindow::default(),
            status_message: String::new(),
            error_popup: None,
            show_help: false,
            throbber: ThrobberState::default(),
            in_flight: None,
            fetch_tx,
            fetch_rx,
        }
    }

    /// Opens a session if needed and loads the dataset list.
    pub async fn initialize(&mut self) {
        match self.actions.ensure_session().await {
            Ok(kind) => {
                self.status_message = format!("Signed in as {}", kind.label());
                self.refresh_datasets().await;
            }
            Err(err) => {
                self.error_popup = Some(format!("Could not start a session: {err}"));
            }
        }
    }

    pub fn update(&mut self) {
        if self.is_loading() {
            self.throbber.calc_next();
        }
    }

    pub const fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// What the spinner is waiting on.
    pub fn loading_label(&self) -> Option<String> {
        let ticket = self.in_flight.as_ref()?;
        let pending = self.store.missing(&ticket.dataset_id, ticket.family);
        let label = pending
            .first()
            .copied()
            .map_or_else(|| "Finishing".to_string(), AnalysisKey::operation);
        Some(format!("{label}..."))
    }

    /// Applies every batch that has arrived since the last frame.
    pub fn poll_fetches(&mut self) {
        while let Ok(batch) = self.fetch_rx.try_recv() {
            self.handle_batch(batch);
        }
    }

    pub fn handle_batch(&mut self, batch: FetchBatch) {
        let latest = self.in_flight.as_ref() == Some(&batch.ticket);
        if latest {
            self.in_flight = None;
        }

        match apply_batch(&mut self.store, batch) {
            BatchOutcome::Complete {
                dataset_id,
                analysis_type,
                fetched,
            } => {
                self.status_message = format!("Loaded {fetched} result(s)");
                let still_selected = self.store.dataset_id() == Some(dataset_id.as_str())
                    && self.store.analysis_type() == Some(analysis_type);
                if latest && still_selected {
                    self.show_results(analysis_type);
                }
            }
            BatchOutcome::Failed { key, error, .. } => {
                if latest {
                    let error = FetchError::Request { key, source: error };
                    self.error_popup = Some(error.user_message());
                }
            }
            BatchOutcome::Stale { dataset_id } => {
                debug!(%dataset_id, "ignored superseded batch");
                if latest {
                    self.status_message = "Selection changed; results discarded".to_string();
                }
            }
        }
    }

    /// Shows the selected analysis, fetching whatever is missing first.
    pub fn start_analysis(&mut self) {
        let (dataset_id, analysis_type) = match selected_target(&self.store) {
            Ok(target) => target,
            Err(err) => {
                self.error_popup = Some(err.user_message());
                return;
            }
        };

        match self.store.plan_fetch(&dataset_id, analysis_type) {
            None => self.show_results(analysis_type),
            Some(plan) => {
                info!(%dataset_id, %analysis_type, pending = plan.pending.len(), "starting analysis");
                self.in_flight = Some(plan.ticket.clone());
                self.status_message = format!("Running {}", analysis_type.label());
                self.actions.spawn_fetch(plan, self.fetch_tx.clone());
            }
        }
    }

    pub fn choose_analysis_type(&mut self) {
        let analysis_type =
            AnalysisType::from_index(self.analysis_type_index).unwrap_or(AnalysisType::Clustering);
        self.store.set_analysis_type(Some(analysis_type));
        self.start_analysis();
    }

    fn show_results(&mut self, analysis_type: AnalysisType) {
        self.cluster_row_index = 0;
        self.histogram.reset();
        self.screen = match analysis_type {
            AnalysisType::Clustering => AppScreen::Clustering,
            AnalysisType::Heatmap => AppScreen::Metrics,
        };
    }

    /// Registers a dataset for the chosen city and transport.
    pub async fn submit_parameters(&mut self) {
        if !self.params.is_valid() {
            self.status_message = "Pick a city and a transport type".to_string();
            return;
        }
        let Some(city) = self.params.selected_city() else {
            return;
        };
        let transport = self.params.selected_transport();

        self.store.set_all(
            SelectionPatch::new()
                .city(city.clone())
                .transport(transport.as_str())
                .clear_dataset_id()
                .clear_analysis_type(),
        );
        self.store.reset_analysis_data();

        match self.actions.create_dataset(&city, transport.as_str()).await {
            Ok(created) => {
                self.status_message = format!("Dataset created for {city}");
                self.refresh_datasets().await;
                if let Some(index) = self
                    .datasets
                    .iter()
                    .position(|d| d.dataset_id == created.dataset_id)
                {
                    self.selected_dataset_index = index;
                }
                self.screen = AppScreen::Datasets;
            }
            Err(err) => {
                self.error_popup = Some(err.user_message("Creating the dataset"));
            }
        }
    }

    pub async fn refresh_datasets(&mut self) {
        match self.actions.list_datasets().await {
            Ok(datasets) => {
                self.datasets = datasets;
                if self.selected_dataset_index >= self.datasets.len() {
                    self.selected_dataset_index = self.datasets.len().saturating_sub(1);
                }
            }
            Err(err) => {
                self.error_popup = Some(err.user_message("Loading datasets"));
            }
        }
    }

    pub fn selected_dataset(&self) -> Option<&DatasetInfo> {
        self.datasets.get(self.selected_dataset_index)
    }

    /// Makes the highlighted dataset current and moves on to analysis choice.
    pub fn select_dataset(&mut self) {
        let Some(dataset) = self.selected_dataset().cloned() else {
            return;
        };

        self.store.set_all(
            SelectionPatch::new()
                .city(dataset.city.clone())
                .transport(dataset.transport_type.clone())
                .clear_analysis_type()
                .dataset_id(dataset.dataset_id.clone()),
        );
        self.params.load(&dataset.city, &dataset.transport_type);
        self.analysis_type_index = 0;
        self.confirm_delete = false;
        self.screen = AppScreen::AnalysisType;
    }

    pub async fn delete_selected_dataset(&mut self) {
        self.confirm_delete = false;
        let Some(dataset) = self.selected_dataset().cloned() else {
            return;
        };

        match self.actions.delete_dataset(&dataset.dataset_id).await {
            Ok(()) => {
                self.store.discard_dataset(&dataset.dataset_id);
                self.datasets.retain(|d| d.dataset_id != dataset.dataset_id);
                if self.selected_dataset_index >= self.datasets.len() {
                    self.selected_dataset_index = self.datasets.len().saturating_sub(1);
                }
                self.status_message = format!("Deleted dataset for {}", dataset.city);
            }
            Err(err) => {
                self.error_popup = Some(err.user_message("Deleting the dataset"));
            }
        }
    }

    pub fn toggle_cluster_method(&mut self) {
        let next = ClusterMethod::from_index(
            (self.store.cluster_method().index() + 1) % ClusterMethod::ALL.len(),
        )
        .unwrap_or_default();
        self.store.set_cluster_method(next);
        self.cluster_row_index = 0;
    }

    pub fn toggle_metric_type(&mut self) {
        let next =
            MetricType::from_index((self.store.metric_type().index() + 1) % MetricType::ALL.len())
                .unwrap_or_default();
        self.store.set_metric_type(next);
        self.histogram.reset();
    }

    pub fn metric_node_count(&self) -> usize {
        self.store
            .current_metric()
            .map_or(0, |result| result.nodes.len())
    }

    pub fn go_back(&mut self) {
        self.confirm_delete = false;
        self.screen = match self.screen {
            AppScreen::Parameters | AppScreen::Datasets => AppScreen::Parameters,
            AppScreen::AnalysisType => AppScreen::Datasets,
            AppScreen::Clustering | AppScreen::Metrics => AppScreen::AnalysisType,
        };
    }

    /// Forgets the selection and the current dataset's cached results.
    pub fn start_over(&mut self) {
        self.store.clear_selection();
        self.params = ParamsForm::default();
        self.in_flight = None;
        self.screen = AppScreen::Parameters;
        self.status_message = "Selection cleared".to_string();
    }

    pub fn dismiss_error(&mut self) {
        self.error_popup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn app_for(server: &ServerGuard) -> App {
        let config = AppConfig {
            api_url: server.url(),
            token_path: std::env::temp_dir().join(format!(
                "transit-analysis-test-{}.json",
                std::process::id()
            )),
            ..AppConfig::default()
        };
        App::new(AppActions::from_config(&config).unwrap())
    }

    fn datasets_body() -> String {
        json!({
            "datasets": [
                {"dataset_id": "d1", "city": "Kazan", "transport_type": "tram"},
                {"dataset_id": "d2", "city": "Omsk", "transport_type": "bus"}
            ]
        })
        .to_string()
    }

    fn cluster_body(dataset_id: &str) -> String {
        json!({
            "dataset_id": dataset_id,
            "nodes": [
                {"id": "1", "name": "Central", "cluster_id": 0, "coordinates": [49.1, 55.8]}
            ]
        })
        .to_string()
    }

    #[test]
    fn fuzzy_city_filter_ranks_matches() {
        let mut form = ParamsForm::default();
        for ch in "kzn".chars() {
            form.push_char(ch);
        }

        assert_eq!(form.matching_cities().first(), Some(&"Kazan"));
        assert_eq!(form.selected_city().as_deref(), Some("Kazan"));
    }

    #[test]
    fn unknown_city_can_be_typed() {
        let mut form = ParamsForm::default();
        assert!(form.is_valid());
        form.city_query = "Qqqxx".to_string();

        assert!(form.matching_cities().is_empty());
        assert_eq!(form.selected_city().as_deref(), Some("Qqqxx"));
    }

    #[test]
    fn load_prefills_transport() {
        let mut form = ParamsForm::default();
        form.load("Omsk", "trolleybus");
        assert_eq!(form.selected_transport(), TransportType::Trolleybus);
        assert_eq!(form.selected_city().as_deref(), Some("Omsk"));
    }

    #[tokio::test]
    async fn duplicate_dataset_shows_distinct_message() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/v1/datasets/")
            .match_body(Matcher::Json(json!({"city": "Kazan", "transport_type": "bus"})))
            .with_status(409)
            .with_body(r#"{"detail":"Dataset already exists"}"#)
            .create_async()
            .await;
        let mut app = app_for(&server);
        app.params.city_query = "Kazan".to_string();

        app.submit_parameters().await;

        let message = app.error_popup.unwrap();
        assert!(message.contains("already exists"));
        assert!(message.contains("dataset list"));
        assert_eq!(app.screen, AppScreen::Parameters);
    }

    #[tokio::test]
    async fn created_dataset_is_highlighted() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/v1/datasets/")
            .with_status(201)
            .with_body(r#"{"dataset_id":"d2"}"#)
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/v1/datasets/")
            .with_status(200)
            .with_body(datasets_body())
            .create_async()
            .await;
        let mut app = app_for(&server);
        app.params.city_query = "Omsk".to_string();

        app.submit_parameters().await;

        assert_eq!(app.screen, AppScreen::Datasets);
        assert_eq!(app.selected_dataset_index, 1);
        assert_eq!(app.store.city(), "Omsk");
        assert_eq!(app.store.dataset_id(), None);
    }

    #[tokio::test]
    async fn selecting_dataset_then_analysis_fetches_and_navigates() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/v1/datasets/")
            .with_status(200)
            .with_body(datasets_body())
            .create_async()
            .await;
        let clusters = server
            .mock("POST", "/v1/analysis/cluster")
            .with_status(200)
            .with_body(cluster_body("d1"))
            .expect(2)
            .create_async()
            .await;
        let mut app = app_for(&server);
        app.refresh_datasets().await;

        app.select_dataset();
        assert_eq!(app.screen, AppScreen::AnalysisType);
        assert_eq!(app.store.dataset_id(), Some("d1"));
        assert_eq!(app.store.city(), "Kazan");

        app.choose_analysis_type();
        assert!(app.is_loading());
        let batch = app.fetch_rx.recv().await.unwrap();
        app.handle_batch(batch);

        assert!(!app.is_loading());
        assert_eq!(app.screen, AppScreen::Clustering);
        assert!(app.store.current_cluster().is_some());
        clusters.assert_async().await;

        // Fully cached now: no spawn, immediate navigation.
        app.go_back();
        app.choose_analysis_type();
        assert!(!app.is_loading());
        assert_eq!(app.screen, AppScreen::Clustering);
    }

    #[tokio::test]
    async fn failed_metric_shows_popup_and_keeps_earlier_result() {
        let mut server = Server::new_async().await;
        let _pagerank = server
            .mock("POST", "/v1/analysis/metric")
            .match_body(Matcher::PartialJson(json!({"metric": "pagerank"})))
            .with_status(200)
            .with_body(
                json!({"dataset_id": "d1", "nodes": [
                    {"id": "1", "name": "Central", "metric": 0.4, "coordinates": [49.1, 55.8]}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let _betweenness = server
            .mock("POST", "/v1/analysis/metric")
            .match_body(Matcher::PartialJson(json!({"metric": "betweenness"})))
            .with_status(500)
            .with_body(r#"{"detail":"graph not ready"}"#)
            .create_async()
            .await;
        let mut app = app_for(&server);
        app.store.set_all(
            SelectionPatch::new()
                .city("Kazan")
                .transport("tram")
                .dataset_id("d1")
                .analysis_type(AnalysisType::Heatmap),
        );

        app.start_analysis();
        let batch = app.fetch_rx.recv().await.unwrap();
        app.handle_batch(batch);

        let message = app.error_popup.clone().unwrap();
        assert!(message.contains("Computing Betweenness failed"));
        assert!(message.contains("graph not ready"));
        assert_eq!(app.screen, AppScreen::Parameters);
        let entry = app.store.analysis_data("d1").unwrap();
        assert!(entry.metric(MetricType::PageRank).is_some());
        assert!(entry.metric(MetricType::Betweenness).is_none());
    }

    #[tokio::test]
    async fn batch_for_old_selection_is_discarded() {
        let mut server = Server::new_async().await;
        let _clusters = server
            .mock("POST", "/v1/analysis/cluster")
            .with_status(200)
            .with_body(cluster_body("d1"))
            .expect_at_least(1)
            .create_async()
            .await;
        let mut app = app_for(&server);
        app.store.set_all(
            SelectionPatch::new()
                .city("Kazan")
                .transport("tram")
                .dataset_id("d1")
                .analysis_type(AnalysisType::Clustering),
        );

        app.start_analysis();
        app.store.set_all(SelectionPatch::new().city("Omsk"));
        let batch = app.fetch_rx.recv().await.unwrap();
        app.handle_batch(batch);

        assert!(app.store.analysis_data("d1").is_none());
        assert_eq!(app.screen, AppScreen::Parameters);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn missing_dataset_blocks_analysis() {
        let server = Server::new_async().await;
        let mut app = app_for(&server);

        app.choose_analysis_type();

        assert!(app
            .error_popup
            .as_deref()
            .unwrap()
            .contains("No dataset loaded"));
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn deleting_dataset_discards_its_cache() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/v1/datasets/")
            .with_status(200)
            .with_body(datasets_body())
            .create_async()
            .await;
        let _delete = server
            .mock("DELETE", "/v1/datasets/d1")
            .with_status(204)
            .create_async()
            .await;
        let mut app = app_for(&server);
        app.refresh_datasets().await;
        app.select_dataset();

        app.delete_selected_dataset().await;

        assert_eq!(app.datasets.len(), 1);
        assert_eq!(app.store.dataset_id(), None);
        assert!(app.status_message.contains("Kazan"));
    }

    #[test]
    fn toggles_cycle_preferences() {
        let actions = AppActions::from_config(&AppConfig {
            token_path: std::env::temp_dir().join("transit-analysis-toggle-test.json"),
            ..AppConfig::default()
        })
        .unwrap();
        let mut app = App::new(actions);

        app.toggle_cluster_method();
        assert_eq!(app.store.cluster_method(), ClusterMethod::Louvain);
        app.toggle_cluster_method();
        assert_eq!(app.store.cluster_method(), ClusterMethod::Leiden);

        app.toggle_metric_type();
        assert_eq!(app.store.metric_type(), MetricType::Betweenness);
    }
}
