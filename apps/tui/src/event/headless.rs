use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::DatasetInfo;
use crate::app::fetch::{ensure_selected, EnsureOutcome};
use crate::app::AppActions;
use crate::cli::{AuthCommand, CliArgs, Command};
use crate::config::AppConfig;
use crate::domain::{AnalysisType, ClusterMethod, MetricType, TransportType};
use crate::store::{SelectionPatch, SelectionStore};
use crate::summary::{community_sizes, format_metric, quality_rows, MetricSummary};

/// Nodes listed per metric in headless reports.
const TOP_NODES: usize = 10;

/// Run a command without the terminal UI
pub async fn run_headless(cli: &CliArgs, config: &AppConfig) -> Result<()> {
    let mut actions = AppActions::from_config(config)?;
    let command = cli.command.clone().unwrap_or(Command::Datasets);
    let output = execute(&mut actions, command).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&output);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum HeadlessOutput {
    Datasets { datasets: Vec<HeadlessDataset> },
    Created { dataset_id: String, city: String, transport: String },
    Deleted { dataset_id: String },
    Analysis(AnalysisReport),
    Session { session: String, detail: Option<String> },
    CodeSent { email: String, message: String },
    LoggedOut,
}

#[derive(Debug, Serialize)]
struct HeadlessDataset {
    dataset_id: String,
    city: String,
    transport: String,
}

impl From<DatasetInfo> for HeadlessDataset {
    fn from(info: DatasetInfo) -> Self {
        Self {
            dataset_id: info.dataset_id,
            city: info.city,
            transport: info.transport_type,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct AnalysisReport {
    dataset_id: String,
    analysis_type: String,
    /// Sub-results requested by this run; zero when everything was cached.
    fetched: usize,
    clusters: Vec<ClusterReport>,
    metrics: Vec<MetricReport>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ClusterReport {
    method: String,
    nodes: usize,
    communities: usize,
    min_size: usize,
    max_size: usize,
    mean_size: f64,
    median_size: f64,
    quality: Vec<(String, String)>,
}

#[derive(Debug, Serialize, PartialEq)]
struct MetricReport {
    metric: String,
    nodes: usize,
    max: f64,
    top: Vec<TopNode>,
}

#[derive(Debug, Serialize, PartialEq)]
struct TopNode {
    id: String,
    name: String,
    value: f64,
}

async fn execute(actions: &mut AppActions, command: Command) -> Result<HeadlessOutput> {
    match command {
        Command::Auth(AuthCommand::Guest) => {
            let kind = actions.login_guest().await?;
            Ok(HeadlessOutput::Session {
                session: kind.label().to_string(),
                detail: None,
            })
        }
        Command::Auth(AuthCommand::RequestCode { email }) => {
            let message = actions.request_code(&email).await?;
            Ok(HeadlessOutput::CodeSent { email, message })
        }
        Command::Auth(AuthCommand::Verify { email, code }) => {
            let email = actions.verify_code(&email, &code).await?;
            Ok(HeadlessOutput::Session {
                session: "user".to_string(),
                detail: Some(email),
            })
        }
        Command::Logout => {
            actions.logout()?;
            Ok(HeadlessOutput::LoggedOut)
        }
        Command::Datasets => {
            actions.ensure_session().await?;
            let datasets = actions
                .list_datasets()
                .await
                .map_err(|err| eyre!(err.user_message("Loading datasets")))?;
            Ok(HeadlessOutput::Datasets {
                datasets: datasets.into_iter().map(HeadlessDataset::from).collect(),
            })
        }
        Command::Create { city, transport } => {
            let transport = TransportType::parse(&transport)
                .ok_or_else(|| eyre!("unknown transport type `{transport}`"))?;
            actions.ensure_session().await?;
            let created = actions
                .create_dataset(&city, transport.as_str())
                .await
                .map_err(|err| {
                    if err.is_conflict() {
                        warn!(%city, transport = transport.as_str(), "dataset already registered");
                    }
                    eyre!(err.user_message("Creating the dataset"))
                })?;
            info!(dataset_id = %created.dataset_id, "dataset created");
            Ok(HeadlessOutput::Created {
                dataset_id: created.dataset_id,
                city,
                transport: transport.as_str().to_string(),
            })
        }
        Command::Delete { dataset_id } => {
            actions.ensure_session().await?;
            actions
                .delete_dataset(&dataset_id)
                .await
                .map_err(|err| eyre!(err.user_message("Deleting the dataset")))?;
            Ok(HeadlessOutput::Deleted { dataset_id })
        }
        Command::Analyze {
            dataset_id,
            analysis_type,
        } => {
            actions.ensure_session().await?;
            let mut store = SelectionStore::new();
            store.set_all(
                SelectionPatch::new()
                    .dataset_id(dataset_id.clone())
                    .analysis_type(analysis_type),
            );
            let outcome = ensure_selected(&mut store, actions.backend())
                .await
                .map_err(|err| eyre!(err.user_message()))?;
            let fetched = match outcome {
                EnsureOutcome::AlreadyCached => 0,
                EnsureOutcome::Fetched(count) => count,
            };
            Ok(HeadlessOutput::Analysis(build_report(
                &store,
                &dataset_id,
                analysis_type,
                fetched,
            )))
        }
    }
}

fn build_report(
    store: &SelectionStore,
    dataset_id: &str,
    analysis_type: AnalysisType,
    fetched: usize,
) -> AnalysisReport {
    let entry = store.analysis_data(dataset_id);

    let clusters = ClusterMethod::ALL
        .iter()
        .filter_map(|method| {
            let result = entry?.clusters.get(method)?;
            let sizes = community_sizes(result)?;
            Some(ClusterReport {
                method: method.as_str().to_string(),
                nodes: result.nodes.len(),
                communities: sizes.communities,
                min_size: sizes.min,
                max_size: sizes.max,
                mean_size: sizes.mean,
                median_size: sizes.median,
                quality: quality_rows(result.statistics.as_ref())
                    .into_iter()
                    .map(|(label, value)| (label.to_string(), value))
                    .collect(),
            })
        })
        .collect();

    let metrics = MetricType::ALL
        .iter()
        .filter_map(|metric| {
            let result = entry?.metrics.get(metric)?;
            let summary = MetricSummary::from_result(result);
            Some(MetricReport {
                metric: metric.as_str().to_string(),
                nodes: summary.nodes,
                max: summary.max,
                top: summary
                    .ranked
                    .into_iter()
                    .take(TOP_NODES)
                    .map(|node| TopNode {
                        id: node.id,
                        name: node.name,
                        value: node.metric,
                    })
                    .collect(),
            })
        })
        .collect();

    AnalysisReport {
        dataset_id: dataset_id.to_string(),
        analysis_type: analysis_type.as_str().to_string(),
        fetched,
        clusters,
        metrics,
    }
}

fn print_text(output: &HeadlessOutput) {
    match output {
        HeadlessOutput::Datasets { datasets } => {
            println!("\nDatasets");
            println!("========");
            if datasets.is_empty() {
                println!("(none)");
            }
            for dataset in datasets {
                println!(
                    "- {} | {} | {}",
                    dataset.dataset_id,
                    dataset.city,
                    TransportType::label_for(&dataset.transport)
                );
            }
        }
        HeadlessOutput::Created {
            dataset_id,
            city,
            transport,
        } => println!("Created {dataset_id} for {city} ({transport})"),
        HeadlessOutput::Deleted { dataset_id } => println!("Deleted {dataset_id}"),
        HeadlessOutput::Session { session, detail } => match detail {
            Some(detail) => println!("Signed in as {detail} ({session} session)"),
            None => println!("Started a {session} session"),
        },
        HeadlessOutput::CodeSent { email, message } => println!("{email}: {message}"),
        HeadlessOutput::LoggedOut => println!("Session token removed"),
        HeadlessOutput::Analysis(report) => print_report(report),
    }
}

fn print_report(report: &AnalysisReport) {
    println!("\nAnalysis of {} ({})", report.dataset_id, report.analysis_type);
    println!("==========================");
    println!("Requests made: {}", report.fetched);

    for cluster in &report.clusters {
        println!("\n{} clustering", cluster.method);
        println!("- stops: {}", cluster.nodes);
        println!("- communities: {}", cluster.communities);
        println!(
            "- community size: min {} / max {} / mean {:.2} / median {:.0}",
            cluster.min_size, cluster.max_size, cluster.mean_size, cluster.median_size
        );
        for (label, value) in &cluster.quality {
            println!("- {label}: {value}");
        }
    }

    for metric in &report.metrics {
        println!("\n{} ({} stops, max {})", metric.metric, metric.nodes, format_metric(metric.max));
        for node in &metric.top {
            println!("- {} | {}", node.name, format_metric(node.value));
        }
    }
}
