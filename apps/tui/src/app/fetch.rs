use crate::api::{AnalysisBackend, AnalysisKey, ApiError};
use crate::domain::AnalysisType;
use crate::store::{AnalysisFragment, FetchPlan, FetchTicket, SelectionStore};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no dataset loaded")]
    MissingDataset,

    #[error("no analysis type selected")]
    MissingAnalysisType,

    #[error("{key} request failed: {source}")]
    Request {
        key: AnalysisKey,
        #[source]
        source: ApiError,
    },

    #[error("results for dataset {0} were superseded")]
    Superseded(String),
}

impl FetchError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingDataset => "No dataset loaded. Create or pick a dataset first.".to_string(),
            Self::MissingAnalysisType => "Choose an analysis type first.".to_string(),
            Self::Request { key, source } => source.user_message(&key.operation()),
            Self::Superseded(_) => {
                "The selection changed while results were loading. Try again.".to_string()
            }
        }
    }
}

/// The outcome of running a [`FetchPlan`], ready to be merged into the store.
#[derive(Debug)]
pub struct FetchBatch {
    pub ticket: FetchTicket,
    pub fragment: AnalysisFragment,
    /// First failing key; nothing after it was requested.
    pub failure: Option<(AnalysisKey, ApiError)>,
}

#[derive(Debug)]
pub enum BatchOutcome {
    Complete {
        dataset_id: String,
        analysis_type: AnalysisType,
        fetched: usize,
    },
    Failed {
        dataset_id: String,
        fetched: usize,
        key: AnalysisKey,
        error: ApiError,
    },
    Stale {
        dataset_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    AlreadyCached,
    Fetched(usize),
}

/// The dataset and analysis type the user has selected, or why there is none.
pub fn selected_target(store: &SelectionStore) -> Result<(String, AnalysisType), FetchError> {
    let dataset_id = store
        .dataset_id()
        .filter(|id| !id.is_empty())
        .ok_or(FetchError::MissingDataset)?;
    let analysis_type = store
        .analysis_type()
        .ok_or(FetchError::MissingAnalysisType)?;

    Ok((dataset_id.to_string(), analysis_type))
}

/// Requests each pending key one at a time, in plan order, and stops at the
/// first failure.
pub async fn execute_plan<B>(backend: &B, plan: FetchPlan) -> FetchBatch
where
    B: AnalysisBackend + ?Sized,
{
    let FetchPlan { ticket, pending } = plan;
    let mut fragment = AnalysisFragment::default();
    let mut failure = None;

    for key in pending {
        debug!(dataset_id = %ticket.dataset_id, %key, "requesting analysis");
        match backend.fetch(&ticket.dataset_id, key).await {
            Ok(result) => fragment.insert(result),
            Err(error) => {
                warn!(dataset_id = %ticket.dataset_id, %key, %error, "analysis request failed");
                failure = Some((key, error));
                break;
            }
        }
    }

    FetchBatch {
        ticket,
        fragment,
        failure,
    }
}

/// Merges a finished batch if its ticket is still current.
///
/// Successful results are kept even when a later key failed, so a retry
/// only asks for what is still missing.
pub fn apply_batch(store: &mut SelectionStore, batch: FetchBatch) -> BatchOutcome {
    let FetchBatch {
        ticket,
        fragment,
        failure,
    } = batch;

    if !store.is_current(&ticket) {
        warn!(
            dataset_id = %ticket.dataset_id,
            generation = ticket.generation(),
            "discarding superseded analysis results"
        );
        return BatchOutcome::Stale {
            dataset_id: ticket.dataset_id,
        };
    }

    let fetched = fragment.len();
    if !fragment.is_empty() {
        store.set_analysis_data(&ticket.dataset_id, fragment);
    }

    match failure {
        Some((key, error)) => BatchOutcome::Failed {
            dataset_id: ticket.dataset_id,
            fetched,
            key,
            error,
        },
        None => {
            info!(dataset_id = %ticket.dataset_id, fetched, "analysis results cached");
            BatchOutcome::Complete {
                dataset_id: ticket.dataset_id,
                analysis_type: ticket.family,
                fetched,
            }
        }
    }
}

/// Makes sure the cache holds everything `analysis_type` needs for
/// `dataset_id`, fetching only what is missing.
pub async fn ensure_analysis<B>(
    store: &mut SelectionStore,
    backend: &B,
    dataset_id: &str,
    analysis_type: AnalysisType,
) -> Result<EnsureOutcome, FetchError>
where
    B: AnalysisBackend + ?Sized,
{
    let Some(plan) = store.plan_fetch(dataset_id, analysis_type) else {
        return Ok(EnsureOutcome::AlreadyCached);
    };

    let batch = execute_plan(backend, plan).await;
    match apply_batch(store, batch) {
        BatchOutcome::Complete { fetched, .. } => Ok(EnsureOutcome::Fetched(fetched)),
        BatchOutcome::Failed { key, error, .. } => Err(FetchError::Request { key, source: error }),
        BatchOutcome::Stale { dataset_id } => Err(FetchError::Superseded(dataset_id)),
    }
}

/// [`ensure_analysis`] for whatever the store currently has selected.
pub async fn ensure_selected<B>(
    store: &mut SelectionStore,
    backend: &B,
) -> Result<EnsureOutcome, FetchError>
where
    B: AnalysisBackend + ?Sized,
{
    let (dataset_id, analysis_type) = selected_target(store)?;
    ensure_analysis(store, backend, &dataset_id, analysis_type).await
}
