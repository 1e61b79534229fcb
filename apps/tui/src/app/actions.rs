use crate::api::{ApiError, DatasetBackend, DatasetInfo, HttpBackend};
use crate::api::models::CreateDatasetResponse;
use crate::app::fetch::{execute_plan, FetchBatch};
use crate::auth::{StoredToken, TokenKind, TokenStore};
use crate::config::AppConfig;
use crate::store::FetchPlan;
use chrono::Utc;
use color_eyre::Result;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Side effects of the app: backend calls and session persistence.
#[derive(Debug, Clone)]
pub struct AppActions {
    backend: Arc<HttpBackend>,
    tokens: TokenStore,
    session: Option<TokenKind>,
}

impl AppActions {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tokens = TokenStore::new(config.token_path.clone());
        let stored = tokens.active_token(Utc::now());
        let session = stored.as_ref().map(|token| token.kind);
        let backend = HttpBackend::new(&config.api_url, config.timeout)?
            .with_token(stored.map(|token| token.token));

        Ok(Self {
            backend: Arc::new(backend),
            tokens,
            session,
        })
    }

    pub fn backend(&self) -> &HttpBackend {
        &self.backend
    }

    pub const fn session(&self) -> Option<TokenKind> {
        self.session
    }

    fn adopt_token(&mut self, token: &StoredToken) -> Result<()> {
        self.tokens.save(token)?;
        Arc::make_mut(&mut self.backend).set_token(Some(token.token.clone()));
        self.session = Some(token.kind);
        Ok(())
    }

    /// Starts a guest session unless a valid token is already held.
    pub async fn ensure_session(&mut self) -> Result<TokenKind> {
        if let Some(kind) = self.session {
            return Ok(kind);
        }
        self.login_guest().await
    }

    pub async fn login_guest(&mut self) -> Result<TokenKind> {
        let token = StoredToken::guest(self.backend.guest().await?);
        self.adopt_token(&token)?;
        info!("started guest session");
        Ok(TokenKind::Guest)
    }

    pub async fn request_code(&self, email: &str) -> Result<String> {
        Ok(self.backend.request_code(email).await?)
    }

    pub async fn verify_code(&mut self, email: &str, code: &str) -> Result<String> {
        let response = self.backend.verify_code(email, code).await?;
        let token = StoredToken::user(response.token, response.email.clone());
        self.adopt_token(&token)?;
        info!(email = %response.email, "signed in");
        Ok(response.email)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.tokens.clear()?;
        Arc::make_mut(&mut self.backend).set_token(None);
        self.session = None;
        Ok(())
    }

    pub async fn list_datasets(&self) -> Result<Vec<DatasetInfo>, ApiError> {
        self.backend.list_datasets().await
    }

    pub async fn create_dataset(
        &self,
        city: &str,
        transport: &str,
    ) -> Result<CreateDatasetResponse, ApiError> {
        self.backend.create_dataset(city, transport).await
    }

    pub async fn delete_dataset(&self, dataset_id: &str) -> Result<(), ApiError> {
        self.backend.delete_dataset(dataset_id).await
    }

    /// Runs `plan` on a background task; the batch arrives on `results`.
    pub fn spawn_fetch(&self, plan: FetchPlan, results: UnboundedSender<FetchBatch>) {
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let batch = execute_plan(backend.as_ref(), plan).await;
            if results.send(batch).is_err() {
                warn!("analysis results arrived after the UI closed");
            }
        });
    }
}
