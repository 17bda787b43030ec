use std::path::{Path, PathBuf};
use std::sync::Arc;

use eventa_api_client::EventaClient;
use eventa_core::config::{ClientConfig, normalize_api_url};
use eventa_core::export::{ExportKind, export_file_name};
use eventa_core::models::CurrentUser;
use eventa_core::routes::{Decision, GateState, Route, authorize};
use eventa_core::safety::SafetyFeed;
use eventa_core::session::{Session, SessionState};
use eventa_core::store::ClientStore;

use crate::cli::Cli;
use crate::{Error, Result};

/// Everything a command needs: configuration, the shared store and a client
/// that reads its credential from that store.
pub struct Context {
    pub config: ClientConfig,
    pub store: Arc<ClientStore>,
    pub client: EventaClient,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &cli.api_url {
            config.api_url = normalize_api_url(url)
                .map_err(|m| Error::Custom(format!("Invalid --api-url: {m}")))?;
        }
        if let Some(path) = &cli.store {
            config.store_path = path.clone();
        }

        let store = Arc::new(ClientStore::open(
            config.store_path.clone(),
            config.store_quota_bytes,
        ));
        let client = EventaClient::from_config(&config, store.clone())
            .map_err(|e| Error::Custom(format!("Invalid API URL {}: {e}", config.api_url)))?;

        Ok(Self {
            config,
            store,
            client,
        })
    }

    pub fn session(&self) -> Session<EventaClient> {
        Session::new(self.client.clone(), self.store.clone())
    }

    pub fn feed(&self) -> SafetyFeed<EventaClient> {
        SafetyFeed::new(self.client.clone())
    }

    /// Resolve the session and check that its role may open `route`.
    pub async fn authorize(&self, route: Route) -> Result<CurrentUser> {
        self.authorize_session(&self.session(), route).await
    }

    /// Like [`Context::authorize`], on a session the caller keeps using.
    pub async fn authorize_session(
        &self,
        session: &Session<EventaClient>,
        route: Route,
    ) -> Result<CurrentUser> {
        let state = session.resolve().await;
        let user = match &state {
            SessionState::Authenticated { user } => user.clone(),
            SessionState::Unauthenticated { reason: Some(reason) } => {
                return Err(Error::Custom(format!(
                    "Not signed in: {reason}. Run `eventa login`."
                )));
            }
            _ => return Err(Error::Custom("Not signed in. Run `eventa login`.".into())),
        };

        match authorize(GateState::from(&state), &route) {
            Decision::Render(_) => Ok(user),
            Decision::Redirect(to) => Err(Error::Custom(format!(
                "{} is not available to {} (the console sends this role to {to})",
                route.title(),
                user.email
            ))),
            Decision::Loading => Err(Error::Custom("Session is still loading".into())),
        }
    }
}

/// `--yes` guard for destructive commands.
pub fn confirm(yes: bool, action: &str) -> Result<()> {
    if yes {
        Ok(())
    } else {
        Err(Error::Custom(format!("Refusing to {action} without --yes")))
    }
}

/// A directory target gets the default export file name.
pub fn csv_target(path: &Path, kind: ExportKind<'_>) -> PathBuf {
    if path.is_dir() {
        path.join(export_file_name(kind, chrono::Local::now().date_naive()))
    } else {
        path.to_path_buf()
    }
}
