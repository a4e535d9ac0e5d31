//! Application execution logic.
//!
//! This module wires the configured store, HTTP client and hook handlers
//! together and runs one subcommand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use push_hooks::config::{Command, HooksCommand, ValidatedConfig};
use push_hooks::context::{SaveError, WebhookContext};
use push_hooks::hooks::{
    ConfigurationUpdater, HookConfigurationSet, HookError, HookRegistry, SimpleHookHandler,
};
use push_hooks::repository::PushEvent;
use push_hooks::secret::SecretCipher;
use push_hooks::store::{ConfigurationStore, FileConfigurationStore, Scope, StoredHook};
use push_hooks::trigger::{TriggerSummary, WebhookTrigger};
use push_hooks::webhook::{HttpClient, HttpError, ReqwestClient, WebhookHttpClient, WebhookSender};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    ClientCreation(#[source] HttpError),

    /// Failed to read an input file.
    #[error("Failed to read '{}': {source}", path.display())]
    ReadInput {
        /// The input file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid JSON of the expected shape.
    #[error("Invalid JSON in '{}': {source}", path.display())]
    ParseInput {
        /// The input file
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The hooks could not be decoded or prepared for storage.
    #[error("Invalid webhook configuration: {0}")]
    Hooks(#[from] HookError),

    /// The hooks could not be stored.
    #[error("Failed to store webhooks: {0}")]
    Save(#[from] SaveError),

    /// The listing could not be printed.
    #[error("Failed to encode webhooks: {0}")]
    Output(#[source] serde_json::Error),
}

/// Accepted shapes of a `hooks apply` input file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HookInput {
    /// A plain list of hooks
    List(Vec<StoredHook>),
    /// A store document (`{"webhooks": [...]}`); other fields are ignored
    Document { webhooks: Vec<StoredHook> },
}

impl HookInput {
    fn into_hooks(self) -> Vec<StoredHook> {
        match self {
            Self::List(hooks) | Self::Document { webhooks: hooks } => hooks,
        }
    }
}

/// Executes one subcommand.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the subcommand
/// fails. Failing webhooks during `trigger` are logged, not returned.
#[cfg(not(tarpaulin_include))]
pub async fn execute(command: &Command, config: ValidatedConfig) -> Result<(), RunError> {
    if config.dry_run {
        tracing::info!("Dry-run mode enabled - webhook requests will be logged but not sent");
    }

    let sender = create_sender(&config)?;
    let store = FileConfigurationStore::new(&config.store_dir);
    tracing::debug!("using webhook store {}", store.dir().display());
    let context = create_context(store, sender, Arc::new(config.cipher));

    match command {
        // handled before the configuration is loaded
        Command::Init { .. } => Ok(()),
        Command::Trigger { event } => {
            let summary = trigger(context, event).await?;
            tracing::info!("{summary}");
            Ok(())
        }
        Command::Hooks(HooksCommand::List { repository, kind }) => {
            let scope = Scope::from_repository(repository.as_deref());
            println!("{}", list(&context, &scope, kind.as_deref())?);
            Ok(())
        }
        Command::Hooks(HooksCommand::Apply { repository, file }) => {
            let scope = Scope::from_repository(repository.as_deref());
            let count = apply(&context, &scope, file).await?;
            println!("Stored {count} webhook(s) for {scope}");
            Ok(())
        }
    }
}

/// Creates the webhook sender from configuration.
///
/// # Errors
///
/// Returns [`RunError::ClientCreation`] if the proxy settings are rejected.
pub fn create_sender(config: &ValidatedConfig) -> Result<WebhookSender<ReqwestClient>, RunError> {
    let client = ReqwestClient::with_options(&config.client).map_err(RunError::ClientCreation)?;

    Ok(WebhookSender::new(
        WebhookHttpClient::new(client)
            .with_user_agent(config.user_agent.clone())
            .with_dry_run(config.dry_run),
    ))
}

/// Builds the context with every built-in hook handler registered.
pub fn create_context<S, H>(
    store: S,
    sender: WebhookSender<H>,
    cipher: Arc<dyn SecretCipher>,
) -> Arc<WebhookContext<S>>
where
    S: ConfigurationStore,
    H: HttpClient + 'static,
{
    let registry = HookRegistry::new().with_handler(SimpleHookHandler::new(sender, cipher));
    Arc::new(WebhookContext::new(store, Arc::new(registry)))
}

/// Reads a push event from `path` and fires the matching hooks.
///
/// # Errors
///
/// Returns an error if the event file cannot be read or parsed.
pub async fn trigger<S: ConfigurationStore>(
    context: Arc<WebhookContext<S>>,
    path: &Path,
) -> Result<TriggerSummary, RunError> {
    let event: PushEvent = read_json(path).await?;
    Ok(WebhookTrigger::new(context).handle(&event).await)
}

/// Renders the set stored for `scope` as pretty JSON, secrets masked.
///
/// # Errors
///
/// Returns an error if an entry cannot be encoded.
pub fn list<S: ConfigurationStore>(
    context: &WebhookContext<S>,
    scope: &Scope,
    kind: Option<&str>,
) -> Result<String, RunError> {
    let updater = ConfigurationUpdater::new(Arc::clone(context.registry()));
    let masked = updater.masked(&context.load(scope));

    let hooks: Vec<StoredHook> = masked
        .to_stored()?
        .into_iter()
        .filter(|hook| kind.is_none_or(|kind| hook.name == kind))
        .collect();

    serde_json::to_string_pretty(&hooks).map_err(RunError::Output)
}

/// Replaces the set stored for `scope` with the hooks in `path`.
///
/// New entries get ids, secrets are encrypted and masked secrets are
/// restored from the stored set. Returns the number of stored hooks.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the hooks cannot be
/// decoded or prepared, or the store write fails.
pub async fn apply<S: ConfigurationStore>(
    context: &WebhookContext<S>,
    scope: &Scope,
    path: &Path,
) -> Result<usize, RunError> {
    let input: HookInput = read_json(path).await?;
    let new = HookConfigurationSet::from_stored(input.into_hooks(), context.registry())?;

    let updater = ConfigurationUpdater::new(Arc::clone(context.registry()));
    let updated = updater.update(&context.load(scope), new)?;

    context.save(scope, &updated).await?;
    Ok(updated.len())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RunError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RunError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| RunError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}
