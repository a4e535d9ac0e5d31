//! The built-in hook kind: call a templated URL on every push.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repository::{Changeset, Changesets, Repository};
use crate::secret::SecretCipher;
use crate::template::{TemplateEnvironment, UrlExpression};
use crate::webhook::{
    ExecutionHeader, HeaderRecord, HttpClient, HttpMethod, WebhookExecution, WebhookSender,
};

use super::config::HookConfiguration;
use super::registry::{HookExecutor, HookHandler};
use super::{DispatchError, HookError};

/// Placeholder shown instead of concealed header values.
///
/// Sending it back unchanged keeps the stored secret.
pub const DUMMY_SECRET: &str = "__DUMMY__";

/// Configuration of a simple URL hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleWebHook {
    /// URL template evaluated per call
    pub url_pattern: String,
    /// One call per commit instead of one call per push
    #[serde(default)]
    pub execute_on_every_commit: bool,
    /// Send commit data as JSON payload
    #[serde(default)]
    pub send_commit_data: bool,
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,
    /// Extra request headers
    #[serde(default)]
    pub headers: Vec<HeaderRecord>,
}

impl SimpleWebHook {
    /// Kind name under which this configuration is stored.
    pub const KIND: &'static str = "SimpleWebHook";

    /// Creates a batch-mode GET hook without payload or headers.
    #[must_use]
    pub fn new(url_pattern: impl Into<String>) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            execute_on_every_commit: false,
            send_commit_data: false,
            method: HttpMethod::Auto,
            headers: Vec::new(),
        }
    }

    /// Fires once per commit.
    #[must_use]
    pub const fn every_commit(mut self) -> Self {
        self.execute_on_every_commit = true;
        self
    }

    /// Sends commit data as payload.
    #[must_use]
    pub const fn with_commit_data(mut self) -> Self {
        self.send_commit_data = true;
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, header: HeaderRecord) -> Self {
        self.headers.push(header);
        self
    }
}

impl HookConfiguration for SimpleWebHook {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn clone_box(&self) -> Box<dyn HookConfiguration> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Handler for [`SimpleWebHook`].
pub struct SimpleHookHandler<H> {
    sender: WebhookSender<H>,
    cipher: Arc<dyn SecretCipher>,
}

impl<H> SimpleHookHandler<H> {
    /// Creates the handler.
    #[must_use]
    pub fn new(sender: WebhookSender<H>, cipher: Arc<dyn SecretCipher>) -> Self {
        Self { sender, cipher }
    }
}

impl<H> fmt::Debug for SimpleHookHandler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleHookHandler").finish_non_exhaustive()
    }
}

fn expect_simple(config: &dyn HookConfiguration) -> Result<&SimpleWebHook, HookError> {
    config
        .downcast_ref::<SimpleWebHook>()
        .ok_or_else(|| mismatch(config))
}

fn expect_simple_mut(config: &mut dyn HookConfiguration) -> Result<&mut SimpleWebHook, HookError> {
    let actual = config.kind().to_string();
    config
        .downcast_mut::<SimpleWebHook>()
        .ok_or_else(|| HookError::KindMismatch {
            expected: SimpleWebHook::KIND.to_string(),
            actual,
        })
}

fn mismatch(config: &dyn HookConfiguration) -> HookError {
    HookError::KindMismatch {
        expected: SimpleWebHook::KIND.to_string(),
        actual: config.kind().to_string(),
    }
}

impl<H: HttpClient + 'static> HookHandler for SimpleHookHandler<H> {
    fn kind(&self) -> &str {
        SimpleWebHook::KIND
    }

    fn accepts(&self, config: &dyn HookConfiguration) -> bool {
        config.is::<SimpleWebHook>()
    }

    fn decode(&self, payload: serde_json::Value) -> Result<Box<dyn HookConfiguration>, HookError> {
        let hook: SimpleWebHook =
            serde_json::from_value(payload).map_err(|source| HookError::Decode {
                kind: SimpleWebHook::KIND.to_string(),
                source,
            })?;
        Ok(Box::new(hook))
    }

    fn create_executor(
        &self,
        config: &dyn HookConfiguration,
        repository: &Repository,
        changesets: Option<&[Changeset]>,
    ) -> Result<Box<dyn HookExecutor>, DispatchError> {
        let hook = expect_simple(config)?;
        let expression = UrlExpression::parse(&hook.url_pattern)?;

        Ok(Box::new(SimpleHookExecutor {
            sender: self.sender.clone(),
            cipher: Arc::clone(&self.cipher),
            hook: hook.clone(),
            expression,
            repository: repository.clone(),
            changesets: changesets.map(<[Changeset]>::to_vec),
        }))
    }

    fn protect_secrets(&self, config: &mut dyn HookConfiguration) -> Result<(), HookError> {
        let hook = expect_simple_mut(config)?;
        for header in &mut hook.headers {
            if header.concealed && header.value != DUMMY_SECRET {
                header.value = self.cipher.encrypt(&header.value)?;
            }
        }
        Ok(())
    }

    fn update_before_store(
        &self,
        old: &dyn HookConfiguration,
        new: &mut dyn HookConfiguration,
    ) -> Result<(), HookError> {
        let old = expect_simple(old)?;
        let new = expect_simple_mut(new)?;

        let previous: HashMap<&str, &str> = old
            .headers
            .iter()
            .map(|header| (header.key.as_str(), header.value.as_str()))
            .collect();

        for header in &mut new.headers {
            if header.value != DUMMY_SECRET {
                continue;
            }
            match previous.get(header.key.as_str()) {
                Some(value) => header.value = (*value).to_string(),
                None => tracing::warn!(
                    "no previous value for masked header {}, keeping placeholder",
                    header.key
                ),
            }
        }
        Ok(())
    }

    fn mask_secrets(&self, config: &mut dyn HookConfiguration) {
        if let Some(hook) = config.downcast_mut::<SimpleWebHook>() {
            for header in hook.headers.iter_mut().filter(|header| header.concealed) {
                header.value = DUMMY_SECRET.to_string();
            }
        }
    }
}

/// Executes one [`SimpleWebHook`] for one push.
struct SimpleHookExecutor<H> {
    sender: WebhookSender<H>,
    cipher: Arc<dyn SecretCipher>,
    hook: SimpleWebHook,
    expression: UrlExpression,
    repository: Repository,
    changesets: Option<Vec<Changeset>>,
}

impl<H: HttpClient> SimpleHookExecutor<H> {
    /// One call per commit, `changeset` and `commit` bound to it.
    async fn each_commit(&self) -> Result<(), DispatchError> {
        let Some(changesets) = &self.changesets else {
            return Ok(());
        };

        for changeset in changesets {
            let mut env = TemplateEnvironment::for_repository(&self.repository)?;
            env.bind_changeset("changeset", changeset)?;
            env.bind_changeset("commit", changeset)?;

            let payload = if self.hook.send_commit_data {
                Some(serde_json::to_value(changeset).map_err(DispatchError::Payload)?)
            } else {
                None
            };

            self.send(self.expression.evaluate(&env), payload).await?;
        }
        Ok(())
    }

    /// One call for the whole push.
    ///
    /// `last` is bound to the first commit delivered and `first` to the final
    /// one; changesets arrive newest first.
    async fn all_at_once(&self) -> Result<(), DispatchError> {
        let changesets = self.changesets.as_deref().unwrap_or_default();

        let mut env = TemplateEnvironment::for_repository(&self.repository)?;
        if let (Some(newest), Some(oldest)) = (changesets.first(), changesets.last()) {
            env.bind_changeset("last", newest)?;
            env.bind_changeset("first", oldest)?;
        }

        let payload = if self.hook.send_commit_data {
            Some(serde_json::to_value(Changesets { changesets }).map_err(DispatchError::Payload)?)
        } else {
            None
        };

        self.send(self.expression.evaluate(&env), payload).await
    }

    async fn send(
        &self,
        url: String,
        payload: Option<serde_json::Value>,
    ) -> Result<(), DispatchError> {
        let mut execution = WebhookExecution::new(self.hook.method, url)
            .with_headers(ExecutionHeader::from_records(&self.hook.headers, &self.cipher));
        if let Some(payload) = payload {
            execution = execution.with_payload(payload);
        }

        self.sender.send(execution).await?;
        Ok(())
    }
}

#[async_trait]
impl<H: HttpClient + 'static> HookExecutor for SimpleHookExecutor<H> {
    async fn execute(&self) -> Result<(), DispatchError> {
        tracing::debug!(
            "execute {} webhook for repository {}",
            SimpleWebHook::KIND,
            self.repository.display_name()
        );

        if self.hook.execute_on_every_commit {
            self.each_commit().await
        } else {
            self.all_at_once().await
        }
    }
}
