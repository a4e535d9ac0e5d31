//! Tests for handler routing.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use super::{
    DispatchError, HookConfiguration, HookError, HookExecutor, HookHandler, HookRegistry,
    NoopHandler, UnknownHook,
};
use crate::repository::{Changeset, Repository};
use crate::webhook::test_support::CapturedLogs;

/// Configuration of a test-only hook kind.
#[derive(Debug, Clone, PartialEq)]
struct PingHook {
    target: String,
}

impl HookConfiguration for PingHook {
    fn kind(&self) -> &str {
        "PingHook"
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(json!({ "target": self.target }))
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

/// Handler that accepts `PingHook` and only git repositories.
struct PingHandler {
    label: &'static str,
    created: Arc<AtomicUsize>,
}

impl PingHandler {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct NothingExecutor;

#[async_trait]
impl HookExecutor for NothingExecutor {
    async fn execute(&self) -> Result<(), DispatchError> {
        Ok(())
    }
}

impl HookHandler for PingHandler {
    fn kind(&self) -> &str {
        self.label
    }

    fn accepts(&self, config: &dyn HookConfiguration) -> bool {
        config.is::<PingHook>()
    }

    fn supports_repository(&self, repository: &Repository) -> bool {
        repository.kind == "git"
    }

    fn decode(&self, payload: serde_json::Value) -> Result<Box<dyn HookConfiguration>, HookError> {
        let target = payload["target"].as_str().unwrap_or_default().to_string();
        Ok(Box::new(PingHook { target }))
    }

    fn create_executor(
        &self,
        _config: &dyn HookConfiguration,
        _repository: &Repository,
        _changesets: Option<&[Changeset]>,
    ) -> Result<Box<dyn HookExecutor>, DispatchError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(NothingExecutor))
    }
}

fn ping() -> PingHook {
    PingHook {
        target: "host".to_string(),
    }
}

mod resolve {
    use super::*;

    #[test]
    fn first_accepting_handler_wins() {
        let registry = HookRegistry::new()
            .with_handler(PingHandler::new("first"))
            .with_handler(PingHandler::new("second"));

        assert_eq!(registry.resolve(&ping()).kind(), "first");
    }

    #[test]
    fn unaccepted_configuration_gets_noop_handler() {
        let registry = HookRegistry::new().with_handler(PingHandler::new("PingHook"));

        let handler = registry.resolve(&UnknownHook::new("Mystery", json!({})));

        assert_eq!(handler.kind(), NoopHandler::KIND);
    }

    #[test]
    fn empty_registry_always_falls_back() {
        assert_eq!(HookRegistry::new().resolve(&ping()).kind(), NoopHandler::KIND);
    }

    #[tokio::test]
    async fn noop_executor_warns_and_succeeds() {
        let (logs, _guard) = CapturedLogs::install();
        let repository = Repository::new("r1", "ns", "repo", "git");
        let config = UnknownHook::new("Mystery", json!({}));

        let executor = NoopHandler
            .create_executor(&config, &repository, None)
            .unwrap();

        executor.execute().await.unwrap();

        let output = logs.contents();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("Mystery"));
    }
}

mod decode {
    use super::*;

    #[test]
    fn known_kind_uses_handler() {
        let registry = HookRegistry::new().with_handler(PingHandler::new("PingHook"));

        let config = registry
            .decode("PingHook", json!({"target": "10.0.0.1"}))
            .unwrap();

        assert_eq!(
            config.downcast_ref::<PingHook>(),
            Some(&PingHook {
                target: "10.0.0.1".to_string()
            })
        );
    }

    #[test]
    fn unknown_kind_is_opaque() {
        let registry = HookRegistry::new();

        let config = registry.decode("Legacy", json!({"a": 1})).unwrap();

        assert_eq!(config.kind(), "Legacy");
        let unknown = config.downcast_ref::<UnknownHook>().unwrap();
        assert_eq!(unknown.payload(), &json!({"a": 1}));
    }
}

mod kinds {
    use super::*;

    #[test]
    fn kinds_for_filters_by_repository_support() {
        let registry = HookRegistry::new().with_handler(PingHandler::new("PingHook"));
        let git = Repository::new("1", "ns", "a", "git");
        let hg = Repository::new("2", "ns", "b", "hg");

        assert_eq!(registry.kinds_for(&git), ["PingHook"]);
        assert!(registry.kinds_for(&hg).is_empty());
        assert_eq!(registry.kinds(), ["PingHook"]);
    }

    #[test]
    fn handler_for_kind() {
        let registry = HookRegistry::new().with_handler(PingHandler::new("PingHook"));

        assert!(registry.handler_for("PingHook").is_some());
        assert!(registry.handler_for("Other").is_none());
    }

    #[test]
    fn debug_lists_kinds() {
        let registry = HookRegistry::new().with_handler(PingHandler::new("PingHook"));

        assert!(format!("{registry:?}").contains("PingHook"));
    }

    #[test]
    fn default_hooks_do_nothing() {
        let handler = PingHandler::new("PingHook");
        let mut config = ping();

        handler.protect_secrets(&mut config).unwrap();
        handler.update_before_store(&ping(), &mut config).unwrap();
        handler.mask_secrets(&mut config);

        assert_eq!(config, ping());
        assert_eq!(handler.created.load(Ordering::SeqCst), 0);
    }
}
