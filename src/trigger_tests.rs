//! Tests for firing hooks on push events.

use std::sync::Arc;

use serde_json::json;

use crate::context::WebhookContext;
use crate::hooks::{
    DispatchError, HookConfiguration, HookEntry, HookError, HookExecutor, HookHandler,
    HookRegistry, SimpleHookHandler, SimpleWebHook, UnknownHook, DUMMY_SECRET,
};
use crate::repository::{Changeset, Person, PushEvent, Repository};
use crate::secret::AesGcmCipher;
use crate::store::mock::MockConfigurationStore;
use crate::store::{LoadResult, Scope, StoredHook};
use crate::trigger::{TriggerSummary, WebhookTrigger};
use crate::webhook::test_support::{CapturedLogs, MockClient};
use crate::webhook::{HeaderRecord, WebhookHttpClient, WebhookSender};

/// Handler for a hook kind that only works on Subversion repositories.
#[derive(Debug)]
struct SvnOnlyHandler;

impl HookHandler for SvnOnlyHandler {
    fn kind(&self) -> &str {
        "SvnHook"
    }

    fn accepts(&self, config: &dyn HookConfiguration) -> bool {
        config.kind() == "SvnHook"
    }

    fn supports_repository(&self, repository: &Repository) -> bool {
        repository.kind == "svn"
    }

    fn decode(&self, payload: serde_json::Value) -> Result<Box<dyn HookConfiguration>, HookError> {
        Ok(Box::new(UnknownHook::new("SvnHook", payload)))
    }

    fn create_executor(
        &self,
        _config: &dyn HookConfiguration,
        _repository: &Repository,
        _changesets: Option<&[Changeset]>,
    ) -> Result<Box<dyn HookExecutor>, DispatchError> {
        unreachable!("git repositories are never dispatched to this handler")
    }
}

fn trigger(mock: &Arc<MockClient>, store: MockConfigurationStore) -> WebhookTrigger<MockConfigurationStore> {
    let sender = WebhookSender::new(WebhookHttpClient::new(Arc::clone(mock)));
    let cipher = Arc::new(AesGcmCipher::new(&[3u8; 32]).unwrap());
    let registry = HookRegistry::new()
        .with_handler(SimpleHookHandler::new(sender, cipher))
        .with_handler(SvnOnlyHandler);
    WebhookTrigger::new(Arc::new(WebhookContext::new(store, Arc::new(registry))))
}

fn repository() -> Repository {
    Repository::new("repo-1", "team", "app", "git")
}

fn event() -> PushEvent {
    PushEvent::new(
        repository(),
        vec![
            Changeset::new("c2", 2_000, Person::new("Arthur", "a@earth"), "second"),
            Changeset::new("c1", 1_000, Person::new("Ford", "f@betelgeuse"), "first"),
        ],
    )
}

fn stored(id: &str, hook: SimpleWebHook) -> StoredHook {
    HookEntry::new(id, hook).to_stored().unwrap()
}

fn repository_scope() -> Scope {
    Scope::Repository("repo-1".to_string())
}

fn urls(mock: &MockClient) -> Vec<String> {
    mock.captured_requests()
        .iter()
        .map(|request| request.url.to_string())
        .collect()
}

mod events {
    use super::*;

    #[tokio::test]
    async fn event_without_repository_does_nothing() {
        let mock = Arc::new(MockClient::success());
        let store = MockConfigurationStore::new()
            .with_hooks(Scope::Global, vec![stored("g", SimpleWebHook::new("https://g/"))]);
        let (logs, _guard) = CapturedLogs::install();

        let summary = trigger(&mock, store).handle(&PushEvent::default()).await;

        assert_eq!(summary, TriggerSummary::default());
        assert_eq!(mock.calls(), 0);
        assert!(logs.contents().contains("ERROR"));
    }

    #[tokio::test]
    async fn no_configuration_means_no_calls() {
        let mock = Arc::new(MockClient::success());

        let summary = trigger(&mock, MockConfigurationStore::new()).handle(&event()).await;

        assert_eq!(summary.total(), 0);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn global_hooks_fire_before_repository_hooks() {
        let mock = Arc::new(MockClient::success());
        let store = MockConfigurationStore::new()
            .with_hooks(
                Scope::Global,
                vec![stored("g", SimpleWebHook::new("https://global/{{repository.name}}"))],
            )
            .with_hooks(
                repository_scope(),
                vec![
                    stored("r1", SimpleWebHook::new("https://repo/{{last.id}}")),
                    stored("r2", SimpleWebHook::new("https://each/{{commit.id}}").every_commit()),
                ],
            );

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(
            summary,
            TriggerSummary {
                executed: 3,
                skipped: 0,
                failed: 0
            }
        );
        assert_eq!(
            urls(&mock),
            [
                "https://global/app",
                "https://repo/c2",
                "https://each/c2",
                "https://each/c1",
            ]
        );
    }

    #[tokio::test]
    async fn other_repositories_are_not_loaded() {
        let mock = Arc::new(MockClient::success());
        let store = MockConfigurationStore::new().with_hooks(
            Scope::Repository("someone-else".to_string()),
            vec![stored("x", SimpleWebHook::new("https://x/"))],
        );

        trigger(&mock, store).handle(&event()).await;

        assert_eq!(mock.calls(), 0);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn failing_hook_does_not_stop_the_rest() {
        let mock = Arc::new(MockClient::success());
        let broken = SimpleWebHook::new("https://broken/")
            .with_header(HeaderRecord::concealed("X-Token", DUMMY_SECRET));
        let store = MockConfigurationStore::new().with_hooks(
            repository_scope(),
            vec![
                stored("bad", broken),
                stored("good", SimpleWebHook::new("https://good/")),
            ],
        );
        let (logs, _guard) = CapturedLogs::install();

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.executed, 1);
        assert_eq!(urls(&mock), ["https://good/"]);
        let output = logs.contents();
        assert!(output.contains("webhook SimpleWebHook (bad) failed for repository team/app"));
        assert!(!output.contains(DUMMY_SECRET));
    }

    #[tokio::test]
    async fn failing_middle_hook_leaves_neighbours_running() {
        let mock = Arc::new(MockClient::success());
        let broken = SimpleWebHook::new("https://second/")
            .with_header(HeaderRecord::concealed("X-Token", DUMMY_SECRET));
        let store = MockConfigurationStore::new().with_hooks(
            repository_scope(),
            vec![
                stored("one", SimpleWebHook::new("https://first/")),
                stored("two", broken),
                stored("three", SimpleWebHook::new("https://third/")),
            ],
        );

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(summary.executed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(urls(&mock), ["https://first/", "https://third/"]);
    }

    #[tokio::test]
    async fn http_errors_count_as_executed() {
        let mock = Arc::new(MockClient::with_status(500));
        let store = MockConfigurationStore::new()
            .with_hooks(Scope::Global, vec![stored("g", SimpleWebHook::new("https://g/"))]);

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(summary.executed, 1);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_template_fails_only_its_hook() {
        let mock = Arc::new(MockClient::success());
        let store = MockConfigurationStore::new().with_hooks(
            Scope::Global,
            vec![
                stored("bad", SimpleWebHook::new("https://x/{{#each}}")),
                stored("good", SimpleWebHook::new("https://good/")),
            ],
        );

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(urls(&mock), ["https://good/"]);
    }

    #[tokio::test]
    async fn corrupted_document_is_treated_as_empty() {
        let mock = Arc::new(MockClient::success());
        let store = MockConfigurationStore::new()
            .with(
                Scope::Global,
                LoadResult::Corrupted {
                    reason: "expected value at line 1".to_string(),
                },
            )
            .with_hooks(repository_scope(), vec![stored("r", SimpleWebHook::new("https://r/"))]);
        let (logs, _guard) = CapturedLogs::install();

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(summary.executed, 1);
        assert_eq!(urls(&mock), ["https://r/"]);
        assert!(logs.contents().contains("expected value at line 1"));
    }
}

mod skipping {
    use super::*;

    #[tokio::test]
    async fn unknown_kind_is_skipped_with_warning() {
        let mock = Arc::new(MockClient::success());
        let store = MockConfigurationStore::new().with_hooks(
            Scope::Global,
            vec![StoredHook {
                id: "j".to_string(),
                name: "JenkinsHook".to_string(),
                configuration: json!({"job": "build"}),
            }],
        );
        let (logs, _guard) = CapturedLogs::install();

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(mock.calls(), 0);
        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains("no executor found for webhook of kind JenkinsHook"));
    }

    #[tokio::test]
    async fn unsupported_repository_is_skipped() {
        let mock = Arc::new(MockClient::success());
        let store = MockConfigurationStore::new().with_hooks(
            Scope::Global,
            vec![
                StoredHook {
                    id: "s".to_string(),
                    name: "SvnHook".to_string(),
                    configuration: json!({}),
                },
                stored("g", SimpleWebHook::new("https://g/")),
            ],
        );

        let summary = trigger(&mock, store).handle(&event()).await;

        assert_eq!(
            summary,
            TriggerSummary {
                executed: 1,
                skipped: 1,
                failed: 0
            }
        );
        assert_eq!(summary.to_string(), "1 executed, 1 skipped, 0 failed");
    }
}
