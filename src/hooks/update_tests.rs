//! Tests for preparing edited sets for storage.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde_json::json;

use super::{
    ConfigurationUpdater, DUMMY_SECRET, HookConfigurationSet, HookEntry, HookRegistry,
    SimpleHookHandler, SimpleWebHook, UnknownHook,
};
use crate::secret::{AesGcmCipher, SecretCipher};
use crate::webhook::test_support::MockClient;
use crate::webhook::{HeaderRecord, WebhookHttpClient, WebhookSender};

fn cipher() -> Arc<AesGcmCipher> {
    Arc::new(AesGcmCipher::new(&[5u8; 32]).unwrap())
}

fn updater(cipher: Arc<AesGcmCipher>) -> ConfigurationUpdater {
    let sender = WebhookSender::new(WebhookHttpClient::new(MockClient::success()));
    let registry = HookRegistry::new().with_handler(SimpleHookHandler::new(sender, cipher));
    ConfigurationUpdater::new(Arc::new(registry))
}

fn token_hook(value: &str) -> SimpleWebHook {
    SimpleWebHook::new("https://ci/push")
        .with_header(HeaderRecord::plain("X-Env", "prod"))
        .with_header(HeaderRecord::concealed("X-Token", value))
}

fn simple(entry: &HookEntry) -> &SimpleWebHook {
    entry
        .configuration()
        .downcast_ref::<SimpleWebHook>()
        .unwrap()
}

mod ids {
    use super::*;

    #[test]
    fn new_entries_get_a_uuid() {
        let updater = updater(cipher());
        let new = HookConfigurationSet::new(vec![
            HookEntry::unassigned(SimpleWebHook::new("https://a/")),
            HookEntry::unassigned(SimpleWebHook::new("https://b/")),
        ]);

        let updated = updater
            .update(&HookConfigurationSet::default(), new)
            .unwrap();

        let ids: Vec<_> = updated.iter().map(HookEntry::id).collect();
        assert!(ids.iter().all(|id| uuid::Uuid::parse_str(id).is_ok()));
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn existing_ids_are_kept() {
        let updater = updater(cipher());
        let new = HookConfigurationSet::new(vec![HookEntry::new(
            "keep-me",
            SimpleWebHook::new("https://a/"),
        )]);

        let updated = updater
            .update(&HookConfigurationSet::default(), new)
            .unwrap();

        assert_eq!(updated.entries()[0].id(), "keep-me");
    }

    #[test]
    fn unknown_kinds_pass_through() {
        let updater = updater(cipher());
        let opaque = UnknownHook::new("JenkinsHook", json!({"token": "x"}));
        let new = HookConfigurationSet::new(vec![HookEntry::new("j", opaque.clone())]);

        let updated = updater
            .update(&HookConfigurationSet::default(), new)
            .unwrap();

        assert_eq!(updated, HookConfigurationSet::new(vec![HookEntry::new("j", opaque)]));
    }
}

mod secrets {
    use super::*;

    #[test]
    fn fresh_secret_is_encrypted() {
        let cipher = cipher();
        let updater = updater(Arc::clone(&cipher));
        let new = HookConfigurationSet::new(vec![HookEntry::unassigned(token_hook("s3cret"))]);

        let updated = updater
            .update(&HookConfigurationSet::default(), new)
            .unwrap();

        let headers = &simple(&updated.entries()[0]).headers;
        assert_eq!(headers[0].value, "prod");
        let decrypted = cipher.decrypt(&headers[1].value).unwrap();
        assert_eq!(decrypted.expose_secret(), "s3cret");
    }

    #[test]
    fn placeholder_restores_stored_secret() {
        let cipher = cipher();
        let updater = updater(Arc::clone(&cipher));
        let stored = cipher.encrypt("s3cret").unwrap();
        let old = HookConfigurationSet::new(vec![HookEntry::new("a", token_hook(&stored))]);
        let new = HookConfigurationSet::new(vec![HookEntry::new("a", token_hook(DUMMY_SECRET))]);

        let updated = updater.update(&old, new).unwrap();

        assert_eq!(simple(&updated.entries()[0]).headers[1].value, stored);
    }

    #[test]
    fn placeholder_only_matches_same_id() {
        let cipher = cipher();
        let updater = updater(Arc::clone(&cipher));
        let stored = cipher.encrypt("s3cret").unwrap();
        let old = HookConfigurationSet::new(vec![HookEntry::new("a", token_hook(&stored))]);
        let new = HookConfigurationSet::new(vec![HookEntry::new("b", token_hook(DUMMY_SECRET))]);

        let updated = updater.update(&old, new).unwrap();

        assert_eq!(simple(&updated.entries()[0]).headers[1].value, DUMMY_SECRET);
    }

    #[test]
    fn changed_secret_replaces_stored_one() {
        let cipher = cipher();
        let updater = updater(Arc::clone(&cipher));
        let stored = cipher.encrypt("old").unwrap();
        let old = HookConfigurationSet::new(vec![HookEntry::new("a", token_hook(&stored))]);
        let new = HookConfigurationSet::new(vec![HookEntry::new("a", token_hook("new"))]);

        let updated = updater.update(&old, new).unwrap();

        let value = &simple(&updated.entries()[0]).headers[1].value;
        assert_eq!(cipher.decrypt(value).unwrap().expose_secret(), "new");
    }

    #[test]
    fn masked_copy_hides_concealed_values() {
        let updater = updater(cipher());
        let set = HookConfigurationSet::new(vec![
            HookEntry::new("a", token_hook("ciphertext")),
            HookEntry::new("u", UnknownHook::new("Other", json!({"k": "v"}))),
        ]);

        let masked = updater.masked(&set);

        let headers = &simple(&masked.entries()[0]).headers;
        assert_eq!(headers[0].value, "prod");
        assert_eq!(headers[1].value, DUMMY_SECRET);
        assert_eq!(masked.entries()[1], set.entries()[1]);
        assert_eq!(simple(&set.entries()[0]).headers[1].value, "ciphertext");
    }
}
