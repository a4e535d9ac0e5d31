//! Hook configurations and the handlers that execute them.
//!
//! This module provides:
//! - The configuration model ([`HookEntry`], [`HookConfigurationSet`])
//! - The handler registry ([`HookRegistry`], [`HookHandler`], [`HookExecutor`])
//! - The built-in URL hook ([`SimpleWebHook`], [`SimpleHookHandler`])
//! - Preparing edited sets for storage ([`ConfigurationUpdater`])

mod config;
mod error;
mod registry;
mod simple;
mod update;

#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod update_tests;

pub use config::{HookConfiguration, HookConfigurationSet, HookEntry, UnknownHook};
pub use error::{DispatchError, HookError};
pub use registry::{HookExecutor, HookHandler, HookRegistry, NoopHandler};
pub use simple::{DUMMY_SECRET, SimpleHookHandler, SimpleWebHook};
pub use update::ConfigurationUpdater;
