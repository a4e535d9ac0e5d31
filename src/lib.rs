//! push-hooks: webhooks for repository pushes
//!
//! A library for resolving the hooks configured for a repository,
//! rendering their URL templates from commit data and delivering
//! the resulting HTTP calls.

pub mod config;
pub mod context;
pub mod hooks;
pub mod repository;
pub mod secret;
pub mod service;
pub mod store;
pub mod template;
pub mod trigger;
pub mod webhook;

#[cfg(test)]
mod trigger_tests;
