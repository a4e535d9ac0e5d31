//! Webhook layer for sending HTTP requests to external services.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Headers with deferred or content-dependent values ([`ExecutionHeader`])
//! - Request building and response classification ([`WebhookHttpClient`])
//! - Sending prepared calls ([`WebhookSender`], [`WebhookExecution`])

mod client;
mod dispatch;
mod error;
mod execution;
mod header;
mod http;
mod marshaller;
mod sender;

#[cfg(test)]
mod client_tests;
#[cfg(test)]
mod sender_tests;
#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ClientOptions, ProxySettings, ReqwestClient};
pub use dispatch::{DEFAULT_USER_AGENT, Delivery, WebhookHttpClient, WebhookRequest, classify};
pub use error::{BoxError, HeaderError, HttpError};
pub use execution::{HttpMethod, PrepareFn, WebhookExecution};
pub use header::{ContentFn, ExecutionHeader, HeaderRecord, HeaderValueSource, Supplier};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use marshaller::{JsonMarshaller, PayloadMarshaller};
pub use sender::WebhookSender;
