//! URL templating over commit and repository data.
//!
//! This module provides:
//! - URL encoding of free-text values ([`encode`])
//! - Encoded, read-only views exposed to templates ([`EncodedChangeset`],
//!   [`EncodedPerson`], [`EncodedRepository`], [`EncodedStringList`])
//! - Compiled URL expressions ([`UrlExpression`]) evaluated against a
//!   [`TemplateEnvironment`]

mod encoder;
mod expression;
mod view;


pub use encoder::{encode, encode_all};
pub use expression::{TemplateEnvironment, TemplateError, UrlExpression};
pub use view::{EncodedChangeset, EncodedPerson, EncodedRepository, EncodedStringList};
