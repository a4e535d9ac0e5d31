//! Compiled URL expressions and their evaluation environment.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use handlebars::{
    Context, Handlebars, Helper, HelperResult, JsonRender, Output, RenderContext, no_escape,
};
use regex::{Captures, Regex};
use serde::Serialize;
use thiserror::Error;

use crate::repository::{Changeset, Repository};

use super::view::{EncodedChangeset, EncodedRepository};

/// Name under which the single template of an expression is registered.
const TEMPLATE_NAME: &str = "url";

/// Legacy `${path}` placeholder.
static LEGACY_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([^}]*?)\s*\}").expect("static regex is valid"));

/// Error raised while compiling or preparing a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template source is not valid.
    #[error("Invalid URL template '{template}': {reason}")]
    Syntax {
        /// The offending template
        template: String,
        /// Parser message
        reason: String,
    },

    /// A value could not be converted into template data.
    #[error("Failed to build template environment: {0}")]
    Environment(#[from] serde_json::Error),
}

/// Named variables visible to a URL template.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TemplateEnvironment {
    values: BTreeMap<&'static str, serde_json::Value>,
}

impl TemplateEnvironment {
    /// Creates an environment with only `repository` bound.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Environment`] if the view cannot be serialized.
    pub fn for_repository(repository: &Repository) -> Result<Self, TemplateError> {
        let mut env = Self::default();
        env.insert("repository", &EncodedRepository::new(repository))?;
        Ok(env)
    }

    /// Binds `name` to the encoded view of `changeset`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Environment`] if the view cannot be serialized.
    pub fn bind_changeset(
        &mut self,
        name: &'static str,
        changeset: &Changeset,
    ) -> Result<(), TemplateError> {
        self.insert(name, &EncodedChangeset::new(changeset))
    }

    fn insert(&mut self, name: &'static str, value: &impl Serialize) -> Result<(), TemplateError> {
        self.values.insert(name, serde_json::to_value(value)?);
        Ok(())
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }
}

/// A URL template compiled once and evaluated many times.
///
/// Placeholders use Handlebars syntax (`{{repository.name}}`). The older
/// `${repository.name}` form is accepted as well and may use method-style
/// segments such as `${commit.getAuthor().getName()}`.
#[derive(Debug)]
pub struct UrlExpression {
    source: String,
    registry: Handlebars<'static>,
}

impl UrlExpression {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the template does not parse.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        tracing::trace!("parsing url template: {template}");

        let source = rewrite_legacy_placeholders(template);

        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        registry.register_helper("join", Box::new(join_helper));
        registry
            .register_template_string(TEMPLATE_NAME, &source)
            .map_err(|e| TemplateError::Syntax {
                template: template.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { source, registry })
    }

    /// Returns the normalized template source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the template.
    ///
    /// Unbound or missing values render as the empty string. A render
    /// failure is logged and yields an empty result.
    #[must_use]
    pub fn evaluate(&self, env: &TemplateEnvironment) -> String {
        let url = self
            .registry
            .render(TEMPLATE_NAME, env)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to evaluate url template '{}': {e}", self.source);
                String::new()
            });

        tracing::trace!("result of expression evaluation: {url}");
        url
    }
}

/// Rewrites `${a.getB().c()}` into `{{a.b.c}}`.
fn rewrite_legacy_placeholders(template: &str) -> String {
    LEGACY_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let path = caps[1]
                .split('.')
                .map(|segment| normalize_segment(segment.trim()))
                .collect::<Vec<_>>()
                .join(".");
            format!("{{{{{path}}}}}")
        })
        .into_owned()
}

/// Maps a method-style segment to the field name it reads.
fn normalize_segment(segment: &str) -> String {
    let name = segment.strip_suffix("()").unwrap_or(segment);

    if let Some(rest) = name.strip_prefix("get") {
        let mut chars = rest.chars();
        if let Some(first) = chars.next() {
            if first.is_ascii_uppercase() {
                return first.to_ascii_lowercase().to_string() + chars.as_str();
            }
        }
    }

    name.to_string()
}

/// `{{join list "sep"}}`: joins list elements, separator defaults to `,`.
fn join_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let separator = h
        .param(1)
        .and_then(|p| p.value().as_str())
        .unwrap_or(",");

    let joined = h
        .param(0)
        .and_then(|p| p.value().as_array())
        .map(|values| {
            values
                .iter()
                .map(JsonRender::render)
                .collect::<Vec<_>>()
                .join(separator)
        })
        .unwrap_or_default();

    out.write(&joined)?;
    Ok(())
}
