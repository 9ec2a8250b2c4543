//! SQL template resolution.
//!
//! Dataset SQL is stored as a template with two placeholder forms, both of
//! which tolerate inner whitespace:
//!
//! - `{{param:KEY}}` is replaced by the runtime parameter `KEY`
//! - `{{dataset:ID}}` is replaced by `(<resolved SQL of dataset ID>)`
//!
//! Parameters are substituted before nested datasets are expanded, at every
//! level. Nested datasets see the same parameter map as their parent.
//! Expansion stops once the nesting depth exceeds the [`DepthGuard`]; the
//! template at that level is returned untouched and its references are
//! reported as unresolved.
//!
//! Values are spliced as text. Only string elements of list parameters are
//! quoted; everything else is trusted input.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, warn};

use crate::data::display_value;
use crate::dataset::{DatasetId, DatasetRepository, Params};

static PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*param:(\w+)\s*\}\}").unwrap());

static DATASET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*dataset:(\d+)\s*\}\}").unwrap());

/// Bound on nested dataset expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthGuard {
    /// Deepest level that is still expanded. The top-level template is level 0.
    pub max_depth: usize,
}

impl DepthGuard {
    pub const DEFAULT_MAX_DEPTH: usize = 5;

    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn exceeded(&self, depth: usize) -> bool {
        depth > self.max_depth
    }
}

impl Default for DepthGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DEPTH)
    }
}

/// Why a dataset reference was left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No dataset has this id.
    NotFound,
    /// The repository failed to answer.
    LookupFailed(String),
    /// The reference sits below the depth limit.
    DepthExceeded,
}

/// A `{{dataset:ID}}` placeholder that survived resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// The id as written in the template.
    pub id: String,
    /// Nesting level of the template that contains the reference.
    pub depth: usize,
    pub reason: UnresolvedReason,
}

/// Output of template resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedQuery {
    /// Final SQL text.
    pub sql: String,
    /// Deepest nesting level that was expanded.
    pub depth: usize,
    /// References left verbatim in `sql` or in truncated sub-templates.
    pub unresolved: Vec<UnresolvedReference>,
}

impl ResolvedQuery {
    /// True when every dataset reference was expanded.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Expands parameter and dataset placeholders against a repository.
pub struct TemplateResolver<'a> {
    repository: &'a dyn DatasetRepository,
    guard: DepthGuard,
}

#[derive(Default)]
struct ResolveState {
    depth: usize,
    unresolved: Vec<UnresolvedReference>,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(repository: &'a dyn DatasetRepository) -> Self {
        Self {
            repository,
            guard: DepthGuard::default(),
        }
    }

    pub fn with_guard(mut self, guard: DepthGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Resolve `template` with `params`.
    pub fn resolve(&self, template: &str, params: &Params) -> ResolvedQuery {
        let mut state = ResolveState::default();
        let sql = self.expand(template, params, 0, &mut state);
        debug!(depth = state.depth, sql = %sql, "resolved dataset template");
        ResolvedQuery {
            sql,
            depth: state.depth,
            unresolved: state.unresolved,
        }
    }

    fn expand(&self, template: &str, params: &Params, depth: usize, state: &mut ResolveState) -> String {
        if template.is_empty() {
            return String::new();
        }

        if self.guard.exceeded(depth) {
            let before = state.unresolved.len();
            state.unresolved.extend(DATASET_RE.captures_iter(template).map(|caps| {
                UnresolvedReference {
                    id: caps[1].to_string(),
                    depth,
                    reason: UnresolvedReason::DepthExceeded,
                }
            }));
            warn!(
                depth,
                max_depth = self.guard.max_depth,
                truncated = state.unresolved.len() - before,
                "dataset nesting exceeds depth limit, template left unexpanded"
            );
            return template.to_string();
        }
        state.depth = state.depth.max(depth);

        let substituted = PARAM_RE.replace_all(template, |caps: &Captures| {
            params.get(&caps[1]).map(render_param).unwrap_or_default()
        });

        DATASET_RE
            .replace_all(&substituted, |caps: &Captures| {
                let raw_id = &caps[1];
                let lookup = raw_id
                    .parse::<DatasetId>()
                    .map_err(|e| e.to_string())
                    .and_then(|id| self.repository.dataset(id).map_err(|e| e.to_string()));

                match lookup {
                    Ok(Some(dataset)) => {
                        format!("({})", self.expand(&dataset.sql, params, depth + 1, state))
                    }
                    Ok(None) => {
                        warn!(dataset_id = raw_id, depth, "referenced dataset not found");
                        state.unresolved.push(UnresolvedReference {
                            id: raw_id.to_string(),
                            depth,
                            reason: UnresolvedReason::NotFound,
                        });
                        caps[0].to_string()
                    }
                    Err(message) => {
                        warn!(dataset_id = raw_id, depth, error = %message, "dataset lookup failed");
                        state.unresolved.push(UnresolvedReference {
                            id: raw_id.to_string(),
                            depth,
                            reason: UnresolvedReason::LookupFailed(message),
                        });
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

/// Resolve `template` against `repository` with an explicit guard.
pub fn resolve(
    template: &str,
    params: &Params,
    repository: &dyn DatasetRepository,
    guard: DepthGuard,
) -> ResolvedQuery {
    TemplateResolver::new(repository)
        .with_guard(guard)
        .resolve(template, params)
}

/// Render one parameter value as SQL text.
///
/// Lists join with `,`; their string elements are single-quoted.
pub fn render_param(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => format!("'{}'", s.replace('\'', "''")),
                Value::Null => "NULL".to_string(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => display_value(other),
    }
}

/// True when `sql` still contains a placeholder of either kind.
pub fn has_placeholders(sql: &str) -> bool {
    PARAM_RE.is_match(sql) || DATASET_RE.is_match(sql)
}
