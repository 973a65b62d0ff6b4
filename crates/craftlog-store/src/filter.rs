//! Injection-safe document filters.
//!
//! User-supplied filter values never reach the backend as patterns: a
//! [`Condition::Matches`] stores the raw literal and the escaped,
//! case-insensitive regex is built from `regex::escape` at compile time of
//! the query. Against boolean or numeric fields the literal is coerced
//! instead of pattern-matched.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub enum Condition {
    /// Exact value equality.
    Eq(JsonValue),
    /// Case-insensitive substring match of the literal (regex metacharacters
    /// escaped before pattern construction).
    Matches(String),
}

/// A conjunction of per-field conditions.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn eq(mut self, field: &str, value: impl Serialize) -> Self {
        // Uuid, bool, numbers and strings all serialize infallibly.
        let value = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        self.conditions.push((field.to_string(), Condition::Eq(value)));
        self
    }

    pub fn matches(mut self, field: &str, literal: &str) -> Self {
        self.conditions
            .push((field.to_string(), Condition::Matches(literal.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Compile once per query; `Matches` literals are escaped here.
    pub(crate) fn compile(&self) -> StoreResult<CompiledFilter> {
        let mut conditions = Vec::with_capacity(self.conditions.len());
        for (field, condition) in &self.conditions {
            let compiled = match condition {
                Condition::Eq(value) => CompiledCondition::Eq(value.clone()),
                Condition::Matches(literal) => {
                    let pattern = RegexBuilder::new(&regex::escape(literal))
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| StoreError::InvalidFilter(e.to_string()))?;
                    CompiledCondition::Matches {
                        pattern,
                        literal: literal.clone(),
                    }
                }
            };
            conditions.push((field.clone(), compiled));
        }
        Ok(CompiledFilter { conditions })
    }
}

pub(crate) enum CompiledCondition {
    Eq(JsonValue),
    Matches { pattern: Regex, literal: String },
}

pub(crate) struct CompiledFilter {
    conditions: Vec<(String, CompiledCondition)>,
}

impl CompiledFilter {
    pub(crate) fn matches(&self, doc: &JsonValue) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            let value = doc.get(field);
            match condition {
                CompiledCondition::Eq(expected) => value == Some(expected),
                CompiledCondition::Matches { pattern, literal } => match value {
                    Some(JsonValue::String(s)) => pattern.is_match(s),
                    Some(JsonValue::Bool(b)) => *b == matches!(literal.as_str(), "true" | "1"),
                    Some(JsonValue::Number(n)) => {
                        matches!((literal.parse::<f64>(), n.as_f64()), (Ok(a), Some(b)) if a == b)
                    }
                    _ => false,
                },
            }
        })
    }
}
