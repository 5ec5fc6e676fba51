//! Data model for ephemeral key/value operations.

use std::time::Duration;

/// Identifies a kind of ephemeral data, optionally qualified by a dynamic
/// component that distinguishes concurrent values under the same name
/// (e.g. one auth token among many issued to an account).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EphemeralKey {
    name: String,
    dynamic_component: Option<String>,
}

impl EphemeralKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dynamic_component: None,
        }
    }

    pub fn dynamic(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dynamic_component: Some(component.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dynamic_component(&self) -> Option<&str> {
        self.dynamic_component.as_deref()
    }
}

/// Ordered path identifying the entity a piece of ephemeral data belongs
/// to. By convention `segments[0]` is the entity kind (`account`, `domain`,
/// `cos`); the remaining segments are opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralLocation {
    segments: Vec<String>,
}

impl EphemeralLocation {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn entity_kind(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }
}

/// Time unit for an [`Expiration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// Relative lifetime for a written value, convertible to the TTL the
/// backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiration {
    amount: u64,
    unit: TimeUnit,
}

impl Expiration {
    pub fn new(amount: u64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn to_duration(self) -> Duration {
        match self.unit {
            TimeUnit::Milliseconds => Duration::from_millis(self.amount),
            TimeUnit::Seconds => Duration::from_secs(self.amount),
            TimeUnit::Minutes => Duration::from_secs(self.amount.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(self.amount.saturating_mul(3_600)),
            TimeUnit::Days => Duration::from_secs(self.amount.saturating_mul(86_400)),
        }
    }
}

/// One write: a key, the raw value, and an optional expiration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralInput {
    key: EphemeralKey,
    value: String,
    expiration: Option<Expiration>,
}

impl EphemeralInput {
    pub fn new(key: EphemeralKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
            expiration: None,
        }
    }

    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn key(&self) -> &EphemeralKey {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expiration(&self) -> Option<Expiration> {
        self.expiration
    }
}

/// Outcome of a read: zero or more values for the requested key. An absent
/// or expired backend key yields an empty result, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralResult {
    key: EphemeralKey,
    values: Vec<String>,
}

impl EphemeralResult {
    pub fn empty(key: EphemeralKey) -> Self {
        Self {
            key,
            values: Vec::new(),
        }
    }

    pub fn single(key: EphemeralKey, value: impl Into<String>) -> Self {
        Self {
            key,
            values: vec![value.into()],
        }
    }

    pub fn new(key: EphemeralKey, values: Vec<String>) -> Self {
        Self { key, values }
    }

    pub fn key(&self) -> &EphemeralKey {
        &self.key
    }

    /// First value, if any.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
