use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use crate::model::CatalogEntry;

/// Failure reported by a lookup source. Its `Display` is the raw message, which
/// is what ends up in the error row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    message: String,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LookupError {}

pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<String>, LookupError>> + Send + 'a>>;

pub trait Lookup: Send + Sync {
    fn lookup<'a>(&'a self, query: &'a str) -> LookupFuture<'a>;
}

impl<F, Fut> Lookup for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<String>, LookupError>> + Send + 'static,
{
    fn lookup<'a>(&'a self, query: &'a str) -> LookupFuture<'a> {
        Box::pin(self(query.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct CatalogLookup {
    entries: Vec<CatalogEntry>,
    limit: usize,
    latency: Duration,
}

impl CatalogLookup {
    pub fn new(entries: Vec<CatalogEntry>, limit: usize) -> Self {
        Self {
            entries,
            limit,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn from_path(path: &Path, limit: usize) -> Result<Self, std::io::Error> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::new(parse_catalog(&raw), limit))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lookup for CatalogLookup {
    fn lookup<'a>(&'a self, query: &'a str) -> LookupFuture<'a> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            Ok(crate::search::rank(&self.entries, query, self.limit))
        })
    }
}

/// One entry per line, optionally followed by a tab and an integer weight.
/// Blank lines and `#` comments are skipped.
pub fn parse_catalog(raw: &str) -> Vec<CatalogEntry> {
    raw.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|line| match line.rsplit_once('\t') {
            Some((text, weight)) => match weight.trim().parse::<u32>() {
                Ok(weight) => CatalogEntry::weighted(text.trim().to_string(), weight),
                Err(_) => CatalogEntry::new(line.trim()),
            },
            None => CatalogEntry::new(line.trim()),
        })
        .collect()
}

pub fn default_catalog() -> Vec<CatalogEntry> {
    [
        "apple", "apricot", "avocado", "banana", "band", "bandana", "blackberry", "blueberry",
        "cherry", "coconut", "cranberry", "date", "dragonfruit", "fig", "grape", "grapefruit",
        "guava", "kiwi", "lemon", "lime", "lychee", "mango", "melon", "nectarine", "orange",
        "papaya", "peach", "pear", "pineapple", "plum", "pomegranate", "raspberry",
        "strawberry", "tangerine", "watermelon",
    ]
    .into_iter()
    .map(CatalogEntry::new)
    .collect()
}

#[derive(Debug, Clone)]
struct Script {
    delay: Duration,
    response: Result<Vec<String>, LookupError>,
}

/// Lookup double answering from a fixed script. Unscripted queries resolve to
/// no matches immediately. Every call is recorded in order.
#[derive(Debug, Default)]
pub struct ScriptedLookup {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub fn respond<I, S>(self, query: &str, matches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.respond_after(query, Duration::ZERO, matches)
    }

    pub fn respond_after<I, S>(mut self, query: &str, delay: Duration, matches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let response = Ok(matches.into_iter().map(Into::into).collect());
        self.scripts
            .insert(query.to_string(), Script { delay, response });
        self
    }

    pub fn fail(self, query: &str, message: &str) -> Self {
        self.fail_after(query, Duration::ZERO, message)
    }

    pub fn fail_after(mut self, query: &str, delay: Duration, message: &str) -> Self {
        let response = Err(LookupError::new(message));
        self.scripts
            .insert(query.to_string(), Script { delay, response });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Lookup for ScriptedLookup {
    fn lookup<'a>(&'a self, query: &'a str) -> LookupFuture<'a> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(query.to_string()),
            Err(poisoned) => poisoned.into_inner().push(query.to_string()),
        }
        let script = self.scripts.get(query).cloned();

        Box::pin(async move {
            let Some(script) = script else {
                return Ok(Vec::new());
            };
            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }
            script.response
        })
    }
}
