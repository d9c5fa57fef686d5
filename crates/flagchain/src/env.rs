//! Layered environment lookups.
//!
//! An [`Env`] is a dictionary with an optional parent; lookups that miss fall
//! through to the parent. Typical chains put an env file in front of the
//! process environment:
//!
//! ```no_run
//! use flagchain::Env;
//!
//! let env = Env::file(Some(Env::system(None)), "deploy.env")?;
//! let region = env.get_or("REGION", "eu-west-1");
//! # Ok::<(), flagchain::EnvError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use thiserror::Error;

use crate::config::{ConfigError, read_dotenv_file, read_environ_file};
use crate::value::{FlagValue, ValueError, ValueResult};

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("require env var {key}: {message}")]
    Missing { key: String, message: String },
    #[error(transparent)]
    File(#[from] ConfigError),
}

/// How the caller intends to use a looked-up key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMode {
    Optional,
    Required,
    /// The caller falls back to these values when the key is missing.
    Default(Vec<String>),
}

/// A key to values dictionary.
pub trait Lookup {
    fn lookup(&self, key: &str, mode: &LookupMode) -> Option<&[String]>;

    /// Known keys, sorted.
    fn keys(&self) -> Vec<String>;
}

/// Sorted multi-map of environment variables.
///
/// As a flag value each `KEY=VALUE` argument appends to `KEY`; an argument
/// without `=` stores an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap(BTreeMap<String, Vec<String>>);

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl FromIterator<(String, String)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Lookup for EnvMap {
    fn lookup(&self, key: &str, _mode: &LookupMode) -> Option<&[String]> {
        self.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

impl FlagValue for EnvMap {
    fn set(&mut self, text: &str) -> ValueResult<()> {
        let (key, value) = text.split_once('=').unwrap_or((text, ""));
        if key.is_empty() {
            return Err(ValueError::Invalid(format!("missing key in {text:?}")));
        }
        self.insert(key, value);
        Ok(())
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (key, values) in &self.0 {
            for value in values {
                out.push_str(&format!("{key}={value:?}\n"));
            }
        }
        out
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// One key requested through a [`CapturingEnvMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvUsage {
    pub key: String,
    pub default: Vec<String>,
    pub required: bool,
}

/// A dictionary that never answers but remembers every key asked for.
///
/// Put one at the front of an [`Env`] chain to discover which variables a
/// program reads.
#[derive(Debug, Default)]
pub struct CapturingEnvMap {
    usages: Mutex<Vec<EnvUsage>>,
}

impl CapturingEnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usages(&self) -> Vec<EnvUsage> {
        self.usages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A template environment for the captured keys: defaults where given,
    /// `required_value` for required keys, empty otherwise. Duplicate pairs
    /// are dropped.
    pub fn usages_as_environ(&self, required_value: &str) -> Vec<(String, String)> {
        let mut env: Vec<(String, String)> = Vec::new();
        let mut add = |key: &str, value: &str| {
            let pair = (key.to_string(), value.to_string());
            if !env.contains(&pair) {
                env.push(pair);
            }
        };
        for usage in self.usages() {
            if !usage.default.is_empty() {
                for value in &usage.default {
                    add(&usage.key, value);
                }
            } else if usage.required {
                add(&usage.key, required_value);
            } else {
                add(&usage.key, "");
            }
        }
        env
    }
}

impl Lookup for CapturingEnvMap {
    fn lookup(&self, key: &str, mode: &LookupMode) -> Option<&[String]> {
        let usage = match mode {
            LookupMode::Optional => EnvUsage {
                key: key.to_string(),
                default: Vec::new(),
                required: false,
            },
            LookupMode::Required => EnvUsage {
                key: key.to_string(),
                default: Vec::new(),
                required: true,
            },
            LookupMode::Default(values) => EnvUsage {
                key: key.to_string(),
                default: values.clone(),
                required: false,
            },
        };
        self.usages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(usage);
        None
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}

static SYSTEM: OnceLock<Arc<EnvMap>> = OnceLock::new();

fn system_env() -> Arc<EnvMap> {
    SYSTEM
        .get_or_init(|| {
            let map: EnvMap = std::env::vars_os()
                .map(|(key, value)| {
                    (
                        key.to_string_lossy().into_owned(),
                        value.to_string_lossy().into_owned(),
                    )
                })
                .collect();
            tracing::trace!("process environment captured");
            Arc::new(map)
        })
        .clone()
}

/// A dictionary layered over an optional parent environment.
#[derive(Clone)]
pub struct Env {
    parent: Option<Arc<Env>>,
    dict: Arc<dyn Lookup + Send + Sync>,
}

impl Env {
    pub fn new(parent: Option<Env>, dict: impl Lookup + Send + Sync + 'static) -> Self {
        Self::shared(parent, Arc::new(dict))
    }

    /// Layer a dictionary the caller keeps a handle to, e.g. a
    /// [`CapturingEnvMap`] inspected afterwards.
    pub fn shared(parent: Option<Env>, dict: Arc<dyn Lookup + Send + Sync>) -> Self {
        Self {
            parent: parent.map(Arc::new),
            dict,
        }
    }

    /// The process environment, captured once per process.
    pub fn system(parent: Option<Env>) -> Self {
        Self::shared(parent, system_env())
    }

    /// Variables from an env file.
    pub fn file(parent: Option<Env>, path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let map: EnvMap = read_environ_file(path)?.into_iter().collect();
        tracing::debug!(path = %path.display(), keys = map.len(), "env file loaded");
        Ok(Self::new(parent, map))
    }

    /// Variables from a dotenv file, unquoted and expanded by `dotenvy`.
    pub fn dotenv_file(parent: Option<Env>, path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let map: EnvMap = read_dotenv_file(path)?.into_iter().collect();
        tracing::debug!(path = %path.display(), keys = map.len(), "dotenv file loaded");
        Ok(Self::new(parent, map))
    }

    pub fn parent(&self) -> Option<&Env> {
        self.parent.as_deref()
    }

    /// Every value of `key`, from the nearest layer that has it.
    pub fn lookup_many(&self, key: &str, mode: &LookupMode) -> Option<&[String]> {
        match self.dict.lookup(key, mode) {
            Some(values) => Some(values),
            None => self.parent.as_deref()?.lookup_many(key, mode),
        }
    }

    /// First value of `key`.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.first(key, &LookupMode::Optional)
    }

    pub fn get(&self, key: &str) -> String {
        self.get_or(key, "")
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        let mode = LookupMode::Default(vec![default.to_string()]);
        self.first(key, &mode).unwrap_or(default).to_string()
    }

    pub fn get_or_error(&self, key: &str, message: &str) -> Result<String, EnvError> {
        self.first(key, &LookupMode::Required)
            .map(str::to_string)
            .ok_or_else(|| EnvError::Missing {
                key: key.to_string(),
                message: message.to_string(),
            })
    }

    /// Keys of every layer, sorted and de-duplicated.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.dict.keys().into_iter().collect();
        if let Some(parent) = self.parent() {
            keys.extend(parent.keys());
        }
        keys.into_iter().collect()
    }

    pub fn map(&self) -> BTreeMap<String, Vec<String>> {
        self.keys()
            .into_iter()
            .filter_map(|key| {
                let values = self.lookup_many(&key, &LookupMode::Optional)?.to_vec();
                Some((key, values))
            })
            .collect()
    }

    /// `(key, value)` pairs sorted by key, one per value.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, values) in self.map() {
            for value in values {
                pairs.push((key.clone(), value));
            }
        }
        pairs
    }

    fn first(&self, key: &str, mode: &LookupMode) -> Option<&str> {
        self.lookup_many(key, mode)?.first().map(String::as_str)
    }
}
