//! Injector tree configuration.
//!
//! Settings come from code, from environment variables, or (with the
//! `config` feature) from JSON.

use std::collections::BTreeMap;
use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::scope::Scope;

/// Default bound on nested resolutions per thread.
///
/// Small enough that a self-dependent provider fails with `DepthExceeded`
/// on a 2 MiB thread stack in unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Settings shared by every injector of a tree.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Injector, InjectorConfig, ScopeRequest};
///
/// let config = InjectorConfig::default().with_tier("tenant", 2).with_tier("request", 3);
/// let root = Injector::builder().config(config).build().unwrap();
///
/// let request = root.create_child(vec![], ScopeRequest::named("request")).unwrap();
/// assert_eq!(request.scope().id(), 3);
/// assert!(root.create_child(vec![], ScopeRequest::named("unknown")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InjectorConfig {
    /// Maximum nesting of resolution calls on one thread
    pub max_resolution_depth: usize,
    /// Scope level of root injectors built without an explicit request
    pub root_scope: u32,
    /// Named scope levels
    pub tiers: BTreeMap<String, u32>,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        let mut tiers = BTreeMap::new();
        tiers.insert("singleton".to_string(), 1);
        tiers.insert("scoped".to_string(), 2);
        Self { max_resolution_depth: DEFAULT_MAX_DEPTH, root_scope: 1, tiers }
    }
}

impl InjectorConfig {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    pub fn with_root_scope(mut self, level: u32) -> Self {
        self.root_scope = level;
        self
    }

    pub fn with_tier(mut self, name: impl Into<String>, level: u32) -> Self {
        self.tiers.insert(name.into(), level);
        self
    }

    /// Scope registered under `name`.
    pub fn tier(&self, name: &str) -> DiResult<Scope> {
        let level = self
            .tiers
            .get(name)
            .ok_or_else(|| DiError::Config(format!("unknown scope tier {:?}", name)))?;
        Scope::new(*level)
    }

    /// Checks that every level is usable.
    pub fn validate(&self) -> DiResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(DiError::Config("max_resolution_depth must be positive".into()));
        }
        if self.root_scope < 1 {
            return Err(DiError::Config("root_scope must be at least 1".into()));
        }
        if let Some((name, _)) = self.tiers.iter().find(|(_, level)| **level < 1) {
            return Err(DiError::Config(format!("tier {:?} must be at least 1", name)));
        }
        Ok(())
    }

    /// Reads `{PREFIX}_MAX_RESOLUTION_DEPTH`, `{PREFIX}_ROOT_SCOPE` and
    /// `{PREFIX}_TIERS` (`name=level` pairs separated by commas) on top of
    /// the defaults.
    pub fn from_env(prefix: &str) -> DiResult<Self> {
        let prefix = prefix.to_uppercase();
        let var = |key: &str| env::var(format!("{}_{}", prefix, key)).ok();
        let mut config = InjectorConfig::default();

        if let Some(depth) = var("MAX_RESOLUTION_DEPTH") {
            config.max_resolution_depth = parse_number(&depth, "MAX_RESOLUTION_DEPTH")?;
        }
        if let Some(level) = var("ROOT_SCOPE") {
            config.root_scope = parse_number(&level, "ROOT_SCOPE")?;
        }
        if let Some(tiers) = var("TIERS") {
            for pair in tiers.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let (name, level) = pair
                    .split_once('=')
                    .ok_or_else(|| DiError::Config(format!("malformed tier {:?}", pair)))?;
                config.tiers.insert(name.trim().to_string(), parse_number(level.trim(), name)?);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON document. Missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        let config: InjectorConfig = serde_json::from_str(json)
            .map_err(|e| DiError::Config(format!("invalid JSON configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> DiResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DiError::Config(format!("{} is not a valid number: {:?}", key, value)))
}
