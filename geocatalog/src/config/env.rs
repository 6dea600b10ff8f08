//! Environment variables, read from the process or from a fixed map in tests.
//!
//! The process environment remembers which variables the config file
//! substituted, so that a variable shadowed by a config file setting can be
//! reported instead of silently ignored.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::ffi::OsString;

use subst::VariableMap;
use tracing::warn;

/// Source of environment variables for config substitution and CLI fallbacks.
pub trait Env<'a>: VariableMap<'a> {
    /// The raw value of `key`.
    fn lookup(&self, key: &str) -> Option<OsString>;

    /// Whether the config file referenced `key`.
    fn was_substituted(&self, key: &str) -> bool;

    /// The value of `key`. Values that are not valid unicode are skipped with a warning.
    #[must_use]
    fn get_env_str(&self, key: &str) -> Option<String> {
        self.lookup(key)?
            .into_string()
            .map_err(|raw| {
                warn!(
                    "Ignoring environment variable {key}, its value {} is not valid unicode",
                    raw.to_string_lossy()
                );
            })
            .ok()
    }

    /// Whether `key` is set, but the config file did not reference it.
    #[must_use]
    fn has_unused_var(&self, key: &str) -> bool {
        !self.was_substituted(key) && self.lookup(key).is_some()
    }
}

/// The process environment.
#[derive(Debug, Default)]
pub struct OsEnv {
    substituted: RefCell<BTreeSet<String>>,
}

impl Env<'_> for OsEnv {
    fn lookup(&self, key: &str) -> Option<OsString> {
        env::var_os(key)
    }

    fn was_substituted(&self, key: &str) -> bool {
        self.substituted.borrow().contains(key)
    }
}

impl<'a> VariableMap<'a> for OsEnv {
    type Value = String;

    fn get(&'a self, key: &str) -> Option<Self::Value> {
        self.substituted.borrow_mut().insert(key.to_string());
        self.get_env_str(key)
    }
}

/// A fixed set of variables. Nothing is tracked, every set variable counts as unused.
#[derive(Debug, Default)]
pub struct FauxEnv(pub HashMap<&'static str, OsString>);

impl<'a> VariableMap<'a> for FauxEnv {
    type Value = String;

    fn get(&'a self, key: &str) -> Option<Self::Value> {
        self.0.get(key).map(|v| v.to_string_lossy().into_owned())
    }
}

impl Env<'_> for FauxEnv {
    fn lookup(&self, key: &str) -> Option<OsString> {
        self.0.get(key).cloned()
    }

    fn was_substituted(&self, _key: &str) -> bool {
        false
    }
}
