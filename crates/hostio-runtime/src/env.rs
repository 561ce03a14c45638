//! Environment variables of the current process.

use std::collections::BTreeMap;

use hostio_core::{BridgeError, BridgeResult};

/// Accessor for the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl Env {
    pub fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        validate_key("env.get", key)?;
        Ok(std::env::var(key).ok())
    }

    pub fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        validate_key("env.set", key)?;
        if value.contains('\0') {
            return Err(BridgeError::invalid_argument(
                "env.set",
                "value contains a NUL byte",
            ));
        }
        std::env::set_var(key, value);
        tracing::debug!(key, "env set");
        Ok(())
    }

    pub fn delete(&self, key: &str) -> BridgeResult<()> {
        validate_key("env.delete", key)?;
        std::env::remove_var(key);
        Ok(())
    }

    pub fn has(&self, key: &str) -> BridgeResult<bool> {
        validate_key("env.has", key)?;
        Ok(std::env::var_os(key).is_some())
    }

    /// Snapshot of every variable whose name and value are valid UTF-8.
    pub fn to_object(&self) -> BTreeMap<String, String> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

fn validate_key(op: &str, key: &str) -> BridgeResult<()> {
    if key.is_empty() {
        return Err(BridgeError::invalid_argument(op, "key is empty"));
    }
    if key.contains(['=', '\0']) {
        return Err(BridgeError::invalid_argument(
            op,
            format!("key {key:?} contains '=' or NUL"),
        ));
    }
    Ok(())
}
