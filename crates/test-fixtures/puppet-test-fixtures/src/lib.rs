//! Shared JSON fixtures for tests and benches, resolved through `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    motions: HashMap<String, MotionEntry>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MotionEntry {
    Path(String),
    Detailed {
        path: String,
        /// Expected load failure kind for negative fixtures.
        #[serde(default)]
        expect_error: Option<String>,
    },
}

impl MotionEntry {
    fn as_path(&self) -> &str {
        match self {
            MotionEntry::Path(path) => path,
            MotionEntry::Detailed { path, .. } => path,
        }
    }

    fn expect_error(&self) -> Option<&str> {
        match self {
            MotionEntry::Path(_) => None,
            MotionEntry::Detailed { expect_error, .. } => expect_error.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod motions {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.motions.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.motions, "motion", name)?;
        read_to_string(entry.as_path())
    }

    /// The decoded generic tree for a motion fixture.
    pub fn tree(name: &str) -> Result<serde_json::Value> {
        let entry = lookup(&MANIFEST.motions, "motion", name)?;
        load_json(entry.as_path())
    }

    /// Expected load error kind (`"empty"`, `"malformed"`, `"invalid_timing"`) for
    /// fixtures that must fail to load.
    pub fn expected_error(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.motions, "motion", name)?;
        Ok(entry.expect_error().map(str::to_string))
    }
}

pub mod configs {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        super::load_json(rel)
    }
}
