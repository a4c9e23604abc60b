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
    descriptors: HashMap<String, DescriptorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptorEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        artboard: Option<String>,
    },
}

impl DescriptorEntry {
    fn as_path(&self) -> &str {
        match self {
            DescriptorEntry::Path(path) => path,
            DescriptorEntry::Detailed { path, .. } => path,
        }
    }

    fn artboard(&self) -> Option<&str> {
        match self {
            DescriptorEntry::Path(_) => None,
            DescriptorEntry::Detailed { artboard, .. } => artboard.as_deref(),
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

/// Static document descriptors as emitted by the design-time parser.
pub mod descriptors {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.descriptors.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.descriptors, "descriptor", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.descriptors, "descriptor", name)?;
        super::load_json(entry.as_path())
    }

    /// Artboard the fixture is meant to be opened on, when the manifest says.
    pub fn artboard(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.descriptors, "descriptor", name)?;
        Ok(entry.artboard().map(str::to_string))
    }
}
