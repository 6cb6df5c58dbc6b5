//! Obfuscator configuration.
//!
//! Loaded from `moonveil.toml`. Every field has a default so an empty file
//! (or no file at all) yields the full pipeline with three decoy blocks and
//! the stock protected-global list.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscatorConfig {
    /// Seed for the run's random stream. Unset means a fresh entropy seed
    /// per run; set it to make output reproducible.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Decoy blocks added by the control-flow flattener.
    #[serde(default = "default_decoy_blocks")]
    pub decoy_blocks: usize,

    #[serde(default)]
    pub passes: PassConfig,

    #[serde(default)]
    pub globals: GlobalsConfig,
}

impl Default for ObfuscatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            decoy_blocks: default_decoy_blocks(),
            passes: PassConfig::default(),
            globals: GlobalsConfig::default(),
        }
    }
}

impl ObfuscatorConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Per-pass switches. Passes always run in their fixed pipeline order;
/// these only choose which ones participate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassConfig {
    #[serde(default = "default_true")]
    pub strip_comments: bool,
    #[serde(default = "default_true")]
    pub invert_conditionals: bool,
    #[serde(default = "default_true")]
    pub inject_predicates: bool,
    #[serde(default = "default_true")]
    pub flatten_control_flow: bool,
    #[serde(default = "default_true")]
    pub mangle_booleans: bool,
    #[serde(default = "default_true")]
    pub mangle_numbers: bool,
    #[serde(default = "default_true")]
    pub encrypt_strings: bool,
    #[serde(default = "default_true")]
    pub virtualize_globals: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            strip_comments: true,
            invert_conditionals: true,
            inject_predicates: true,
            flatten_control_flow: true,
            mangle_booleans: true,
            mangle_numbers: true,
            encrypt_strings: true,
            virtualize_globals: true,
        }
    }
}

/// Which global names get virtualized, and how aggressively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalsConfig {
    /// Names eligible for rewriting into environment-proxy lookups.
    #[serde(default = "default_protected_globals")]
    pub protected: Vec<String>,

    /// Per-name override of the shadowing policy.
    #[serde(default)]
    pub mode: HashMap<String, VirtualizeMode>,
}

impl Default for GlobalsConfig {
    fn default() -> Self {
        Self {
            protected: default_protected_globals(),
            mode: HashMap::new(),
        }
    }
}

impl GlobalsConfig {
    pub fn mode_for(&self, name: &str) -> VirtualizeMode {
        self.mode.get(name).copied().unwrap_or_default()
    }

    /// Protected names, longest first. Keeps replacement order stable and
    /// independent of how the list was written in the config file.
    pub fn ordered_protected(&self) -> Vec<String> {
        let mut names = self.protected.clone();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();
        names
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VirtualizeMode {
    /// Rewrite every bare occurrence, even when a local of the same name
    /// exists somewhere in the script.
    Always,
    /// Leave the name alone everywhere if the script declares a local with
    /// it. Resolving which uses the local would need real scope analysis,
    /// so the safe answer is all-or-nothing.
    #[default]
    SkipWhenShadowed,
}

fn default_true() -> bool {
    true
}

fn default_decoy_blocks() -> usize {
    3
}

fn default_protected_globals() -> Vec<String> {
    [
        "print",
        "warn",
        "game",
        "workspace",
        "math",
        "table",
        "string",
        "task",
        "wait",
        "spawn",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
