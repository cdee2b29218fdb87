/*
 *  Copyright (c) 2024 The kotoha developers
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Analyzer configuration.
//!
//! A JSON settings file names the resource files; relative paths resolve
//! against `resource_dir` (itself defaulting to the settings file's
//! directory). The dictionary-list file is a plain-text sidecar of the
//! resources, one `<priority>,<base_name>` record per line.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json;
use thiserror::Error;

use crate::error::{KotohaError, KotohaResult};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Missing settings entry: {0}")]
    MissingEntry(&'static str),
}

/// Resource locations plus analyzer defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directory for relative resource paths.
    pub resource_dir: Option<PathBuf>,
    pub connection_table: Option<PathBuf>,
    pub grammar_table: Option<PathBuf>,
    pub english_table: Option<PathBuf>,
    pub unknown_class_table: Option<PathBuf>,
    pub unknown_cost_table: Option<PathBuf>,
    pub normalize_table: Option<PathBuf>,
    /// Dictionary-list file; when absent a single dictionary of priority 1
    /// with the default base name is assumed.
    pub dictionary_list: Option<PathBuf>,
    /// Upper bound on a single morpheme's length; 0 keeps the default.
    pub max_word_length: u32,
}

impl Config {
    /// Reads a settings file; relative paths will resolve against its
    /// directory unless `resource_dir` overrides that.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let mut file = File::open(path)?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        let mut config: Config = serde_json::from_str(&raw)?;
        if config.resource_dir.is_none() {
            config.resource_dir = path.parent().map(|p| p.to_path_buf());
        }
        Ok(config)
    }

    /// Resolves a resource path against the resource directory.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        match &self.resource_dir {
            Some(dir) => dir.join(p),
            None => p.to_path_buf(),
        }
    }

    pub fn connection_table(&self) -> Result<PathBuf, ConfigError> {
        self.connection_table
            .as_deref()
            .map(|p| self.resolve(p))
            .ok_or(ConfigError::MissingEntry("connection_table"))
    }

    pub fn unknown_class_table(&self) -> Result<PathBuf, ConfigError> {
        self.unknown_class_table
            .as_deref()
            .map(|p| self.resolve(p))
            .ok_or(ConfigError::MissingEntry("unknown_class_table"))
    }

    pub fn unknown_cost_table(&self) -> Result<PathBuf, ConfigError> {
        self.unknown_cost_table
            .as_deref()
            .map(|p| self.resolve(p))
            .ok_or(ConfigError::MissingEntry("unknown_cost_table"))
    }
}

/// Per-call analysis options.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Apply the normalizer before analysis.
    pub execute_normalization: bool,
    /// Let dictionary lookup skip one embedded CR/LF run.
    pub ignore_line_break: bool,
    /// Reproduce the legacy unknown-word max-length check.
    pub emulate_bug: bool,
    /// Upper bound on a single morpheme's length; 0 means the default 255.
    pub max_word_length: u32,
}

/// Base name used when no dictionary-list file is present.
pub const DEFAULT_DICTIONARY_NAME: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryListEntry {
    pub priority: u8,
    pub base_name: String,
}

/// Parses a dictionary-list file: one `<priority>,<base_name>` per
/// non-comment line, priorities 1..=255 and non-decreasing.
pub fn parse_dictionary_list(text: &str) -> KotohaResult<Vec<DictionaryListEntry>> {
    let mut entries = Vec::new();
    let mut last_priority = 0u16;
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (prio, name) = match line.split_once(',') {
            Some(pair) => pair,
            None => {
                return Err(KotohaError::InvalidDataFormat(
                    n + 1,
                    String::from("expected <priority>,<base_name>"),
                ))
            }
        };
        let priority: u16 = prio.trim().parse().map_err(|_| {
            KotohaError::InvalidDataFormat(n + 1, format!("bad priority {:?}", prio))
        })?;
        if priority < 1 || priority > 255 {
            return Err(KotohaError::InvalidDataFormat(
                n + 1,
                format!("priority {} outside 1..=255", priority),
            ));
        }
        if priority < last_priority {
            return Err(KotohaError::InvalidDataFormat(
                n + 1,
                String::from("priorities must be non-decreasing"),
            ));
        }
        last_priority = priority;
        let name = name.trim();
        if name.is_empty() {
            return Err(KotohaError::InvalidDataFormat(
                n + 1,
                String::from("empty base name"),
            ));
        }
        entries.push(DictionaryListEntry {
            priority: priority as u8,
            base_name: name.to_string(),
        });
    }
    Ok(entries)
}

/// The single-dictionary fallback used when no list file exists.
pub fn default_dictionary_list() -> Vec<DictionaryListEntry> {
    vec![DictionaryListEntry {
        priority: 1,
        base_name: DEFAULT_DICTIONARY_NAME.to_string(),
    }]
}
