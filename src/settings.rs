//! Settings infrastructure for doclsp.
//!
//! This module provides support for loading and parsing settings.toml files
//! to configure where and whether doc comment continuation applies.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tower_lsp::lsp_types::Url;

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Continuation configuration.
    pub continuation: Option<ContinuationSettings>,
}

/// Options for the continuation engine.
#[derive(Debug, Default, Deserialize)]
pub struct ContinuationSettings {
    /// Whether continuation is active at all (default: true).
    pub enabled: Option<bool>,

    /// File extensions continuation applies to, without the dot.
    /// Absent means all documents.
    pub extensions: Option<Vec<String>>,
}

impl Settings {
    /// Whether continuation is active.
    pub fn enabled(&self) -> bool {
        self.continuation
            .as_ref()
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    /// Whether continuation applies to the given document.
    pub fn applies_to(&self, uri: &Url) -> bool {
        if !self.enabled() {
            return false;
        }
        let Some(extensions) = self
            .continuation
            .as_ref()
            .and_then(|c| c.extensions.as_ref())
        else {
            return true;
        };

        match Path::new(uri.path()).extension().and_then(|e| e.to_str()) {
            Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Warning: failed to parse settings.toml: {}", e);
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Discover settings.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found settings.toml. If not found, returns
/// `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    // Phase 1: Walk up from start_dir
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join("settings.toml");
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    // Phase 2: Check immediate child directories
    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join("settings.toml");
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}
