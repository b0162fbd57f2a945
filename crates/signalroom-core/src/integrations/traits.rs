use std::fs;
use std::path::{Path, PathBuf};

use super::payload::{display_name, ProviderPayload, KNOWN_TOOLS};

/// Per-fetch limits handed to every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub max_items: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self { max_items: 200 }
    }
}

/// Every provider the engine can read from implements this trait.
/// Sources are stateless between calls; `fetch` runs on a blocking thread.
pub trait SignalSource: Send + Sync {
    /// Tool identifier (e.g. "slack", "linear").
    fn name(&self) -> &str;

    /// Human-readable display name.
    fn display_name(&self) -> &str;

    /// Fetch the current native records.
    fn fetch(
        &self,
        limits: &FetchLimits,
    ) -> Result<ProviderPayload, Box<dyn std::error::Error + Send + Sync>>;
}

/// Reads a native payload for one tool from a JSON file.
///
/// The file holds either the bare array of records or an object with a
/// `records` array.
#[derive(Debug, Clone)]
pub struct FileSource {
    tool: String,
    display: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(tool: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let tool = tool.into().trim().to_lowercase();
        Self {
            display: display_name(&tool).to_string(),
            tool,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One source per `<tool>.json` in `dir`, sorted by tool name. Files named
    /// after unknown tools are skipped.
    pub fn discover(dir: &Path) -> std::io::Result<Vec<FileSource>> {
        let mut sources = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let tool = stem.to_lowercase();
            if KNOWN_TOOLS.contains(&tool.as_str()) {
                sources.push(FileSource::new(tool, path));
            } else {
                tracing::debug!(file = %path.display(), "skipping payload for unknown tool");
            }
        }
        sources.sort_by(|a, b| a.tool.cmp(&b.tool));
        Ok(sources)
    }
}

impl SignalSource for FileSource {
    fn name(&self) -> &str {
        &self.tool
    }

    fn display_name(&self) -> &str {
        &self.display
    }

    fn fetch(
        &self,
        limits: &FetchLimits,
    ) -> Result<ProviderPayload, Box<dyn std::error::Error + Send + Sync>> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read {}: {e}", self.path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let records = match value {
            serde_json::Value::Object(mut wrapper) if wrapper.contains_key("records") => {
                wrapper.remove("records").unwrap_or_default()
            }
            other => other,
        };
        let mut payload = ProviderPayload::from_records(&self.tool, records)?;
        payload.truncate(limits.max_items);
        Ok(payload)
    }
}
