//! Export collaborator: renders a snapshot into a document on disk.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::summary::{summarize, ConfigurationSummary};
use crate::{AddedParts, Catalog, ExportError, ServerId};

/// Read-only copy of the selection handed to an [`Exporter`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub selected_server_id: Option<ServerId>,
    pub added_parts: AddedParts,
    pub catalog: Arc<Catalog>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

pub trait Exporter {
    /// Export the snapshot, returning where the document was written.
    fn export(&self, snapshot: &Snapshot) -> Result<PathBuf, ExportError>;
}

/// Writes Markdown or JSON documents into a directory.
#[derive(Debug, Clone)]
pub struct DocumentExporter {
    dir: PathBuf,
    format: ExportFormat,
}

impl DocumentExporter {
    pub fn new(dir: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    fn target_path(&self, summary: &ConfigurationSummary) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let stem = format!("{}-{}", slug(&summary.server.name), stamp);
        let ext = self.format.extension();
        let mut path = self.dir.join(format!("{stem}.{ext}"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{stem}-{n}.{ext}"));
            n += 1;
        }
        path
    }
}

impl Exporter for DocumentExporter {
    fn export(&self, snapshot: &Snapshot) -> Result<PathBuf, ExportError> {
        let summary = summarize(snapshot).ok_or(ExportError::NoServerSelected)?;
        let body = match self.format {
            ExportFormat::Markdown => render_markdown(&summary),
            ExportFormat::Json => render_json(&summary)?,
        };

        // Temp file + rename so a reader never sees a half-written document.
        fs::create_dir_all(&self.dir)?;
        let path = self.target_path(&summary);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let tmp = self.dir.join(format!(".{file_name}.tmp"));
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;

        tracing::info!(path = %path.display(), format = ?self.format, "configuration exported");
        Ok(path)
    }
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "server".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn render_json(summary: &ConfigurationSummary) -> Result<String, ExportError> {
    let doc = serde_json::json!({
        "server": summary.server,
        "addedParts": summary.added_parts,
        "summary": summary,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn render_markdown(summary: &ConfigurationSummary) -> String {
    let server = &summary.server;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# Server Configuration: {}", server.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Server");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Manufacturer: {}", server.manufacturer);
    let _ = writeln!(out, "- Form factor: {}", server.form_factor);
    if !server.description.is_empty() {
        let _ = writeln!(out, "- Description: {}", server.description);
    }
    if !server.chassis_types.is_empty() {
        let _ = writeln!(out, "- Chassis types: {}", server.chassis_types.join(", "));
    }
    let _ = writeln!(out, "- CPU sockets: {}", server.max_cpu_sockets);
    let _ = writeln!(out, "- Memory slots: {}", server.max_memory_slots);
    let _ = writeln!(out, "- PCI slots: {}", server.max_pci_slots);
    let _ = writeln!(out, "- Maximum power: {} W", server.max_power);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Parts");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Type | Model | Quantity | Unit power |");
    let _ = writeln!(out, "|------|-------|----------|------------|");
    for line in &summary.lines {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} W |",
            line.part_type,
            line.model.as_deref().unwrap_or("-"),
            line.quantity,
            line.unit_power
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Estimated power: {} W", summary.estimated_power);
    let _ = writeln!(out, "- Total memory: {} GB", summary.total_memory_gb);
    if summary.secondary_riser_enabled {
        let slots: Vec<String> = summary
            .unlocked_pci_slots
            .iter()
            .map(|s| s.to_string())
            .collect();
        let _ = writeln!(out, "- Secondary riser: enabled (slots {})", slots.join(", "));
    } else {
        let _ = writeln!(out, "- Secondary riser: disabled");
    }
    match &summary.recommended_power_supply {
        Some(psu) => {
            let _ = writeln!(out, "- Recommended power supply: {} ({} W)", psu.name, psu.watts);
        }
        None => {
            let _ = writeln!(out, "- Recommended power supply: none available");
        }
    }

    if !summary.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Warnings");
        let _ = writeln!(out);
        for warning in &summary.warnings {
            let _ = writeln!(out, "- {warning}");
        }
    }
    out
}
