pub mod catalog;
pub mod error;
pub mod export;
pub mod rules;
pub mod state;
pub mod summary;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

pub use catalog::Catalog;
pub use error::{CatalogError, ConfigError, ExportError, SettingsError};
pub use export::{DocumentExporter, ExportFormat, Exporter, Snapshot};
pub use state::{Action, ConfigurationManager, SelectionState, Transition};
pub use summary::{summarize, ConfigurationSummary};

// --- Types (matching src/types/index.ts) ---

/// Identifier of a server chassis in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    schemars::JsonSchema,
)]
#[serde(transparent)]
pub struct ServerId(pub u32);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub manufacturer: String,
    pub form_factor: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chassis_types: Vec<String>,
    pub max_cpu_sockets: u32,
    pub max_memory_slots: u32,
    pub max_pci_slots: u32,
    /// Watts.
    pub max_power: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    pub id: u32,
    pub name: String,
    pub manufacturer: String,
    pub series: String,
    pub frequency: String,
    pub cores: u32,
    pub cache: String,
    pub power: u32,
    pub compatible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Gpu {
    pub id: u32,
    pub name: String,
    pub manufacturer: String,
    pub memory: String,
    pub power: u32,
    pub compatible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: u32,
    pub name: String,
    pub manufacturer: String,
    #[serde(rename = "type")]
    pub memory_type: String,
    pub speed: String,
    /// Gigabytes per module.
    pub capacity: u32,
    pub compatible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CompatibleParts {
    #[serde(default)]
    pub cpu: Vec<Cpu>,
    #[serde(default)]
    pub gpu: Vec<Gpu>,
    #[serde(default)]
    pub memory: Vec<Memory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecondProcessorRequirement {
    pub secondary_riser: bool,
    #[serde(default)]
    pub slots: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerSupplyOption {
    pub name: String,
    pub watts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub max_cpu: u32,
    pub max_memory_modules: u32,
    pub max_gpu: u32,
    pub memory_per_processor: u32,
    #[serde(default)]
    pub requires_second_processor_for: SecondProcessorRequirement,
    #[serde(default)]
    pub power_supply_options: Vec<PowerSupplyOption>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    Cpu,
    Gpu,
    Memory,
}

impl PartType {
    pub const ALL: [PartType; 3] = [PartType::Cpu, PartType::Gpu, PartType::Memory];

    pub fn label(self) -> &'static str {
        match self {
            PartType::Cpu => "CPU",
            PartType::Gpu => "GPU",
            PartType::Memory => "Memory",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count of each part type added to the selected server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AddedParts {
    pub cpu: u32,
    pub gpu: u32,
    pub memory: u32,
}

impl AddedParts {
    pub fn get(&self, part: PartType) -> u32 {
        match part {
            PartType::Cpu => self.cpu,
            PartType::Gpu => self.gpu,
            PartType::Memory => self.memory,
        }
    }

    pub(crate) fn get_mut(&mut self, part: PartType) -> &mut u32 {
        match part {
            PartType::Cpu => &mut self.cpu,
            PartType::Gpu => &mut self.gpu,
            PartType::Memory => &mut self.memory,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu == 0 && self.gpu == 0 && self.memory == 0
    }
}

// --- Storage ---

/// Resolve the data directory (~/.chassis/, or $CHASSIS_HOME when set).
pub fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("CHASSIS_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chassis")
}

// --- Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Catalog file replacing the built-in catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    #[serde(default)]
    pub export_format: ExportFormat,
}

impl Settings {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("exports"))
    }

    /// Load the configured catalog, falling back to the built-in one.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }
}

fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Read settings from the data directory. A missing file yields defaults.
pub fn read_settings() -> Result<Settings, SettingsError> {
    read_settings_from(&settings_path())
}

pub fn read_settings_from(path: &std::path::Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_settings(settings: &Settings) -> Result<(), SettingsError> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &std::path::Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_type_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&PartType::Memory).unwrap(), "\"memory\"");
        let parsed: PartType = serde_json::from_str("\"gpu\"").unwrap();
        assert_eq!(parsed, PartType::Gpu);
    }

    #[test]
    fn memory_type_field_is_named_type() {
        let raw = r#"{"id":1,"name":"32GB RDIMM","manufacturer":"Samsung","type":"DDR5","speed":"4800MT/s","capacity":32,"compatible":true}"#;
        let memory: Memory = serde_json::from_str(raw).unwrap();
        assert_eq!(memory.memory_type, "DDR5");
        assert!(serde_json::to_string(&memory).unwrap().contains("\"type\":\"DDR5\""));
    }

    #[test]
    fn added_parts_accessors_agree() {
        let mut parts = AddedParts::default();
        assert!(parts.is_empty());
        *parts.get_mut(PartType::Gpu) += 2;
        assert_eq!(parts.get(PartType::Gpu), 2);
        assert_eq!(parts.gpu, 2);
        assert!(!parts.is_empty());
    }

    #[test]
    fn settings_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        assert_eq!(read_settings_from(&path).unwrap(), Settings::default());

        let settings = Settings {
            catalog_path: Some(PathBuf::from("/tmp/catalog.json")),
            export_dir: Some(dir.path().join("out")),
            export_format: ExportFormat::Json,
        };
        write_settings_to(&path, &settings).unwrap();
        assert_eq!(read_settings_from(&path).unwrap(), settings);
        assert_eq!(settings.export_dir(), dir.path().join("out"));
    }

    #[test]
    fn malformed_settings_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_settings_from(&path), Err(SettingsError::Json(_))));
    }
}
