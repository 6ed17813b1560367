//! Read-only catalog of servers, parts and global constraints.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::{
    CatalogError, CompatibleParts, Constraints, Cpu, Gpu, Memory, PartType, Server, ServerId,
};

const BUILTIN_CATALOG: &str = include_str!("../catalog/default.json");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub servers: Vec<Server>,
    #[serde(default)]
    pub compatible_parts: CompatibleParts,
    pub constraints: Constraints,
}

/// A borrowed part of any type.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PartRef<'a> {
    Cpu(&'a Cpu),
    Gpu(&'a Gpu),
    Memory(&'a Memory),
}

impl PartRef<'_> {
    pub fn part_type(&self) -> PartType {
        match self {
            PartRef::Cpu(_) => PartType::Cpu,
            PartRef::Gpu(_) => PartType::Gpu,
            PartRef::Memory(_) => PartType::Memory,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            PartRef::Cpu(p) => p.id,
            PartRef::Gpu(p) => p.id,
            PartRef::Memory(p) => p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PartRef::Cpu(p) => &p.name,
            PartRef::Gpu(p) => &p.name,
            PartRef::Memory(p) => &p.name,
        }
    }

    pub fn manufacturer(&self) -> &str {
        match self {
            PartRef::Cpu(p) => &p.manufacturer,
            PartRef::Gpu(p) => &p.manufacturer,
            PartRef::Memory(p) => &p.manufacturer,
        }
    }

    /// Power draw in watts. Memory modules are not budgeted.
    pub fn power(&self) -> u32 {
        match self {
            PartRef::Cpu(p) => p.power,
            PartRef::Gpu(p) => p.power,
            PartRef::Memory(_) => 0,
        }
    }

    pub fn compatible(&self) -> bool {
        match self {
            PartRef::Cpu(p) => p.compatible,
            PartRef::Gpu(p) => p.compatible,
            PartRef::Memory(p) => p.compatible,
        }
    }

    /// One-line spec string for listings and documents.
    pub fn specs(&self) -> String {
        match self {
            PartRef::Cpu(p) => format!("{} cores, {}, {} cache", p.cores, p.frequency, p.cache),
            PartRef::Gpu(p) => p.memory.clone(),
            PartRef::Memory(p) => format!("{} GB {} {}", p.capacity, p.memory_type, p.speed),
        }
    }
}

impl Catalog {
    /// The catalog embedded in this crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), servers = catalog.servers.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.servers.is_empty() {
            return Err(CatalogError::Invalid("catalog has no servers".to_string()));
        }
        let mut seen = HashSet::new();
        for server in &self.servers {
            if !seen.insert(server.id) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate server id {}",
                    server.id
                )));
            }
            if server.max_power == 0 {
                return Err(CatalogError::Invalid(format!(
                    "server '{}' has no power budget",
                    server.name
                )));
            }
        }
        for part_type in PartType::ALL {
            let mut ids = HashSet::new();
            for part in self.parts(part_type, true) {
                if !ids.insert(part.id()) {
                    return Err(CatalogError::Invalid(format!(
                        "duplicate {} id {}",
                        part_type,
                        part.id()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn server(&self, id: ServerId) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }

    /// Parts of one type in catalog order. Incompatible parts are skipped
    /// unless requested; the `compatible` flag is taken as given.
    pub fn parts(&self, part_type: PartType, include_incompatible: bool) -> Vec<PartRef<'_>> {
        let all: Vec<PartRef<'_>> = match part_type {
            PartType::Cpu => self.compatible_parts.cpu.iter().map(PartRef::Cpu).collect(),
            PartType::Gpu => self.compatible_parts.gpu.iter().map(PartRef::Gpu).collect(),
            PartType::Memory => self
                .compatible_parts
                .memory
                .iter()
                .map(PartRef::Memory)
                .collect(),
        };
        all.into_iter()
            .filter(|p| include_incompatible || p.compatible())
            .collect()
    }

    /// The part standing in for every added unit of a type: the first
    /// compatible entry.
    pub fn representative(&self, part_type: PartType) -> Option<PartRef<'_>> {
        self.parts(part_type, false).into_iter().next()
    }

    /// Capacity ceiling for a part type on the given server.
    pub fn limit(&self, server: &Server, part_type: PartType) -> u32 {
        match part_type {
            PartType::Cpu => server.max_cpu_sockets,
            PartType::Gpu => self.constraints.max_gpu,
            PartType::Memory => server.max_memory_slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.servers.len(), 3);
        assert!(catalog.server(ServerId(1)).is_some());
        assert!(catalog.server(ServerId(99)).is_none());
    }

    #[test]
    fn incompatible_parts_are_filtered_by_flag() {
        let catalog = Catalog::builtin().unwrap();
        let compatible = catalog.parts(PartType::Cpu, false);
        let all = catalog.parts(PartType::Cpu, true);
        assert_eq!(all.len(), 3);
        assert_eq!(compatible.len(), 2);
        assert!(compatible.iter().all(|p| p.compatible()));
    }

    #[test]
    fn representative_is_first_compatible_part() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.compatible_parts.gpu[0].compatible = false;
        let gpu = catalog.representative(PartType::Gpu).unwrap();
        assert_eq!(gpu.name(), "A30");
    }

    #[test]
    fn limits_come_from_server_and_constraints() {
        let catalog = Catalog::builtin().unwrap();
        let server = catalog.server(ServerId(3)).unwrap();
        assert_eq!(catalog.limit(server, PartType::Cpu), 2);
        assert_eq!(catalog.limit(server, PartType::Memory), 16);
        assert_eq!(catalog.limit(server, PartType::Gpu), catalog.constraints.max_gpu);
    }

    #[test]
    fn duplicate_server_ids_are_rejected() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.servers[1].id = ServerId(1);
        let raw = serde_json::to_string(&catalog).unwrap();
        let err = Catalog::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("duplicate server id 1"));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let raw = r#"{"servers": [], "constraints": {"maxCpu": 2, "maxMemoryModules": 8, "maxGpu": 1, "memoryPerProcessor": 4}}"#;
        assert!(matches!(
            Catalog::from_json(raw),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
