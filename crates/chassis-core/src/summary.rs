//! Derived figures for the information panel and exported documents.
//!
//! Warnings here are advisory: they never block an add or remove.

use serde::Serialize;

use crate::catalog::PartRef;
use crate::{AddedParts, PartType, PowerSupplyOption, Server, Snapshot};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartLine {
    pub part_type: PartType,
    /// Representative catalog model, if the catalog offers a compatible one.
    pub model: Option<String>,
    pub quantity: u32,
    pub unit_power: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSummary {
    pub server: Server,
    pub added_parts: AddedParts,
    pub lines: Vec<PartLine>,
    /// Watts drawn by CPUs and GPUs.
    pub estimated_power: u64,
    pub total_memory_gb: u64,
    pub secondary_riser_enabled: bool,
    pub unlocked_pci_slots: Vec<u32>,
    pub recommended_power_supply: Option<PowerSupplyOption>,
    pub warnings: Vec<String>,
}

/// Summarize a snapshot. Returns `None` when no server is selected.
pub fn summarize(snapshot: &Snapshot) -> Option<ConfigurationSummary> {
    let catalog = &snapshot.catalog;
    let server = catalog.server(snapshot.selected_server_id?)?;
    let parts = snapshot.added_parts;
    let constraints = &catalog.constraints;

    let lines: Vec<PartLine> = PartType::ALL
        .iter()
        .map(|&part_type| {
            let representative = catalog.representative(part_type);
            PartLine {
                part_type,
                model: representative.map(|p| p.name().to_string()),
                quantity: parts.get(part_type),
                unit_power: representative.map_or(0, |p| p.power()),
            }
        })
        .collect();

    // u64 so large catalog figures cannot overflow.
    let estimated_power: u64 = lines
        .iter()
        .map(|l| u64::from(l.quantity) * u64::from(l.unit_power))
        .fold(0, u64::saturating_add);

    let memory_capacity = match catalog.representative(PartType::Memory) {
        Some(PartRef::Memory(m)) => m.capacity,
        _ => 0,
    };
    let total_memory_gb = u64::from(parts.memory) * u64::from(memory_capacity);

    let riser = &constraints.requires_second_processor_for;
    let secondary_riser_enabled = riser.secondary_riser && parts.cpu >= 2;
    let unlocked_pci_slots = if secondary_riser_enabled {
        riser.slots.clone()
    } else {
        Vec::new()
    };

    let recommended_power_supply = constraints
        .power_supply_options
        .iter()
        .filter(|o| u64::from(o.watts) >= estimated_power)
        .min_by_key(|o| o.watts)
        .cloned();

    let mut warnings = Vec::new();
    if estimated_power > u64::from(server.max_power) {
        warnings.push(format!(
            "Estimated power {estimated_power} W exceeds the server maximum of {} W",
            server.max_power
        ));
    }
    if recommended_power_supply.is_none() && estimated_power > 0 {
        warnings.push(format!("No power supply option covers {estimated_power} W"));
    }
    if parts.memory > 0 && parts.cpu == 0 {
        warnings.push("Memory installed without a processor".to_string());
    } else if u64::from(parts.memory)
        > u64::from(parts.cpu) * u64::from(constraints.memory_per_processor)
    {
        warnings.push(format!(
            "{} memory modules exceed {} per processor for {} CPU(s)",
            parts.memory, constraints.memory_per_processor, parts.cpu
        ));
    }

    Some(ConfigurationSummary {
        server: server.clone(),
        added_parts: parts,
        lines,
        estimated_power,
        total_memory_gb,
        secondary_riser_enabled,
        unlocked_pci_slots,
        recommended_power_supply,
        warnings,
    })
}
