use std::fmt::Write as _;

use crate::{Catalog, PartType, Server};

/// Configuration rules, rendered for the given catalog. Single source of
/// truth for the MCP instructions and the `get_rules` tool.
pub fn describe(catalog: &Catalog, selected: Option<&Server>) -> String {
    let c = &catalog.constraints;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "1. Select a server before adding parts. Selecting a server (even the same one again) removes every added part."
    );
    match selected {
        Some(server) => {
            let _ = writeln!(
                out,
                "2. Capacity on {}: at most {} CPU(s) (sockets), {} GPU(s) (global limit), {} memory module(s) (slots).",
                server.name,
                catalog.limit(server, PartType::Cpu),
                catalog.limit(server, PartType::Gpu),
                catalog.limit(server, PartType::Memory),
            );
        }
        None => {
            let _ = writeln!(
                out,
                "2. Capacity: CPUs are limited by the server's sockets, memory modules by its slots, GPUs by the global limit of {}.",
                c.max_gpu
            );
        }
    }
    let _ = writeln!(
        out,
        "3. Limits are checked per part type and only when adding. Removing is always allowed while at least one part of that type is installed."
    );
    let _ = writeln!(
        out,
        "4. Plan for {} memory module(s) per installed processor.",
        c.memory_per_processor
    );
    let riser = &c.requires_second_processor_for;
    if riser.secondary_riser {
        let slots: Vec<String> = riser.slots.iter().map(|s| s.to_string()).collect();
        let _ = writeln!(
            out,
            "5. A second CPU enables the secondary riser and PCI slot(s) {}.",
            slots.join(", ")
        );
    } else {
        let _ = writeln!(out, "5. No PCI slots depend on a second CPU.");
    }
    if c.power_supply_options.is_empty() {
        let _ = write!(out, "6. No power supply options are listed.");
    } else {
        let options: Vec<String> = c
            .power_supply_options
            .iter()
            .map(|o| format!("{} ({} W)", o.name, o.watts))
            .collect();
        let _ = write!(
            out,
            "6. Power supply options: {}. Only parts marked compatible are offered by default.",
            options.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerId;

    #[test]
    fn mentions_selected_server_limits() {
        let catalog = Catalog::builtin().unwrap();
        let server = catalog.server(ServerId(3)).unwrap();
        let text = describe(&catalog, Some(server));
        assert!(text.contains("Capacity on PowerEdge T550: at most 2 CPU(s)"));
        assert!(text.contains("16 memory module(s)"));
        assert!(text.contains("PCI slot(s) 4, 5, 6"));
    }

    #[test]
    fn general_rules_without_selection() {
        let catalog = Catalog::builtin().unwrap();
        let text = describe(&catalog, None);
        assert!(text.contains("global limit of 2"));
        assert!(text.contains("800W Platinum (800 W)"));
    }
}
