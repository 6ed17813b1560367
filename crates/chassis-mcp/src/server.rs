use std::sync::{Arc, Mutex, MutexGuard};

use chassis_core::{
    rules, summarize, ConfigurationManager, DocumentExporter, ExportFormat, Exporter, PartType,
    ServerId,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPartsRequest {
    /// Part type: "cpu", "gpu" or "memory"
    pub part_type: PartType,
    /// Also list parts the catalog marks as incompatible. Default: false.
    pub include_incompatible: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectServerRequest {
    /// ID of the server chassis (see list_servers). Selecting a server removes all added parts.
    pub server_id: ServerId,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PartRequest {
    /// Part type: "cpu", "gpu" or "memory"
    pub part_type: PartType,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportRequest {
    /// Document format: "markdown" or "json". Default comes from settings.
    pub format: Option<ExportFormat>,
}

// --- Server ---

#[derive(Clone)]
pub struct ChassisServer {
    manager: Arc<Mutex<ConfigurationManager>>,
    exporter: DocumentExporter,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ChassisServer {
    pub fn new(manager: ConfigurationManager, exporter: DocumentExporter) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
            exporter,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List the server chassis in the catalog with their CPU socket, memory slot, PCI slot and power limits")]
    fn list_servers(&self) -> Result<CallToolResult, McpError> {
        Ok(reply(self.servers_json()))
    }

    #[tool(
        description = "List catalog parts of one type. Only parts marked compatible are listed unless include_incompatible is true."
    )]
    fn list_parts(
        &self,
        Parameters(req): Parameters<ListPartsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(reply(
            self.parts_json(req.part_type, req.include_incompatible.unwrap_or(false)),
        ))
    }

    #[tool(description = "Select a server chassis by ID. Always clears every added CPU, GPU and memory part.")]
    fn select_server(
        &self,
        Parameters(req): Parameters<SelectServerRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(reply(self.select(req.server_id)))
    }

    #[tool(
        description = "Add one part of the given type to the selected server. Fails if no server is selected or the type's limit is reached (CPU: server sockets, GPU: global limit, memory: server slots)."
    )]
    fn add_part(
        &self,
        Parameters(req): Parameters<PartRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(reply(self.add(req.part_type)))
    }

    #[tool(description = "Remove one part of the given type. Fails if none of that type is installed.")]
    fn remove_part(
        &self,
        Parameters(req): Parameters<PartRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(reply(self.remove(req.part_type)))
    }

    #[tool(description = "Get the current selection: {selectedServerId, addedParts: {cpu, gpu, memory}}")]
    fn get_state(&self) -> Result<CallToolResult, McpError> {
        Ok(reply(self.state_json()))
    }

    #[tool(
        description = "Get a summary of the current configuration: representative parts, estimated power, total memory, riser slots, recommended power supply and warnings"
    )]
    fn get_summary(&self) -> Result<CallToolResult, McpError> {
        Ok(reply(self.summary_json()))
    }

    #[tool(description = "Get the configuration rules for the catalog and the selected server")]
    fn get_rules(&self) -> Result<CallToolResult, McpError> {
        Ok(reply(self.rules_text()))
    }

    #[tool(
        description = "Export the current configuration as a document (markdown or json). Returns the path of the written file."
    )]
    async fn export_configuration(
        &self,
        Parameters(req): Parameters<ExportRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(reply(self.export(req.format).await))
    }
}

#[tool_handler]
impl ServerHandler for ChassisServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!("{}\n\n## Rules\n{}", INSTRUCTIONS, self.rules_text().unwrap_or_default());
        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Operations ---

impl ChassisServer {
    fn manager(&self) -> Result<MutexGuard<'_, ConfigurationManager>, String> {
        self.manager
            .lock()
            .map_err(|_| "configuration state is unavailable".to_string())
    }

    fn servers_json(&self) -> Result<String, String> {
        let m = self.manager()?;
        to_json(&m.catalog().servers)
    }

    fn parts_json(&self, part_type: PartType, include_incompatible: bool) -> Result<String, String> {
        let m = self.manager()?;
        let parts = m.catalog().parts(part_type, include_incompatible);
        if parts.is_empty() {
            return Ok(format!("No {part_type} parts available."));
        }
        to_json(&parts)
    }

    fn select(&self, id: ServerId) -> Result<String, String> {
        let mut m = self.manager()?;
        let server = m.select_server(id).map_err(|e| e.to_string())?;
        Ok(format!(
            "Selected {} ({}). All parts cleared. Limits: {} CPU, {} memory modules.",
            server.name, server.form_factor, server.max_cpu_sockets, server.max_memory_slots
        ))
    }

    fn add(&self, part: PartType) -> Result<String, String> {
        let mut m = self.manager()?;
        let count = m.add_part(part).map_err(|e| e.to_string())?;
        Ok(format!("Added {part}. {part} count: {count}"))
    }

    fn remove(&self, part: PartType) -> Result<String, String> {
        let mut m = self.manager()?;
        let count = m.remove_part(part).map_err(|e| e.to_string())?;
        Ok(format!("Removed {part}. {part} count: {count}"))
    }

    fn state_json(&self) -> Result<String, String> {
        let m = self.manager()?;
        to_json(m.state())
    }

    fn summary_json(&self) -> Result<String, String> {
        let snapshot = self.manager()?.snapshot();
        match summarize(&snapshot) {
            Some(summary) => to_json(&summary),
            None => Err("No server selected. Use select_server first.".to_string()),
        }
    }

    fn rules_text(&self) -> Result<String, String> {
        let m = self.manager()?;
        Ok(rules::describe(m.catalog(), m.selected_server()))
    }

    async fn export(&self, format: Option<ExportFormat>) -> Result<String, String> {
        let snapshot = self.manager()?.snapshot();
        let exporter = DocumentExporter::new(
            self.exporter.dir(),
            format.unwrap_or(self.exporter.format()),
        );
        let result = tokio::task::spawn_blocking(move || exporter.export(&snapshot))
            .await
            .map_err(|e| format!("Export task failed: {e}"))?;
        match result {
            Ok(path) => Ok(format!("Exported configuration to {}", path.display())),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                Err(format!("Export failed: {e}"))
            }
        }
    }
}

// --- Helpers ---

fn reply(result: Result<String, String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::error(vec![Content::text(e)]),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Serialization error: {e}"))
}

const INSTRUCTIONS: &str = r#"chassis is a server configurator. You build one server configuration at a time: pick a chassis, then add CPUs, GPUs and memory modules within its limits.

## Workflow
1. `list_servers` to see the available chassis and their limits.
2. `select_server` with a server ID. This always clears previously added parts.
3. `list_parts` to inspect CPU, GPU or memory options. Only compatible parts are listed by default.
4. `add_part` / `remove_part` one unit at a time. A rejected call leaves the configuration unchanged and says which limit was hit.
5. `get_summary` for power, memory and power supply figures plus advisory warnings.
6. `export_configuration` to write a document of the result.

## Notes
- Part counts are per type. The catalog's first compatible part of each type stands in for every added unit in summaries and exports.
- Nothing is saved between sessions; restarting the server starts from an empty selection."#;
