//! Tool-server (MCP) connectors handed to the agent runtime.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const PROJECT_CONFIG_FILE: &str = ".mcp.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolServer {
    /// Local process speaking over stdio.
    Stdio {
        command: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
    },
    Sse { url: String },
}

/// Named connectors, ordered by name.
pub type ToolServers = BTreeMap<String, ToolServer>;

/// Read `<dir>/.mcp.json`. Missing or malformed config yields no servers.
pub fn discover(dir: &Path) -> ToolServers {
    let path = dir.join(PROJECT_CONFIG_FILE);
    let Ok(raw) = std::fs::read_to_string(&path) else {
        debug!("no tool-server config at {}", path.display());
        return ToolServers::new();
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(json) => from_project_config(&json),
        Err(e) => {
            warn!("ignoring malformed {}: {e}", path.display());
            ToolServers::new()
        }
    }
}

/// Map `mcpServers` entries: `command` → stdio, `url` → SSE, others dropped.
pub fn from_project_config(json: &Value) -> ToolServers {
    let Some(servers) = json.get("mcpServers").and_then(|v| v.as_object()) else {
        return ToolServers::new();
    };
    servers
        .iter()
        .filter_map(|(name, cfg)| {
            let server = if let Some(command) = cfg.get("command").and_then(|v| v.as_str()) {
                let args: Vec<String> = cfg
                    .get("args")
                    .and_then(|v| v.as_array())
                    .map(|a| {
                        a.iter()
                            .filter_map(|s| s.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();
                ToolServer::Stdio {
                    command: command.to_string(),
                    args,
                }
            } else if let Some(url) = cfg.get("url").and_then(|v| v.as_str()) {
                ToolServer::Sse {
                    url: url.to_string(),
                }
            } else {
                debug!("tool server {name} has neither command nor url");
                return None;
            };
            Some((name.clone(), server))
        })
        .collect()
}

/// Discovered servers overlaid with declared ones; declared names win.
pub fn merge(discovered: ToolServers, declared: &ToolServers) -> ToolServers {
    let mut merged = discovered;
    merged.extend(declared.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// `{"mcpServers": {...}}` as accepted by `--mcp-config`.
pub fn to_mcp_config(servers: &ToolServers) -> Value {
    json!({ "mcpServers": servers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path()).is_empty());
    }

    #[test]
    fn test_discover_maps_entry_kinds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            r#"{"mcpServers":{
                "local":{"command":"memd","args":["mcp","--stdio"]},
                "remote":{"url":"http://127.0.0.1:7437/mcp/sse"},
                "broken":{"env":{}}
            }}"#,
        )
        .unwrap();
        let servers = discover(dir.path());
        assert_eq!(servers.len(), 2);
        assert_eq!(
            servers["local"],
            ToolServer::Stdio {
                command: "memd".into(),
                args: vec!["mcp".into(), "--stdio".into()]
            }
        );
        assert!(matches!(servers["remote"], ToolServer::Sse { .. }));
    }

    #[test]
    fn test_discover_malformed_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "{ nope").unwrap();
        assert!(discover(dir.path()).is_empty());
    }

    #[test]
    fn test_merge_and_render() {
        let mut discovered = ToolServers::new();
        discovered.insert(
            "memory".into(),
            ToolServer::Stdio {
                command: "old".into(),
                args: vec![],
            },
        );
        let mut declared = ToolServers::new();
        declared.insert(
            "memory".into(),
            ToolServer::Sse {
                url: "http://x/mcp/sse".into(),
            },
        );
        let merged = merge(discovered, &declared);
        let cfg = to_mcp_config(&merged);
        assert_eq!(cfg["mcpServers"]["memory"]["type"], "sse");
        assert_eq!(cfg["mcpServers"]["memory"]["url"], "http://x/mcp/sse");
    }
}
