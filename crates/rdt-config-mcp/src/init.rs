//! `rdt-config-mcp init`: register the server with MCP clients in the
//! current project.

use std::error::Error;
use std::path::{Path, PathBuf};

/// Key the server is registered under in client config files.
const SERVER_KEY: &str = "rdt-config";
/// Name of this executable, as shown in messages.
const BINARY: &str = env!("CARGO_PKG_NAME");

type InitResult<T> = Result<T, Box<dyn Error>>;

/// MCP clients that read project-scoped server config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Client {
    ClaudeCode,
    Codex,
}

impl Client {
    const ALL: [Client; 2] = [Client::ClaudeCode, Client::Codex];

    fn command(self) -> &'static str {
        match self {
            Client::ClaudeCode => "claude",
            Client::Codex => "codex",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Client::ClaudeCode => "Claude Code",
            Client::Codex => "Codex",
        }
    }

    fn register(self, cwd: &Path, binary_path: &str) -> InitResult<PathBuf> {
        match self {
            Client::ClaudeCode => write_mcp_json(cwd, binary_path),
            Client::Codex => write_codex_toml(cwd, binary_path),
        }
    }
}

/// Write project-scoped MCP config in the current directory for every
/// installed client, so they start this server when working here.
pub fn init_project() -> InitResult<()> {
    let clients = installed_clients(on_path)?;
    let binary_path = std::env::current_exe()?
        .canonicalize()?
        .to_string_lossy()
        .to_string();
    let cwd = std::env::current_dir()?;

    for client in &clients {
        let path = client.register(&cwd, &binary_path)?;
        eprintln!("Wrote {}", path.display());
    }
    let labels: Vec<_> = clients.iter().map(|c| c.label()).collect();
    eprintln!(
        "\nDone. {} will use {} in this project.",
        labels.join(" and "),
        SERVER_KEY
    );
    Ok(())
}

/// Clients whose command is found by `on_path`. Errors when there are none.
fn installed_clients(on_path: impl Fn(&str) -> bool) -> InitResult<Vec<Client>> {
    let found: Vec<Client> = Client::ALL
        .into_iter()
        .filter(|c| on_path(c.command()))
        .collect();
    if found.is_empty() {
        let commands: Vec<_> = Client::ALL.iter().map(|c| format!("`{}`", c.command())).collect();
        return Err(format!(
            "none of {} found in PATH; install one of them, then re-run `{} init`",
            commands.join(", "),
            BINARY
        )
        .into());
    }
    Ok(found)
}

fn on_path(name: &str) -> bool {
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths)
            .any(|dir| dir.join(name).is_file() || dir.join(format!("{name}.exe")).is_file())
    })
}

/// Read a config file if it exists.
fn read_existing(path: &Path) -> InitResult<Option<String>> {
    if path.exists() {
        Ok(Some(std::fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Merge the server entry into `.mcp.json`, keeping other servers.
fn write_mcp_json(cwd: &Path, binary_path: &str) -> InitResult<PathBuf> {
    let path = cwd.join(".mcp.json");
    let merged = merge_mcp_json(read_existing(&path)?.as_deref(), binary_path)?;
    std::fs::write(&path, merged)?;
    Ok(path)
}

fn merge_mcp_json(existing: Option<&str>, binary_path: &str) -> Result<String, serde_json::Error> {
    let mut root: serde_json::Value = existing
        .and_then(|s| serde_json::from_str(s).ok())
        .filter(serde_json::Value::is_object)
        .unwrap_or_else(|| serde_json::json!({}));

    if !root.get("mcpServers").is_some_and(|v| v.is_object()) {
        root["mcpServers"] = serde_json::json!({});
    }
    root["mcpServers"][SERVER_KEY] = serde_json::json!({
        "type": "stdio",
        "command": binary_path,
        "args": [],
    });
    serde_json::to_string_pretty(&root)
}

/// Merge the server table into `.codex/config.toml`.
fn write_codex_toml(cwd: &Path, binary_path: &str) -> InitResult<PathBuf> {
    let codex_dir = cwd.join(".codex");
    let path = codex_dir.join("config.toml");
    let merged = merge_codex_toml(read_existing(&path)?.as_deref(), binary_path);
    std::fs::create_dir_all(&codex_dir)?;
    std::fs::write(&path, merged)?;
    Ok(path)
}

fn merge_codex_toml(existing: Option<&str>, binary_path: &str) -> String {
    let mut doc: toml_edit::DocumentMut = existing
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();

    if !doc.contains_table("mcp_servers") {
        doc["mcp_servers"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let mut server = toml_edit::Table::new();
    server.insert("command", toml_edit::value(binary_path));
    server.insert("args", toml_edit::value(toml_edit::Array::new()));
    doc["mcp_servers"][SERVER_KEY] = toml_edit::Item::Table(server);
    doc.to_string()
}
