// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the agent-commander control plane.
#[derive(Debug, Clone, clap::Args)]
pub struct ServerConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "AGENT_COMMANDER_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9900, env = "AGENT_COMMANDER_PORT")]
    pub port: u16,

    /// SQLite database URL (file path or `sqlite::memory:`).
    #[arg(long, default_value = "commander.sqlite3", env = "AGENT_COMMANDER_DATABASE_URL")]
    pub database_url: String,

    /// Bearer token operators/read-only dashboards present on `/v1/ui/ws` and REST calls.
    /// If unset, UI auth is disabled.
    #[arg(long, env = "AGENT_COMMANDER_UI_TOKEN")]
    pub ui_token: Option<String>,

    /// Bearer token that grants the `admin` role on top of `ui_token`'s `operator` role.
    #[arg(long, env = "AGENT_COMMANDER_ADMIN_TOKEN")]
    pub admin_token: Option<String>,

    /// Bearer token read-only observers present; grants the `read_only` role.
    #[arg(long, env = "AGENT_COMMANDER_READ_ONLY_TOKEN")]
    pub read_only_token: Option<String>,

    /// Terminal channel idle timeout in milliseconds before an `idle_timeout` frame and detach.
    #[arg(long, default_value_t = 600_000, env = "AGENT_COMMANDER_TERMINAL_IDLE_MS")]
    pub terminal_idle_ms: u64,

    /// Directory roots agents are allowed to list via `list_directory` / `GET /hosts/:id/directories`.
    /// Repeatable; empty means no directory listing is permitted anywhere.
    #[arg(long = "directory-root", env = "AGENT_COMMANDER_DIRECTORY_ROOTS", value_delimiter = ',')]
    pub directory_roots: Vec<String>,
}

impl ServerConfig {
    pub fn terminal_idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.terminal_idle_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
