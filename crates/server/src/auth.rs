// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role-based authorization (spec §6.4, §11). Token → principal resolution
//! is kept behind a trait per the spec's explicit "opaque token-to-principal
//! resolver" framing; `StaticTokenResolver` is the binary's concrete
//! implementation, backed by the three bearer tokens in `ServerConfig`.

use std::future::Future;
use std::pin::Pin;

use axum::http::HeaderMap;

use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    ReadOnly,
    Operator,
    Admin,
}

impl Role {
    pub fn can_mutate_sessions(&self) -> bool {
        *self >= Role::Operator
    }

    pub fn can_mutate_hosts(&self) -> bool {
        *self >= Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct Principal {
    pub role: Role,
}

/// Resolves a bearer token to a `Principal`. Abstract so the binary's
/// static config-backed implementation can later be swapped for a real
/// auth provider without touching any handler. Hand-written boxed-future
/// signature (rather than `async_trait`) to keep `dyn TokenResolver` object
/// safe without adding a dependency the rest of the workspace doesn't use.
pub trait TokenResolver: Send + Sync {
    fn resolve<'a>(&'a self, token: &'a str) -> Pin<Box<dyn Future<Output = Option<Principal>> + Send + 'a>>;
}

/// Resolver backed by the three static tokens in `ServerConfig`. If none of
/// `ui_token`/`admin_token`/`read_only_token` are configured, auth is
/// disabled and every request is treated as `admin` — matching the
/// teacher's `auth_token: Option<String>` "unset disables auth" convention.
pub struct StaticTokenResolver {
    admin_token: Option<String>,
    ui_token: Option<String>,
    read_only_token: Option<String>,
}

impl StaticTokenResolver {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            admin_token: config.admin_token.clone(),
            ui_token: config.ui_token.clone(),
            read_only_token: config.read_only_token.clone(),
        }
    }

    fn auth_disabled(&self) -> bool {
        self.admin_token.is_none() && self.ui_token.is_none() && self.read_only_token.is_none()
    }
}

impl TokenResolver for StaticTokenResolver {
    fn resolve<'a>(&'a self, token: &'a str) -> Pin<Box<dyn Future<Output = Option<Principal>> + Send + 'a>> {
        Box::pin(async move {
            if self.auth_disabled() {
                return Some(Principal { role: Role::Admin });
            }
            if self.admin_token.as_deref() == Some(token) {
                return Some(Principal { role: Role::Admin });
            }
            if self.ui_token.as_deref() == Some(token) {
                return Some(Principal { role: Role::Operator });
            }
            if self.read_only_token.as_deref() == Some(token) {
                return Some(Principal { role: Role::ReadOnly });
            }
            None
        })
    }
}

/// Extract the bearer token from an `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
