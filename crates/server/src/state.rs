// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use agent_commander_bus::Bus;
use agent_commander_dispatch::{BulkOperations, CommandDispatcher, CrossHostCopy};
use agent_commander_store::Store;

use crate::auth::TokenResolver;
use crate::config::ServerConfig;
use crate::terminal::TerminalChannelTable;

/// Shared state handed to every handler via axum's `State` extractor.
pub struct ServerState {
    pub store: Arc<Store>,
    pub bus: Arc<Bus>,
    pub dispatcher: CommandDispatcher,
    pub cross_host_copy: CrossHostCopy,
    pub bulk_operations: BulkOperations,
    pub config: ServerConfig,
    pub token_resolver: Arc<dyn TokenResolver>,
    pub terminal_channels: TerminalChannelTable,
}

impl ServerState {
    pub fn new(
        store: Arc<Store>,
        bus: Arc<Bus>,
        config: ServerConfig,
        token_resolver: Arc<dyn TokenResolver>,
    ) -> Arc<Self> {
        let dispatcher = CommandDispatcher::new(Arc::clone(&bus), Arc::clone(&store));
        let cross_host_copy = CrossHostCopy::new(dispatcher.clone(), Arc::clone(&store));
        let bulk_operations = BulkOperations::new(Arc::clone(&store), dispatcher.clone(), Arc::clone(&bus));
        Arc::new(Self {
            store,
            bus,
            dispatcher,
            cross_host_copy,
            bulk_operations,
            config,
            token_resolver,
            terminal_channels: TerminalChannelTable::default(),
        })
    }
}
