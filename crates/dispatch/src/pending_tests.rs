// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use agent_commander_types::protocol::command::CommandsResultBody;

use super::*;

#[tokio::test]
async fn resolve_before_timeout_returns_result() {
    let table = PendingResultTable::new();
    let cmd_id = "01J0000000000000000000EXAMP".to_owned();
    let rx = table.register(cmd_id.clone()).await;

    let table_clone = Arc::clone(&table);
    let cmd_id_clone = cmd_id.clone();
    let resolver = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        table_clone
            .resolve(CommandsResultBody { cmd_id: cmd_id_clone, session_id: None, ok: true, result: None, error: None })
            .await
    });

    let result = table.await_result(&cmd_id, rx, Duration::from_secs(5)).await.expect("should resolve");
    assert!(result.ok);
    assert!(resolver.await.expect("resolver task"));
}

#[tokio::test]
async fn never_resolved_times_out() {
    let table = PendingResultTable::new();
    let rx = table.register("unused".to_owned()).await;
    let err = table.await_result("unused", rx, Duration::from_millis(20)).await.unwrap_err();
    assert_eq!(err, CommanderError::CommandTimedOut);
}

#[tokio::test]
async fn resolving_unknown_cmd_id_is_a_noop() {
    let table = PendingResultTable::new();
    let found = table
        .resolve(CommandsResultBody { cmd_id: "ghost".to_owned(), session_id: None, ok: true, result: None, error: None })
        .await;
    assert!(!found);
}

#[tokio::test]
async fn cancel_after_register_prevents_late_resolve() {
    let table = PendingResultTable::new();
    let cmd_id = "cancel-me".to_owned();
    let _rx = table.register(cmd_id.clone()).await;
    table.cancel(&cmd_id).await;

    let found = table
        .resolve(CommandsResultBody { cmd_id, session_id: None, ok: true, result: None, error: None })
        .await;
    assert!(!found);
}
