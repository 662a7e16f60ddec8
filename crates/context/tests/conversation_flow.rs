//! End-to-end flow over the service and assembler: record turns across two
//! panels, assemble a provider payload, record the answer, and read back.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use xt_context::{assemble, ContextRequest, ContextService, DEFAULT_TURN_BUDGET};
use xt_domain::message::Role;
use xt_domain::turn::{Speaker, Turn};
use xt_store::TranscriptStore;

fn service(dir: &TempDir) -> ContextService {
    let store = Arc::new(TranscriptStore::new(dir.path()).unwrap());
    ContextService::new(store, Duration::from_secs(300))
}

#[tokio::test]
async fn two_panel_conversation_round_trip() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    svc.record_turn(Turn::new(1, Speaker::Human, "hi")).await.unwrap();
    svc.record_turn(Turn::new(
        2,
        Speaker::Assistant { model: "gpt-4o-mini".into() },
        "hello",
    ))
    .await
    .unwrap();

    // Assemble a request spanning both panels.
    let turns = svc.get_context(&[1, 2]).await.unwrap();
    let messages = assemble(
        &turns,
        &ContextRequest {
            panel_ids: vec![1, 2],
            turn_budget: DEFAULT_TURN_BUDGET,
            system_prompt: None,
            question: "what next?".into(),
        },
    );

    let rendered: Vec<(Role, &str)> = messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        rendered,
        vec![
            (Role::User, "hi"),
            (Role::Assistant, "hello"),
            (Role::User, "what next?"),
        ]
    );

    // The provider answered; record it and the cached slice is refreshed on
    // the next read.
    svc.record_turn(Turn::new(
        1,
        Speaker::Assistant { model: "gpt-4o-mini".into() },
        "we continue",
    ))
    .await
    .unwrap();

    let turns = svc.get_context(&[1, 2]).await.unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns.last().unwrap().body, "we continue");

    // Panel order in the request never changes the result.
    let reversed = svc.get_context(&[2, 1]).await.unwrap();
    assert_eq!(
        turns.iter().map(|t| &t.body).collect::<Vec<_>>(),
        reversed.iter().map(|t| &t.body).collect::<Vec<_>>()
    );
    // And the reversed read was a cache hit on the same canonical key.
    assert!(svc.stats().cache_hits >= 1);
}

#[tokio::test]
async fn turns_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    {
        let svc = service(&dir);
        svc.record_turn(Turn::new(7, Speaker::Human, "persisted"))
            .await
            .unwrap();
    }
    // A fresh service over the same directory sees the turn.
    let svc = service(&dir);
    let turns = svc.get_context(&[7]).await.unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].body, "persisted");
}
