mod common;

use common::test_app;
use futures::future::join_all;
use std::collections::HashSet;
use uuid::Uuid;

/// The central correctness property: concurrent get-or-create calls for the
/// same pair, from both argument orders, all observe one conversation.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_get_or_create_yields_one_conversation() {
    let app = test_app();
    let alice = app.users.add_user("alice");
    let bob = app.users.add_user("bob");

    let mut handles = Vec::new();
    for i in 0..32 {
        let service = app.service.clone();
        let (requester, other) = if i % 2 == 0 { (alice, bob) } else { (bob, alice) };
        handles.push(tokio::spawn(async move {
            service
                .get_or_create_conversation(requester, other)
                .await
                .unwrap()
                .id
        }));
    }

    let ids: HashSet<Uuid> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(ids.len(), 1, "every caller must observe the same conversation");
    assert_eq!(app.store.conversation_count(), 1);
}
