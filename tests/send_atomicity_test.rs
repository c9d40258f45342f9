mod common;

use common::test_app;
use sodev_messaging::error::AppError;

/// A send whose commit fails must leave no trace: no message in the history,
/// no preview update. A retry then succeeds, so the failure is safe to
/// surface to the client as retryable.
#[tokio::test]
async fn aborted_send_leaves_no_partial_state() {
    let app = test_app();
    let alice = app.users.add_user("alice");
    let bob = app.users.add_user("bob");
    let conv = app
        .service
        .get_or_create_conversation(alice, bob)
        .await
        .unwrap();

    app.store.inject_commit_failure();
    let err = app
        .service
        .send_message(alice, conv.id, "lost in transit")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransactionAborted(_)));
    assert!(err.is_retryable());

    // nothing visible through any read path
    assert!(app
        .service
        .list_messages(bob, conv.id)
        .await
        .unwrap()
        .is_empty());
    let listed = app.service.list_conversations(bob).await.unwrap();
    assert_eq!(listed[0].last_message, None);
    assert_eq!(listed[0].unread, 0);

    // the retry commits both writes
    app.service
        .send_message(alice, conv.id, "made it")
        .await
        .unwrap();
    let listed = app.service.list_conversations(bob).await.unwrap();
    assert_eq!(listed[0].last_message.as_deref(), Some("made it"));
    assert_eq!(listed[0].unread, 1);
}
