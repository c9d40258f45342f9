mod common;

use common::test_app;
use sodev_messaging::error::AppError;
use sodev_messaging::store::MessageStore;
use uuid::Uuid;

#[tokio::test]
async fn non_participant_is_denied_everywhere() {
    let app = test_app();
    let alice = app.users.add_user("alice");
    let bob = app.users.add_user("bob");
    let carol = app.users.add_user("carol");
    let conv = app
        .service
        .get_or_create_conversation(alice, bob)
        .await
        .unwrap();
    app.service.send_message(alice, conv.id, "private").await.unwrap();

    let err = app.service.list_messages(carol, conv.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = app
        .service
        .send_message(carol, conv.id, "intruding")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = app.service.mark_read(carol, conv.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // and the denied attempts changed nothing
    assert_eq!(
        app.store.list_by_conversation(conv.id).await.unwrap().len(),
        1
    );
    assert_eq!(app.store.count_unread(conv.id, bob).await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_conversation_is_not_found() {
    let app = test_app();
    let alice = app.users.add_user("alice");
    let missing = Uuid::new_v4();

    let err = app.service.list_messages(alice, missing).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("conversation")));

    let err = app
        .service
        .send_message(alice, missing, "hello?")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("conversation")));

    let err = app.service.mark_read(alice, missing).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("conversation")));
}
