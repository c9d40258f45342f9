/// OpenAPI documentation for the so.dev messaging service
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "so.dev Messaging Service API",
        version = "0.1.0",
        description = "Direct-message conversations: get-or-create, history, send, read-state"
    ),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Conversations", description = "Conversation listing and read-state"),
        (name = "Messages", description = "Message history and sending"),
    ),
    components(schemas(
        crate::models::UserProfile,
        crate::models::ConversationView,
        crate::models::MessageView,
        crate::routes::conversations::MarkReadResponse,
        crate::routes::messages::SendMessageRequest,
        crate::middleware::error_handling::ErrorBody,
    ))
)]
pub struct ApiDoc;
