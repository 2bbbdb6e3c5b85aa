use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Any JSON object. A client-sent `id` is ignored.
#[derive(ToSchema)]
pub struct RecordFieldsDoc { pub name: Option<String> }

/// Stored record: the assigned `id` plus whatever fields were sent.
#[derive(ToSchema)]
pub struct RecordDoc { pub id: i64, pub name: Option<String> }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub detail: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::resources::list_records,
        crate::routes::resources::create_record,
        crate::routes::resources::update_record,
        crate::routes::resources::delete_record,
    ),
    components(
        schemas(
            HealthResponse,
            RecordFieldsDoc,
            RecordDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "records")
    )
)]
pub struct ApiDoc;
