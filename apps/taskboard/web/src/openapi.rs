//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the taskboard
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskboard",
        version = "0.1.0",
        description = "Server-rendered task list with create, edit, delete, filter and sort",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/tasks", api = domain_tasks::TasksApiDoc)
    )
)]
pub struct ApiDoc;
