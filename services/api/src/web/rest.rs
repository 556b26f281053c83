//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification of the JSON endpoints.

use crate::web::{
    auth::{LoginRequest, RegisterRequest},
    entries::EntryRequest,
    habits::HabitRequest,
    response::{ErrorResponse, SuccessResponse},
};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::login_handler,
        crate::web::auth::register_handler,
        crate::web::habits::add_handler,
        crate::web::habits::remove_handler,
        crate::web::entries::update_handler,
    ),
    components(
        schemas(
            LoginRequest,
            RegisterRequest,
            HabitRequest,
            EntryRequest,
            SuccessResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Habit Tracker API", description = "Form-encoded endpoints for accounts, habits and entries.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_json_endpoint_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/login", "/register", "/add", "/remove", "/update"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
