use actix_web::HttpResponse;
use serde_json::json;

use crate::services::ServiceError;

pub mod generations;
pub mod product_types;
pub mod templates;

/// Maps a service failure onto the JSON error response returned by the API.
///
/// `context` names the failed operation in the server log.
pub fn error_response(err: ServiceError, context: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().json(json!({ "error": "not found" })),
        ServiceError::Conflict(message) => {
            HttpResponse::Conflict().json(json!({ "error": message }))
        }
        ServiceError::Form(message) => HttpResponse::BadRequest().json(json!({ "error": message })),
        ServiceError::Validation(errors) => {
            HttpResponse::UnprocessableEntity().json(json!({ "errors": errors }))
        }
        ServiceError::MissingProductType(handles) => HttpResponse::UnprocessableEntity().json(
            json!({ "error": "a default product type is required", "handles": handles }),
        ),
        ServiceError::ImportInterrupted {
            applied,
            handle,
            reason,
            conflict,
        } => {
            let body = json!({
                "error": "import interrupted",
                "applied": applied,
                "handle": handle,
                "reason": reason,
            });
            if conflict {
                log::warn!("{context}: import stopped at `{handle}` after {applied} records: {reason}");
                HttpResponse::Conflict().json(body)
            } else {
                log::error!("{context}: import stopped at `{handle}` after {applied} records: {reason}");
                HttpResponse::InternalServerError().json(body)
            }
        }
        ServiceError::Storage(message) => {
            log::error!("{context}: {message}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (
                ServiceError::Conflict("stale".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Form("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Validation(vec!["Missing title".to_string()]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::MissingProductType(vec!["mug".to_string()]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::ImportInterrupted {
                    applied: 1,
                    handle: "mug".to_string(),
                    reason: "boom".to_string(),
                    conflict: false,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::ImportInterrupted {
                    applied: 2,
                    handle: "mug".to_string(),
                    reason: "stale".to_string(),
                    conflict: true,
                },
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::Storage("db".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(error_response(err, "test").status(), status);
        }
    }

    #[actix_web::test]
    async fn stale_import_reports_reason_with_conflict_status() {
        let response = error_response(
            ServiceError::ImportInterrupted {
                applied: 1,
                handle: "mug".to_string(),
                reason: "template `mug` was modified concurrently".to_string(),
                conflict: true,
            },
            "test",
        );

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("readable body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("JSON body");
        assert_eq!(json["applied"], 1);
        assert_eq!(json["handle"], "mug");
        assert_eq!(json["reason"], "template `mug` was modified concurrently");
    }
}
