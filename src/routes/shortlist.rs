use crate::models::{
    ActionResponse, ErrorResponse, RecordActionRequest, RefreshRequest, RefreshResponse,
    ShortlistResponse, ShortlistStatus,
};
use crate::routes::AppState;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure shortlist routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/shortlist", web::get().to(get_shortlist))
        .route("/shortlist/refresh", web::post().to(refresh_shortlist))
        .route("/shortlist/action", web::post().to(record_action));
}

/// Shortlist refresh endpoint
///
/// POST /api/v1/shortlist/refresh
///
/// Request body:
/// ```json
/// { "userId": "string" }
/// ```
///
/// Returns the tri-state outcome: applied (with the suggested count),
/// skipped (profile or embedding not ready), or an error response when
/// the merge failed and rolled back.
async fn refresh_shortlist(
    state: web::Data<AppState>,
    req: web::Json<RefreshRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.reconciler.refresh(&req.user_id).await {
        Ok(outcome) => HttpResponse::Ok().json(RefreshResponse::from(outcome)),
        Err(e) => {
            tracing::error!("Shortlist refresh failed for {}: {}", req.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Refresh failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Get shortlist endpoint
///
/// GET /api/v1/shortlist?userId={userId}
async fn get_shortlist(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let subject_id = match query.get("userId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing userId parameter".to_string(),
                message: "userId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    match state.store.list_entries(subject_id).await {
        Ok(entries) => {
            let count = entries.len();
            HttpResponse::Ok().json(ShortlistResponse {
                subject_id: subject_id.clone(),
                entries,
                count,
            })
        }
        Err(e) => {
            tracing::error!("Failed to fetch shortlist for {}: {}", subject_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch shortlist".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Record action endpoint
///
/// POST /api/v1/shortlist/action
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "candidateId": "string",
///   "action": "accept|pass|block"
/// }
/// ```
///
/// Drives the suggested -> active/passed/blocked transition. The store
/// write is guarded, so acting on an entry that already left
/// `suggested` reports `transitioned: false` instead of overwriting it.
async fn record_action(
    state: web::Data<AppState>,
    req: web::Json<RecordActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let status = match req.action.to_lowercase().as_str() {
        "accept" => ShortlistStatus::Active,
        "pass" => ShortlistStatus::Passed,
        "block" => ShortlistStatus::Blocked,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid action".to_string(),
                message: "Action must be one of: accept, pass, block".to_string(),
                status_code: 400,
            });
        }
    };

    match state
        .store
        .record_action(&req.user_id, &req.candidate_id, status)
        .await
    {
        Ok(transitioned) => {
            if !transitioned {
                tracing::debug!(
                    "No transition for {} -> {}: entry missing or already acted on",
                    req.user_id,
                    req.candidate_id
                );
            }
            HttpResponse::Ok().json(ActionResponse {
                transitioned,
                status,
            })
        }
        Err(e) => {
            tracing::error!(
                "Failed to record action for {} -> {}: {}",
                req.user_id,
                req.candidate_id,
                e
            );
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to record action".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::HealthResponse;

    #[test]
    fn test_health_response_shape() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
