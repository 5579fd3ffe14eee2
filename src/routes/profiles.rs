use crate::models::{
    ErrorResponse, HealthResponse, RefreshResponse, SaveProfileRequest, SaveProfileResponse,
};
use crate::routes::AppState;
use crate::services::profile_text;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure profile and service-level routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/interests", web::get().to(get_interests))
        .route("/profiles", web::post().to(save_profile));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Interest taxonomy endpoint
///
/// GET /api/v1/interests
///
/// Serves the ordered canonical interest names that onboarding maps
/// free-text answers onto.
async fn get_interests(state: web::Data<AppState>) -> impl Responder {
    match state.store.interest_taxonomy().await {
        Ok(interests) => HttpResponse::Ok().json(interests),
        Err(e) => {
            tracing::error!("Failed to load interest taxonomy: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load interests".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Save profile endpoint
///
/// POST /api/v1/profiles
///
/// Persists the attribute bag, recomputes the profile embedding, then
/// triggers a shortlist refresh. A provider failure fails the request
/// (attributes are kept, the embedding stays absent so the profile is
/// simply not yet eligible for matching). A refresh failure is logged
/// and reported but never fails the save.
async fn save_profile(
    state: web::Data<AppState>,
    req: web::Json<SaveProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let user_id = &req.user_id;

    tracing::info!("Saving profile for {}", user_id);

    if let Err(e) = state.store.upsert_attributes(user_id, &req.attributes).await {
        tracing::error!("Failed to save attributes for {}: {}", user_id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to save profile".to_string(),
            message: e.to_string(),
            status_code: 500,
        });
    }

    // Embed the attribute bag. Failure here is a hard failure for the
    // save path: the profile must not silently look complete without a
    // usable embedding.
    let embedding = match state.embeddings.embed(&profile_text(&req.attributes)).await {
        Ok(vector) => vector,
        Err(e) => {
            tracing::error!("Embedding generation failed for {}: {}", user_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Embedding generation failed".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    if let Err(e) = state.store.set_embedding(user_id, &embedding).await {
        tracing::error!("Failed to store embedding for {}: {}", user_id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to store embedding".to_string(),
            message: e.to_string(),
            status_code: 500,
        });
    }

    // Best-effort refresh: a failure is observable in logs and in the
    // response body, but the profile save has already succeeded.
    let refresh = match state.reconciler.refresh(user_id).await {
        Ok(outcome) => RefreshResponse::from(outcome),
        Err(e) => {
            tracing::error!("Post-save shortlist refresh failed for {}: {}", user_id, e);
            RefreshResponse {
                outcome: "failed".to_string(),
                suggested: None,
                reason: None,
            }
        }
    };

    HttpResponse::Ok().json(SaveProfileResponse {
        user_id: user_id.clone(),
        embedded: true,
        refresh,
    })
}
