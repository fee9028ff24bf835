use actix_web::HttpResponse;

/// Public liveness probe; never requires authentication.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
