use actix_web::{HttpResponse, Result};

use super::middleware::AuthenticatedUser;

pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse> {
    log::info!("/auth/me called for user: {}", user.0.sub);
    Ok(HttpResponse::Ok().json(user.0))
}
