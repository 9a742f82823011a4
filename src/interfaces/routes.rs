use actix_web::web;

use crate::handlers::contact::intake;

/// Paths are not distinguished: every request lands on the intake handler.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.default_service(web::to(intake));
}
