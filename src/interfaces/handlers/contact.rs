use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use tracing::{debug, error, info};

use crate::{
    entities::contact::ContactResponse,
    errors::ContactError,
    handlers::form::read_contact_form,
    middlewares::cors::preflight_response,
    utils::get_client_ip::client_identity,
    AppState,
};

/// Single entry point for every path: preflight, method check, rate limit,
/// then the submission pipeline.
pub async fn intake(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ContactError> {
    if req.method() == Method::OPTIONS {
        return Ok(preflight_response());
    }

    if req.method() != Method::POST {
        return Err(ContactError::MethodNotAllowed);
    }

    let identity = client_identity(&req, &state.client_ip_header);
    let decision = state.rate_limiter.check(&identity).await;

    if !decision.allowed {
        info!(client = %identity, "Rate limited contact submission");
        return Err(ContactError::RateLimited {
            retry_after_secs: state.rate_limiter.window_secs(),
        });
    }
    debug!(client = %identity, remaining = decision.remaining, "Contact submission admitted");

    let outcome: Result<ContactResponse, ContactError> = async {
        let form = read_contact_form(&req, payload, state.max_body_bytes).await?;
        state.contact_handler.submit(form).await
    }
    .await;

    let response = outcome.inspect_err(|e| {
        if let ContactError::InternalFault(detail) = e {
            error!(client = %identity, detail = %detail, "Unexpected failure handling contact submission");
        }
    })?;

    Ok(HttpResponse::Ok().json(response))
}
