use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{captcha, db, limiter, utils};

use repositories::{captcha::CaptchaVerifier, contact::ContactRepository, rate_limit::RateLimitStore};
use use_cases::{contact::ContactHandler, rate_limit::RateLimiter};

pub struct AppState {
    pub contact_handler: ContactHandler,
    pub rate_limiter: RateLimiter,
    pub client_ip_header: String,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        contact_repo: Arc<dyn ContactRepository>,
        rate_limit_store: Arc<dyn RateLimitStore>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> Self {
        let timeout = config.outbound_timeout();

        let rate_limiter = RateLimiter::new(
            rate_limit_store,
            config.rate_limit_max_requests,
            config.rate_limit_window_secs,
            timeout,
        );
        let contact_handler = ContactHandler::new(contact_repo, captcha, timeout);

        AppState {
            contact_handler,
            rate_limiter,
            client_ip_header: config.client_ip_header.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}
