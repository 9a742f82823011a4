pub mod captcha;
pub mod contact;
pub mod rate_limit;
pub mod sqlx_repo;
