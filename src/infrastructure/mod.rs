pub mod captcha;
pub mod db;
pub mod limiter;
pub mod utils;
