pub mod hcaptcha;
