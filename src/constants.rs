// Rate limiting
pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;
pub const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit:";

// Client identity
pub const DEFAULT_CLIENT_IP_HEADER: &str = "CF-Connecting-IP";
pub const UNKNOWN_CLIENT: &str = "unknown";

// Captcha
pub const DEFAULT_HCAPTCHA_VERIFY_URL: &str = "https://hcaptcha.com/siteverify";
pub const CAPTCHA_RESPONSE_FIELD: &str = "h-captcha-response";

// CORS
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";
pub const CORS_MAX_AGE_SECS: u32 = 86400;

// Responses
pub const SUCCESS_MESSAGE: &str = "Thank you! We will contact you shortly.";
