use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::{
    errors::CaptchaError,
    repositories::captcha::CaptchaVerifier,
    settings::AppConfig,
};

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,

    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Asks the hCaptcha `siteverify` oracle whether `response_token` was solved.
///
/// Returns the oracle's `success` flag. Anything short of a well-formed 2xx
/// answer is an error, which callers must treat as a failed verification.
pub async fn verify_captcha(
    client: &Client,
    verify_url: &str,
    response_token: &str,
    secret: &str,
    site_key: Option<&str>,
) -> Result<bool, CaptchaError> {
    if response_token.trim().is_empty() {
        return Err(CaptchaError::MissingToken);
    }

    let mut form = vec![("response", response_token), ("secret", secret)];
    if let Some(site_key) = site_key {
        form.push(("sitekey", site_key));
    }

    let response = client.post(verify_url).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CaptchaError::Status(status.as_u16()));
    }

    let body: SiteVerifyResponse = response.json().await?;
    if !body.success {
        debug!(error_codes = ?body.error_codes, "Captcha oracle rejected token");
    }

    Ok(body.success)
}

pub struct HCaptchaVerifier {
    client: Client,
    verify_url: String,
    secret: Zeroizing<String>,
    site_key: Option<String>,
}

impl HCaptchaVerifier {
    pub fn new(
        verify_url: impl Into<String>,
        secret: &str,
        site_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CaptchaError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CaptchaError::from)?;

        Ok(HCaptchaVerifier {
            client,
            verify_url: verify_url.into(),
            secret: Zeroizing::new(secret.to_string()),
            site_key: site_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CaptchaError> {
        Self::new(
            config.hcaptcha_verify_url.as_str(),
            &config.hcaptcha_secret,
            config.hcaptcha_site_key.clone(),
            config.outbound_timeout(),
        )
    }
}

#[async_trait]
impl CaptchaVerifier for HCaptchaVerifier {
    async fn verify(&self, response_token: &str) -> bool {
        match verify_captcha(
            &self.client,
            &self.verify_url,
            response_token,
            &self.secret,
            self.site_key.as_deref(),
        )
        .await
        {
            Ok(success) => success,
            Err(CaptchaError::MissingToken) => {
                debug!("Submission without captcha token");
                false
            }
            Err(e) => {
                warn!(error = %e, "Captcha verification unavailable, rejecting submission");
                false
            }
        }
    }
}

impl fmt::Debug for HCaptchaVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HCaptchaVerifier")
            .field("verify_url", &self.verify_url)
            .field("secret", &"[REDACTED]")
            .field("site_key", &self.site_key)
            .finish()
    }
}
