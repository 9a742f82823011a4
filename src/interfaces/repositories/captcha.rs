use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Attests that a challenge token was solved by a human.
///
/// Implementations answer `false` for every failure, including an
/// unreachable oracle.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, response_token: &str) -> bool;
}
