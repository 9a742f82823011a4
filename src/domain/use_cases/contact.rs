use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{error, info};

use crate::{
    entities::contact::{sanitize, validate, ContactResponse, RawContactForm},
    errors::{ContactError, RepositoryError},
    repositories::{captcha::CaptchaVerifier, contact::ContactRepository},
};

pub struct ContactHandler {
    pub contact_repo: Arc<dyn ContactRepository>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    db_timeout: Duration,
}

impl ContactHandler {
    pub fn new(
        contact_repo: Arc<dyn ContactRepository>,
        captcha: Arc<dyn CaptchaVerifier>,
        db_timeout: Duration,
    ) -> Self {
        ContactHandler {
            contact_repo,
            captcha,
            db_timeout,
        }
    }

    /// Verifies, normalizes, validates and stores one submission.
    ///
    /// The captcha is checked before any field is looked at, so a bot learns
    /// nothing about validation from a rejected token.
    pub async fn submit(&self, form: RawContactForm) -> Result<ContactResponse, ContactError> {
        if !self.captcha.verify(&form.captcha_response).await {
            return Err(ContactError::CaptchaFailed);
        }

        let submission = sanitize(&form);
        validate(&submission)?;

        let submitted_at = Utc::now();
        let stored = tokio::time::timeout(
            self.db_timeout,
            self.contact_repo.insert_contact(&submission, submitted_at),
        )
        .await
        .unwrap_or(Err(RepositoryError::Timeout(self.db_timeout)));

        if let Err(e) = stored {
            error!(error = %e, "Failed to store contact submission");
            return Err(e.into());
        }

        info!(
            country = %submission.country,
            interest = %submission.interest,
            "Contact submission stored"
        );

        Ok(ContactResponse::received())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::contact::ContactSubmission,
        repositories::{captcha::MockCaptchaVerifier, contact::MockContactRepository},
    };
    use async_trait::async_trait;
    use chrono::DateTime;

    fn valid_form() -> RawContactForm {
        RawContactForm {
            name: "  Ana Popescu ".into(),
            company: "Akademos".into(),
            email: " Ana@Example.MD ".into(),
            phone: "+37360000000".into(),
            country: "Moldova".into(),
            interest: "courses".into(),
            message: "Hello".into(),
            captcha_response: "10000000-aaaa-bbbb-cccc-000000000001".into(),
        }
    }

    fn passing_captcha() -> Arc<MockCaptchaVerifier> {
        let mut captcha = MockCaptchaVerifier::new();
        captcha.expect_verify().returning(|_| true);
        Arc::new(captcha)
    }

    fn untouched_repo() -> Arc<MockContactRepository> {
        let mut repo = MockContactRepository::new();
        repo.expect_insert_contact().times(0);
        Arc::new(repo)
    }

    fn handler(
        repo: Arc<dyn ContactRepository>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> ContactHandler {
        ContactHandler::new(repo, captcha, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn stores_sanitized_submission() {
        let mut repo = MockContactRepository::new();
        repo.expect_insert_contact()
            .withf(|s, _| s.name == "Ana Popescu" && s.email == "ana@example.md" && s.country == "Moldova")
            .times(1)
            .returning(|_, _| Ok(()));

        let response = handler(Arc::new(repo), passing_captcha())
            .submit(valid_form())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.message, "Thank you! We will contact you shortly.");
    }

    #[tokio::test]
    async fn failed_captcha_stops_before_validation() {
        let mut captcha = MockCaptchaVerifier::new();
        captcha.expect_verify().times(1).returning(|_| false);

        let form = RawContactForm {
            name: String::new(),
            ..valid_form()
        };
        let result = handler(untouched_repo(), Arc::new(captcha)).submit(form).await;

        assert!(matches!(result, Err(ContactError::CaptchaFailed)));
    }

    #[tokio::test]
    async fn missing_required_field_is_rejected() {
        let form = RawContactForm {
            country: "   ".into(),
            ..valid_form()
        };

        let result = handler(untouched_repo(), passing_captcha()).submit(form).await;

        assert!(matches!(result, Err(ContactError::MissingFields)));
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let form = RawContactForm {
            email: "not-an-email".into(),
            ..valid_form()
        };

        let result = handler(untouched_repo(), passing_captcha()).submit(form).await;

        assert!(matches!(result, Err(ContactError::InvalidEmail)));
    }

    #[tokio::test]
    async fn repository_failure_is_a_database_error() {
        let mut repo = MockContactRepository::new();
        repo.expect_insert_contact()
            .returning(|_, _| Err(RepositoryError::Database("duplicate key".into())));

        let result = handler(Arc::new(repo), passing_captcha()).submit(valid_form()).await;

        assert!(matches!(result, Err(ContactError::PersistenceFailed)));
    }

    struct HangingRepo;

    #[async_trait]
    impl ContactRepository for HangingRepo {
        async fn insert_contact(
            &self,
            _submission: &ContactSubmission,
            _submitted_at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_database_times_out() {
        let result = handler(Arc::new(HangingRepo), passing_captcha())
            .submit(valid_form())
            .await;

        assert!(matches!(result, Err(ContactError::PersistenceFailed)));
    }
}
