use actix_multipart::Multipart;
use actix_web::{
    http::header,
    web::{self, BytesMut},
    HttpRequest,
};
use futures_util::{StreamExt, TryStreamExt};
use url::form_urlencoded;

use crate::{entities::contact::RawContactForm, errors::ContactError};

/// Reads the submitted fields from either a urlencoded or a multipart body.
///
/// Browsers posting a `FormData` object send `multipart/form-data`; plain HTML
/// forms send `application/x-www-form-urlencoded`. Any other content type is
/// parsed as urlencoded, which at worst yields an empty form.
pub async fn read_contact_form(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<RawContactForm, ContactError> {
    if is_multipart(req) {
        read_multipart(req, payload, limit).await
    } else {
        read_urlencoded(payload, limit).await
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_urlencoded(
    mut payload: web::Payload,
    limit: usize,
) -> Result<RawContactForm, ContactError> {
    let mut body = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(body_too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(RawContactForm::from_pairs(form_urlencoded::parse(&body)))
}

async fn read_multipart(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<RawContactForm, ContactError> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut total = 0usize;

    while let Some(mut field) = multipart.try_next().await? {
        let name = field.name().map(str::to_string);
        let mut value = Vec::new();

        while let Some(chunk) = field.try_next().await? {
            total += chunk.len();
            if total > limit {
                return Err(body_too_large(limit));
            }
            value.extend_from_slice(&chunk);
        }

        if let Some(name) = name {
            pairs.push((name, String::from_utf8_lossy(&value).into_owned()));
        }
    }

    Ok(RawContactForm::from_pairs(pairs))
}

fn body_too_large(limit: usize) -> ContactError {
    ContactError::InternalFault(format!("Request body exceeds {} bytes", limit))
}
