use actix_web::HttpRequest;

use crate::entities::client::ClientIdentity;

/// Reads the client identity from the trusted forwarded-address header.
///
/// Proxies that append to the header produce a comma-separated list; the first
/// entry is the client itself. A missing, non-ASCII or blank header yields
/// the shared `unknown` identity. The socket peer address is never used.
pub fn client_identity(req: &HttpRequest, header_name: &str) -> ClientIdentity {
    req.headers()
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(ClientIdentity::new)
        .unwrap_or_else(ClientIdentity::unknown)
}
