//! Lifts the visitor's session cookies off the inbound request.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};

use crate::application::remote::SessionCredential;

impl<S> FromRequestParts<S> for SessionCredential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(credential_from_headers(&parts.headers))
    }
}

/// Copy every `Cookie` header verbatim; HTTP/2 clients may split them.
pub fn credential_from_headers(headers: &HeaderMap) -> SessionCredential {
    SessionCredential::from_header_values(headers.get_all(COOKIE))
}
