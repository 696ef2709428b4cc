use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use cookie::Cookie;
use std::convert::Infallible;

use super::{AppState, errors::AppError};
use crate::session::{self, FLASH_COOKIE, Identity};

/// The signed-in user. Requests without a valid session are sent to the login page.
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session::identity_from_headers(&state.session_key, &parts.headers) {
            Some(identity) => Ok(CurrentUser(identity)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "no session, redirecting to login");
                Err(Redirect::to("/"))
            }
        }
    }
}

/// One-shot messages left by the previous redirect.
pub struct Flashes(pub Vec<String>);

impl FromRequestParts<AppState> for Flashes {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Flashes(session::flashes_from_headers(
            &state.session_key,
            &parts.headers,
        )))
    }
}

/// Attach `Set-Cookie` headers to a response.
pub fn with_cookies(
    response: impl IntoResponse,
    cookies: &[Cookie<'static>],
) -> Result<Response, AppError> {
    let mut response = response.into_response();
    for cookie in cookies {
        let value = HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| AppError::Internal(format!("invalid cookie header: {e}")))?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// Redirect to `to`, leaving `message` for the next rendered page.
pub fn redirect_with_flash(
    state: &AppState,
    to: &str,
    message: &str,
) -> Result<Response, AppError> {
    let cookie = session::flash_cookie(&state.session_key, &[message.to_string()])?;
    with_cookies(Redirect::to(to), &[cookie])
}

/// Render a page. Flashes shown on it are consumed.
pub fn render_page(html: String, shown_flashes: bool) -> Result<Response, AppError> {
    let page = axum::response::Html(html);
    if shown_flashes {
        with_cookies(page, &[session::removal_cookie(FLASH_COOKIE)])
    } else {
        Ok(page.into_response())
    }
}
