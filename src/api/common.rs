// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Common API helpers
//!
//! Basic and simple authentication can hand the token out as a cookie
//! instead of a body. The caller asks for it with the headers:
//!
//! - `X-Set-Cookie`: name of the cookie,
//! - `X-Set-Cookie-Domain`: domain of the cookie,
//! - `X-Set-Cookie-Insecure`: `yes` drops the `Secure` attribute.
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use autentigo_api_types::Claims;

use crate::api::error::AutentigoApiError;

pub(crate) const X_SET_COOKIE: &str = "x-set-cookie";
pub(crate) const X_SET_COOKIE_DOMAIN: &str = "x-set-cookie-domain";
pub(crate) const X_SET_COOKIE_INSECURE: &str = "x-set-cookie-insecure";

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CookieRequest {
    name: String,
    domain: Option<String>,
    secure: bool,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|val| val.to_str().ok())
        .map(str::trim)
        .filter(|val| !val.is_empty())
}

impl CookieRequest {
    /// Cookie requested by the headers, if any.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, AutentigoApiError> {
        let Some(name) = header_str(headers, X_SET_COOKIE) else {
            return Ok(None);
        };
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
        {
            return Err(AutentigoApiError::BadRequest(format!(
                "invalid cookie name {name}"
            )));
        }
        Ok(Some(Self {
            name: name.to_string(),
            domain: header_str(headers, X_SET_COOKIE_DOMAIN).map(ToString::to_string),
            secure: header_str(headers, X_SET_COOKIE_INSECURE) != Some("yes"),
        }))
    }

    fn header_value(&self, token: &str, claims: &Claims) -> Result<HeaderValue, AutentigoApiError> {
        let mut cookie = format!(
            "{}={}; Path=/; Expires={}; HttpOnly",
            self.name,
            token,
            claims.expires_at().format("%a, %d %b %Y %H:%M:%S GMT")
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        HeaderValue::from_str(&cookie)
            .map_err(|_| AutentigoApiError::BadRequest("invalid cookie domain".into()))
    }

    /// Empty `201 Created` response setting the cookie.
    pub(crate) fn response(&self, token: &str, claims: &Claims) -> Result<Response, AutentigoApiError> {
        Ok((
            StatusCode::CREATED,
            [(header::SET_COOKIE, self.header_value(token, claims)?)],
        )
            .into_response())
    }
}

#[cfg(test)]
mod tests {
    use autentigo_api_types::ExtraClaims;
    use chrono::DateTime;

    use super::*;

    fn claims() -> Claims {
        Claims::new(
            "alice",
            ExtraClaims::default(),
            DateTime::from_timestamp(0, 0).unwrap(),
            DateTime::from_timestamp(784111777, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_no_cookie() {
        assert_eq!(None, CookieRequest::from_headers(&HeaderMap::new()).unwrap());
    }

    #[test]
    fn test_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(X_SET_COOKIE, "auth".parse().unwrap());
        let cookie = CookieRequest::from_headers(&headers).unwrap().unwrap();
        assert_eq!(
            "auth=tkn; Path=/; Expires=Sun, 06 Nov 1994 08:49:37 GMT; HttpOnly; Secure",
            cookie.header_value("tkn", &claims()).unwrap()
        );

        headers.insert(X_SET_COOKIE_DOMAIN, "example.org".parse().unwrap());
        headers.insert(X_SET_COOKIE_INSECURE, "yes".parse().unwrap());
        let cookie = CookieRequest::from_headers(&headers).unwrap().unwrap();
        assert_eq!(
            "auth=tkn; Path=/; Expires=Sun, 06 Nov 1994 08:49:37 GMT; HttpOnly; Domain=example.org",
            cookie.header_value("tkn", &claims()).unwrap()
        );
    }

    #[test]
    fn test_invalid_cookie_name() {
        let mut headers = HeaderMap::new();
        headers.insert(X_SET_COOKIE, "a=b; Domain=evil".parse().unwrap());
        assert!(matches!(
            CookieRequest::from_headers(&headers),
            Err(AutentigoApiError::BadRequest(_))
        ));
    }
}
