//! `Cookie` request header parsing and `Set-Cookie` formatting.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Browsers commonly refuse cookies larger than this.
pub const MAX_COOKIE_BYTES: usize = 4096;

const JSON_COOKIE_PREFIX: &str = "j:";
const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Parsed request cookies, available to handlers as a request extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies(HashMap<String, String>);

impl Cookies {
    /// Parse every `Cookie` header line in order.
    ///
    /// Lines are read as lossy UTF-8: a raw non-ASCII value only affects its
    /// own pair, never its neighbours.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = HashMap::new();
        for value in headers.get_all(header::COOKIE) {
            parse_into(&String::from_utf8_lossy(value.as_bytes()), &mut cookies);
        }
        Self(cookies)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of a `j:`-prefixed JSON cookie. Plain cookies and invalid JSON give `None`.
    pub fn json(&self, name: &str) -> Option<Value> {
        let raw = self.get(name)?.strip_prefix(JSON_COOKIE_PREFIX)?;
        serde_json::from_str(raw).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

/// Parse a single `Cookie` header value into name/value pairs.
///
/// Segments without `=` or with an empty name are skipped. The last
/// occurrence of a name wins.
pub fn parse(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    parse_into(header, &mut cookies);
    cookies
}

fn parse_into(header: &str, cookies: &mut HashMap<String, String>) {
    for segment in header.split(';') {
        let Some((name, value)) = segment.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        cookies.insert(name.to_string(), decode_value(value.trim()));
    }
}

fn decode_value(value: &str) -> String {
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    if !value.contains('%') {
        return value.to_string();
    }
    match percent_decode_str(value).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}

/// `Set-Cookie` value for a live session cookie.
pub fn format_set_cookie(name: &str, value: &str, max_age_secs: u64) -> String {
    format!("{name}={value}; Max-Age={max_age_secs}; Path=/; HttpOnly")
}

/// `Set-Cookie` value that tells the client to drop the cookie.
pub fn format_expired_cookie(name: &str) -> String {
    format!("{name}=; Max-Age=0; Path=/; HttpOnly; Expires={EXPIRED_DATE}")
}
