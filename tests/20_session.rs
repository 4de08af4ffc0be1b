mod common;

use anyhow::{Context, Result};
use reqwest::{header, StatusCode};
use serde_json::json;

#[tokio::test]
async fn new_session_is_issued_and_read_back() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .put(server.url("/api/session"))
        .json(&json!({ "user": "alice" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?
        .to_string();
    assert!(set_cookie.starts_with("cvedbSession="), "{}", set_cookie);
    assert!(set_cookie.contains("Max-Age=86400"), "{}", set_cookie);
    assert!(set_cookie.contains("HttpOnly"), "{}", set_cookie);

    let cookie = common::session_cookie(&res).context("missing session cookie")?;
    let res = client
        .get(server.url("/api/session"))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;

    // Reading without mutating re-issues nothing
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["session"], json!({ "user": "alice" }));
    assert_eq!(body["data"]["is_new"], false);
    Ok(())
}

#[tokio::test]
async fn garbage_cookie_behaves_like_first_visit() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/session"))
        .header(header::COOKIE, "cvedbSession=garbage")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["session"], json!({}));
    assert_eq!(body["data"]["is_new"], true);
    Ok(())
}

#[tokio::test]
async fn cookie_from_other_secret_is_ignored() -> Result<()> {
    let other = common::start_server_with_key("some-other-key").await?;
    let client = reqwest::Client::new();

    let res = client
        .put(other.url("/api/session"))
        .json(&json!({ "user": "mallory" }))
        .send()
        .await?;
    let foreign_cookie = common::session_cookie(&res).context("missing session cookie")?;

    let server = common::start_server().await?;
    let body = client
        .get(server.url("/api/session"))
        .header(header::COOKIE, &foreign_cookie)
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(body["data"]["session"], json!({}));
    assert_eq!(body["data"]["is_new"], true);
    Ok(())
}

#[tokio::test]
async fn delete_expires_the_cookie() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .put(server.url("/api/session"))
        .json(&json!({ "user": "alice" }))
        .send()
        .await?;
    let cookie = common::session_cookie(&res).context("missing session cookie")?;

    let res = client
        .delete(server.url("/api/session"))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?;
    assert!(set_cookie.starts_with("cvedbSession=;"), "{}", set_cookie);
    assert!(set_cookie.contains("Max-Age=0"), "{}", set_cookie);
    Ok(())
}
