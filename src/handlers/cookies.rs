use std::collections::HashMap;

use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult};
use crate::session::Cookies;

/// GET /api/cookies - Cookies sent with this request, URL-decoded
pub async fn cookies_get(
    Extension(cookies): Extension<Cookies>,
) -> ApiResult<HashMap<String, String>> {
    Ok(ApiResponse::success(cookies.into_inner()))
}
