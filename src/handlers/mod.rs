// Route handlers grouped by resource
pub mod cookies;
pub mod session;

pub use cookies::cookies_get;
pub use session::{session_delete, session_get, session_put};
