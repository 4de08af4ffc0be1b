pub mod codec;
pub mod cookie;
pub mod handle;

pub use codec::SessionCodec;
pub use cookie::Cookies;
pub use handle::Session;

/// Session contents: a JSON object keyed by string.
pub type SessionData = serde_json::Map<String, serde_json::Value>;
