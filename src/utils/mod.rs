pub mod atomic_write;
pub mod constants;
pub mod url_utils;

pub use atomic_write::write_atomic;
pub use constants::*;
pub use url_utils::{fallback_title, hash_hex, host_of, is_http_url, sanitize_host};
