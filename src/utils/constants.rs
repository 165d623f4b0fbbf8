//! Shared configuration constants for stash
//!
//! Default values used by the config builder and the capture pipeline, kept
//! in one place to avoid magic numbers.

/// Default per-request timeout: 30 seconds
///
/// Applied to the page fetch, to every asset fetch and to every API call.
/// A request that exceeds it is treated like any other transport failure.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of assets fetched at once for a single capture
///
/// Pages routinely reference 50+ assets; without a cap every one of them
/// would hold an open connection at the same time.
pub const DEFAULT_MAX_CONCURRENT_ASSETS: usize = 8;

/// Default number of pages captured at once during a sync
pub const DEFAULT_MAX_CONCURRENT_CAPTURES: usize = 4;

/// Maximum size of a top-level page body: 10MB
pub const DEFAULT_MAX_PAGE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum size of a single asset: 25MB
///
/// Large enough for short video/audio clips referenced directly by a page.
pub const DEFAULT_MAX_ASSET_SIZE_BYTES: usize = 25 * 1024 * 1024;

/// Directory name under the platform data dir used when none is configured
pub const DEFAULT_DATA_DIR_NAME: &str = "kodegen-stash";

/// File name of the catalog document inside the data dir
pub const CATALOG_FILENAME: &str = "_index.json";

/// File name of the credentials document used by `FileCredentialStore`
pub const CREDENTIALS_FILENAME: &str = "credentials.json";

/// File name of the captured page inside each snapshot directory
pub const SNAPSHOT_INDEX_FILENAME: &str = "index.html";

/// Subtree inside each snapshot directory that holds fetched assets
pub const ASSETS_DIR_NAME: &str = "assets";

/// Extensions (lowercase) that qualify a URL as a capturable asset
pub const ASSET_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "gif", "webp", "svg", "ico", "woff", "woff2", "ttf",
    "otf", "mp4", "webm", "mp3", "m4a",
];

/// Chrome user agent string sent with page and asset requests
///
/// Some hosts serve reduced markup (or nothing) to unknown agents.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
