/// Base URL of the remote reference API
pub const DEFAULT_BASE_URL: &str = "https://swapi.info/api";

/// Default path of the local SQLite database
pub const DEFAULT_DB_PATH: &str = "holocron.db";

/// Per-request timeout for collection fetches (seconds)
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on the page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;
