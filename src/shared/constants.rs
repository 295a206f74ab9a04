/// Object key prefix for uploaded images (`maint-img/{submission_id}`)
pub const IMAGE_KEY_PREFIX: &str = "maint-img";

/// Path the uploaded images are served from (`/maint-img/{submission_id}`)
pub const IMAGE_SERVE_PATH: &str = "/maint-img";

/// Prefix the backend puts in front of submission ids in `pk`
pub const SUBMISSION_PK_PREFIX: &str = "submission_";

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "X-API-Key";

// =============================================================================
// CLASSIFICATION POLLING
// =============================================================================

/// Delay between two classification status fetches
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Classification status fetches before giving up (~50 seconds)
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 100;

// =============================================================================
// UPLOADS
// =============================================================================

/// Largest image the classifier accepts (15 MiB)
pub const MAX_IMAGE_BYTES: u64 = 15 * 1024 * 1024;

/// Upload progress above which the progress bar is labelled
pub const PROGRESS_LABEL_THRESHOLD: u8 = 30;

// =============================================================================
// OPERATOR MAP
// =============================================================================

/// Entries shown per ranked list in the detail panel
pub const DETAIL_TOP_N: usize = 6;

/// Separator between report names in a marker title
pub const TITLE_SEPARATOR: &str = " / ";
