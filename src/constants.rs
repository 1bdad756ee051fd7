/// User agent string for HTTP requests
pub const USER_AGENT: &str = "space-weather-forecast/0.1.0";

/// NASA DONKI API base URL
pub const DONKI_API_BASE: &str = "https://api.nasa.gov/DONKI";

/// Public demo key accepted by api.nasa.gov
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";

/// First day of the historical window
pub const DEFAULT_START_DATE: &str = "2012-01-01";

/// Days predicted beyond the last historical date
pub const DEFAULT_HORIZON_DAYS: u32 = 365;

/// Longest accepted horizon (ten years)
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// Timestamp layout used by every DONKI event field we read
pub const TIMESTAMP_PATTERN: &str = "%Y-%m-%dT%H:%MZ";

/// Calendar format of the `date` field in the output document
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";
