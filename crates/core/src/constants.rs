//! Constants used throughout the hospital data core.

use std::time::Duration;

/// Default directory for the file-backed key/value store when none is configured.
pub const DEFAULT_DATA_DIR: &str = "hospital_data";

/// Key the medical state record is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "medical_data";

/// Key the API bearer token is stored under.
pub const DEFAULT_TOKEN_KEY: &str = "auth_token";

/// Quiet period before pending changes are written back.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Buffered change events per subscriber before slow receivers start lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// File extension of records in the file-backed store.
pub const RECORD_FILE_EXTENSION: &str = "json";

/// Base URL of allocated telemedicine meeting rooms.
pub const TELEMEDICINE_BASE_URL: &str = "https://meet.hospital.local/room";
