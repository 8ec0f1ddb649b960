use std::env;
use std::path::PathBuf;

/// Current version of the on-disk store format
pub const STORE_VERSION: &str = "1.0.0";

/// Get the path to the ManagMe data directory (~/.managme)
pub fn managme_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".managme")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".managme")
    }
}
