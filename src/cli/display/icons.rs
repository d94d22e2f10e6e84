//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// All artifacts present / operation succeeded
    pub const SUCCESS: &'static str = "✓";

    /// Some artifacts missing
    pub const WARNING: &'static str = "⚠";

    /// No artifacts / operation failed
    pub const ERROR: &'static str = "✗";

    pub const INFO: &'static str = "ℹ";

    pub const UNKNOWN: &'static str = "?";

    /// Icon for how many of a configuration's artifact files exist
    pub fn get_artifact_icon(present: usize, total: usize) -> &'static str {
        if total == 0 {
            Self::UNKNOWN
        } else if present == total {
            Self::SUCCESS
        } else if present > 0 {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }

    pub fn get_status_text(present: usize, total: usize) -> &'static str {
        if total == 0 {
            "Unknown"
        } else if present == total {
            "Ready"
        } else if present > 0 {
            "Partial"
        } else {
            "Missing"
        }
    }
}
