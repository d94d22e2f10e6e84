//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Color for how many of a configuration's artifact files exist on disk
    pub fn get_artifact_color(&self, present: usize, total: usize) -> TableColor {
        if total == 0 {
            self.muted
        } else if present == total {
            self.success
        } else if present > 0 {
            self.warning
        } else {
            self.error
        }
    }

    pub fn get_value_color(&self, value: &str) -> TableColor {
        if value.is_empty() {
            self.muted
        } else {
            self.info
        }
    }
}
