//! Journey configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mobile device profile used for emulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Profile name (for logs and reports)
    pub name: String,
    /// Viewport width in CSS pixels
    pub width: u32,
    /// Viewport height in CSS pixels
    pub height: u32,
    /// Device pixel ratio
    pub scale_factor: f64,
    /// User agent string
    pub user_agent: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            name: "Pixel 7".to_string(),
            width: 412,
            height: 915,
            scale_factor: 2.625,
            user_agent: "Mozilla/5.0 (Linux; Android 14; Pixel 7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36"
                .to_string(),
        }
    }
}

/// Static configuration for one journey run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyConfig {
    /// Site under test
    pub base_url: String,
    /// Route of the search page, appended to `base_url`
    pub search_path: String,
    /// Query to type into the search field
    pub search_term: String,
    /// Device to emulate
    pub device: DeviceProfile,
    /// Directory for logs and failure evidence
    pub output_dir: PathBuf,
    /// Path of the final evidence screenshot
    pub screenshot_path: PathBuf,
    /// Force headless on/off; `None` follows the environment (headless in CI)
    pub headless: Option<bool>,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://m.twitch.tv".to_string(),
            search_path: "/search".to_string(),
            search_term: "lofi hip hop".to_string(),
            device: DeviceProfile::default(),
            output_dir: PathBuf::from("output"),
            screenshot_path: PathBuf::from("output/final_screen.png"),
            headless: None,
        }
    }
}

impl JourneyConfig {
    /// Create a default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the site under test
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the search term
    #[must_use]
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Set the device profile
    #[must_use]
    pub fn with_device(mut self, device: DeviceProfile) -> Self {
        self.device = device;
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the evidence screenshot path
    #[must_use]
    pub fn with_screenshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_path = path.into();
        self
    }

    /// Force headless mode on or off
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// Full URL of the search page
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.search_path)
    }
}
