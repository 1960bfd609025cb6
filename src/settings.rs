/// User preferences and their defaults
use serde::{Deserialize, Serialize};

/// chrome.storage.sync key holding the settings record
pub const SETTINGS_KEY: &str = "nodeshot_settings";

pub const DEFAULT_PREFIX: &str = "NodeShot";
pub const DEFAULT_TEMPLATE: &str = "screenshot_{timestamp}";
pub const DEFAULT_QUALITY: u8 = 90;
pub const DEFAULT_CAPTURE_DELAY_MS: u32 = 100;
pub const MAX_CAPTURE_DELAY_MS: u32 = 2000;

/// Where downloads are written
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SaveLocation {
    /// The browser's default downloads folder
    #[default]
    Downloads,
    /// A sub-folder of the downloads folder named by `customPath`
    Custom,
}

/// Format chosen on the options page. Output is PNG regardless.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn from_name(value: &str) -> ImageFormat {
        match value {
            "jpeg" => ImageFormat::Jpeg,
            "webp" => ImageFormat::Webp,
            _ => ImageFormat::Png,
        }
    }

    /// Whether a quality slider means anything for this format
    pub fn is_lossy(&self) -> bool {
        !matches!(self, ImageFormat::Png)
    }
}

/// Flat settings record. Missing fields are filled from the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub file_name_prefix: String,
    pub filename_template: String,
    pub image_quality: u8,
    pub save_location: SaveLocation,
    pub custom_path: String,
    pub image_format: ImageFormat,
    pub show_notification: bool,
    pub capture_delay: u32,
    pub include_metadata: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            file_name_prefix: DEFAULT_PREFIX.to_string(),
            filename_template: DEFAULT_TEMPLATE.to_string(),
            image_quality: DEFAULT_QUALITY,
            save_location: SaveLocation::Downloads,
            custom_path: String::new(),
            image_format: ImageFormat::Png,
            show_notification: true,
            capture_delay: DEFAULT_CAPTURE_DELAY_MS,
            include_metadata: true,
        }
    }
}

impl Settings {
    /// Clamp numeric fields into their valid ranges
    pub fn normalized(mut self) -> Settings {
        self.image_quality = self.image_quality.clamp(1, 100);
        self.capture_delay = self.capture_delay.min(MAX_CAPTURE_DELAY_MS);
        self
    }

    /// Template to expand, falling back to the default when blank
    pub fn effective_template(&self) -> &str {
        if self.filename_template.trim().is_empty() {
            DEFAULT_TEMPLATE
        } else {
            &self.filename_template
        }
    }

    /// Resolve a raw stored value, substituting defaults when absent
    pub fn from_stored(value: Option<serde_json::Value>) -> Result<Settings, serde_json::Error> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Settings::default()),
            Some(value) => serde_json::from_value::<Settings>(value).map(Settings::normalized),
        }
    }
}
