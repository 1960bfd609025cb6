/// Download filename generation
use regex::Regex;
use std::sync::LazyLock;

use crate::element::ElementInfo;
use crate::settings::{SaveLocation, Settings};

pub const EXTENSION: &str = "png";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\-_]").expect("static regex"));

/// Replace every character outside `[a-zA-Z0-9_-]` with `_`
pub fn sanitize(value: &str) -> String {
    UNSAFE_CHARS.replace_all(value, "_").into_owned()
}

/// Turn an ISO-8601 timestamp into a filename-safe token
///
/// `2024-05-01T10:20:30.123Z` → `2024-05-01T10-20-30-123Z`
pub fn timestamp_token(iso_timestamp: &str) -> String {
    iso_timestamp.replace([':', '.'], "-")
}

/// Build `{prefix}_{expanded template}.png`
pub fn generate_filename(
    info: Option<&ElementInfo>,
    settings: &Settings,
    iso_timestamp: &str,
) -> String {
    let element_id = info.map(ElementInfo::label).unwrap_or("element");

    let expanded = settings
        .effective_template()
        .replace("{timestamp}", &timestamp_token(iso_timestamp))
        .replace("{elementId}", element_id);

    let mut filename = sanitize(&expanded);

    let prefix = settings.file_name_prefix.trim();
    if !prefix.is_empty() {
        filename = format!("{}_{}", sanitize(prefix), filename);
    }

    format!("{}.{}", filename, EXTENSION)
}

/// Sub-folder under the downloads directory, if one is configured
///
/// Each path segment is sanitized; empty, `.` and `..` segments are dropped.
pub fn download_dir(settings: &Settings) -> Option<String> {
    if settings.save_location != SaveLocation::Custom {
        return None;
    }

    let segments: Vec<String> = settings
        .custom_path
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(sanitize)
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Path handed to the downloads API, relative to the downloads directory
pub fn download_path(settings: &Settings, filename: &str) -> String {
    match download_dir(settings) {
        Some(dir) => format!("{}/{}", dir, filename),
        None => filename.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2024-05-01T10:20:30.123Z";

    fn hero() -> ElementInfo {
        ElementInfo {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 40.0,
            tag_name: "DIV".to_string(),
            class_name: "banner".to_string(),
            id: "hero".to_string(),
            ..ElementInfo::default()
        }
    }

    fn with_template(template: &str) -> Settings {
        Settings {
            filename_template: template.to_string(),
            ..Settings::default()
        }
    }

    fn is_safe(filename: &str) -> bool {
        filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }

    #[test]
    fn test_default_template() {
        let filename = generate_filename(Some(&hero()), &Settings::default(), NOW);
        assert_eq!(filename, "NodeShot_screenshot_2024-05-01T10-20-30-123Z.png");
    }

    #[test]
    fn test_element_id_substitution() {
        let settings = with_template("shot_{elementId}_{timestamp}");
        let filename = generate_filename(Some(&hero()), &settings, NOW);

        assert_eq!(filename, "NodeShot_shot_hero_2024-05-01T10-20-30-123Z.png");
    }

    #[test]
    fn test_element_id_falls_back_to_class_and_sanitizes() {
        let info = ElementInfo {
            id: String::new(),
            class_name: "card wide".to_string(),
            ..hero()
        };
        let filename = generate_filename(Some(&info), &with_template("{elementId}"), NOW);

        assert_eq!(filename, "NodeShot_card_wide.png");
    }

    #[test]
    fn test_missing_element_info() {
        let filename = generate_filename(None, &with_template("{elementId}"), NOW);
        assert_eq!(filename, "NodeShot_element.png");
    }

    #[test]
    fn test_every_placeholder_occurrence_replaced() {
        let settings = with_template("{elementId}-{elementId}");
        let filename = generate_filename(Some(&hero()), &settings, NOW);
        assert_eq!(filename, "NodeShot_hero-hero.png");
    }

    #[test]
    fn test_empty_prefix_is_omitted() {
        let settings = Settings {
            file_name_prefix: String::new(),
            ..with_template("{elementId}")
        };
        assert_eq!(generate_filename(Some(&hero()), &settings, NOW), "hero.png");
    }

    #[test]
    fn test_output_charset() {
        let templates = [
            "{timestamp}",
            "{elementId}",
            "my shot/{elementId}:{timestamp}",
            "../../etc/passwd {timestamp}",
            "émoji 📸 {elementId}",
            "",
        ];
        let settings_prefix = ["NodeShot", "My Prefix!", ""];

        for template in templates {
            for prefix in settings_prefix {
                let settings = Settings {
                    file_name_prefix: prefix.to_string(),
                    ..with_template(template)
                };
                let filename = generate_filename(Some(&hero()), &settings, NOW);

                assert!(is_safe(&filename), "unsafe filename: {}", filename);
                assert!(filename.ends_with(".png"));
                assert_eq!(filename.matches('.').count(), 1);
            }
        }
    }

    #[test]
    fn test_download_path_default_location() {
        let settings = Settings {
            custom_path: "ignored".to_string(),
            ..Settings::default()
        };
        assert_eq!(download_path(&settings, "a.png"), "a.png");
    }

    #[test]
    fn test_download_path_custom_location() {
        let settings = Settings {
            save_location: SaveLocation::Custom,
            custom_path: " shots / ../ web pages\\2024 ".to_string(),
            ..Settings::default()
        };
        assert_eq!(download_path(&settings, "a.png"), "shots/web_pages/2024/a.png");
    }

    #[test]
    fn test_download_path_custom_but_empty() {
        let settings = Settings {
            save_location: SaveLocation::Custom,
            custom_path: " / ".to_string(),
            ..Settings::default()
        };
        assert_eq!(download_path(&settings, "a.png"), "a.png");
    }
}
