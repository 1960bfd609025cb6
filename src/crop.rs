/// Cropping a captured viewport bitmap down to one element.
///
/// The host captures the visible tab at device resolution, so every CSS
/// coordinate is multiplied by the device pixel ratio before it touches the
/// bitmap. Source pixels outside the bitmap stay transparent, matching what a
/// canvas `drawImage` would produce.

use base64::{Engine, engine::general_purpose::STANDARD as B64};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use std::io::Cursor;

use crate::element::ElementInfo;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Largest output in pixels, the same ceiling Chrome puts on a canvas
pub const MAX_OUTPUT_PIXELS: u64 = 268_435_456;

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Crop rectangle has zero width or height")]
    ZeroDimension,

    #[error("Element is too large to capture ({0}x{1} device pixels)")]
    TooLarge(f64, f64),

    #[error("Invalid device pixel ratio: {0}")]
    InvalidScale(f64),

    #[error("Not a base64 data URL")]
    MalformedDataUrl,

    #[error("Image decoding failed: {0}")]
    DecodingFailed(String),

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Crop rectangle in device pixels. The origin may be negative or past the
/// bitmap when the element is only partly on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl DeviceRegion {
    pub fn from_element(
        info: &ElementInfo,
        device_pixel_ratio: f64,
    ) -> Result<DeviceRegion, CropError> {
        if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
            return Err(CropError::InvalidScale(device_pixel_ratio));
        }

        let rect = info.viewport_rect();
        let width = (rect.width * device_pixel_ratio).round();
        let height = (rect.height * device_pixel_ratio).round();

        if !(width >= 1.0 && height >= 1.0) {
            return Err(CropError::ZeroDimension);
        }
        if width > u32::MAX as f64 || height > u32::MAX as f64 {
            return Err(CropError::TooLarge(width, height));
        }
        let pixels = (width as u64).checked_mul(height as u64);
        if !pixels.is_some_and(|pixels| pixels <= MAX_OUTPUT_PIXELS) {
            return Err(CropError::TooLarge(width, height));
        }

        Ok(DeviceRegion {
            x: (rect.left * device_pixel_ratio).round() as i64,
            y: (rect.top * device_pixel_ratio).round() as i64,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Copy `region` out of `source` into a new image of exactly the region size
pub fn crop_region(source: &RgbaImage, region: DeviceRegion) -> RgbaImage {
    let mut output = RgbaImage::new(region.width, region.height);

    let left = region.x.max(0);
    let top = region.y.max(0);
    let right = (region.x + region.width as i64).min(source.width() as i64);
    let bottom = (region.y + region.height as i64).min(source.height() as i64);

    if right <= left || bottom <= top {
        return output;
    }

    let visible = imageops::crop_imm(
        source,
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
    .to_image();

    imageops::replace(&mut output, &visible, left - region.x, top - region.y);
    output
}

/// Decode the body of a base64 `data:` URL
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, CropError> {
    let (header, body) = data_url.split_once(',').ok_or(CropError::MalformedDataUrl)?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(CropError::MalformedDataUrl);
    }

    B64.decode(body.trim()).map_err(|_| CropError::MalformedDataUrl)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CropError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| CropError::EncodingFailed(e.to_string()))?;

    Ok(png_bytes)
}

pub fn png_data_url(png_bytes: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, B64.encode(png_bytes))
}

/// Crop the captured tab to `info` and return a PNG data URL.
///
/// Output is always lossless PNG, so there is no quality parameter.
pub fn crop_data_url(
    data_url: &str,
    info: &ElementInfo,
    device_pixel_ratio: f64,
) -> Result<String, CropError> {
    let region = DeviceRegion::from_element(info, device_pixel_ratio)?;

    let bytes = decode_data_url(data_url)?;
    let source = image::load_from_memory(&bytes)
        .map_err(|e| CropError::DecodingFailed(e.to_string()))?
        .to_rgba8();

    log::debug!(
        "Cropping {}x{} capture to {:?} at dpr {}",
        source.width(),
        source.height(),
        region,
        device_pixel_ratio
    );

    let cropped = crop_region(&source, region);
    Ok(png_data_url(&encode_png(&cropped)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Each pixel encodes its own coordinates so crops can be checked exactly
    fn coordinate_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    fn element(x: f64, y: f64, width: f64, height: f64) -> ElementInfo {
        ElementInfo {
            x,
            y,
            width,
            height,
            tag_name: "DIV".to_string(),
            ..ElementInfo::default()
        }
    }

    #[test]
    fn test_region_dimensions_follow_dpr() {
        let cases = [
            (1.0, 10.0, 20.0, 100.0, 50.0),
            (2.0, 10.0, 20.0, 100.0, 50.0),
            (1.25, 3.0, 7.0, 33.0, 17.0),
            (1.5, 0.5, 0.5, 45.3, 12.7),
            (3.0, 1.0, 2.0, 9.9, 9.9),
        ];

        for (dpr, x, y, width, height) in cases {
            let region = DeviceRegion::from_element(&element(x, y, width, height), dpr).unwrap();

            assert_eq!(region.width, (width * dpr).round() as u32);
            assert_eq!(region.height, (height * dpr).round() as u32);
            assert_eq!(region.x, (x * dpr).round() as i64);
            assert_eq!(region.y, (y * dpr).round() as i64);
        }
    }

    #[test]
    fn test_region_subtracts_scroll() {
        let info = ElementInfo {
            scroll_x: 0.0,
            scroll_y: 500.0,
            ..element(10.0, 520.0, 40.0, 40.0)
        };

        let region = DeviceRegion::from_element(&info, 2.0).unwrap();

        assert_eq!((region.x, region.y), (20, 40));
    }

    #[test]
    fn test_region_rejects_bad_input() {
        assert!(matches!(
            DeviceRegion::from_element(&element(0.0, 0.0, 0.0, 10.0), 1.0),
            Err(CropError::ZeroDimension)
        ));
        assert!(matches!(
            DeviceRegion::from_element(&element(0.0, 0.0, 10.0, 10.0), 0.0),
            Err(CropError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_region_rejects_oversized_output() {
        // Past u32 in both directions
        assert!(matches!(
            DeviceRegion::from_element(&element(0.0, 0.0, 4e9, 4e9), 2.0),
            Err(CropError::TooLarge(_, _))
        ));
        // Fits u32 but not the pixel ceiling
        assert!(matches!(
            DeviceRegion::from_element(&element(0.0, 0.0, 2560.0, 420_000.0), 1.0),
            Err(CropError::TooLarge(_, _))
        ));
        // Exactly at the ceiling is still accepted
        let region = DeviceRegion::from_element(&element(0.0, 0.0, 16384.0, 16384.0), 1.0).unwrap();
        assert_eq!(region.width as u64 * region.height as u64, MAX_OUTPUT_PIXELS);
    }

    #[test]
    fn test_crop_data_url_refuses_huge_element() {
        let data_url = png_data_url(&encode_png(&coordinate_image(10, 10)).unwrap());

        let result = crop_data_url(&data_url, &element(0.0, 0.0, 4e9, 4e9), 2.0);

        assert!(matches!(result, Err(CropError::TooLarge(_, _))));
    }

    #[test]
    fn test_crop_content_matches_source() {
        let source = coordinate_image(200, 120);
        let region = DeviceRegion::from_element(&element(10.0, 5.0, 30.0, 20.0), 2.0).unwrap();

        let cropped = crop_region(&source, region);

        assert_eq!(cropped.dimensions(), (60, 40));
        for (x, y, pixel) in cropped.enumerate_pixels() {
            assert_eq!(pixel, source.get_pixel(20 + x, 10 + y));
        }
    }

    #[test]
    fn test_crop_outside_bitmap_is_transparent() {
        let source = coordinate_image(50, 50);
        let region = DeviceRegion {
            x: -10,
            y: 40,
            width: 20,
            height: 20,
        };

        let cropped = crop_region(&source, region);

        assert_eq!(cropped.dimensions(), (20, 20));
        assert_eq!(cropped.get_pixel(0, 0)[3], 0);
        assert_eq!(cropped.get_pixel(10, 0), source.get_pixel(0, 40));
        assert_eq!(cropped.get_pixel(19, 9), source.get_pixel(9, 49));
        assert_eq!(cropped.get_pixel(15, 15)[3], 0);
    }

    #[test]
    fn test_crop_data_url_round_trip() {
        let source = coordinate_image(100, 100);
        let data_url = png_data_url(&encode_png(&source).unwrap());

        let result = crop_data_url(&data_url, &element(5.0, 5.0, 10.0, 8.0), 1.5).unwrap();

        assert!(result.starts_with(PNG_DATA_URL_PREFIX));
        let decoded = image::load_from_memory(&decode_data_url(&result).unwrap())
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (15, 12));
        assert_eq!(decoded.get_pixel(0, 0), source.get_pixel(8, 8));
    }

    #[test]
    fn test_decode_data_url_rejects_garbage() {
        assert!(matches!(decode_data_url("not a url"), Err(CropError::MalformedDataUrl)));
        assert!(matches!(
            decode_data_url("data:image/png,plain"),
            Err(CropError::MalformedDataUrl)
        ));
    }

    #[test]
    fn test_crop_data_url_reports_decode_failure() {
        let data_url = format!("{}{}", PNG_DATA_URL_PREFIX, B64.encode(b"not a png"));
        let result = crop_data_url(&data_url, &element(0.0, 0.0, 10.0, 10.0), 1.0);

        assert!(matches!(result, Err(CropError::DecodingFailed(_))));
    }
}
