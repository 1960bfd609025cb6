/// Background half of a capture: grab, crop, name, download, record
use crate::element::ElementInfo;
use crate::error::{NodeShotError, Result};
use crate::filename::{download_path, generate_filename};
use crate::history::{HistoryLog, HistoryRecord};
use crate::settings::Settings;

/// Host services a capture needs. Implemented over chrome.* in the
/// background worker and by an in-memory fake in tests.
#[allow(async_fn_in_trait)]
pub trait CaptureHost {
    async fn settings(&self) -> Result<Settings>;

    /// PNG data URL of the visible part of the tab
    async fn capture_visible_tab(&self, quality: u8) -> Result<String>;

    /// Ask the page to crop `data_url` to `info`, returning a PNG data URL
    async fn crop_in_page(&self, data_url: String, info: &ElementInfo) -> Result<String>;

    /// Start a download and return its id
    async fn download(&self, url: &str, path: &str) -> Result<i32>;

    async fn load_history(&self) -> Result<HistoryLog>;

    async fn save_history(&self, log: &HistoryLog) -> Result<()>;

    fn now_iso(&self) -> String;
}

/// Run one capture to completion and return the saved filename.
///
/// Steps run strictly in order; the first failure aborts the rest, so a
/// failed capture never reaches the history log. Once the download has
/// started the file exists, so a history failure is only logged.
pub async fn run_capture<H: CaptureHost>(host: &H, info: &ElementInfo) -> Result<String> {
    if info.width <= 0.0 || info.height <= 0.0 {
        return Err(NodeShotError::ElementNotVisible);
    }

    let settings = host.settings().await?;

    // PNG is lossless; the quality is forwarded but changes nothing
    let captured = host.capture_visible_tab(settings.image_quality).await?;
    log::debug!("Captured visible tab ({} bytes)", captured.len());

    let cropped = host.crop_in_page(captured, info).await?;

    let timestamp = host.now_iso();
    let filename = generate_filename(Some(info), &settings, &timestamp);
    let path = download_path(&settings, &filename);

    let download_id = host.download(&cropped, &path).await?;
    log::info!("Saved {} (download {})", path, download_id);

    let record = HistoryRecord {
        timestamp,
        filename: filename.clone(),
        element_info: settings.include_metadata.then(|| info.clone()),
        download_id,
    };
    match record_history(host, record).await {
        Ok(count) => log::debug!("History holds {} captures", count),
        Err(e) => log::warn!("Saved {} but could not update history: {}", filename, e),
    }

    Ok(filename)
}

async fn record_history<H: CaptureHost>(host: &H, record: HistoryRecord) -> Result<usize> {
    let mut history = host.load_history().await?;
    history.record(record);
    host.save_history(&history).await?;
    Ok(history.len())
}
