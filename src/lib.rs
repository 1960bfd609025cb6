/// NodeShot - Chrome Extension that saves a screenshot of one page element
/// Built with Rust + WASM + Yew

mod background;
pub mod content;
mod crop;
mod element;
mod error;
mod filename;
mod history;
mod host;
mod messages;
mod pipeline;
mod restricted;
mod selection;
mod settings;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export the page check for JavaScript access
#[wasm_bindgen]
pub fn is_restricted_url(url: &str) -> bool {
    restricted::is_restricted_url(url)
}

// Start the service worker listeners
#[wasm_bindgen]
pub fn start_background() {
    background::start();
}

// Start the in-page message listener
#[wasm_bindgen]
pub fn start_content() {
    content::start();
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}
