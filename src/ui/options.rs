/// Options page: edit, save and reset the settings record

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::host::PreferencesStore;
use crate::settings::{ImageFormat, MAX_CAPTURE_DELAY_MS, SaveLocation, Settings};
use crate::ui::components::{Flash, FlashKind, FormRow, use_flash};

/// Form fields, each mapped onto one settings property
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingField {
    Prefix,
    Template,
    Quality,
    SaveLocation,
    CustomPath,
    Format,
    ShowNotification,
    CaptureDelay,
    IncludeMetadata,
}

impl SettingField {
    /// Apply a raw form value. Unparseable numbers leave the field unchanged.
    pub fn apply(self, settings: &Settings, value: &str) -> Settings {
        let mut next = settings.clone();
        match self {
            SettingField::Prefix => next.file_name_prefix = value.to_string(),
            SettingField::Template => next.filename_template = value.to_string(),
            SettingField::Quality => {
                if let Ok(quality) = value.trim().parse::<u8>() {
                    next.image_quality = quality;
                }
            }
            SettingField::SaveLocation => {
                next.save_location = if value == "custom" {
                    SaveLocation::Custom
                } else {
                    SaveLocation::Downloads
                };
            }
            SettingField::CustomPath => next.custom_path = value.to_string(),
            SettingField::Format => next.image_format = ImageFormat::from_name(value),
            SettingField::ShowNotification => next.show_notification = value == "true",
            SettingField::CaptureDelay => {
                if let Ok(delay) = value.trim().parse::<u32>() {
                    next.capture_delay = delay;
                }
            }
            SettingField::IncludeMetadata => next.include_metadata = value == "true",
        }
        next.normalized()
    }
}

/// Read the value an input, checkbox or select carries after a change
fn event_value(event: &Event) -> Option<String> {
    if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
        if input.type_() == "checkbox" {
            return Some(input.checked().to_string());
        }
        return Some(input.value());
    }
    event
        .target_dyn_into::<HtmlSelectElement>()
        .map(|select| select.value())
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let settings = use_state(Settings::default);
    let loading = use_state(|| true);
    let (status, show_status) = use_flash();
    let (error, show_error) = use_flash();

    // Load stored settings on mount
    {
        let settings = settings.clone();
        let loading = loading.clone();
        let show_error = show_error.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match PreferencesStore::get().await {
                    Ok(stored) => settings.set(stored),
                    Err(e) => show_error.emit(format!("Failed to load settings: {}", e)),
                }
                loading.set(false);
            });
            || ()
        });
    }

    let on_field = {
        let settings = settings.clone();
        move |field: SettingField| {
            let settings = settings.clone();
            Callback::from(move |event: Event| {
                if let Some(value) = event_value(&event) {
                    settings.set(field.apply(&settings, &value));
                }
            })
        }
    };

    let on_save = {
        let settings = settings.clone();
        let show_status = show_status.clone();
        let show_error = show_error.clone();

        Callback::from(move |_| {
            let current = (*settings).clone();
            let show_status = show_status.clone();
            let show_error = show_error.clone();

            spawn_local(async move {
                match PreferencesStore::set(&current).await {
                    Ok(()) => show_status.emit("Settings saved".to_string()),
                    Err(e) => show_error.emit(format!("Failed to save: {}", e)),
                }
            });
        })
    };

    let on_reset = {
        let settings = settings.clone();

        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .and_then(|window| {
                    window
                        .confirm_with_message("Reset all settings to their defaults?")
                        .ok()
                })
                .unwrap_or(false);
            if !confirmed {
                return;
            }

            let settings = settings.clone();
            let show_status = show_status.clone();
            let show_error = show_error.clone();

            spawn_local(async move {
                let reloaded = match PreferencesStore::reset().await {
                    Ok(()) => PreferencesStore::get().await,
                    Err(e) => Err(e),
                };
                match reloaded {
                    Ok(defaults) => {
                        settings.set(defaults);
                        show_status.emit("Settings reset to defaults".to_string());
                    }
                    Err(e) => show_error.emit(format!("Failed to reset: {}", e)),
                }
            });
        })
    };

    let on_submit = Callback::from(|e: SubmitEvent| e.prevent_default());
    let formats = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Webp];

    let current = (*settings).clone();
    let is_custom = current.save_location == SaveLocation::Custom;

    html! {
        <div class="container">
            <div class="header">
                <h1 class="main-title">{"NodeShot Settings"}</h1>
            </div>

            if *loading {
                <div class="loading-text-center">
                    <Spinner />
                </div>
            }

            <form class="pf-v5-c-form" onsubmit={on_submit}>
                <FormRow label="Save location">
                    <label class="radio-label">
                        <input
                            type="radio"
                            name="saveLocation"
                            value="downloads"
                            checked={!is_custom}
                            onchange={on_field(SettingField::SaveLocation)}
                        />
                        {" Downloads folder"}
                    </label>
                    <label class="radio-label">
                        <input
                            type="radio"
                            name="saveLocation"
                            value="custom"
                            checked={is_custom}
                            onchange={on_field(SettingField::SaveLocation)}
                        />
                        {" Sub-folder of Downloads"}
                    </label>
                </FormRow>

                if is_custom {
                    <FormRow label="Folder" hint="Relative to the downloads folder">
                        <input
                            type="text"
                            class="pf-v5-c-form-control"
                            value={current.custom_path.clone()}
                            onchange={on_field(SettingField::CustomPath)}
                        />
                    </FormRow>
                }

                <FormRow label="File name prefix">
                    <input
                        type="text"
                        class="pf-v5-c-form-control"
                        value={current.file_name_prefix.clone()}
                        onchange={on_field(SettingField::Prefix)}
                    />
                </FormRow>

                <FormRow label="File name template" hint="Placeholders: {timestamp}, {elementId}">
                    <input
                        type="text"
                        class="pf-v5-c-form-control"
                        value={current.filename_template.clone()}
                        onchange={on_field(SettingField::Template)}
                    />
                </FormRow>

                <FormRow label="Image format" hint="Screenshots are currently always saved as PNG">
                    <select class="pf-v5-c-form-control" onchange={on_field(SettingField::Format)}>
                        {for formats.into_iter().map(|format| html! {
                            <option
                                value={format.as_str()}
                                selected={format == current.image_format}
                            >
                                {format.as_str().to_uppercase()}
                            </option>
                        })}
                    </select>
                </FormRow>

                if current.image_format.is_lossy() {
                    <FormRow label={format!("Image quality: {}", current.image_quality)}>
                        <input
                            type="range"
                            min="1"
                            max="100"
                            value={current.image_quality.to_string()}
                            onchange={on_field(SettingField::Quality)}
                        />
                    </FormRow>
                }

                <FormRow label={format!("Capture delay: {}ms", current.capture_delay)}>
                    <input
                        type="range"
                        min="0"
                        max={MAX_CAPTURE_DELAY_MS.to_string()}
                        step="50"
                        value={current.capture_delay.to_string()}
                        onchange={on_field(SettingField::CaptureDelay)}
                    />
                </FormRow>

                <FormRow label="Notifications">
                    <label class="checkbox-label">
                        <input
                            type="checkbox"
                            checked={current.show_notification}
                            onchange={on_field(SettingField::ShowNotification)}
                        />
                        {" Show hints on the page"}
                    </label>
                </FormRow>

                <FormRow label="History">
                    <label class="checkbox-label">
                        <input
                            type="checkbox"
                            checked={current.include_metadata}
                            onchange={on_field(SettingField::IncludeMetadata)}
                        />
                        {" Record element details with each capture"}
                    </label>
                </FormRow>
            </form>

            <div class="flex-row-gap">
                <Button onclick={on_save} variant={ButtonVariant::Primary}>
                    {"Save"}
                </Button>
                <Button onclick={on_reset} variant={ButtonVariant::Secondary}>
                    {"Reset to defaults"}
                </Button>
            </div>

            <Flash message={status} kind={FlashKind::Success} />
            <Flash message={error} kind={FlashKind::Error} />
        </div>
    }
}
