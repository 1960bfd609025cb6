/// Reusable UI pieces shared by the popup and the options page

use std::time::Duration;

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

const FLASH_LIFETIME: Duration = Duration::from_secs(3);

/// A message that clears itself after a few seconds.
///
/// Returns the current message and a callback that replaces it.
#[hook]
pub fn use_flash() -> (Option<String>, Callback<String>) {
    let message = use_state(|| None::<String>);
    let generation = use_mut_ref(|| 0u64);

    let show = {
        let message = message.clone();
        Callback::from(move |text: String| {
            *generation.borrow_mut() += 1;
            let current = *generation.borrow();
            message.set(Some(text));

            let message = message.clone();
            let generation = generation.clone();
            spawn_local(async move {
                yew::platform::time::sleep(FLASH_LIFETIME).await;
                // Only the newest message may clear itself
                if *generation.borrow() == current {
                    message.set(None);
                }
            });
        })
    };

    ((*message).clone(), show)
}

#[derive(PartialEq, Clone, Copy, Default)]
pub enum FlashKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Properties, PartialEq)]
pub struct FlashProps {
    pub message: Option<String>,
    #[prop_or_default]
    pub kind: FlashKind,
}

/// Inline alert for a flash message; renders nothing when there is none
#[function_component(Flash)]
pub fn flash(props: &FlashProps) -> Html {
    let Some(message) = props.message.clone() else {
        return html! {};
    };

    let alert_type = match props.kind {
        FlashKind::Info => AlertType::Info,
        FlashKind::Success => AlertType::Success,
        FlashKind::Warning => AlertType::Warning,
        FlashKind::Error => AlertType::Danger,
    };

    html! {
        <div class="message-top-margin">
            <Alert r#type={alert_type} title={message} inline={true}></Alert>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FormRowProps {
    pub label: AttrValue,
    #[prop_or_default]
    pub hint: Option<AttrValue>,
    pub children: Children,
}

/// Labelled form row
#[function_component(FormRow)]
pub fn form_row(props: &FormRowProps) -> Html {
    html! {
        <div class="pf-v5-c-form__group">
            <div class="pf-v5-c-form__group-label">
                <span class="pf-v5-c-form__label-text">{props.label.clone()}</span>
            </div>
            <div class="pf-v5-c-form__group-control">
                {props.children.clone()}
                if let Some(hint) = &props.hint {
                    <p class="pf-v5-c-form__helper-text">{hint.clone()}</p>
                }
            </div>
        </div>
    }
}
