/// Message protocol between the page and the background worker
use serde::{Deserialize, Serialize};

use crate::element::ElementInfo;
use crate::error::NodeShotError;
use crate::settings::Settings;

/// Requests, tagged by `action`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    Activate,
    Deactivate,
    #[serde(rename_all = "camelCase")]
    Capture { element_info: ElementInfo },
    GetSettings,
    #[serde(rename_all = "camelCase")]
    CropImage {
        data_url: String,
        element_info: ElementInfo,
    },
}

/// `{success, ...result or error}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cropped_data_url: Option<String>,
}

impl Response {
    pub fn ok() -> Response {
        Response {
            success: true,
            ..Response::default()
        }
    }

    pub fn failure(error: impl ToString) -> Response {
        Response {
            success: false,
            error: Some(error.to_string()),
            ..Response::default()
        }
    }

    pub fn with_settings(settings: Settings) -> Response {
        Response {
            settings: Some(settings),
            ..Response::ok()
        }
    }

    pub fn with_filename(filename: String) -> Response {
        Response {
            filename: Some(filename),
            ..Response::ok()
        }
    }

    pub fn with_cropped(data_url: String) -> Response {
        Response {
            cropped_data_url: Some(data_url),
            ..Response::ok()
        }
    }

    /// Turn a `success: false` answer back into an error, keeping its text as is
    pub fn into_result(self) -> crate::error::Result<Response> {
        if self.success {
            Ok(self)
        } else {
            let text = self.error.unwrap_or_else(|| "Unknown error".to_string());
            Err(NodeShotError::Remote(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_actions() {
        let activate: Request = serde_json::from_value(json!({ "action": "activate" })).unwrap();
        let settings: Request = serde_json::from_value(json!({ "action": "getSettings" })).unwrap();

        assert_eq!(activate, Request::Activate);
        assert_eq!(settings, Request::GetSettings);
    }

    #[test]
    fn test_parse_capture() {
        let request: Request = serde_json::from_value(json!({
            "action": "capture",
            "elementInfo": {
                "x": 10, "y": 20, "width": 100, "height": 50,
                "tagName": "DIV", "className": "", "id": "hero"
            }
        }))
        .unwrap();

        match request {
            Request::Capture { element_info } => assert_eq!(element_info.id, "hero"),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_crop_image_shape() {
        let request = Request::CropImage {
            data_url: "data:image/png;base64,AAAA".to_string(),
            element_info: ElementInfo::default(),
        };

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["action"], "cropImage");
        assert_eq!(value["dataUrl"], "data:image/png;base64,AAAA");
        assert!(value["elementInfo"].is_object());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = serde_json::from_value::<Request>(json!({ "action": "explode" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_shapes() {
        let ok = serde_json::to_value(Response::with_filename("a.png".into())).unwrap();
        assert_eq!(ok, json!({ "success": true, "filename": "a.png" }));

        let failed = serde_json::to_value(Response::failure("boom")).unwrap();
        assert_eq!(failed, json!({ "success": false, "error": "boom" }));
    }

    #[test]
    fn test_into_result() {
        assert!(Response::ok().into_result().is_ok());
        assert!(matches!(
            Response::failure("boom").into_result(),
            Err(NodeShotError::Remote(text)) if text == "boom"
        ));

        let bare = Response {
            success: false,
            ..Response::default()
        };
        let err = bare.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }

    #[test]
    fn test_relayed_error_is_not_relabelled() {
        let download = NodeShotError::Download("disk full".to_string());
        let relayed = Response::failure(&download).into_result().unwrap_err();
        assert_eq!(relayed.to_string(), "Download failed: disk full");

        let crop: NodeShotError = crate::crop::CropError::MalformedDataUrl.into();
        let relayed = Response::failure(&crop).into_result().unwrap_err();
        assert_eq!(relayed.to_string(), "Not a base64 data URL");
    }
}
