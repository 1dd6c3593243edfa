//! Action objects attached to templates and quick replies.
//!
//! Which action kinds are legal depends on where the action is placed; see
//! [`TemplateKind::allows`](crate::model::TemplateKind::allows).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Message,
    Uri,
    Postback,
    Camera,
    CameraRoll,
    Location,
}

impl ActionKind {
    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Message => "message",
            ActionKind::Uri => "uri",
            ActionKind::Postback => "postback",
            ActionKind::Camera => "camera",
            ActionKind::CameraRoll => "cameraRoll",
            ActionKind::Location => "location",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interactive action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Sends `text` as if the member typed it, optionally carrying a postback token.
    Message {
        label: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        postback: Option<String>,
    },
    /// Opens a URL.
    Uri { label: String, uri: String },
    /// Fires a `postback` event with `data`; shows `displayText` in the chat.
    Postback {
        label: String,
        data: String,
        #[serde(rename = "displayText")]
        display_text: String,
    },
    /// Opens the camera.
    Camera { label: String },
    /// Opens the camera roll.
    CameraRoll { label: String },
    /// Opens the location picker.
    Location { label: String },
}

impl Action {
    /// Creates a plain message action.
    pub fn message(label: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Message {
            label: label.into(),
            text: text.into(),
            postback: None,
        }
    }

    /// Creates a message action that carries a postback token.
    pub fn message_with_postback(
        label: impl Into<String>,
        text: impl Into<String>,
        postback: impl Into<String>,
    ) -> Self {
        Action::Message {
            label: label.into(),
            text: text.into(),
            postback: Some(postback.into()),
        }
    }

    /// Creates a URI action.
    pub fn uri(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Action::Uri {
            label: label.into(),
            uri: uri.into(),
        }
    }

    /// Creates a postback action.
    pub fn postback(
        label: impl Into<String>,
        data: impl Into<String>,
        display_text: impl Into<String>,
    ) -> Self {
        Action::Postback {
            label: label.into(),
            data: data.into(),
            display_text: display_text.into(),
        }
    }

    pub fn camera(label: impl Into<String>) -> Self {
        Action::Camera {
            label: label.into(),
        }
    }

    pub fn camera_roll(label: impl Into<String>) -> Self {
        Action::CameraRoll {
            label: label.into(),
        }
    }

    pub fn location(label: impl Into<String>) -> Self {
        Action::Location {
            label: label.into(),
        }
    }

    /// Returns the action's kind.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Message { .. } => ActionKind::Message,
            Action::Uri { .. } => ActionKind::Uri,
            Action::Postback { .. } => ActionKind::Postback,
            Action::Camera { .. } => ActionKind::Camera,
            Action::CameraRoll { .. } => ActionKind::CameraRoll,
            Action::Location { .. } => ActionKind::Location,
        }
    }

    /// Returns the button label.
    pub fn label(&self) -> &str {
        match self {
            Action::Message { label, .. }
            | Action::Uri { label, .. }
            | Action::Postback { label, .. }
            | Action::Camera { label }
            | Action::CameraRoll { label }
            | Action::Location { label } => label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialize() {
        let json = serde_json::to_string(&Action::message("Yes", "Yes")).unwrap();
        assert_eq!(json, r#"{"type":"message","label":"Yes","text":"Yes"}"#);

        let json = serde_json::to_string(&Action::postback("List", "list_template", "list please"))
            .unwrap();
        assert_eq!(
            json,
            r#"{"type":"postback","label":"List","data":"list_template","displayText":"list please"}"#
        );

        let json = serde_json::to_string(&Action::camera_roll("Roll")).unwrap();
        assert_eq!(json, r#"{"type":"cameraRoll","label":"Roll"}"#);
    }

    #[test]
    fn test_action_kind() {
        assert_eq!(Action::uri("a", "https://x").kind(), ActionKind::Uri);
        assert_eq!(Action::location("here").kind(), ActionKind::Location);
        assert_eq!(Action::location("here").label(), "here");
        assert_eq!(ActionKind::CameraRoll.to_string(), "cameraRoll");
    }
}
