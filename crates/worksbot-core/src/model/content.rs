//! Reply content types.
//!
//! A [`ReplyContent`] is the `content` object of an outbound message. Plain
//! variants (text, sticker, image) carry no structural rules; the structured
//! variants do, and each has a `validate` method enforcing them:
//!
//! | Kind | Limit | Legal action kinds |
//! |---|---|---|
//! | button template | - | message, uri |
//! | list template | 4 elements, 2×2 actions | message, uri |
//! | carousel | - | message, uri, postback |
//! | image carousel | 3 columns | message, uri, postback |
//! | quick reply | - | all |
//!
//! # Example
//!
//! ```rust
//! use worksbot_core::model::{Action, ImageCarousel, ImageColumn, ReplyContent};
//!
//! let carousel = ImageCarousel::new(vec![ImageColumn::new(
//!     "https://example.com/a.png",
//!     Action::uri("Open", "https://example.com"),
//! )])
//! .unwrap();
//! let content = ReplyContent::ImageCarousel(carousel);
//! assert!(content.validate().is_ok());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};
use crate::model::action::{Action, ActionKind};
use crate::model::event::{ImageContent, StickerContent};

/// Maximum number of elements in a list template.
pub const LIST_MAX_ELEMENTS: usize = 4;
/// Maximum number of action rows in a list template.
pub const LIST_MAX_ACTION_ROWS: usize = 2;
/// Maximum number of actions per list template row.
pub const LIST_MAX_ACTIONS_PER_ROW: usize = 2;
/// Maximum number of columns in an image carousel.
pub const IMAGE_CAROUSEL_MAX_COLUMNS: usize = 3;

// ============================================================================
// TemplateKind
// ============================================================================

/// The structured reply kinds the dispatcher can select by token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    ButtonTemplate,
    ListTemplate,
    Carousel,
    ImageCarousel,
    QuickReply,
}

impl TemplateKind {
    /// All kinds in matching priority order.
    pub const PRIORITY: [TemplateKind; 5] = [
        TemplateKind::ButtonTemplate,
        TemplateKind::ListTemplate,
        TemplateKind::Carousel,
        TemplateKind::ImageCarousel,
        TemplateKind::QuickReply,
    ];

    /// Single-letter shorthand, matched case-insensitively.
    pub fn shorthand(self) -> &'static str {
        match self {
            TemplateKind::ButtonTemplate => "B",
            TemplateKind::ListTemplate => "L",
            TemplateKind::Carousel => "C",
            TemplateKind::ImageCarousel => "I",
            TemplateKind::QuickReply => "Q",
        }
    }

    /// Long-form identifier, matched case-sensitively.
    ///
    /// Quick replies are not a content type of their own and have none.
    pub fn canonical(self) -> Option<&'static str> {
        match self {
            TemplateKind::ButtonTemplate => Some("button_template"),
            TemplateKind::ListTemplate => Some("list_template"),
            TemplateKind::Carousel => Some("carousel"),
            TemplateKind::ImageCarousel => Some("image_carousel"),
            TemplateKind::QuickReply => None,
        }
    }

    /// Action kinds that may appear inside this kind.
    pub fn allowed_actions(self) -> &'static [ActionKind] {
        match self {
            TemplateKind::ButtonTemplate | TemplateKind::ListTemplate => {
                &[ActionKind::Message, ActionKind::Uri]
            }
            TemplateKind::Carousel | TemplateKind::ImageCarousel => {
                &[ActionKind::Message, ActionKind::Uri, ActionKind::Postback]
            }
            TemplateKind::QuickReply => &[
                ActionKind::Message,
                ActionKind::Uri,
                ActionKind::Postback,
                ActionKind::Camera,
                ActionKind::CameraRoll,
                ActionKind::Location,
            ],
        }
    }

    /// Returns whether `action` is legal inside this kind.
    pub fn allows(self, action: ActionKind) -> bool {
        self.allowed_actions().contains(&action)
    }

    /// Checks a single action against the allowlist.
    pub fn check_action(self, action: &Action) -> TemplateResult<()> {
        let kind = action.kind();
        if self.allows(kind) {
            Ok(())
        } else {
            Err(TemplateError::ActionNotAllowed {
                template: self,
                action: kind,
            })
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical().unwrap_or("quick_reply"))
    }
}

fn check_actions<'a>(
    template: TemplateKind,
    actions: impl IntoIterator<Item = &'a Action>,
) -> TemplateResult<()> {
    actions
        .into_iter()
        .try_for_each(|a| template.check_action(a))
}

// ============================================================================
// Quick reply
// ============================================================================

/// One suggested action in a quick-reply row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickReplyItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub action: Action,
}

impl QuickReplyItem {
    pub fn new(action: Action) -> Self {
        Self {
            image_url: None,
            action,
        }
    }

    pub fn with_image(image_url: impl Into<String>, action: Action) -> Self {
        Self {
            image_url: Some(image_url.into()),
            action,
        }
    }
}

/// Ephemeral row of suggested actions attached to a text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub items: Vec<QuickReplyItem>,
}

impl QuickReply {
    /// Creates a validated quick reply.
    pub fn new(items: Vec<QuickReplyItem>) -> TemplateResult<Self> {
        let quick_reply = Self { items };
        quick_reply.validate()?;
        Ok(quick_reply)
    }

    pub fn validate(&self) -> TemplateResult<()> {
        if self.items.is_empty() {
            return Err(TemplateError::Empty {
                template: TemplateKind::QuickReply,
                what: "item",
            });
        }
        check_actions(TemplateKind::QuickReply, self.items.iter().map(|i| &i.action))
    }
}

// ============================================================================
// Text
// ============================================================================

/// Text reply, optionally carrying a quick-reply row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReply>,
}

// ============================================================================
// Button template
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonTemplate {
    pub content_text: String,
    pub actions: Vec<Action>,
}

impl ButtonTemplate {
    pub fn new(content_text: impl Into<String>, actions: Vec<Action>) -> TemplateResult<Self> {
        let template = Self {
            content_text: content_text.into(),
            actions,
        };
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> TemplateResult<()> {
        if self.actions.is_empty() {
            return Err(TemplateError::Empty {
                template: TemplateKind::ButtonTemplate,
                what: "action",
            });
        }
        check_actions(TemplateKind::ButtonTemplate, &self.actions)
    }
}

// ============================================================================
// List template
// ============================================================================

/// Header block of a list template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// One row of a list template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListElement {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplate {
    pub cover_data: CoverData,
    pub elements: Vec<ListElement>,
    /// Up to two rows of up to two actions.
    #[serde(default)]
    pub actions: Vec<Vec<Action>>,
}

impl ListTemplate {
    pub fn new(
        cover_data: CoverData,
        elements: Vec<ListElement>,
        actions: Vec<Vec<Action>>,
    ) -> TemplateResult<Self> {
        let template = Self {
            cover_data,
            elements,
            actions,
        };
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> TemplateResult<()> {
        let kind = TemplateKind::ListTemplate;
        if self.elements.is_empty() {
            return Err(TemplateError::Empty {
                template: kind,
                what: "element",
            });
        }
        if self.elements.len() > LIST_MAX_ELEMENTS {
            return Err(TemplateError::too_many(
                kind,
                "elements",
                LIST_MAX_ELEMENTS,
                self.elements.len(),
            ));
        }
        if self.actions.len() > LIST_MAX_ACTION_ROWS {
            return Err(TemplateError::too_many(
                kind,
                "action rows",
                LIST_MAX_ACTION_ROWS,
                self.actions.len(),
            ));
        }
        if let Some(row) = self
            .actions
            .iter()
            .find(|row| row.len() > LIST_MAX_ACTIONS_PER_ROW)
        {
            return Err(TemplateError::too_many(
                kind,
                "actions per row",
                LIST_MAX_ACTIONS_PER_ROW,
                row.len(),
            ));
        }
        check_actions(kind, self.elements.iter().map(|e| &e.action))?;
        check_actions(kind, self.actions.iter().flatten())
    }
}

// ============================================================================
// Carousel
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_image_url: Option<String>,
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<Action>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carousel {
    pub columns: Vec<CarouselColumn>,
}

impl Carousel {
    pub fn new(columns: Vec<CarouselColumn>) -> TemplateResult<Self> {
        let carousel = Self { columns };
        carousel.validate()?;
        Ok(carousel)
    }

    pub fn validate(&self) -> TemplateResult<()> {
        if self.columns.is_empty() {
            return Err(TemplateError::Empty {
                template: TemplateKind::Carousel,
                what: "column",
            });
        }
        check_actions(
            TemplateKind::Carousel,
            self.columns
                .iter()
                .flat_map(|c| c.default_action.iter().chain(c.actions.iter())),
        )
    }
}

// ============================================================================
// Image carousel
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageColumn {
    pub image_url: String,
    pub action: Action,
}

impl ImageColumn {
    pub fn new(image_url: impl Into<String>, action: Action) -> Self {
        Self {
            image_url: image_url.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCarousel {
    pub columns: Vec<ImageColumn>,
}

impl ImageCarousel {
    pub fn new(columns: Vec<ImageColumn>) -> TemplateResult<Self> {
        let carousel = Self { columns };
        carousel.validate()?;
        Ok(carousel)
    }

    pub fn validate(&self) -> TemplateResult<()> {
        let kind = TemplateKind::ImageCarousel;
        if self.columns.is_empty() {
            return Err(TemplateError::Empty {
                template: kind,
                what: "column",
            });
        }
        if self.columns.len() > IMAGE_CAROUSEL_MAX_COLUMNS {
            return Err(TemplateError::too_many(
                kind,
                "columns",
                IMAGE_CAROUSEL_MAX_COLUMNS,
                self.columns.len(),
            ));
        }
        check_actions(kind, self.columns.iter().map(|c| &c.action))
    }
}

// ============================================================================
// ReplyContent
// ============================================================================

/// The `content` object of an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyContent {
    Text(TextReply),
    Sticker(StickerContent),
    Image(ImageContent),
    ButtonTemplate(ButtonTemplate),
    ListTemplate(ListTemplate),
    Carousel(Carousel),
    ImageCarousel(ImageCarousel),
}

impl ReplyContent {
    /// Creates a plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        ReplyContent::Text(TextReply {
            text: text.into(),
            quick_reply: None,
        })
    }

    /// Creates a text reply with a quick-reply row.
    pub fn text_with_quick_reply(text: impl Into<String>, quick_reply: QuickReply) -> Self {
        ReplyContent::Text(TextReply {
            text: text.into(),
            quick_reply: Some(quick_reply),
        })
    }

    /// Creates a sticker reply.
    pub fn sticker(package_id: impl Into<String>, sticker_id: impl Into<String>) -> Self {
        ReplyContent::Sticker(StickerContent {
            package_id: package_id.into(),
            sticker_id: sticker_id.into(),
        })
    }

    /// Creates an image reply from an uploaded resource.
    pub fn image(resource_id: impl Into<String>) -> Self {
        ReplyContent::Image(ImageContent {
            resource_id: resource_id.into(),
        })
    }

    /// Returns the `type` discriminator.
    pub fn content_type(&self) -> &'static str {
        match self {
            ReplyContent::Text(_) => "text",
            ReplyContent::Sticker(_) => "sticker",
            ReplyContent::Image(_) => "image",
            ReplyContent::ButtonTemplate(_) => "button_template",
            ReplyContent::ListTemplate(_) => "list_template",
            ReplyContent::Carousel(_) => "carousel",
            ReplyContent::ImageCarousel(_) => "image_carousel",
        }
    }

    /// Returns the text of a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReplyContent::Text(t) => Some(&t.text),
            _ => None,
        }
    }

    /// Checks the structural rules of the content.
    pub fn validate(&self) -> TemplateResult<()> {
        match self {
            ReplyContent::Text(t) => t.quick_reply.as_ref().map_or(Ok(()), QuickReply::validate),
            ReplyContent::Sticker(_) | ReplyContent::Image(_) => Ok(()),
            ReplyContent::ButtonTemplate(t) => t.validate(),
            ReplyContent::ListTemplate(t) => t.validate(),
            ReplyContent::Carousel(c) => c.validate(),
            ReplyContent::ImageCarousel(c) => c.validate(),
        }
    }
}
