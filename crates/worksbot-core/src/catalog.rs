//! Template catalog.
//!
//! Builds the structured reply for each [`TemplateKind`]. Every action
//! inside points back at the catalog (postback tokens `button_template`,
//! `list_template`, `carousel`, `image_carousel`, `q`), so members can
//! walk from one template to the next.
//!
//! Images are served from `{image_host}/images/<name>.png`.

use crate::error::TemplateResult;
use crate::model::{
    Action, ButtonTemplate, Carousel, CarouselColumn, CoverData, ImageCarousel, ImageColumn,
    ListElement, ListTemplate, QuickReply, QuickReplyItem, ReplyContent, TemplateKind,
};
use crate::replies::Replies;

const WORKS_HOME: &str = "https://line.worksmobile.com/jp/";
const ACTION_DOCS: &str = "https://developers.worksmobile.com/jp/document/1005050?lang=ja";

/// Postback token the catalog uses for each kind.
fn token(kind: TemplateKind) -> &'static str {
    kind.canonical().unwrap_or("q")
}

fn request_text(kind: TemplateKind) -> String {
    match kind {
        TemplateKind::QuickReply => "QuickReply please".to_string(),
        other => format!("{} please", token(other)),
    }
}

/// Message action that types "<token> please" and carries the token.
fn request(label: &str, kind: TemplateKind) -> Action {
    Action::message_with_postback(label, request_text(kind), token(kind))
}

/// Postback action for a kind.
fn postback(label: &str, kind: TemplateKind) -> Action {
    Action::postback(label, token(kind), request_text(kind))
}

fn works_home() -> Action {
    Action::uri("LINE WORKS", WORKS_HOME)
}

/// Static catalog of demo templates.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    image_host: String,
    button_text: String,
    quick_reply_text: String,
}

impl TemplateCatalog {
    /// Creates a catalog serving images from `image_host`.
    pub fn new(image_host: impl Into<String>, replies: &Replies) -> Self {
        let image_host = image_host.into().trim_end_matches('/').to_string();
        Self {
            image_host,
            button_text: replies.button_template_text.clone(),
            quick_reply_text: replies.quick_reply_text.clone(),
        }
    }

    fn image(&self, name: &str) -> String {
        format!("{}/images/{}", self.image_host, name)
    }

    /// Builds the reply for `kind`.
    pub fn build(&self, kind: TemplateKind) -> ReplyContent {
        match kind {
            TemplateKind::ButtonTemplate => ReplyContent::ButtonTemplate(self.button_template()),
            TemplateKind::ListTemplate => ReplyContent::ListTemplate(self.list_template()),
            TemplateKind::Carousel => ReplyContent::Carousel(self.carousel()),
            TemplateKind::ImageCarousel => ReplyContent::ImageCarousel(self.image_carousel()),
            TemplateKind::QuickReply => {
                ReplyContent::text_with_quick_reply(&self.quick_reply_text, self.quick_reply())
            }
        }
    }

    /// Validates every template the catalog can produce.
    pub fn verify(&self) -> TemplateResult<()> {
        TemplateKind::PRIORITY
            .into_iter()
            .try_for_each(|kind| self.build(kind).validate())
    }

    pub fn button_template(&self) -> ButtonTemplate {
        ButtonTemplate {
            content_text: self.button_text.clone(),
            actions: vec![
                Action::message("Message label", "Message text"),
                request("Button postback", TemplateKind::ButtonTemplate),
                request("List postback", TemplateKind::ListTemplate),
                request("Carousel postback", TemplateKind::Carousel),
                request("Image carousel pb", TemplateKind::ImageCarousel),
                request("QuickReply postback", TemplateKind::QuickReply),
                works_home(),
            ],
        }
    }

    pub fn list_template(&self) -> ListTemplate {
        let element = |title: &str, image: &str, action: Action| ListElement {
            title: format!("List {title} title"),
            subtitle: Some(format!("List {title} subtitle")),
            image: Some(self.image(image)),
            action,
        };

        ListTemplate {
            cover_data: CoverData {
                background_image: Some(self.image("lw.png")),
                title: "Here is a list template.".to_string(),
                subtitle: Some("Subtitle".to_string()),
            },
            elements: vec![
                element("message", "lw.png", Action::message("Message", "Message text")),
                element(
                    "button postback",
                    "lw.png",
                    request("Button", TemplateKind::ButtonTemplate),
                ),
                element(
                    "list postback",
                    "lw.png",
                    request("List", TemplateKind::ListTemplate),
                ),
                element("uri", "security.png", works_home()),
            ],
            actions: vec![
                vec![
                    request("Carousel postback", TemplateKind::Carousel),
                    request("Image Car postback", TemplateKind::ImageCarousel),
                ],
                vec![
                    request("QuickReply", TemplateKind::QuickReply),
                    Action::message("No", "No"),
                ],
            ],
        }
    }

    pub fn carousel(&self) -> Carousel {
        Carousel {
            columns: vec![
                CarouselColumn {
                    thumbnail_image_url: Some(self.image("giraffe01.png")),
                    title: "Carousel postback title".to_string(),
                    text: "Carousel postback text (default button)".to_string(),
                    default_action: Some(postback("ButtonTemp", TemplateKind::ButtonTemplate)),
                    actions: vec![
                        postback("ListTemp", TemplateKind::ListTemplate),
                        postback("Carousel", TemplateKind::Carousel),
                        postback("QuickReply", TemplateKind::QuickReply),
                    ],
                },
                CarouselColumn {
                    thumbnail_image_url: Some(self.image("panda01.png")),
                    title: "Carousel uri title".to_string(),
                    text: "Carousel uri text".to_string(),
                    default_action: Some(works_home()),
                    actions: vec![
                        works_home(),
                        Action::uri("bot Action Objects", ACTION_DOCS),
                    ],
                },
                CarouselColumn {
                    thumbnail_image_url: Some(self.image("sushi.png")),
                    title: "Carousel message title".to_string(),
                    text: "Carousel message text".to_string(),
                    default_action: Some(Action::message("Message", "Message text")),
                    actions: vec![Action::message("Yes", "Yes"), Action::message("No", "No")],
                },
            ],
        }
    }

    pub fn image_carousel(&self) -> ImageCarousel {
        ImageCarousel {
            columns: vec![
                ImageColumn::new(
                    self.image("giraffe01.png"),
                    postback("ButtonTemp", TemplateKind::ButtonTemplate),
                ),
                ImageColumn::new(
                    self.image("lw.png"),
                    postback("ListTemp", TemplateKind::ListTemplate),
                ),
                ImageColumn::new(
                    self.image("sushi.png"),
                    postback("Carousel", TemplateKind::Carousel),
                ),
            ],
        }
    }

    pub fn quick_reply(&self) -> QuickReply {
        let with_image = |name: &str, action| QuickReplyItem::with_image(self.image(name), action);

        QuickReply {
            items: vec![
                with_image("giraffe01.png", postback("ButtonTemp", TemplateKind::ButtonTemplate)),
                with_image("panda01.png", postback("ListTemp", TemplateKind::ListTemplate)),
                with_image("giraffe02.png", postback("Carousel", TemplateKind::Carousel)),
                with_image("panda02.png", postback("ImageCarousel", TemplateKind::ImageCarousel)),
                with_image("sushi.png", postback("QuickReply", TemplateKind::QuickReply)),
                with_image("sushi.png", Action::message("Sushi", "Sushi")),
                with_image("lw.png", works_home()),
                QuickReplyItem::new(Action::camera("Camera")),
                QuickReplyItem::new(Action::camera_roll("Camera roll")),
                QuickReplyItem::new(Action::location("Location")),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActionKind;

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::new("https://img.example.com/", &Replies::default())
    }

    #[test]
    fn test_catalog_verifies() {
        assert_eq!(catalog().verify(), Ok(()));
    }

    #[test]
    fn test_build_matches_kind() {
        let catalog = catalog();
        assert_eq!(
            catalog.build(TemplateKind::ButtonTemplate).content_type(),
            "button_template"
        );
        assert_eq!(catalog.build(TemplateKind::Carousel).content_type(), "carousel");
        assert_eq!(catalog.build(TemplateKind::QuickReply).content_type(), "text");
    }

    #[test]
    fn test_catalog_shapes() {
        let catalog = catalog();
        assert_eq!(catalog.button_template().actions.len(), 7);
        assert_eq!(catalog.list_template().elements.len(), 4);
        assert_eq!(catalog.carousel().columns.len(), 3);
        assert_eq!(catalog.image_carousel().columns.len(), 3);

        let quick = catalog.quick_reply();
        assert_eq!(quick.items.len(), 10);
        let kinds: Vec<ActionKind> = quick.items.iter().map(|i| i.action.kind()).collect();
        assert!(kinds.contains(&ActionKind::Camera));
        assert!(kinds.contains(&ActionKind::CameraRoll));
        assert!(kinds.contains(&ActionKind::Location));
    }

    #[test]
    fn test_image_host_trailing_slash() {
        let columns = catalog().image_carousel().columns;
        assert_eq!(columns[0].image_url, "https://img.example.com/images/giraffe01.png");
    }

    #[test]
    fn test_postback_tokens_select_their_kind() {
        for column in catalog().image_carousel().columns {
            let crate::model::Action::Postback { data, .. } = column.action else {
                panic!("image carousel columns carry postbacks");
            };
            assert!(crate::matcher::match_kind(&[Some(data.as_str())]).is_some());
        }
    }
}
