//! Fixed reply texts.

use serde::{Deserialize, Serialize};

/// Texts the dispatcher and catalog put into replies.
///
/// Every field has a default, so a partial `[dispatch.replies]` table only
/// overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replies {
    /// Sent when a member presses "start" in a new 1:1 chat.
    pub welcome: String,
    /// Sent when the bot is invited into a room.
    pub join_greeting: String,
    /// Appended after the comma-joined list of members who joined.
    pub joined_suffix: String,
    /// Appended after the comma-joined list of members who left.
    pub left_suffix: String,
    /// First line of the echo for text that selects nothing.
    pub fallback_prefix: String,
    /// `contentText` of the button template.
    pub button_template_text: String,
    /// Text carrying the quick-reply row.
    pub quick_reply_text: String,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            welcome: "Hello! I'm here to help.\n\
                      Send one of these for a special reply (case does not matter):\n\
                      ・b: button template\n\
                      ・l: list template\n\
                      ・c: carousel\n\
                      ・i: image carousel\n\
                      ・q: quick reply"
                .to_string(),
            join_greeting: "Hi everyone!".to_string(),
            joined_suffix: "welcome aboard!".to_string(),
            left_suffix: "see you again.".to_string(),
            fallback_prefix: "I see.".to_string(),
            button_template_text: "Here is a button template.".to_string(),
            quick_reply_text: "Here is a quick reply.".to_string(),
        }
    }
}

impl Replies {
    /// `"<members> <joined suffix>"`, members comma-joined in order.
    pub fn joined(&self, members: &[String]) -> String {
        format!("{} {}", members.join(","), self.joined_suffix)
    }

    /// `"<members> <left suffix>"`, members comma-joined in order.
    pub fn left(&self, members: &[String]) -> String {
        format!("{} {}", members.join(","), self.left_suffix)
    }

    /// Echo of text that selected no template.
    pub fn fallback(&self, received: &str) -> String {
        format!("{}\n(received: {})", self.fallback_prefix, received)
    }

    /// Location shared by a member, rendered as text.
    pub fn location(address: &str, latitude: f64, longitude: f64) -> String {
        format!("address:{address}\nlat:{latitude}\nlon:{longitude}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lists() {
        let replies = Replies::default();
        assert_eq!(
            replies.joined(&["u1".into(), "u2".into()]),
            "u1,u2 welcome aboard!"
        );
        assert_eq!(replies.left(&[]), " see you again.");
    }

    #[test]
    fn test_location_format() {
        assert_eq!(
            Replies::location("Tokyo", 35.5, 139.0),
            "address:Tokyo\nlat:35.5\nlon:139"
        );
    }

    #[test]
    fn test_partial_override() {
        let replies: Replies = serde_json::from_str(r#"{"join_greeting":"yo"}"#).unwrap();
        assert_eq!(replies.join_greeting, "yo");
        assert_eq!(replies.left_suffix, Replies::default().left_suffix);
    }
}
