//! Token matching.
//!
//! Candidate tokens come from the text and postback fields of an event. A
//! token selects a [`TemplateKind`] when it equals the kind's single-letter
//! shorthand (case-insensitive) or its long-form id (case-sensitive):
//!
//! ```text
//! "b" | "B" | "button_template"   → ButtonTemplate
//! "l" | "L" | "list_template"     → ListTemplate
//! "c" | "C" | "carousel"          → Carousel
//! "i" | "I" | "image_carousel"    → ImageCarousel
//! "q" | "Q"                       → QuickReply
//! ```

use crate::model::TemplateKind;

impl TemplateKind {
    /// Returns whether a single token selects this kind.
    pub fn matches(self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        token.eq_ignore_ascii_case(self.shorthand()) || self.canonical() == Some(token)
    }

    /// Returns whether any present candidate selects this kind.
    pub fn matches_any(self, candidates: &[Option<&str>]) -> bool {
        candidates.iter().flatten().any(|token| self.matches(token))
    }
}

/// Finds the first kind, in priority order, selected by any candidate.
pub fn match_kind(candidates: &[Option<&str>]) -> Option<TemplateKind> {
    TemplateKind::PRIORITY
        .into_iter()
        .find(|kind| kind.matches_any(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_is_case_insensitive() {
        assert!(TemplateKind::ButtonTemplate.matches("b"));
        assert!(TemplateKind::ButtonTemplate.matches("B"));
        assert!(TemplateKind::QuickReply.matches("q"));
        assert!(!TemplateKind::ButtonTemplate.matches("bb"));
    }

    #[test]
    fn test_canonical_is_case_sensitive() {
        assert!(TemplateKind::ButtonTemplate.matches("button_template"));
        assert!(!TemplateKind::ButtonTemplate.matches("Button_Template"));
        assert!(!TemplateKind::Carousel.matches("CAROUSEL"));
        assert!(!TemplateKind::QuickReply.matches("quick_reply"));
    }

    #[test]
    fn test_absent_and_empty_candidates() {
        assert_eq!(match_kind(&[None, None]), None);
        assert_eq!(match_kind(&[Some(""), None]), None);
        assert_eq!(match_kind(&[]), None);
    }

    #[test]
    fn test_priority_order() {
        // text says "q" but the postback selects the list template
        assert_eq!(
            match_kind(&[Some("list_template"), Some("q")]),
            Some(TemplateKind::ListTemplate)
        );
        // priority is by kind, not candidate position
        assert_eq!(
            match_kind(&[Some("i"), Some("c")]),
            Some(TemplateKind::Carousel)
        );
        assert_eq!(
            match_kind(&[None, Some("I")]),
            Some(TemplateKind::ImageCarousel)
        );
    }

    #[test]
    fn test_non_ascii_tokens() {
        assert_eq!(match_kind(&[Some("すし")]), None);
    }
}
