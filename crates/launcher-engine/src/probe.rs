//! Text-entry detection for the typing probe.

use async_trait::async_trait;

use crate::{Result, deps::InputFocusProbe, registry::WindowId};

/// Class/id fragments that mark an element as a text-entry widget.
const TEXT_ENTRY_HINTS: [&str; 6] = ["chat", "input", "message", "text", "edit", "textarea"];

/// Snapshot of the element holding keyboard focus inside a window's content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveElement {
    /// Element tag name, e.g. `INPUT`.
    pub tag: String,
    /// The element is content-editable.
    pub content_editable: bool,
    /// ARIA role, if any.
    pub role: Option<String>,
    /// Class attribute.
    pub class_name: String,
    /// Id attribute.
    pub id: String,
}

impl ActiveElement {
    /// Whether this element looks like somewhere the user types text.
    pub fn looks_like_text_entry(&self) -> bool {
        let tag = self.tag.to_ascii_uppercase();
        if tag == "INPUT" || tag == "TEXTAREA" || self.content_editable {
            return true;
        }
        if let Some(role) = &self.role {
            let role = role.to_ascii_lowercase();
            if role == "textbox" || role == "combobox" {
                return true;
            }
        }
        let class = self.class_name.to_ascii_lowercase();
        let id = self.id.to_ascii_lowercase();
        TEXT_ENTRY_HINTS
            .iter()
            .any(|hint| class.contains(hint) || id.contains(hint))
    }
}

/// A source of focused-element snapshots for a window.
#[async_trait]
pub trait ActiveElementSource: Send + Sync {
    /// The focused element of `window`'s content, if any.
    async fn active_element(&self, window: WindowId) -> Result<Option<ActiveElement>>;
}

/// Adapts an [`ActiveElementSource`] to [`InputFocusProbe`].
pub struct ElementProbe<S> {
    source: S,
}

impl<S: ActiveElementSource> ElementProbe<S> {
    /// Wrap `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: ActiveElementSource> InputFocusProbe for ElementProbe<S> {
    async fn is_typing(&self, window: WindowId) -> Result<bool> {
        Ok(self
            .source
            .active_element(window)
            .await?
            .is_some_and(|el| el.looks_like_text_entry()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn el(tag: &str) -> ActiveElement {
        ActiveElement {
            tag: tag.to_string(),
            ..ActiveElement::default()
        }
    }

    #[test]
    fn text_entry_heuristic() {
        assert!(el("input").looks_like_text_entry());
        assert!(el("TEXTAREA").looks_like_text_entry());
        assert!(!el("CANVAS").looks_like_text_entry());
        assert!(!el("BODY").looks_like_text_entry());

        let editable = ActiveElement {
            content_editable: true,
            ..el("DIV")
        };
        assert!(editable.looks_like_text_entry());

        let combo = ActiveElement {
            role: Some("ComboBox".into()),
            ..el("DIV")
        };
        assert!(combo.looks_like_text_entry());
        let button = ActiveElement {
            role: Some("button".into()),
            ..el("DIV")
        };
        assert!(!button.looks_like_text_entry());

        let chat = ActiveElement {
            class_name: "ui ChatPanel".into(),
            ..el("DIV")
        };
        assert!(chat.looks_like_text_entry());
        let by_id = ActiveElement {
            id: "msgEditor".into(),
            ..el("SPAN")
        };
        assert!(by_id.looks_like_text_entry());
    }

    /// Source returning a fixed answer.
    struct Fixed(Option<ActiveElement>, bool);

    #[async_trait]
    impl ActiveElementSource for Fixed {
        async fn active_element(&self, _window: WindowId) -> Result<Option<ActiveElement>> {
            if self.1 {
                return Err(Error::Probe("window gone".into()));
            }
            Ok(self.0.clone())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn element_probe_maps_snapshots() {
        let w = WindowId(1);
        assert!(ElementProbe::new(Fixed(Some(el("INPUT")), false)).is_typing(w).await.unwrap());
        assert!(!ElementProbe::new(Fixed(Some(el("CANVAS")), false)).is_typing(w).await.unwrap());
        assert!(!ElementProbe::new(Fixed(None, false)).is_typing(w).await.unwrap());
        assert!(ElementProbe::new(Fixed(None, true)).is_typing(w).await.is_err());
    }
}
