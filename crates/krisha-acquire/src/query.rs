// Structural queries against listing markup.
//
// A field value lives in two nested elements:
//
//   <div class="offer__info-item" data-name="indust.prod_square">
//     <div class="offer__advert-short-info">120 m²</div>
//   </div>
//
// Each level is described by an `ElementMatch`; `FieldQuery` chains the two.

use krisha_model::FieldKey;
use scraper::{ElementRef, Html};

const INFO_ITEM_CLASS: &str = "offer__info-item";
const SHORT_INFO_CLASS: &str = "offer__advert-short-info";
const KEY_ATTRIBUTE: &str = "data-name";

/// Matches an element by tag name, a class token, and optionally one
/// attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMatch {
    pub tag: &'static str,
    pub class: &'static str,
    pub attr: Option<(&'static str, String)>,
}

impl ElementMatch {
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        let elem = element.value();
        if elem.name() != self.tag {
            return false;
        }
        if !elem.classes().any(|c| c == self.class) {
            return false;
        }
        match &self.attr {
            Some((name, value)) => elem.attr(name) == Some(value.as_str()),
            None => true,
        }
    }

    /// First matching element strictly below `scope`, in document order.
    pub fn find_in<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|e| self.matches(e))
    }
}

/// Two-step lookup of one field: the info item for the key, then the
/// short-info element inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldQuery {
    pub container: ElementMatch,
    pub value: ElementMatch,
}

impl FieldQuery {
    pub fn for_key(key: FieldKey) -> Self {
        Self {
            container: ElementMatch {
                tag: "div",
                class: INFO_ITEM_CLASS,
                attr: Some((KEY_ATTRIBUTE, key.as_str().to_string())),
            },
            value: ElementMatch {
                tag: "div",
                class: SHORT_INFO_CLASS,
                attr: None,
            },
        }
    }

    /// Trimmed text of the value element, or `None` if either element is
    /// missing or the text is blank.
    pub fn run(&self, document: &Html) -> Option<String> {
        let container = self.container.find_in(document.root_element())?;
        let value = self.value.find_in(container)?;

        let text: String = value.text().collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
