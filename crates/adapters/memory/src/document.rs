//! In-memory UI document.
//!
//! Holds the element tree the client markup would declare: the domain
//! selector, the placeholder, and per enabled domain a hidden section with
//! a list of hidden cards. Transitions complete instantly: enabling a card
//! drives its `state` indicator to opacity 0, disabling drives it to 1.

use std::collections::HashMap;

use homebutler_app::ports::document::child;
use homebutler_app::ports::{Animation, Document};
use homebutler_app::services::rendering::ids;
use homebutler_domain::enabled_domains::EnabledDomains;

/// Rendered properties of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub visible: bool,
    pub text: String,
    pub fill: Option<String>,
    pub opacity: f64,
    pub selected: Option<usize>,
    pub class: Option<String>,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            visible: false,
            text: String::new(),
            fill: None,
            opacity: 1.0,
            selected: None,
            class: None,
        }
    }
}

/// Element tree addressed by id, kept in markup order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDocument {
    order: Vec<String>,
    elements: HashMap<String, Element>,
}

impl MemoryDocument {
    /// Build the markup for every enabled domain, with as many card slots
    /// as the domain's maximum.
    #[must_use]
    pub fn with_layout(enabled: &EnabledDomains) -> Self {
        let mut document = Self::default();
        document.insert(ids::DOMAIN_LIST, None);
        document.insert(ids::WARNING_TITLE, None);
        document.insert(ids::WARNING_CONTENT, None);
        for (domain, max) in enabled.iter() {
            document.insert(&ids::section(domain), None);
            document.insert(&ids::list(domain), None);
            for index in 0..max {
                let card = ids::card(domain, index);
                document.insert(&card, Some(domain));
                for name in ids::CARD_CHILDREN {
                    document.insert(&child(&card, name), None);
                }
            }
        }
        document
    }

    /// Add an element at the end of the markup, replacing any element
    /// with the same id.
    pub fn insert(&mut self, id: &str, class: Option<&str>) {
        let element = Element {
            class: class.map(str::to_string),
            ..Element::default()
        };
        if self.elements.insert(id.to_string(), element).is_none() {
            self.order.push(id.to_string());
        }
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.element(id).is_some_and(|el| el.visible)
    }

    #[must_use]
    pub fn fill(&self, id: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.fill.as_deref())
    }

    #[must_use]
    pub fn selected(&self, id: &str) -> Option<usize> {
        self.element(id).and_then(|el| el.selected)
    }

    /// Force an opacity, e.g. to freeze a running transition.
    pub fn set_opacity(&mut self, id: &str, opacity: f64) {
        if let Some(el) = self.elements.get_mut(id) {
            el.opacity = opacity;
        }
    }

    /// Ids of the visible elements carrying `class`, in markup order.
    #[must_use]
    pub fn visible_cards(&self, class: &str) -> Vec<String> {
        self.elements_by_class(class)
            .into_iter()
            .filter(|id| self.is_visible(id))
            .collect()
    }
}

impl Document for MemoryDocument {
    fn exists(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(el) = self.elements.get_mut(id) {
            el.visible = visible;
        }
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.text = text.to_string();
        }
    }

    fn text(&self, id: &str) -> Option<String> {
        self.element(id).map(|el| el.text.clone())
    }

    fn set_fill(&mut self, id: &str, color: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.fill = Some(color.to_string());
        }
    }

    fn animate(&mut self, id: &str, animation: Animation) {
        let opacity = match animation {
            Animation::Enable => 0.0,
            Animation::Disable => 1.0,
        };
        self.set_opacity(&child(id, ids::STATE), opacity);
    }

    fn opacity(&self, id: &str) -> Option<f64> {
        self.element(id).map(|el| el.opacity)
    }

    fn select(&mut self, list_id: &str, index: usize) {
        if let Some(el) = self.elements.get_mut(list_id) {
            el.selected = Some(index);
        }
    }

    fn elements_by_class(&self, class: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| {
                self.elements
                    .get(id.as_str())
                    .is_some_and(|el| el.class.as_deref() == Some(class))
            })
            .cloned()
            .collect()
    }
}
