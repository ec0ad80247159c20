//! Document port — element lookup into the client's declarative UI.
//!
//! Elements are addressed by id. Children of a card are addressed with
//! [`child`], e.g. `child("light-0", "name")`. Operations on ids that do
//! not exist are no-ops.

/// Visual transition played on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    /// Card shows its device as active; the `state` indicator fades out.
    Enable,
    /// Card shows its device as inactive; the `state` indicator fades in.
    Disable,
}

/// Build the id of a card child element.
#[must_use]
pub fn child(parent: &str, name: &str) -> String {
    format!("{parent}/{name}")
}

/// The UI markup, as seen by the rendering engine.
pub trait Document {
    /// Whether an element with this id exists in the markup.
    fn exists(&self, id: &str) -> bool;

    /// Show or hide an element.
    fn set_visible(&mut self, id: &str, visible: bool);

    fn set_text(&mut self, id: &str, text: &str);

    /// Current text of an element.
    fn text(&self, id: &str) -> Option<String>;

    /// Set the fill color (`#RRGGBB`).
    fn set_fill(&mut self, id: &str, color: &str);

    /// Play a transition on a card.
    fn animate(&mut self, id: &str, animation: Animation);

    /// Current rendered opacity of an element.
    fn opacity(&self, id: &str) -> Option<f64>;

    /// Select an item of a list element.
    fn select(&mut self, list_id: &str, index: usize);

    /// Ids of every element carrying `class`, in markup order.
    fn elements_by_class(&self, class: &str) -> Vec<String>;
}
