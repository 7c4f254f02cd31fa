//! Core element types.

use std::fmt;

use guilay_core::{Color, Rect, SlotList};
use slotmap::new_key_type;

new_key_type! {
    /// Stable, non-owning handle to an element in an [`ElementTree`](super::ElementTree).
    ///
    /// Generational: a handle to a destroyed element never aliases a newer one.
    pub struct ElementId;
}

/// Activation callback attached to a button.
pub type Callback = Box<dyn FnMut()>;

/// A single line of text.
///
/// Text has no bounds of its own; it is placed by the flow layout inside
/// its container.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// The string to draw.
    pub content: String,
    scale: f32,
    /// Glyph color.
    pub color: Color,
}

impl Text {
    /// Creates a text run. Non-positive or NaN scales fall back to `1.0`.
    #[must_use]
    pub fn new(content: impl Into<String>, scale: f32, color: Color) -> Self {
        Self {
            content: content.into(),
            scale: positive_or_one(scale),
            color,
        }
    }

    /// Returns the uniform scale applied to glyph metrics. Always positive.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Sets the scale. Non-positive or NaN scales fall back to `1.0`.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = positive_or_one(scale);
    }
}

fn positive_or_one(scale: f32) -> f32 {
    if scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// A colored rectangle that owns an ordered list of children.
#[derive(Debug)]
pub struct Section {
    /// Absolute window bounds.
    pub bounds: Rect,
    /// Background color.
    pub color: Color,
    /// Owned children. Only the tree mutates this list.
    pub(crate) children: SlotList<ElementId>,
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub const fn new(bounds: Rect, color: Color) -> Self {
        Self {
            bounds,
            color,
            children: SlotList::new(),
        }
    }

    /// Returns the number of child slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the section has no child slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A clickable rectangle with an owned label.
pub struct Button {
    /// Absolute window bounds.
    pub bounds: Rect,
    /// Background color.
    pub color: Color,
    /// Label, centred in the bounds.
    pub label: Text,
    on_activate: Option<Callback>,
}

impl Button {
    /// Creates a button with no callback.
    #[must_use]
    pub fn new(bounds: Rect, color: Color, label: Text) -> Self {
        Self {
            bounds,
            color,
            label,
            on_activate: None,
        }
    }

    /// Sets the activation callback.
    #[must_use]
    pub fn on_activate(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_activate = Some(Box::new(callback));
        self
    }

    /// Replaces the activation callback.
    pub fn set_on_activate(&mut self, callback: Option<Callback>) {
        self.on_activate = callback;
    }

    /// Runs the callback. Returns false if none is attached.
    pub fn activate(&mut self) -> bool {
        match self.on_activate.as_mut() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("bounds", &self.bounds)
            .field("color", &self.color)
            .field("label", &self.label)
            .field("on_activate", &self.on_activate.is_some())
            .finish()
    }
}

/// Discriminant of an [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A text run.
    Text,
    /// A container.
    Section,
    /// A clickable button.
    Button,
}

/// A visual element.
#[derive(Debug)]
pub enum Element {
    /// A text run.
    Text(Text),
    /// A container with owned children.
    Section(Section),
    /// A clickable button.
    Button(Button),
}

impl Element {
    /// Shorthand for a text element.
    #[must_use]
    pub fn text(content: impl Into<String>, scale: f32, color: Color) -> Self {
        Self::Text(Text::new(content, scale, color))
    }

    /// Shorthand for an empty section.
    #[must_use]
    pub const fn section(bounds: Rect, color: Color) -> Self {
        Self::Section(Section::new(bounds, color))
    }

    /// Shorthand for a button without a callback.
    #[must_use]
    pub fn button(bounds: Rect, color: Color, label: Text) -> Self {
        Self::Button(Button::new(bounds, color, label))
    }

    /// Returns the variant tag.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Section(_) => ElementKind::Section,
            Self::Button(_) => ElementKind::Button,
        }
    }

    /// Returns the explicit bounds. Text has none.
    #[must_use]
    pub const fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Text(_) => None,
            Self::Section(section) => Some(section.bounds),
            Self::Button(button) => Some(button.bounds),
        }
    }

    /// Returns the element's primary color.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self {
            Self::Text(text) => text.color,
            Self::Section(section) => section.color,
            Self::Button(button) => button.color,
        }
    }

    /// Returns true if the element can hold children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Section(_))
    }
}

impl From<Text> for Element {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

impl From<Section> for Element {
    fn from(section: Section) -> Self {
        Self::Section(section)
    }
}

impl From<Button> for Element {
    fn from(button: Button) -> Self {
        Self::Button(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_text_scale_must_be_positive() {
        assert_eq!(Text::new("a", 2.0, Color::WHITE).scale(), 2.0);
        assert_eq!(Text::new("a", 0.0, Color::WHITE).scale(), 1.0);
        assert_eq!(Text::new("a", -3.0, Color::WHITE).scale(), 1.0);
        assert_eq!(Text::new("a", f32::NAN, Color::WHITE).scale(), 1.0);

        let mut text = Text::new("a", 2.0, Color::WHITE);
        text.set_scale(0.0);
        assert_eq!(text.scale(), 1.0);
        text.set_scale(3.5);
        assert_eq!(text.scale(), 3.5);
    }

    #[test]
    fn test_button_activation() {
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let mut button = Button::new(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK, Text::new("ok", 1.0, Color::WHITE))
            .on_activate(move || counter.set(counter.get() + 1));

        assert!(button.activate());
        assert!(button.activate());
        assert_eq!(clicks.get(), 2);

        button.set_on_activate(None);
        assert!(!button.activate());
    }

    #[test]
    fn test_kind_and_bounds() {
        let text = Element::text("hi", 1.0, Color::WHITE);
        let section = Element::section(Rect::new(1.0, 2.0, 3.0, 4.0), Color::BLACK);

        assert_eq!(text.kind(), ElementKind::Text);
        assert_eq!(text.bounds(), None);
        assert_eq!(section.bounds(), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert!(section.is_container());
        assert!(!text.is_container());
    }
}
