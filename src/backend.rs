//! Traits for backends.

use crate::events::EventHandler;

/// A backend implementation: whatever actually owns and renders elements.
///
/// The builder never validates tag names, attribute names, style properties or event names; it
/// hands them to the backend as-is, and whatever the backend returns as an error aborts the build.
pub trait Backend {
    /// A reference to an element in the backend.
    ///
    /// Cloning should be cheap: references are stored in scopes and handed back to callers.
    type Element: Clone;

    /// Payload passed to event handlers.
    type Event;

    /// Error type.
    type Error;

    /// Creates a new element with the given tag name.
    fn create_element(&mut self, tag: &str) -> Result<Self::Element, Self::Error>;

    /// Sets an attribute.
    fn set_attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// Replaces the element’s content with raw markup.
    fn set_markup(&mut self, element: &Self::Element, markup: &str) -> Result<(), Self::Error>;

    /// Registers an event listener. Listeners are additive.
    fn add_event_listener(
        &mut self,
        element: &Self::Element,
        event: &str,
        handler: EventHandler<Self::Event>,
    ) -> Result<(), Self::Error>;

    /// Sets an inline style property.
    fn set_style(
        &mut self,
        element: &Self::Element,
        property: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// Appends `child` as the last child of `parent`.
    fn append_child(
        &mut self,
        parent: &Self::Element,
        child: &Self::Element,
    ) -> Result<(), Self::Error>;
}
