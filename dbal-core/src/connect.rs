use crate::{Attribute, Result, Value};

/// Link lifecycle and attribute access of a driver.
///
/// The link is established lazily: any operation that needs it connects
/// first, an explicit `connect` is only needed to surface connect failures early.
pub trait Connect {
    /// Establish the link, no-op when already connected.
    fn connect(&self) -> Result<&Self>;
    /// Release every prepared statement, then the link. Safe in any state.
    fn disconnect(&self) -> &Self;
    fn is_connected(&self) -> bool;
    /// `false` when not connected, otherwise a round trip through the adapter.
    fn ping(&self) -> bool;
    /// Buffer the attribute and, when connected, apply it to the link too.
    fn set_attribute(&self, attribute: impl Into<Attribute>, value: impl Into<Value>)
    -> Result<&Self>;
    /// Value reported by the live link, falling back to the buffered one.
    fn get_attribute(&self, attribute: impl Into<Attribute>) -> Result<Option<Value>>;
}
