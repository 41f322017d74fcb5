/// Free form labels used by the [`crate::Manager`] to route requests, like `RO` or `RW`.
pub trait Taggable {
    fn add_tag(&self, tag: &str);
    /// `true` if the tag was present.
    fn remove_tag(&self, tag: &str) -> bool;
    fn has_tag(&self, tag: &str) -> bool;
    fn tags(&self) -> Vec<String>;
}
