//! Stable keys for synchronization events.
//!
//! A key has the form `<kind>/<section>/<namespace>/<name>`. `%` and `/` are
//! percent-escaped inside every component, so the first two separators always
//! delimit kind and section and distinct inputs never produce the same key.

use std::borrow::Cow;

/// Discovery kind for pod targets.
pub const POD_KIND: &str = "pods";

/// Builds the sync key for the resource identified by `object_key` in the
/// given discovery kind and configuration section.
///
/// `object_key` is expected to be escaped already, see [`crate::discovery::Pod::key`].
pub fn build_sync_key(kind: &str, section: &str, object_key: &str) -> String {
    format!(
        "{}/{}/{object_key}",
        escape_component(kind),
        escape_component(section)
    )
}

pub(crate) fn escape_component(component: &str) -> Cow<'_, str> {
    if !component.contains(['%', '/']) {
        return Cow::Borrowed(component);
    }

    let mut escaped = String::with_capacity(component.len() + 4);
    for c in component.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2F"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
