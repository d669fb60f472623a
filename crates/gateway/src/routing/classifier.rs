//! Request classification
//!
//! Decides whether a request is internal administrative traffic. Admin
//! requests bypass site binding and canonical-host redirects entirely.

/// Query parameter marking an editor preview request; checked by presence.
const EDITMODE_PARAM: &str = "editmode";

/// Classifies requests as administrative or public-facing.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    admin_prefixes: Vec<String>,
}

impl RequestClassifier {
    pub fn new(admin_prefixes: Vec<String>) -> Self {
        Self { admin_prefixes }
    }

    /// Whether this request is administrative traffic.
    ///
    /// Admin = the path lives under a configured admin prefix, or the query
    /// string carries the editmode marker (an editor previewing a page).
    pub fn is_admin(&self, path: &str, query: Option<&str>) -> bool {
        if self
            .admin_prefixes
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
        {
            return true;
        }

        if let Some(query) = query {
            return url::form_urlencoded::parse(query.as_bytes())
                .any(|(key, _)| key == EDITMODE_PARAM);
        }

        false
    }
}

/// Segment-aware prefix match: "/admin" covers "/admin" and "/admin/login"
/// but not "/administrator".
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
