/// A resolved request address.
///
/// The empty string is the sentinel for "unspecified" on both fields. The
/// resolver never produces an empty namespace with a non-empty key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub namespace: String,
    pub key: String,
}

impl Address {
    /// Parse a URL path into a (namespace, key) pair.
    ///
    /// The path is split on `/`, dropping the leading empty segment. First
    /// match wins:
    ///
    /// | shape          | resolved as                 |
    /// |----------------|-----------------------------|
    /// | `/`            | `("", "")`                  |
    /// | `/<a>`         | `(default_namespace, a)`    |
    /// | `/<a>/`        | `(a, "")`                   |
    /// | `/<a>/<b>[/…]` | `(a, b)`, extras ignored    |
    ///
    /// Any other shape (an empty segment in the first two positions)
    /// resolves to the fully-unspecified address.
    pub fn resolve(path: &str, default_namespace: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<&str> = trimmed.split('/').collect();
        let (namespace, key) = match segments.as_slice() {
            [""] => (String::new(), String::new()),
            [a] => (default_namespace.to_owned(), (*a).to_owned()),
            [a, ""] if !a.is_empty() => ((*a).to_owned(), String::new()),
            [a, b, ..] if !a.is_empty() && !b.is_empty() => ((*a).to_owned(), (*b).to_owned()),
            _ => (String::new(), String::new()),
        };
        Self { namespace, key }
    }

    /// The effective read address: fall back to the configured defaults
    /// where the path left the namespace or key unspecified.
    pub fn effective(&self, default_namespace: &str, default_key: &str) -> (String, String) {
        match (self.namespace.is_empty(), self.key.is_empty()) {
            (true, _) => (default_namespace.to_owned(), default_key.to_owned()),
            (false, true) => (self.namespace.clone(), default_key.to_owned()),
            (false, false) => (self.namespace.clone(), self.key.clone()),
        }
    }
}
