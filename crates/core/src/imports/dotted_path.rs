use std::fmt;

/// A non-empty dotted module path such as `requests.auth.basic`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DottedPath {
    segments: Vec<String>,
}

impl DottedPath {
    pub fn new(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    pub fn parse(text: &str) -> Option<Self> {
        Self::new(text.split('.').map(|s| s.trim().to_string()).collect())
    }

    /// First component, the name a vendored top-level package is known by
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Last component
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Components after the root
    pub fn rest(&self) -> &[String] {
        &self.segments[1..]
    }

    /// Path without its first component, if anything remains
    pub fn without_root(&self) -> Option<Self> {
        Self::new(self.rest().to_vec())
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
