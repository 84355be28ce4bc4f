//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile patterns such as `/coffee/{id}/status` into segments
//! - Match a request path segment by segment
//! - Hand back the captured identifier, if the pattern has one
//!
//! # Design Decisions
//! - A capture matches exactly one non-empty segment
//! - Literal segments are case-sensitive
//! - No regex: matching is a single pass over the segments

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture,
}

/// Outcome of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// The value of the `{...}` segment, when the pattern has one.
    pub id: Option<String>,
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern. `{name}` segments capture; the name is informational.
    pub fn new(pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let segments = source
            .split('/')
            .map(|s| {
                if s.len() >= 2 && s.starts_with('{') && s.ends_with('}') {
                    Segment::Capture
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();
        Self { source, segments }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match `path` against the pattern.
    pub fn matches(&self, path: &str) -> Option<PathMatch> {
        let mut parts = path.split('/');
        let mut id = None;

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Capture if part.is_empty() => return None,
                Segment::Capture => id = Some(part.to_string()),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(PathMatch { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_single_segment() {
        let pattern = PathPattern::new("/coffee/{id}");
        assert_eq!(
            pattern.matches("/coffee/pot-1"),
            Some(PathMatch { id: Some("pot-1".into()) })
        );
        assert_eq!(pattern.matches("/coffee/pot-1/status"), None);
        assert_eq!(pattern.matches("/coffee/"), None);
        assert_eq!(pattern.matches("/coffee"), None);
        assert_eq!(pattern.matches("/tea/pot-1"), None);
    }

    #[test]
    fn test_capture_with_suffix() {
        let pattern = PathPattern::new("/coffee/{id}/stop-milk");
        assert_eq!(
            pattern.matches("/coffee/kettle-2/stop-milk"),
            Some(PathMatch { id: Some("kettle-2".into()) })
        );
        assert_eq!(pattern.matches("/coffee//stop-milk"), None);
        assert_eq!(pattern.matches("/coffee/pot-1/stop-milk/"), None);
        assert_eq!(pattern.matches("/coffee/pot-1/STOP-MILK"), None);
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::new("/");
        assert_eq!(pattern.matches("/"), Some(PathMatch { id: None }));
        assert_eq!(pattern.matches(""), None);
        assert_eq!(pattern.matches("//"), None);
        assert_eq!(pattern.as_str(), "/");
    }
}
