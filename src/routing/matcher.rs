//! Route template matching.
//!
//! # Responsibilities
//! - Compile a cleaned route prefix into static and `:name` segments
//! - Match a request path segment by segment, capturing parameters
//!
//! # Design Decisions
//! - Whole-path match: a template never matches a longer or shorter path
//! - Static segments compare case-sensitively
//! - No regex, matching is a single pass over the segments

use crate::handler::PathParams;
use crate::registry::clean_path;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A compiled route template such as `/users/:id/posts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn compile(prefix: &str) -> Self {
        let cleaned = clean_path(prefix);
        let segments = cleaned
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Number of static segments. More static segments is more specific.
    pub fn static_segments(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    /// Match a cleaned request path, returning captured parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::new();
        let mut parts = path.split('/').filter(|s| !s.is_empty());

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Static(expected) if expected == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => params.push(name.as_str(), part),
            }
        }

        match parts.next() {
            Some(_) => None,
            None => Some(params),
        }
    }
}
