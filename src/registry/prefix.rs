//! URL prefix normalization and decomposition.
//!
//! # Responsibilities
//! - Anchor a declared prefix under `/` and collapse `.`, `..` and repeated
//!   separators
//! - Drop any query component
//! - Split the cleaned prefix at the first `/:` parameter marker

/// Marker that starts the parametrized part of a prefix.
pub const PARAM_MARKER: &str = "/:";

/// A cleaned prefix and its static/parametrized halves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefixParts {
    /// The full normalized prefix.
    pub prefix: String,
    /// Everything before the first parameter marker. Never contains parameters.
    pub path: String,
    /// Everything from the first parameter marker onward, or empty.
    pub param: String,
}

/// Lexically clean a slash-separated path rooted at `/`.
///
/// Empty and `.` segments are removed, `..` removes the previous segment and
/// never climbs above the root, trailing slashes are dropped. The result
/// always starts with `/` and is `/` for an empty input.
pub fn clean_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut cleaned = String::with_capacity(raw.len() + 1);
    for segment in segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    cleaned
}

/// Normalize `raw` and split it into static and parametrized parts.
pub fn decompose_prefix(raw: &str) -> PrefixParts {
    let cleaned = clean_path(raw);
    let prefix = match cleaned.find('?') {
        Some(idx) => cleaned[..idx].to_string(),
        None => cleaned,
    };

    match prefix.find(PARAM_MARKER) {
        Some(idx) => PrefixParts {
            path: prefix[..idx].to_string(),
            param: prefix[idx..].to_string(),
            prefix,
        },
        None => PrefixParts {
            path: prefix.clone(),
            param: String::new(),
            prefix,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_at_first_param() {
        let parts = decompose_prefix("/users/:id/posts");
        assert_eq!(parts.prefix, "/users/:id/posts");
        assert_eq!(parts.path, "/users");
        assert_eq!(parts.param, "/:id/posts");
    }

    #[test]
    fn test_relative_prefix_is_anchored() {
        let parts = decompose_prefix("users");
        assert_eq!(parts.prefix, "/users");
        assert_eq!(parts.path, "/users");
        assert_eq!(parts.param, "");
    }

    #[test]
    fn test_redundant_segments_collapse() {
        assert_eq!(clean_path("//a/./b/../c/"), "/a/c");
        assert_eq!(clean_path("/../../x"), "/x");
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn test_query_is_discarded() {
        let parts = decompose_prefix("/search?q=rust");
        assert_eq!(parts.prefix, "/search");
        assert_eq!(parts.path, "/search");
        assert!(parts.param.is_empty());
    }

    #[test]
    fn test_multiple_params() {
        let parts = decompose_prefix("/a/:x/b/:y");
        assert_eq!(parts.path, "/a");
        assert_eq!(parts.param, "/:x/b/:y");
    }

    #[test]
    fn test_param_at_root() {
        let parts = decompose_prefix("/:id");
        assert_eq!(parts.path, "");
        assert_eq!(parts.param, "/:id");
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(raw in "[a-z./:]{0,24}") {
            let once = clean_path(&raw);
            prop_assert_eq!(clean_path(&once), once.clone());
            prop_assert!(once.starts_with('/'));
        }

        #[test]
        fn prop_parts_recompose(raw in "[a-z/:?]{0,24}") {
            let parts = decompose_prefix(&raw);
            prop_assert_eq!(format!("{}{}", parts.path, parts.param), parts.prefix.clone());
            prop_assert!(!parts.path.contains(PARAM_MARKER));
            prop_assert!(!parts.prefix.contains('?'));
        }
    }
}
