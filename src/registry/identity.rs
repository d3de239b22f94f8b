//! Deterministic identity derivation for descriptors.
//!
//! Two formulas exist and are kept apart on purpose:
//!
//! - operation-bound: `symbol[suffix][description][type1][type2]...`
//! - prefix-bound: `symbol[prefix][method1][method2]...`
//!
//! The prefix-bound form keys on the full prefix and ignores description and
//! parameters; the operation-bound form keys on the path suffix and includes
//! the description.

use axum::http::Method;

/// Symbol used for descriptors without a callback.
pub const NIL_SYMBOL: &str = "nil";

fn bracket(out: &mut String, part: &str) {
    out.push('[');
    out.push_str(part);
    out.push(']');
}

/// Identity of an operation-bound descriptor.
///
/// `types` must already be in their final sorted and deduplicated order.
pub fn operation_identity<S: AsRef<str>>(
    symbol: &str,
    suffix: &str,
    description: &str,
    types: &[S],
) -> String {
    let mut id = String::with_capacity(symbol.len() + suffix.len() + description.len() + 16);
    id.push_str(symbol);
    bracket(&mut id, suffix);
    bracket(&mut id, description);
    for ty in types {
        bracket(&mut id, ty.as_ref());
    }
    id
}

/// Identity of a prefix-bound descriptor.
pub fn route_identity(symbol: &str, prefix: &str, methods: &[Method]) -> String {
    let mut id = String::with_capacity(symbol.len() + prefix.len() + 8 * methods.len() + 2);
    id.push_str(symbol);
    bracket(&mut id, prefix);
    for method in methods {
        bracket(&mut id, method.as_str());
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_identity_layout() {
        let id = operation_identity("app::users::show", "/:id", "show user", &["GET", "HEAD"]);
        assert_eq!(id, "app::users::show[/:id][show user][GET][HEAD]");
    }

    #[test]
    fn test_route_identity_layout() {
        let id = route_identity("app::users::show", "/users/:id", &[Method::GET]);
        assert_eq!(id, "app::users::show[/users/:id][GET]");
    }

    #[test]
    fn test_route_identity_ignores_nothing_but_prefix_and_methods() {
        let a = route_identity("h", "/a", &[Method::POST, Method::GET]);
        let b = route_identity("h", "/a", &[Method::GET, Method::POST]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_nil_identity() {
        let id = operation_identity::<&str>(NIL_SYMBOL, "", "placeholder", &[]);
        assert_eq!(id, "nil[][placeholder]");
    }
}
