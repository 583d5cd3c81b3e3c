//! Cache key namespace for class views.
//!
//! Every key lives under the `class:` namespace and is composed of a view
//! prefix plus a discriminator:
//!
//! - id-keyed views: `class:data:{id}`
//! - parameterized views: `class:list:{canonical_params}`
//! - dimension indexes: `class:teacher:{teacher_id}:{canonical_params}`
//!
//! Canonicalization is what makes cache hits possible across requests:
//! the same logical query must always yield the same key string, no matter
//! in what order the caller assembled its parameters.

use std::collections::BTreeMap;

/// Top-level namespace for all class cache keys.
pub const NAMESPACE: &str = "class";

/// Separator between `name:value` pairs in a canonical parameter string.
const PARAM_SEPARATOR: char = '|';

/// Discriminator used for parameterized views queried with no parameters.
const EMPTY_PARAMS: &str = "all";

/// Cached views of the class entity, each with its own key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Single entity by id
    Data,
    /// Paginated, filtered list
    List,
    /// Advanced search
    Search,
    /// Stats/counts
    Counts,
    /// Aggregated analytics
    Analytics,
    /// Performance reports
    Performance,
    /// Export payloads
    Export,
    /// Per-school index
    School,
    /// Per-level index
    Level,
    /// Per-teacher index
    Teacher,
}

impl View {
    /// All views, in key-prefix order.
    pub const ALL: [View; 10] = [
        View::Data,
        View::List,
        View::Search,
        View::Counts,
        View::Analytics,
        View::Performance,
        View::Export,
        View::School,
        View::Level,
        View::Teacher,
    ];

    /// Full key prefix including the namespace, e.g. `class:list:`.
    pub fn prefix(self) -> &'static str {
        match self {
            View::Data => "class:data:",
            View::List => "class:list:",
            View::Search => "class:search:",
            View::Counts => "class:counts:",
            View::Analytics => "class:analytics:",
            View::Performance => "class:performance:",
            View::Export => "class:export:",
            View::School => "class:school:",
            View::Level => "class:level:",
            View::Teacher => "class:teacher:",
        }
    }

    /// Build the key for a discriminator under this view.
    pub fn key(self, discriminator: &str) -> String {
        format!("{}{}", self.prefix(), discriminator)
    }

    /// Glob pattern matching every key of this view.
    pub fn pattern(self) -> String {
        format!("{}*", self.prefix())
    }

    /// Glob pattern matching one dimension value of a dimension view,
    /// e.g. `class:teacher:t10:*`.
    pub fn dimension_pattern(self, value: &str) -> String {
        format!("{}{}:*", self.prefix(), value)
    }
}

/// Glob pattern matching the entire class namespace.
pub fn namespace_pattern() -> String {
    format!("{NAMESPACE}:*")
}

/// Canonicalize query parameters into a deterministic discriminator.
///
/// Parameter names are sorted lexicographically and joined as
/// `name:value` pairs with a fixed separator, so `{b:2, a:1}` and
/// `{a:1, b:2}` produce the same string. An empty parameter set yields a
/// fixed sentinel so unparameterized queries still get a stable key.
pub fn canonical_params<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let sorted: BTreeMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    if sorted.is_empty() {
        return EMPTY_PARAMS.to_string();
    }

    let mut out = String::new();
    for (i, (name, value)) in sorted.iter().enumerate() {
        if i > 0 {
            out.push(PARAM_SEPARATOR);
        }
        out.push_str(name);
        out.push(':');
        out.push_str(value);
    }
    out
}

/// Discriminator for a dimension view: `{value}:{canonical_params}`.
pub fn dimension_discriminator(value: &str, canonical: &str) -> String {
    format!("{value}:{canonical}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_prefixes_live_under_namespace() {
        for view in View::ALL {
            assert!(view.prefix().starts_with("class:"));
            assert!(view.prefix().ends_with(':'));
        }
    }

    #[test]
    fn test_key_and_pattern() {
        assert_eq!(View::Data.key("42"), "class:data:42");
        assert_eq!(View::List.pattern(), "class:list:*");
        assert_eq!(View::Teacher.dimension_pattern("t10"), "class:teacher:t10:*");
        assert_eq!(namespace_pattern(), "class:*");
    }

    #[test]
    fn test_canonical_params_order_independent() {
        let mut forward = HashMap::new();
        forward.insert("a", "1");
        forward.insert("b", "2");

        let mut reverse = HashMap::new();
        reverse.insert("b", "2");
        reverse.insert("a", "1");

        assert_eq!(canonical_params(forward), canonical_params(reverse));
        assert_eq!(
            canonical_params([("b", "2"), ("a", "1")]),
            "a:1|b:2"
        );
    }

    #[test]
    fn test_canonical_params_empty() {
        let empty: Vec<(&str, &str)> = Vec::new();
        assert_eq!(canonical_params(empty), "all");
    }

    #[test]
    fn test_canonical_params_from_list_params() {
        let mut params = campus_core::ListParams::default();
        params.teacher_id = Some("t10".to_string());

        let canonical = canonical_params(params.to_pairs());
        assert_eq!(canonical, "page:1|per_page:20|teacher_id:t10");
    }

    #[test]
    fn test_dimension_discriminator() {
        assert_eq!(dimension_discriminator("s5", "page:1"), "s5:page:1");
        assert_eq!(
            View::School.key(&dimension_discriminator("s5", "all")),
            "class:school:s5:all"
        );
    }
}
