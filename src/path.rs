//! Dotted path strings.
//!
//! Every dotted wrapper in the library splits on [`DEFAULT_SEPARATOR`]. The
//! command line may choose another separator through its settings.

use itertools::Itertools;

pub const DEFAULT_SEPARATOR: char = '.';

/// Split a dotted path into segments. The empty string addresses the node itself.
pub fn split_path(path: &str) -> Vec<&str> {
    split_path_with(path, DEFAULT_SEPARATOR)
}

pub fn split_path_with(path: &str, separator: char) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(separator).collect()
}

/// Render segments back into dotted form, for messages and logs.
pub fn join_path(segments: &[&str]) -> String {
    segments.iter().join(&DEFAULT_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.b.c", vec!["a", "b", "c"])]
    #[case("a", vec!["a"])]
    #[case("", vec![])]
    #[case("a..b", vec!["a", "", "b"])]
    #[case("a,b", vec!["a,b"])]
    fn test_split_path(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_path(input), expected);
    }

    #[test]
    fn test_split_path_with_custom_separator() {
        assert_eq!(split_path_with("a/b.c", '/'), vec!["a", "b.c"]);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["a", "b"]), "a.b");
        assert_eq!(join_path(&[]), "");
    }
}
