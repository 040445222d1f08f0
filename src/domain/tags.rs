//! Tag list parsing for free-text tag inputs.

const TAG_SEPARATOR: char = ',';

/// Split a comma-separated tag input into trimmed, non-empty tags.
///
/// Input order is preserved and duplicates pass through untouched.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tags back into the free-text form accepted by [`normalize_tags`].
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Re-normalize tags that are already in list form.
pub fn renormalize(tags: &[String]) -> Vec<String> {
    tags.iter()
        .flat_map(|tag| normalize_tags(tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_pieces_and_trims() {
        assert_eq!(normalize_tags("a, ,b,, c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn preserves_order_and_duplicates() {
        assert_eq!(
            normalize_tags("rust, tokio, rust"),
            vec!["rust", "tokio", "rust"]
        );
    }

    #[test]
    fn empty_and_separator_only_inputs_yield_nothing() {
        assert!(normalize_tags("").is_empty());
        assert!(normalize_tags(" , ,, ").is_empty());
    }

    #[test]
    fn inner_whitespace_is_kept() {
        assert_eq!(
            normalize_tags("  machine learning ,web dev"),
            vec!["machine learning", "web dev"]
        );
    }

    #[test]
    fn normalization_is_idempotent_over_rejoined_output() {
        let inputs = [
            "",
            ",",
            "a",
            "a, ,b,, c ",
            " tech , tutorial,nextjs ",
            "\tx\n,\ny\t",
            "dup,dup, dup",
            "ünïcode, 日本語 , ,emoji 🚀",
        ];

        for input in inputs {
            let first = normalize_tags(input);
            let second = normalize_tags(&join_tags(&first));
            assert_eq!(first, second, "input {input:?}");
        }
    }

    #[test]
    fn renormalize_splits_and_trims_list_entries() {
        let tags = vec![" a ".to_string(), "".to_string(), "b,c".to_string()];
        assert_eq!(renormalize(&tags), vec!["a", "b", "c"]);
    }
}
