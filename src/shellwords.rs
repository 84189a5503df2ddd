// ABOUTME: Quote-aware tokenizer for the free-form extra-options string.
// ABOUTME: Splits on unquoted spaces, honoring single and double quotes.

/// Split a free-form options string into argv-safe tokens.
///
/// Unquoted ASCII spaces separate tokens. A `"` or `'` toggles quoting and is
/// consumed; while a quote is active, spaces and the other quote character
/// are literal. An unterminated quote runs to the end of the string. Empty
/// tokens are dropped. There is no backslash escaping.
pub fn split(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => quote = Some(c),
                ' ' => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(c),
            },
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_no_tokens() {
        assert!(split("").is_empty());
    }

    #[test]
    fn splits_on_unquoted_spaces() {
        assert_eq!(split("--parallel --limit=5"), vec!["--parallel", "--limit=5"]);
    }

    #[test]
    fn double_quotes_are_consumed() {
        assert_eq!(split("--tag=\"v1.0\" --flag"), vec!["--tag=v1.0", "--flag"]);
    }

    #[test]
    fn single_quotes_preserve_spaces() {
        assert_eq!(split("'a b' c"), vec!["a b", "c"]);
    }

    #[test]
    fn other_quote_type_is_literal_inside_quotes() {
        assert_eq!(split("\"it's\""), vec!["it's"]);
        assert_eq!(split("'say \"hi\"'"), vec!["say \"hi\""]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(split("--msg='hello world"), vec!["--msg=hello world"]);
    }

    #[test]
    fn consecutive_spaces_drop_empty_tokens() {
        assert_eq!(split("a   b"), vec!["a", "b"]);
        assert_eq!(split("  a "), vec!["a"]);
    }

    #[test]
    fn adjacent_quoted_segments_join_into_one_token() {
        assert_eq!(split("a'b c'd"), vec!["ab cd"]);
    }

    #[test]
    fn empty_quotes_produce_no_token() {
        assert_eq!(split("'' a"), vec!["a"]);
    }

    #[test]
    fn backslash_is_an_ordinary_character() {
        assert_eq!(split("a\\ b"), vec!["a\\", "b"]);
    }
}
