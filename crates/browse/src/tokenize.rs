//! Command-line tokenization for raw command execution.
//!
//! Splits a raw command string into arguments the way interactive shells
//! for key-value stores do: double-quoted spans first, then single-quoted
//! spans within the unquoted remainder, then whitespace. A quoted span
//! becomes exactly one argument with the quotes stripped. Single quotes
//! inside a double-quoted span stay literal; double quotes always pair up
//! first, so they split the line even when single quotes surround them.

use serde::{Deserialize, Serialize};

use crate::error::{BrowseError, BrowseResult};

/// What to do with a quote character that never finds its partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotePolicy {
    /// Treat the unpaired quote as a literal character and keep splitting
    /// the remainder on whitespace.
    #[default]
    Lenient,
    /// Reject the whole command with [`BrowseError::MalformedCommand`].
    Strict,
}

/// Splits `input` into command arguments.
///
/// Empty and whitespace-only input yields an empty vector. Empty quoted
/// spans (`""` or `''`) yield an empty-string argument.
///
/// # Errors
///
/// Returns [`BrowseError::MalformedCommand`] for an unpaired quote when
/// `policy` is [`QuotePolicy::Strict`].
pub fn tokenize(input: &str, policy: QuotePolicy) -> BrowseResult<Vec<String>> {
    let mut args = Vec::new();
    for segment in split_quoted(input, '"', policy)? {
        match segment {
            Segment::Quoted(arg) => args.push(arg),
            Segment::Bare(rest) => {
                for inner in split_quoted(&rest, '\'', policy)? {
                    match inner {
                        Segment::Quoted(arg) => args.push(arg),
                        Segment::Bare(text) => {
                            args.extend(text.split_whitespace().map(str::to_owned));
                        }
                    }
                }
            }
        }
    }
    Ok(args)
}

enum Segment {
    /// Contents of a balanced quote pair, quotes stripped.
    Quoted(String),
    /// Text outside any balanced pair.
    Bare(String),
}

/// Splits `input` on balanced pairs of `quote`. Only paired quotes
/// delimit spans; a trailing unpaired quote is handled per `policy`,
/// with Lenient folding it into the surrounding bare text.
fn split_quoted(input: &str, quote: char, policy: QuotePolicy) -> BrowseResult<Vec<Segment>> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut bare = String::new();
    let mut rest = input;

    while let Some(open) = rest.find(quote) {
        let after_open = &rest[open + quote.len_utf8()..];
        match after_open.find(quote) {
            Some(close) => {
                bare.push_str(&rest[..open]);
                if !bare.is_empty() {
                    segments.push(Segment::Bare(std::mem::take(&mut bare)));
                }
                segments.push(Segment::Quoted(after_open[..close].to_owned()));
                rest = &after_open[close + quote.len_utf8()..];
            }
            None => match policy {
                QuotePolicy::Strict => {
                    return Err(BrowseError::malformed_command(format!(
                        "unbalanced {quote} quote in command"
                    )));
                }
                QuotePolicy::Lenient => {
                    bare.push_str(rest);
                    rest = "";
                    break;
                }
            },
        }
    }

    bare.push_str(rest);
    if !bare.is_empty() {
        segments.push(Segment::Bare(bare));
    }
    Ok(segments)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn lenient(input: &str) -> Vec<String> {
        tokenize(input, QuotePolicy::Lenient).unwrap()
    }

    #[rstest]
    #[case("GET mykey", vec!["GET", "mykey"])]
    #[case("SET key \"a value\" count", vec!["SET", "key", "a value", "count"])]
    #[case("GET 'my key'", vec!["GET", "my key"])]
    #[case("SET \"k 1\" 'v 2' plain", vec!["SET", "k 1", "v 2", "plain"])]
    #[case("  PING  ", vec!["PING"])]
    #[case("SET k \"\"", vec!["SET", "k", ""])]
    #[case("SET k ''", vec!["SET", "k", ""])]
    fn splits_into_expected_arguments(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(lenient(input), expected);
    }

    #[test]
    fn empty_input_yields_no_arguments() {
        assert!(lenient("").is_empty());
        assert!(lenient("   ").is_empty());
    }

    #[test]
    fn single_quotes_inside_double_quoted_span_are_literal() {
        assert_eq!(lenient("ECHO \"it's fine\""), vec!["ECHO", "it's fine"]);
    }

    #[test]
    fn double_quotes_split_across_surrounding_single_quotes() {
        // Double quotes pair first, so the span between them becomes its
        // own argument and the single quotes are left as bare text.
        assert_eq!(lenient("ECHO 'say \"hi\"'"), vec!["ECHO", "'say", "hi", "'"]);
    }

    #[test]
    fn double_quote_pairing_wins_over_single_quotes() {
        // The single quotes here do not pair across the double-quoted span;
        // they stay attached to their bare tokens.
        assert_eq!(lenient("a'b \"c\" d'"), vec!["a'b", "c", "d'"]);
    }

    #[test]
    fn lenient_keeps_unpaired_quote_as_literal() {
        assert_eq!(lenient("GET can't stop"), vec!["GET", "can't", "stop"]);
        assert_eq!(lenient("GET \"oops"), vec!["GET", "\"oops"]);
    }

    #[test]
    fn strict_rejects_unpaired_quote() {
        let err = tokenize("GET \"oops", QuotePolicy::Strict).unwrap_err();
        assert!(matches!(err, BrowseError::MalformedCommand { .. }));
        let err = tokenize("GET can't", QuotePolicy::Strict).unwrap_err();
        assert!(matches!(err, BrowseError::MalformedCommand { .. }));
    }

    #[test]
    fn strict_accepts_balanced_quotes() {
        let args = tokenize("SET k \"a b\" 'c d'", QuotePolicy::Strict).unwrap();
        assert_eq!(args, vec!["SET", "k", "a b", "c d"]);
    }

    proptest! {
        /// Quote-free input tokenizes exactly like whitespace splitting.
        #[test]
        fn plain_input_matches_whitespace_split(input in "[a-zA-Z0-9 :*?_.-]{0,60}") {
            let expected: Vec<String> =
                input.split_whitespace().map(str::to_owned).collect();
            prop_assert_eq!(lenient(&input), expected);
        }

        /// No produced argument retains surrounding whitespace, and lenient
        /// tokenization never fails.
        #[test]
        fn lenient_never_errors_and_trims_bare_tokens(input in ".{0,80}") {
            let args = tokenize(&input, QuotePolicy::Lenient).unwrap();
            for (i, arg) in args.iter().enumerate() {
                // Quoted arguments may hold whitespace; bare ones may not.
                if !input.contains(['"', '\'']) {
                    prop_assert!(!arg.contains(char::is_whitespace), "arg {i} = {arg:?}");
                }
            }
        }
    }
}
