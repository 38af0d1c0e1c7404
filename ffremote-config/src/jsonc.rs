//! JSONC comment stripping.
//!
//! Config files allow JavaScript-style comments on top of JSON. Stripping
//! removes `//` line comments (keeping the newline) and `/* */` block
//! comments, while preserving string literals verbatim, including `//` and
//! `/* */` substrings and escape sequences inside them.

/// Strip comments from JSONC text, yielding plain JSON bytes.
pub fn strip_comments(content: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(content.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;
    // `/*` openers seen inside a block comment; the comment only ends once
    // the matching number of closers has passed.
    let mut block_depth = 0usize;

    let mut i = 0;
    while i < content.len() {
        let c = content[i];

        if in_line_comment {
            if c == b'\n' {
                in_line_comment = false;
                result.push(c);
            }
            i += 1;
            continue;
        }

        if in_block_comment {
            if c == b'/' && content.get(i + 1) == Some(&b'*') {
                block_depth += 1;
                i += 2;
                continue;
            }
            if c == b'*' && content.get(i + 1) == Some(&b'/') {
                if block_depth > 0 {
                    block_depth -= 1;
                } else {
                    in_block_comment = false;
                }
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }

        if escaped {
            result.push(c);
            escaped = false;
            i += 1;
            continue;
        }

        if in_string {
            if c == b'\\' {
                escaped = true;
            } else if c == b'"' {
                in_string = false;
            }
            result.push(c);
            i += 1;
            continue;
        }

        if c == b'"' {
            in_string = true;
            result.push(c);
            i += 1;
        } else if c == b'/' && i + 1 < content.len() {
            match content[i + 1] {
                b'/' => {
                    in_line_comment = true;
                    i += 2;
                }
                b'*' => {
                    in_block_comment = true;
                    i += 2;
                }
                _ => {
                    result.push(c);
                    i += 1;
                }
            }
        } else {
            result.push(c);
            i += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(input: &str) -> String {
        String::from_utf8(strip_comments(input.as_bytes())).unwrap()
    }

    #[test]
    fn test_no_comments() {
        assert_eq!(strip(r#"{"key": "value"}"#), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(
            strip(r#"{"key": "value"} // This is a comment"#),
            r#"{"key": "value"} "#
        );
    }

    #[test]
    fn test_line_comment_keeps_newline() {
        assert_eq!(
            strip("// Header comment\n{\"key\": \"value\"}"),
            "\n{\"key\": \"value\"}"
        );
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(
            strip(r#"{"key": /* inline comment */ "value"}"#),
            r#"{"key":  "value"}"#
        );
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        assert_eq!(
            strip("{\n  \"key\": /* this comment\n  spans multiple\n  lines */ \"value\"\n}"),
            "{\n  \"key\":  \"value\"\n}"
        );
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(
            strip(r#"{"key": /* outer /* inner */ still comment */ "value"}"#),
            r#"{"key":  "value"}"#
        );
    }

    #[test]
    fn test_strings_preserved_verbatim() {
        let input = r#"{"key": "This is not a // comment", "other": "Not /* a comment */ either"}"#;
        assert_eq!(strip(input), input);
    }

    #[test]
    fn test_url_in_string() {
        let input = r#"{"url": "https://example.com/path"}"#;
        assert_eq!(strip(input), input);
    }

    #[test]
    fn test_escaped_quotes_in_string() {
        let input = r#"{"key": "value with \"quotes\" inside // not a comment"}"#;
        assert_eq!(strip(input), input);
    }

    #[test]
    fn test_escaped_backslashes_before_comment() {
        assert_eq!(
            strip(r#"{"path": "C:\\Windows\\System32"} // Comment"#),
            r#"{"path": "C:\\Windows\\System32"} "#
        );
    }

    #[test]
    fn test_output_parses_as_json() {
        let input = r#"{
  "key1": "value1", // End of line comment
  /* Block comment */
  "key2": {
    // Nested comment
    "nested": "value" /* inline */
  }
}"#;
        let stripped = strip_comments(input.as_bytes());
        let value: serde_json::Value = serde_json::from_slice(&stripped).unwrap();
        assert_eq!(value["key2"]["nested"], "value");
    }

    #[test]
    fn test_lone_slash_is_kept() {
        // A division-like slash that is not followed by another slash or star.
        assert_eq!(strip(r#"{"key": "a"} /"#), r#"{"key": "a"} /"#);
    }
}
