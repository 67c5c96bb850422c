use crate::FlashcardError;

/// Longest filename stem produced by [`sanitize_title`]
pub const MAX_STEM_LEN: usize = 200;

/// Turn a video title into a filesystem-safe filename stem
///
/// Keeps lowercase ASCII letters and digits, turns runs of spaces and
/// underscores into a single `_`, drops everything else and caps the result at
/// [`MAX_STEM_LEN`] characters. The output only ever contains `[a-z0-9_]`, so
/// feeding it back in returns it unchanged.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' => Some(c),
            ' ' | '_' => Some(' '),
            _ => None,
        })
        .collect();

    let mut stem = kept.split_whitespace().collect::<Vec<_>>().join("_");
    // ASCII only past this point, so byte truncation is char-safe
    stem.truncate(MAX_STEM_LEN);
    stem.trim_end_matches('_').to_string()
}

/// Parse the CSV delimiter given on the command line
///
/// Line breaks, the quote character and other control bytes (except tab)
/// would split or merge rows, so they are refused.
pub fn parse_delimiter(value: &str) -> Result<u8, FlashcardError> {
    let byte = match value.as_bytes() {
        _ if value == "\\t" => b'\t',
        [byte] => *byte,
        _ => return Err(invalid_delimiter(value, "The delimiter must be a single ASCII character, e.g. ',' or ';'")),
    };

    match byte {
        b'\t' => Ok(byte),
        b'"' => Err(invalid_delimiter(value, "The quote character '\"' cannot be used as delimiter")),
        b if b.is_ascii_control() => Err(invalid_delimiter(
            value,
            "Line breaks and control characters cannot be used as delimiter (tab is allowed)",
        )),
        b if b.is_ascii() => Ok(byte),
        _ => Err(invalid_delimiter(value, "The delimiter must be a single ASCII character, e.g. ',' or ';'")),
    }
}

fn invalid_delimiter(value: &str, hint: &str) -> FlashcardError {
    FlashcardError::InvalidConfiguration {
        setting: "delimiter",
        value: value.escape_debug().to_string(),
        hint: hint.to_string(),
    }
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title_basic() {
        assert_eq!(sanitize_title("Simple Title"), "simple_title");
        assert_eq!(sanitize_title("Title with UPPERCASE and 123"), "title_with_uppercase_and_123");
        assert_eq!(sanitize_title("  Title with spaces  "), "title_with_spaces");
        assert_eq!(sanitize_title("Title with special chars !@#$%^&*()"), "title_with_special_chars");
        assert_eq!(sanitize_title(&"A".repeat(250)), "a".repeat(200));
    }

    #[test]
    fn test_sanitize_title_edge_cases() {
        assert_eq!(sanitize_title(""), "");
        assert_eq!(sanitize_title("!!!"), "");
        assert_eq!(sanitize_title("   "), "");
        assert_eq!(sanitize_title("á é í"), "");
        assert_eq!(sanitize_title("tab\tand\nnewline"), "tabandnewline");
    }

    #[test]
    fn test_sanitize_title_language_transfer_video() {
        assert_eq!(
            sanitize_title("Complete Swahili Track 02: Language Transfer – The Thinking Method"),
            "complete_swahili_track_02_language_transfer_the_thinking_method"
        );
    }

    #[test]
    fn test_sanitize_title_is_idempotent() {
        let samples = [
            "Hello World!",
            "already_clean_title",
            "mixed _ separators__here",
            "Ünïcödé and ascii",
            "",
        ];
        for sample in samples {
            let once = sanitize_title(sample);
            assert_eq!(sanitize_title(&once), once, "input: {sample:?}");
        }

        // Truncation landing on a separator must not leave a trailing underscore
        let long = format!("{} tail", "a".repeat(199));
        let once = sanitize_title(&long);
        assert_eq!(once, "a".repeat(199));
        assert_eq!(sanitize_title(&once), once);
    }

    #[test]
    fn test_sanitize_title_charset_and_length() {
        let noisy = "Ça va? 100% -- Lesson #7 (Part 2) ".repeat(20);
        let out = sanitize_title(&noisy);
        assert!(out.len() <= MAX_STEM_LEN);
        assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(matches!(
            parse_delimiter(";;"),
            Err(FlashcardError::InvalidConfiguration { .. })
        ));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn test_parse_delimiter_rejects_row_breaking_bytes() {
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("|").unwrap(), b'|');

        for value in ["\n", "\r", "\"", "\u{0}", "\u{1}", "\u{1b}", "\u{7f}"] {
            match parse_delimiter(value) {
                Err(FlashcardError::InvalidConfiguration { setting, .. }) => assert_eq!(setting, "delimiter"),
                other => panic!("{value:?} should be rejected, got {other:?}"),
            }
        }

        let message = parse_delimiter("\n").unwrap_err().to_string();
        assert!(message.starts_with("Invalid delimiter '\\n'"), "{message}");
    }

    /// Deterministic pseudo-random titles around the truncation boundary
    fn generated_titles() -> Vec<String> {
        const ALPHABET: &[char] = &[
            'a', 'b', 'z', 'Q', 'X', '0', '7', '9', '_', '_', ' ', ' ', '\t', '-', '!', '.', ':', 'é', 'ß', '–',
        ];
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as usize
        };

        let mut titles = Vec::new();
        for len in 190..=215 {
            for _ in 0..40 {
                titles.push((0..len).map(|_| ALPHABET[next() % ALPHABET.len()]).collect());
            }
        }
        // Separators sitting exactly on the cut
        for pos in 195..=201 {
            for sep in ["_", " ", "__", " _ "] {
                titles.push(format!("{}{}{}", "a".repeat(pos), sep, "b".repeat(10)));
                titles.push(format!("{}{}{}", "Z9".repeat(pos / 2), sep, "tail"));
            }
        }
        titles
    }

    #[test]
    fn test_sanitize_title_properties_near_length_limit() {
        for title in generated_titles() {
            let once = sanitize_title(&title);

            assert!(once.len() <= MAX_STEM_LEN, "too long for {title:?}");
            assert!(
                once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "bad charset {once:?}"
            );
            assert!(!once.starts_with('_') && !once.ends_with('_'), "edge separator {once:?}");
            assert!(!once.contains("__"), "doubled separator {once:?}");
            assert_eq!(sanitize_title(&once), once, "not idempotent for {title:?}");
        }
    }
}
