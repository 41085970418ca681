//! Clean-up of raw LLM keyword replies.

/// Upper bound on suggested keywords returned to the client.
pub const MAX_KEYWORDS: usize = 6;

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '+' | '#' | '.' | '-')
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
///
/// "node.js" becomes "Node.Js" and "3d modeling" becomes "3D Modeling".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Splits a comma-separated reply into at most [`MAX_KEYWORDS`] distinct keywords.
///
/// Each entry is stripped of characters outside `[A-Za-z0-9 +#.-]`, trimmed
/// and title-cased. Empty entries are dropped; first occurrence wins.
pub fn postprocess_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let cleaned: String = part.chars().filter(|c| is_keyword_char(*c)).collect();
        let keyword = title_case(cleaned.trim());
        if keyword.is_empty() || keywords.contains(&keyword) {
            continue;
        }
        keywords.push(keyword);
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split_and_title_case() {
        assert_eq!(
            postprocess_keywords("rust, tokio ,  postgresql"),
            vec!["Rust", "Tokio", "Postgresql"]
        );
    }

    #[test]
    fn test_keeps_symbol_characters() {
        assert_eq!(
            postprocess_keywords("c++, C#, node.js, ci-cd"),
            vec!["C++", "C#", "Node.Js", "Ci-Cd"]
        );
    }

    #[test]
    fn test_strips_disallowed_characters() {
        assert_eq!(
            postprocess_keywords("1. *Docker*, \"AWS Lambda\"\n"),
            vec!["1. Docker", "Aws Lambda"]
        );
    }

    #[test]
    fn test_dedupes_after_cleaning() {
        assert_eq!(
            postprocess_keywords("SQL, sql, S*QL, Go"),
            vec!["Sql", "Go"]
        );
    }

    #[test]
    fn test_drops_empty_entries() {
        assert_eq!(postprocess_keywords(", ,!!, Rust,"), vec!["Rust"]);
        assert!(postprocess_keywords("").is_empty());
    }

    #[test]
    fn test_truncates_to_six() {
        let kws = postprocess_keywords("a, b, c, d, e, f, g, h");
        assert_eq!(kws.len(), MAX_KEYWORDS);
        assert_eq!(kws.last().map(String::as_str), Some("F"));
    }

    #[test]
    fn test_title_case_after_digits() {
        assert_eq!(title_case("3d modeling"), "3D Modeling");
        assert_eq!(title_case("MACHINE learning"), "Machine Learning");
    }
}
