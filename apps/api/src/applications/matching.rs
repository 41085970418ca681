//! Resume match scoring — PDF text extraction, normalization, and keyword overlap.
//!
//! Everything here is pure and infallible: a PDF that cannot be read yields
//! empty text, which scores 0 against any non-empty keyword list.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

/// Extracts text from raw PDF bytes and normalizes it.
pub fn extract_resume_text(pdf_bytes: &[u8]) -> String {
    normalize_text(&extract_pdf_text(pdf_bytes))
}

/// Concatenates the text of every page. Pages without text are skipped;
/// a document that fails to parse yields an empty string.
fn extract_pdf_text(pdf_bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed inputs
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));

    match result {
        Ok(Ok(pages)) => pages
            .into_iter()
            .filter(|page| !page.trim().is_empty())
            .collect::<Vec<_>>()
            .concat(),
        Ok(Err(e)) => {
            warn!("PDF extract error: {e}");
            String::new()
        }
        Err(_) => {
            warn!("PDF extract error: parser panicked");
            String::new()
        }
    }
}

/// Lowercases, drops everything outside `[a-z0-9\s]`, and collapses whitespace.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Percentage of `keywords` present in normalized `text`, rounded to two decimals.
///
/// Single words must match a whole token; keywords containing a space are
/// matched as substrings so phrases like "machine learning" work.
pub fn compute_match_score(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let tokens: HashSet<&str> = text.split_whitespace().collect();

    let matched = keywords
        .iter()
        .filter(|kw| {
            let kw = kw.to_lowercase();
            if kw.contains(' ') {
                text.contains(kw.as_str())
            } else {
                tokens.contains(kw.as_str())
            }
        })
        .count();

    // Exact ties (e.g. 1/32 = 3.125) round to even.
    let pct = matched as f64 / keywords.len() as f64 * 100.0;
    (pct * 100.0).round_ties_even() / 100.0
}

/// Minimal PDFs built in memory for extraction tests.
#[cfg(test)]
pub(crate) mod test_pdf {
    /// A PDF with one page per entry; an empty string gives a page with no text.
    pub fn with_pages(pages: &[&str]) -> Vec<u8> {
        let page_count = pages.len();
        // 1 catalog, 2 page tree, 3 font, then a (page, content) pair per page
        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", 4 + i * 2))
            .collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
                kids.join(" ")
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        for (i, text) in pages.iter().enumerate() {
            let content_id = 5 + i * 2;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
            ));
            let stream = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET")
            };
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reference_example_scores_sixty() {
        let text = "experienced java backend engineer with sql and docker";
        let score = compute_match_score(text, &kws(&["java", "python", "sql", "docker", "aws"]));
        assert_eq!(score, 60.0);
    }

    #[test]
    fn test_empty_keywords_score_zero() {
        assert_eq!(compute_match_score("anything at all", &[]), 0.0);
        assert_eq!(compute_match_score("", &[]), 0.0);
    }

    #[test]
    fn test_single_word_requires_whole_token() {
        let text = "javascript developer";
        assert_eq!(compute_match_score(text, &kws(&["java"])), 0.0);
        assert_eq!(compute_match_score(text, &kws(&["javascript"])), 100.0);
    }

    #[test]
    fn test_phrase_matches_by_substring() {
        let text = "worked on machine learning pipelines";
        assert_eq!(compute_match_score(text, &kws(&["machine learning"])), 100.0);
        assert_eq!(compute_match_score(text, &kws(&["deep learning"])), 0.0);
        assert_eq!(
            compute_match_score("machine and learning", &kws(&["machine learning"])),
            0.0
        );
    }

    #[test]
    fn test_keywords_are_lowercased() {
        assert_eq!(
            compute_match_score("rust and postgres", &kws(&["Rust", "POSTGRES"])),
            100.0
        );
    }

    #[test]
    fn test_score_rounds_to_two_decimals() {
        let score = compute_match_score("rust", &kws(&["rust", "go", "java"]));
        assert_eq!(score, 33.33);
        let score = compute_match_score("rust go", &kws(&["rust", "go", "java"]));
        assert_eq!(score, 66.67);
    }

    #[test]
    fn test_exact_tie_rounds_to_even() {
        let mut keywords = kws(&["rust"]);
        keywords.extend((0..31).map(|i| format!("k{i}x")));
        assert_eq!(compute_match_score("rust", &keywords), 3.12);

        // 3/8 = 37.5 needs no rounding at two decimals
        let keywords = kws(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        assert_eq!(compute_match_score("a b c", &keywords), 37.5);
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let cases: Vec<(&str, Vec<String>)> = vec![
            ("", kws(&["a"])),
            ("a a a a", kws(&["a", "a"])),
            ("x y z", kws(&["x y", "y z", "q"])),
        ];
        for (text, keywords) in cases {
            let score = compute_match_score(text, &keywords);
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn test_normalize_strips_and_collapses() {
        assert_eq!(
            normalize_text("  Senior C++ Engineer!\n\nNode.js,   SQL\t(5+ yrs)  "),
            "senior c engineer nodejs sql 5 yrs"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Hello,\nWorld!  ",
            "ÄÖÜ straße — café",
            "\t\tmixed\r\nline endings\n",
            "",
            "already normalized text 123",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_invalid_pdf_yields_empty_text() {
        assert_eq!(extract_resume_text(b"definitely not a pdf"), "");
        assert_eq!(extract_resume_text(&[]), "");
    }

    #[test]
    fn test_pages_are_concatenated_and_normalized() {
        let pdf = test_pdf::with_pages(&["Java developer", "", "SQL, Docker!"]);
        let text = extract_resume_text(&pdf);
        assert_eq!(text, "java developer sql docker");

        let score = compute_match_score(&text, &kws(&["java", "docker", "aws", "sql"]));
        assert_eq!(score, 75.0);
    }

    #[test]
    fn test_unreadable_resume_scores_zero() {
        let text = extract_resume_text(b"%PDF-1.4 truncated");
        assert_eq!(compute_match_score(&text, &kws(&["rust"])), 0.0);
    }
}
