//! Line-level helpers for the Codex config patcher.
//!
//! The patcher treats a document as a flat list of lines. These helpers take
//! care of the framing around that list: a leading byte-order mark, the
//! newline convention, and the boundary between the root region and the first
//! `[table]` header.

const BOM: char = '\u{FEFF}';

/// Split a leading byte-order mark off `content`.
///
/// Returns the BOM (empty if there was none) and the remainder. Callers
/// re-prepend the first half to whatever they produce.
pub fn strip_bom(content: &str) -> (&str, &str) {
    match content.strip_prefix(BOM) {
        Some(rest) => (&content[..BOM.len_utf8()], rest),
        None => ("", content),
    }
}

/// `"\r\n"` if the content uses it anywhere, otherwise `"\n"`.
pub fn detect_newline(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Split content into lines, dropping a single trailing terminator.
///
/// Empty content yields no lines at all, so that joining them back produces
/// the empty string rather than a lone newline.
pub fn split_lines(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n");
    let normalized = normalized.strip_suffix('\n').unwrap_or(&normalized);
    if normalized.is_empty() {
        return Vec::new();
    }
    normalized.split('\n').map(str::to_string).collect()
}

/// Join lines with `newline`, always ending with exactly one terminator.
pub fn join_lines(lines: &[String], newline: &str) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join(newline);
    out.push_str(newline);
    out
}

/// Index of the first `[table]` header, or `lines.len()` if there is none.
///
/// Blank and comment-only lines are skipped. Everything before the returned
/// index belongs to the root table.
pub fn first_table_index(lines: &[String]) -> usize {
    lines
        .iter()
        .position(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#') && trimmed.starts_with('[')
        })
        .unwrap_or(lines.len())
}

/// Drop blank lines from the start of `lines`.
pub fn trim_leading_blank_lines(lines: &mut Vec<String>) {
    let blank = lines
        .iter()
        .take_while(|line| line.trim().is_empty())
        .count();
    lines.drain(..blank);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strip_bom_splits_prefix() {
        let (bom, rest) = strip_bom("\u{FEFF}model = \"o3\"\n");
        assert_eq!(bom, "\u{FEFF}");
        assert_eq!(rest, "model = \"o3\"\n");
    }

    #[test]
    fn strip_bom_without_bom() {
        let (bom, rest) = strip_bom("model = \"o3\"\n");
        assert_eq!(bom, "");
        assert_eq!(rest, "model = \"o3\"\n");
    }

    #[test]
    fn detect_newline_prefers_crlf_when_present() {
        assert_eq!(detect_newline("a = 1\r\nb = 2\r\n"), "\r\n");
        assert_eq!(detect_newline("a = 1\nb = 2\r\n"), "\r\n");
        assert_eq!(detect_newline("a = 1\nb = 2\n"), "\n");
        assert_eq!(detect_newline(""), "\n");
    }

    #[test]
    fn split_empty_content_has_no_lines() {
        assert!(split_lines("").is_empty());
        assert!(split_lines("\n").is_empty());
    }

    #[test]
    fn split_drops_one_trailing_newline() {
        assert_eq!(split_lines("a\nb\n"), owned(&["a", "b"]));
        assert_eq!(split_lines("a\nb"), owned(&["a", "b"]));
        assert_eq!(split_lines("a\n\n"), owned(&["a", ""]));
    }

    #[test]
    fn split_normalizes_crlf() {
        assert_eq!(split_lines("a\r\nb\r\n"), owned(&["a", "b"]));
    }

    #[test]
    fn join_appends_single_terminator() {
        assert_eq!(join_lines(&owned(&["a", "b"]), "\n"), "a\nb\n");
        assert_eq!(join_lines(&owned(&["a", "b"]), "\r\n"), "a\r\nb\r\n");
        assert_eq!(join_lines(&[], "\n"), "");
    }

    #[test]
    fn first_table_skips_comments_and_blanks() {
        let lines = owned(&["# [not a table]", "", "model = \"o3\"", "[tools]", "x = 1"]);
        assert_eq!(first_table_index(&lines), 3);
    }

    #[test]
    fn first_table_is_len_without_tables() {
        let lines = owned(&["model = \"o3\"", "notify = [\"a\"]"]);
        assert_eq!(first_table_index(&lines), 2);
    }

    #[test]
    fn first_table_ignores_brackets_in_values() {
        let lines = owned(&["x = \"[abc\"", "y = [1]", "notify = [", "  \"a\",", "]", "[tools]"]);
        assert_eq!(first_table_index(&lines), 5);
    }

    #[test]
    fn first_table_accepts_indented_and_array_headers() {
        let lines = owned(&["model = \"o3\"", "  [[profiles]]", "name = \"x\""]);
        assert_eq!(first_table_index(&lines), 1);
    }

    #[test]
    fn first_table_at_start() {
        let lines = owned(&["[model_providers.openai]", "name = \"OpenAI\""]);
        assert_eq!(first_table_index(&lines), 0);
    }

    #[test]
    fn trim_leading_blanks() {
        let mut lines = owned(&["", "  ", "[tools]", ""]);
        trim_leading_blank_lines(&mut lines);
        assert_eq!(lines, owned(&["[tools]", ""]));
    }
}
