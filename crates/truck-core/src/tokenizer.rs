//! Line tokenizer.
//!
//! Splits a line into argument views on `SPACE TAB , : |`. Only byte offsets
//! are recorded; the span table is owned by the tokenizer and reused for
//! every line.

use smallvec::SmallVec;

/// Upper bound on arguments recorded per line. Extra arguments are dropped.
pub const LINE_MAX_ARGS: usize = 128;

/// Argument separator test shared with the keyword recogniser.
#[inline]
#[must_use]
pub const fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b',' | b':' | b'|')
}

/// Byte range of one argument inside the tokenized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArgSpan {
    pub start: usize,
    pub len: usize,
}

impl ArgSpan {
    #[inline]
    #[must_use]
    pub fn slice(self, line: &str) -> &str {
        &line[self.start..self.start + self.len]
    }
}

/// Reusable span table.
#[derive(Debug, Default)]
pub struct Tokenizer {
    spans: Vec<ArgSpan>,
}

impl Tokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            spans: Vec::with_capacity(LINE_MAX_ARGS),
        }
    }

    /// Tokenize `line`, replacing the previous span table. Returns the argument count.
    pub fn tokenize(&mut self, line: &str) -> usize {
        self.spans.clear();
        let bytes = line.as_bytes();
        let mut start: Option<usize> = None;
        for (i, &b) in bytes.iter().enumerate() {
            if self.spans.len() == LINE_MAX_ARGS {
                return self.spans.len();
            }
            match (start, is_separator(b)) {
                (None, false) => start = Some(i),
                (Some(s), true) => {
                    self.spans.push(ArgSpan { start: s, len: i - s });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            if self.spans.len() < LINE_MAX_ARGS {
                self.spans.push(ArgSpan {
                    start: s,
                    len: bytes.len() - s,
                });
            }
        }
        self.spans.len()
    }

    #[must_use]
    pub fn spans(&self) -> &[ArgSpan] {
        &self.spans
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Split on a single separator, trimming blanks around each field.
///
/// Used by the block parsers whose fields may contain the default separators
/// (`animators`, `AntiLockBrakes`, `TractionControl`, `add_animation`, ...).
/// Empty fields are dropped, like the legacy string splitter did.
#[must_use]
pub fn split_trimmed(text: &str, sep: char) -> SmallVec<[&str; 16]> {
    text.split(sep)
        .map(|f| f.trim_matches([' ', '\t']))
        .filter(|f| !f.is_empty())
        .collect()
}

/// Split on any blank (space/tab), dropping empty fields.
#[must_use]
pub fn split_blank(text: &str) -> SmallVec<[&str; 16]> {
    text.split([' ', '\t']).filter(|f| !f.is_empty()).collect()
}

/// Cut a trailing comment: everything from the first `;`, or a `//` run
/// together with the blanks and slashes in front of it.
#[must_use]
pub fn trim_trailing_comment(line: &str) -> &str {
    if let Some(pos) = line.find(';') {
        return &line[..pos];
    }
    if let Some(pos) = line.find("//") {
        let bytes = line.as_bytes();
        let mut cut = pos;
        while cut > 0 && matches!(bytes[cut - 1], b'/' | b' ' | b'\t') {
            cut -= 1;
        }
        return &line[..cut];
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        let mut t = Tokenizer::new();
        t.tokenize(line);
        t.spans().iter().map(|s| s.slice(line).to_string()).collect()
    }

    #[test]
    fn splits_on_all_separators() {
        assert_eq!(args("1, 2:3|4\t5 6"), ["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn consecutive_separators_collapse() {
        assert_eq!(args(" ,, a ,:| b  "), ["a", "b"]);
    }

    #[test]
    fn empty_line_has_no_args() {
        let mut t = Tokenizer::new();
        assert_eq!(t.tokenize(""), 0);
        assert!(t.is_empty());
        assert_eq!(t.tokenize(" ,\t"), 0);
    }

    #[test]
    fn argument_count_is_bounded() {
        let line = "x ".repeat(LINE_MAX_ARGS + 20);
        let mut t = Tokenizer::new();
        assert_eq!(t.tokenize(&line), LINE_MAX_ARGS);
    }

    #[test]
    fn span_table_is_reused() {
        let mut t = Tokenizer::new();
        t.tokenize("a b c d");
        assert_eq!(t.len(), 4);
        t.tokenize("z");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn trailing_comments_are_cut() {
        assert_eq!(trim_trailing_comment("1, 2 ; note"), "1, 2 ");
        assert_eq!(trim_trailing_comment("1, 2 // note"), "1, 2");
        assert_eq!(trim_trailing_comment("1, 2 /// note"), "1, 2");
        assert_eq!(trim_trailing_comment("mesh/a.mesh"), "mesh/a.mesh");
    }

    #[test]
    fn split_helpers_trim_fields() {
        assert_eq!(split_trimmed(" a , b ,, c", ',').as_slice(), ["a", "b", "c"]);
        assert_eq!(split_blank("x  y\tz").as_slice(), ["x", "y", "z"]);
    }
}
