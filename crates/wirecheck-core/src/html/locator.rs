//! Maps tokenizer output back to source lines.
//!
//! The tokenizer reports the line it is on when a token is emitted, which for
//! a tag spread over several lines is the line of its closing `>`. The locator
//! walks a cursor through the source in step with the token stream and
//! reports the line of each tag's opening `<` instead.

pub(crate) struct SourceLocator {
    lower: String,
    line_starts: Vec<usize>,
    cursor: usize,
}

impl SourceLocator {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            lower: source.to_ascii_lowercase(),
            line_starts,
            cursor: 0,
        }
    }

    pub fn line_count(&self) -> usize {
        let trailing_newline = self.lower.ends_with('\n');
        match self.line_starts.len() {
            1 if self.lower.is_empty() => 0,
            n if trailing_newline => n - 1,
            n => n,
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset).max(1)
    }

    /// Line of the start tag `name` the tokenizer just emitted on `token_line`.
    pub fn start_tag(&mut self, name: &str, token_line: usize) -> usize {
        let needle = format!("<{}", name);
        self.advance_to_tag(&needle, token_line)
            .unwrap_or(token_line)
    }

    pub fn end_tag(&mut self, name: &str, token_line: usize) {
        let needle = format!("</{}", name);
        self.advance_to_tag(&needle, token_line);
    }

    pub fn comment(&mut self, token_line: usize) {
        let Some(start) = self.lower[self.cursor..].find("<!--").map(|p| p + self.cursor) else {
            return;
        };
        if self.line_at(start) > token_line {
            return;
        }
        self.cursor = match self.lower[start + 4..].find("-->") {
            Some(end) => start + 4 + end + 3,
            None => self.lower.len(),
        };
    }

    fn advance_to_tag(&mut self, needle: &str, token_line: usize) -> Option<usize> {
        let position = self.find_tag(needle)?;
        let line = self.line_at(position);
        if line > token_line {
            return None;
        }
        self.cursor = position + needle.len();
        Some(line)
    }

    fn find_tag(&self, needle: &str) -> Option<usize> {
        let bytes = self.lower.as_bytes();
        let mut from = self.cursor;

        while let Some(found) = self.lower.get(from..)?.find(needle) {
            let position = from + found;
            let after = position + needle.len();
            match bytes.get(after) {
                None => return Some(position),
                Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {
                    return Some(position);
                }
                Some(_) => from = position + 1,
            }
        }
        None
    }
}
