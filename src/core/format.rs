//! Splits chat messages into plain text and fenced code blocks.
//!
//! A message is cut on every "```" marker. Pieces alternate between plain
//! text and code, starting with plain text, so an unterminated fence turns
//! the rest of the message into a code block. Code blocks may open with a
//! bare-word language hint on their first line (```` ```rust ````), which is
//! stripped from the content and passed to the [`Highlighter`].

use memchr::memmem;
use tracing::trace;

use crate::core::highlight::{Highlighter, Markup};

pub const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain { content: String },
    Code(CodeBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language hint from the fence line, if any.
    pub language: Option<String>,
    /// Code text with the hint line removed. This is what gets copied.
    pub content: String,
    /// Highlighter output for `content`.
    pub markup: Markup,
    /// Text removed from the start of the block: `"<hint>\n"`, a lone line
    /// break, or nothing.
    info_line: String,
}

impl CodeBlock {
    pub fn info_line(&self) -> &str {
        &self.info_line
    }
}

impl Segment {
    pub fn plain(content: impl Into<String>) -> Self {
        Segment::Plain {
            content: content.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code(_))
    }

    /// Raw text of the segment, without fences or hint line.
    pub fn raw_text(&self) -> &str {
        match self {
            Segment::Plain { content } => content,
            Segment::Code(block) => &block.content,
        }
    }

    /// Lines of a plain segment, split on every line break.
    ///
    /// Unlike [`str::lines`], a trailing break yields a trailing empty line,
    /// so each break in the source becomes one visual line break.
    pub fn lines(&self) -> Vec<&str> {
        self.raw_text().split('\n').collect()
    }

    pub fn as_code(&self) -> Option<&CodeBlock> {
        match self {
            Segment::Code(block) => Some(block),
            Segment::Plain { .. } => None,
        }
    }
}

/// Cut `message` on every fence marker. Always returns at least one piece.
pub fn split_fences(message: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for pos in memmem::find_iter(message.as_bytes(), FENCE.as_bytes()) {
        pieces.push(&message[start..pos]);
        start = pos + FENCE.len();
    }
    pieces.push(&message[start..]);
    pieces
}

/// Separate the language hint from a code piece.
///
/// Returns `(hint, stripped_prefix_len)`. A first line made only of word
/// characters is a hint; an empty first line is dropped without a hint; any
/// other first line belongs to the code.
fn split_info_line(piece: &str) -> (Option<&str>, usize) {
    let word_len = piece
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let rest = &piece[word_len..];
    let newline_len = if rest.starts_with('\n') {
        1
    } else if rest.starts_with("\r\n") {
        2
    } else {
        return (None, 0);
    };

    let hint = (word_len > 0).then(|| &piece[..word_len]);
    (hint, word_len + newline_len)
}

/// Language hint and remaining code for a code piece.
pub fn extract_language_hint(piece: &str) -> (Option<&str>, &str) {
    let (hint, prefix) = split_info_line(piece);
    (hint, &piece[prefix..])
}

fn code_block(piece: &str, highlighter: &dyn Highlighter) -> CodeBlock {
    let (hint, prefix) = split_info_line(piece);
    let content = &piece[prefix..];
    CodeBlock {
        language: hint.map(str::to_owned),
        content: content.to_owned(),
        markup: highlighter.highlight(content, hint),
        info_line: piece[..prefix].to_owned(),
    }
}

/// Format a message into plain and code segments.
///
/// Pure: the same input and highlighter always give the same segments.
pub fn format_message(message: &str, highlighter: &dyn Highlighter) -> Vec<Segment> {
    let pieces = split_fences(message);
    if pieces.len() % 2 == 0 {
        trace!(pieces = pieces.len(), "unterminated code fence");
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, piece)| {
            if index % 2 == 1 {
                Segment::Code(code_block(piece, highlighter))
            } else {
                Segment::plain(piece)
            }
        })
        .collect()
}

/// Rebuild the message text that produced `segments`.
pub fn reconstruct(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            out.push_str(FENCE);
        }
        match segment {
            Segment::Plain { content } => out.push_str(content),
            Segment::Code(block) => {
                out.push_str(&block.info_line);
                out.push_str(&block.content);
            }
        }
    }
    out
}

/// All code blocks in display order.
pub fn code_blocks(segments: &[Segment]) -> impl Iterator<Item = &CodeBlock> {
    segments.iter().filter_map(Segment::as_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::highlight::PlainHighlighter;

    fn format(message: &str) -> Vec<Segment> {
        format_message(message, &PlainHighlighter::new())
    }

    fn fence_count(message: &str) -> usize {
        memmem::find_iter(message.as_bytes(), FENCE.as_bytes()).count()
    }

    #[test]
    fn message_without_fences_is_one_plain_segment() {
        for input in ["hello", "multi\nline\n", "`inline` and ``double``", "   "] {
            let segments = format(input);
            assert_eq!(segments, vec![Segment::plain(input)]);
        }
    }

    #[test]
    fn empty_message_is_single_empty_plain_segment() {
        let segments = format("");
        assert_eq!(segments, vec![Segment::plain("")]);
        assert_eq!(segments[0].lines(), vec![""]);
    }

    #[test]
    fn even_fence_count_alternates_starting_and_ending_with_plain() {
        let inputs = [
            "a```b```c",
            "```x```",
            "one\n```py\nprint(1)\n```\ntwo\n```\nraw\n```\nthree",
            "``````",
        ];
        for input in inputs {
            let n = fence_count(input);
            assert_eq!(n % 2, 0, "{input:?}");
            let segments = format(input);
            assert_eq!(segments.len(), n + 1, "{input:?}");
            for (i, segment) in segments.iter().enumerate() {
                assert_eq!(segment.is_code(), i % 2 == 1, "{input:?} at {i}");
            }
        }
    }

    #[test]
    fn splits_text_and_hinted_block() {
        let segments = format("Hello\n```js\nconst x = 1;\n```\nBye");
        assert_eq!(segments.len(), 3);

        assert_eq!(segments[0].raw_text(), "Hello\n");
        assert_eq!(segments[0].lines(), vec!["Hello", ""]);

        let block = segments[1].as_code().expect("code block");
        assert_eq!(block.language.as_deref(), Some("js"));
        assert_eq!(block.content, "const x = 1;\n");
        assert_eq!(block.info_line(), "js\n");

        assert_eq!(segments[2].raw_text(), "\nBye");
        assert_eq!(segments[2].lines(), vec!["", "Bye"]);
    }

    #[test]
    fn block_without_hint_drops_blank_fence_line() {
        let segments = format("```\nplain code\n```");
        let block = segments[1].as_code().expect("code block");
        assert_eq!(block.language, None);
        assert_eq!(block.content, "plain code\n");
    }

    #[test]
    fn non_word_first_line_stays_in_code() {
        let segments = format("```c++\nint x;\n```");
        let block = segments[1].as_code().expect("code block");
        assert_eq!(block.language, None);
        assert_eq!(block.content, "c++\nint x;\n");

        let segments = format("```let x = 1;```");
        let block = segments[1].as_code().expect("code block");
        assert_eq!(block.language, None);
        assert_eq!(block.content, "let x = 1;");
    }

    #[test]
    fn hint_line_accepts_crlf() {
        let (hint, rest) = extract_language_hint("rust\r\nfn main() {}\r\n");
        assert_eq!(hint, Some("rust"));
        assert_eq!(rest, "fn main() {}\r\n");
    }

    #[test]
    fn hint_without_line_break_is_code() {
        let (hint, rest) = extract_language_hint("python");
        assert_eq!(hint, None);
        assert_eq!(rest, "python");
    }

    #[test]
    fn unterminated_fence_yields_trailing_code() {
        let segments = format("intro\n```rust\nfn main() {}\n");
        assert_eq!(segments.len(), 2);
        let block = segments[1].as_code().expect("code block");
        assert_eq!(block.language.as_deref(), Some("rust"));
        assert_eq!(block.content, "fn main() {}\n");
    }

    #[test]
    fn reconstruct_restores_input() {
        let inputs = [
            "",
            "plain",
            "Hello\n```js\nconst x = 1;\n```\nBye",
            "```\nplain code\n```",
            "```c++\nint x;\n``` tail ```open",
            "````",
        ];
        for input in inputs {
            assert_eq!(reconstruct(&format(input)), input);
        }
    }

    #[test]
    fn formatting_is_idempotent_through_reconstruction() {
        let input = "a\n```sh\necho hi\n```\nb\n```\nx\n```";
        let first = format(input);
        let second = format(&reconstruct(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn highlighter_receives_hint_and_stripped_content() {
        use std::cell::RefCell;

        struct Recording(RefCell<Vec<(String, Option<String>)>>);
        impl Highlighter for Recording {
            fn highlight(&self, code: &str, language: Option<&str>) -> Markup {
                self.0
                    .borrow_mut()
                    .push((code.to_string(), language.map(str::to_string)));
                Vec::new()
            }
        }

        let recorder = Recording(RefCell::new(Vec::new()));
        format_message("```go\nfunc f() {}\n```\n```\nx\n```", &recorder);
        let calls = recorder.0.into_inner();
        assert_eq!(
            calls,
            vec![
                ("func f() {}\n".to_string(), Some("go".to_string())),
                ("x\n".to_string(), None),
            ]
        );
    }

    #[test]
    fn code_blocks_lists_blocks_in_order() {
        let segments = format("```a\n1\n``` mid ```b\n2\n```");
        let langs: Vec<_> = code_blocks(&segments)
            .map(|b| b.language.clone().unwrap_or_default())
            .collect();
        assert_eq!(langs, vec!["a", "b"]);
    }

    #[test]
    fn split_fences_matches_naive_split() {
        assert_eq!(split_fences("a```b"), vec!["a", "b"]);
        assert_eq!(split_fences("````"), vec!["", "`"]);
        assert_eq!(split_fences("no fence"), vec!["no fence"]);
    }
}
