//! Line-oriented markdown conversion.
//!
//! Each input line becomes exactly one [`Block`]; there is no multi-line
//! block detection. Inline formatting is a separate step that splits a line
//! into [`Span`]s. Rendering to HTML lives in `lectern-report`.

use serde::{Deserialize, Serialize};

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Span {
    Text(String),
    Strong(String),
    /// Italic run; bold may appear inside it.
    Emphasis(Vec<Span>),
}

impl Span {
    /// Text content without markup.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain(&mut out);
        out
    }

    fn push_plain(&self, out: &mut String) {
        match self {
            Span::Text(s) | Span::Strong(s) => out.push_str(s),
            Span::Emphasis(children) => children.iter().for_each(|c| c.push_plain(out)),
        }
    }
}

/// One converted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// `#`, `##` or `###` heading; `slug` is the trimmed heading text.
    Heading {
        level: u8,
        slug: String,
        content: Vec<Span>,
    },
    /// `---`
    Rule,
    /// A blank line.
    Spacer,
    /// Any other line.
    Paragraph {
        content: Vec<Span>,
        /// The line ended in two whitespace characters.
        line_break: bool,
    },
}

impl Block {
    /// Text content without markup, empty for rules and spacers.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { content, .. } | Block::Paragraph { content, .. } => {
                let mut out = String::new();
                content.iter().for_each(|span| span.push_plain(&mut out));
                out
            }
            Block::Rule | Block::Spacer => String::new(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }
}

/// Convert a whole document.
///
/// Lines are split on `\n` with an optional preceding `\r`, so a trailing
/// newline yields a final spacer.
pub fn parse(markdown: &str) -> Vec<Block> {
    markdown
        .split('\n')
        .map(|line| parse_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// Convert a single line.
pub fn parse_line(line: &str) -> Block {
    if let Some((level, text)) = heading(line) {
        return Block::Heading {
            level,
            slug: text.to_string(),
            content: format_inline(text),
        };
    }

    if let Some(rest) = line.strip_prefix("---") {
        if rest.chars().all(char::is_whitespace) {
            return Block::Rule;
        }
    }

    if line.trim().is_empty() {
        return Block::Spacer;
    }

    let (body, line_break) = strip_hard_break(line);
    Block::Paragraph {
        content: format_inline(body),
        line_break,
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    const MARKERS: [&str; 3] = ["###", "##", "#"];
    MARKERS.iter().find_map(|marker| {
        let rest = line.strip_prefix(marker)?;
        rest.starts_with(char::is_whitespace)
            .then(|| (marker.len() as u8, rest.trim()))
    })
}

fn strip_hard_break(line: &str) -> (&str, bool) {
    let mut tail = line.char_indices().rev().take(2);
    match (tail.next(), tail.next()) {
        (Some((_, a)), Some((start, b))) if a.is_whitespace() && b.is_whitespace() => {
            (&line[..start], true)
        }
        _ => (line, false),
    }
}

/// Split a line into plain, bold and italic runs.
///
/// Bold (`**text**`) is applied first. Italic (`*text*`) then runs over the
/// whole line, so an italic run may enclose bold ones. An italic only opens
/// at the start of the line or after a character that is not an ASCII word
/// character; the end of a bold run counts as such a character.
pub fn format_inline(text: &str) -> Vec<Span> {
    split_emphasis(&split_strong(text))
}

/// A plain character or a whole bold run.
enum Token {
    Char(char),
    Strong(String),
}

fn is_star(token: &Token) -> bool {
    matches!(token, Token::Char('*'))
}

fn split_strong(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '*' && chars.get(i + 1) == Some(&'*') {
            if let Some(close) = find_star(&chars, i + 2) {
                if close > i + 2 && chars.get(close + 1) == Some(&'*') {
                    out.push(Token::Strong(chars[i + 2..close].iter().collect()));
                    i = close + 2;
                    continue;
                }
            }
        }
        out.push(Token::Char(chars[i]));
        i += 1;
    }
    out
}

fn split_emphasis(tokens: &[Token]) -> Vec<Span> {
    let mut out = Vec::new();
    let mut i = 0;
    // Tokens before this index belong to an earlier match.
    let mut consumed = 0;

    while i < tokens.len() {
        if is_star(&tokens[i]) && can_open(tokens, i, consumed) {
            let close = tokens[i + 1..].iter().position(is_star).map(|p| p + i + 1);
            if let Some(close) = close.filter(|close| *close > i + 1) {
                let mut children = Vec::new();
                tokens[i + 1..close]
                    .iter()
                    .for_each(|t| push_token(t, &mut children));
                out.push(Span::Emphasis(children));
                i = close + 1;
                consumed = i;
                continue;
            }
        }
        push_token(&tokens[i], &mut out);
        i += 1;
    }
    out
}

fn can_open(tokens: &[Token], i: usize, consumed: usize) -> bool {
    if i == 0 {
        return true;
    }
    i > consumed
        && match &tokens[i - 1] {
            Token::Char(c) => !is_word_char(*c),
            Token::Strong(_) => true,
        }
}

fn push_token(token: &Token, out: &mut Vec<Span>) {
    match token {
        Token::Char(c) => match out.last_mut() {
            Some(Span::Text(text)) => text.push(*c),
            _ => out.push(Span::Text(c.to_string())),
        },
        Token::Strong(text) => out.push(Span::Strong(text.clone())),
    }
}

fn find_star(chars: &[char], from: usize) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|c| *c == '*')
        .map(|p| p + from)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Span {
        Span::Text(s.into())
    }

    fn em(children: &[Span]) -> Span {
        Span::Emphasis(children.to_vec())
    }

    #[test]
    fn title_spacer_and_bold_paragraph() {
        let blocks = parse("# Title\n\nBody **bold** text");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    slug: "Title".into(),
                    content: vec![text("Title")],
                },
                Block::Spacer,
                Block::Paragraph {
                    content: vec![text("Body "), Span::Strong("bold".into()), text(" text")],
                    line_break: false,
                },
            ]
        );
    }

    #[test]
    fn heading_levels() {
        assert!(matches!(parse_line("### Three"), Block::Heading { level: 3, .. }));
        assert!(matches!(parse_line("## Two"), Block::Heading { level: 2, .. }));
        assert!(matches!(parse_line("#\tOne"), Block::Heading { level: 1, .. }));
        assert!(matches!(parse_line("#### Four"), Block::Paragraph { .. }));
        assert!(matches!(parse_line("#NoSpace"), Block::Paragraph { .. }));
    }

    #[test]
    fn heading_slug_is_trimmed_text() {
        match parse_line("##   第一课 得救  ") {
            Block::Heading { slug, .. } => assert_eq!(slug, "第一课 得救"),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn heading_keeps_markup_in_slug() {
        match parse_line("# The **key** verse") {
            Block::Heading { slug, content, .. } => {
                assert_eq!(slug, "The **key** verse");
                assert_eq!(content[1], Span::Strong("key".into()));
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn rules_and_spacers() {
        assert_eq!(parse_line("---"), Block::Rule);
        assert_eq!(parse_line("---   "), Block::Rule);
        assert!(matches!(parse_line("----"), Block::Paragraph { .. }));
        assert_eq!(parse_line(""), Block::Spacer);
        assert_eq!(parse_line("   \t"), Block::Spacer);
    }

    #[test]
    fn trailing_double_space_is_line_break() {
        assert_eq!(
            parse_line("first line  "),
            Block::Paragraph {
                content: vec![text("first line")],
                line_break: true,
            }
        );
        assert_eq!(
            parse_line("three   "),
            Block::Paragraph {
                content: vec![text("three ")],
                line_break: true,
            }
        );
        assert!(matches!(
            parse_line("single "),
            Block::Paragraph { line_break: false, .. }
        ));
    }

    #[test]
    fn crlf_lines_and_trailing_newline() {
        let blocks = parse("a\r\nb\n");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].plain_text(), "a");
        assert_eq!(blocks[2], Block::Spacer);
    }

    #[test]
    fn italic_needs_non_word_before() {
        assert_eq!(
            format_inline("an *emphasised* word"),
            vec![text("an "), em(&[text("emphasised")]), text(" word")]
        );
        assert_eq!(format_inline("*start*"), vec![em(&[text("start")])]);
        assert_eq!(format_inline("a*b*c"), vec![text("a*b*c")]);
        // CJK characters are not ASCII word characters
        assert_eq!(
            format_inline("神*爱*人"),
            vec![text("神"), em(&[text("爱")]), text("人")]
        );
    }

    #[test]
    fn bold_before_italic() {
        assert_eq!(
            format_inline("**b** and *i*"),
            vec![
                Span::Strong("b".into()),
                text(" and "),
                em(&[text("i")])
            ]
        );
        assert_eq!(format_inline("**unclosed"), vec![text("**unclosed")]);
        assert_eq!(format_inline("****"), vec![text("****")]);
    }

    #[test]
    fn italic_cannot_reuse_consumed_delimiter() {
        assert_eq!(
            format_inline("*a**b*"),
            vec![em(&[text("a")]), text("*b*")]
        );
    }

    #[test]
    fn italic_can_enclose_bold() {
        assert_eq!(
            format_inline("*a **b** c*"),
            vec![em(&[text("a "), Span::Strong("b".into()), text(" c")])]
        );
        assert_eq!(
            format_inline("***a***"),
            vec![em(&[Span::Strong("a".into())])]
        );
        assert_eq!(
            format_inline("see *the **key** verse* here"),
            vec![
                text("see "),
                em(&[text("the "), Span::Strong("key".into()), text(" verse")]),
                text(" here"),
            ]
        );
    }

    #[test]
    fn italic_may_open_right_after_bold() {
        assert_eq!(
            format_inline("**b***i*"),
            vec![Span::Strong("b".into()), em(&[text("i")])]
        );
    }

    #[test]
    fn plain_text_drops_markup() {
        let block = parse_line("Body **bold** and *it*");
        assert_eq!(block.plain_text(), "Body bold and it");
        assert_eq!(Block::Rule.plain_text(), "");
        assert_eq!(parse_line("*a **b** c*").plain_text(), "a b c");
        assert!(!block.is_heading());
    }
}
