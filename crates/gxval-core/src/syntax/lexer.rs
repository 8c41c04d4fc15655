//! Line scanner shared by the layout pre-check and the tree parser
//!
//! The scanner walks physical lines once, keeps a stack of open block
//! mappings and sequences, and turns the document into a flat token stream.
//! Everything that can be decided from indentation and punctuation alone is
//! rejected here, so the first error returned is the one with the lowest line.
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use super::error::{SyntaxError, SyntaxErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarStyle {
    Plain,
    Quoted,
    Flow,
    /// `|` or `>` content, already unfolded
    Block,
    /// `*name`; the text holds the anchor name
    Alias,
}

/// Scalar text as written, resolved by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScalarSource {
    pub text: String,
    pub style: ScalarStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `key:` with an optional value on the same line
    Entry {
        key: String,
        value: Option<ScalarSource>,
    },
    /// `-` sequence item marker; same-line content follows as its own token
    Dash,
    /// Scalar standing on its own (item content, nested value or root)
    Scalar(ScalarSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub line: usize,
    /// Column of the token's first character
    pub indent: usize,
    pub kind: TokenKind,
    /// `&name` attached to the entry's value or the item after a dash
    pub anchor: Option<String>,
}

/// Scan `text` into tokens, failing on the earliest layout violation
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut scanner = Scanner {
        lines: text.lines().collect(),
        next: 0,
        tokens: Vec::new(),
        blocks: Vec::new(),
        root_indent: None,
        open: Open::Nothing,
        ended: false,
    };
    scanner.run()?;
    if scanner.tokens.is_empty() {
        return Err(SyntaxError::empty_document());
    }
    Ok(scanner.tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Mapping,
    Sequence,
}

#[derive(Debug, Clone, Copy)]
struct Block {
    indent: usize,
    kind: BlockKind,
    /// `key:` followed by `- item` at the key's own column
    indentless: bool,
}

/// What the previous token leaves open for the following lines
#[derive(Debug, Clone, Copy)]
enum Open {
    Nothing,
    /// Entry or dash without inline content, awaiting a nested node
    Child { parent: usize, after_entry: bool },
    /// Plain scalar that deeper lines continue
    Plain { owner: Option<usize>, token: usize },
    /// Quoted, flow or block value; nothing may be nested under it
    Closed { owner: Option<usize> },
}

enum Tail {
    Plain,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Clip,
    Strip,
    Keep,
}

struct Scanner<'a> {
    lines: Vec<&'a str>,
    next: usize,
    tokens: Vec<Token>,
    blocks: Vec<Block>,
    root_indent: Option<usize>,
    open: Open,
    ended: bool,
}

impl<'a> Scanner<'a> {
    fn advance(&mut self) -> Option<(usize, &'a str)> {
        let raw = *self.lines.get(self.next)?;
        self.next += 1;
        Some((self.next, raw))
    }

    fn run(&mut self) -> Result<(), SyntaxError> {
        while let Some((line, raw)) = self.advance() {
            let (indent, content) = indentation(raw, line)?;
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            if indent == 0 && self.document_marker(line, content)? {
                continue;
            }
            if self.ended {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::Unparsable,
                    line,
                    "Content found after the document end marker '...'",
                )
                .with_suggestion("Remove the '...' marker or the content after it"));
            }
            self.line(line, indent, content)?;
        }
        Ok(())
    }

    fn document_marker(&mut self, line: usize, content: &str) -> Result<bool, SyntaxError> {
        if content == "---" || content.starts_with("--- ") {
            if !self.tokens.is_empty() || self.ended {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::Unparsable,
                    line,
                    "Multiple documents in one file are not supported",
                )
                .with_suggestion("Keep a single document per file"));
            }
            let rest = content[3..].trim();
            if rest.is_empty() || rest.starts_with('#') {
                return Ok(true);
            }
            return Err(SyntaxError::new(
                SyntaxErrorKind::Unparsable,
                line,
                "Content on the document start line is not supported",
            )
            .with_suggestion("Move the content below '---'"));
        }
        if content == "..." {
            self.ended = true;
            return Ok(true);
        }
        Ok(content.starts_with('%') && self.tokens.is_empty())
    }

    fn line(&mut self, line: usize, indent: usize, content: &'a str) -> Result<(), SyntaxError> {
        let pending = self.open;
        match pending {
            Open::Plain { owner, token } if deeper(indent, owner) => {
                if find_plain_colon(content).is_some() {
                    return Err(SyntaxError::mapping_values_not_allowed(line));
                }
                self.fold_continuation(token, strip_comment(content));
                return Ok(());
            }
            Open::Closed { owner: None } => return Err(after_root(line)),
            Open::Closed { owner } if deeper(indent, owner) => {
                if find_plain_colon(content).is_some() {
                    return Err(SyntaxError::mapping_values_not_allowed(line));
                }
                return Err(SyntaxError::new(
                    SyntaxErrorKind::Indentation,
                    line,
                    "Unexpected indentation after a complete value",
                )
                .with_suggestion("Align this line with the key above it or remove the extra indentation"));
            }
            _ => {}
        }

        let open = std::mem::replace(&mut self.open, Open::Nothing);
        if let Open::Child {
            parent,
            after_entry,
        } = open
        {
            if indent > parent {
                return self.node(line, indent, content, Some(parent));
            }
            if after_entry && indent == parent && is_dash(content) {
                self.blocks.push(Block {
                    indent,
                    kind: BlockKind::Sequence,
                    indentless: true,
                });
                return self.dash(line, indent, content);
            }
        }

        let Some(root) = self.root_indent else {
            self.root_indent = Some(indent);
            return self.node(line, indent, content, None);
        };
        if indent < root {
            return Err(SyntaxError::new(
                SyntaxErrorKind::Indentation,
                line,
                "Line is indented less than the start of the document",
            )
            .with_suggestion(format!("Indent this line to column {}", root + 1)));
        }

        while let Some(top) = self.blocks.last() {
            let closes =
                top.indent > indent || (top.indentless && top.indent == indent && !is_dash(content));
            if !closes {
                break;
            }
            self.blocks.pop();
        }
        let Some(top) = self.blocks.last().copied() else {
            return Err(after_root(line));
        };
        if top.indent != indent {
            return Err(SyntaxError::new(
                SyntaxErrorKind::Indentation,
                line,
                format!(
                    "Inconsistent indentation: line is indented {} spaces but its block uses {}",
                    indent, top.indent
                ),
            )
            .with_suggestion(format!(
                "Align this line with its siblings at column {}",
                top.indent + 1
            )));
        }

        match top.kind {
            BlockKind::Sequence if is_dash(content) => self.dash(line, indent, content),
            BlockKind::Sequence => Err(SyntaxError::new(
                SyntaxErrorKind::MappingSyntax,
                line,
                "Expected a '- ' sequence item",
            )
            .with_suggestion("Start the line with '- ' or indent it under the previous item")),
            BlockKind::Mapping => match split_entry(content, line)? {
                Some((key, rest)) => self.entry(line, indent, key, rest),
                None if is_dash(content) => Err(SyntaxError::new(
                    SyntaxErrorKind::MappingSyntax,
                    line,
                    "Sequence item found where a 'key: value' entry was expected",
                )
                .with_suggestion("Indent the sequence under its key")),
                None => Err(SyntaxError::new(
                    SyntaxErrorKind::MappingSyntax,
                    line,
                    format!("Expected 'key: value' but found '{}'", content),
                )
                .with_suggestion("Add ':' after the key name")),
            },
        }
    }

    /// Start a node at `col`, opening a new block when it is a collection
    fn node(
        &mut self,
        line: usize,
        col: usize,
        content: &'a str,
        owner: Option<usize>,
    ) -> Result<(), SyntaxError> {
        if is_dash(content) {
            self.blocks.push(Block {
                indent: col,
                kind: BlockKind::Sequence,
                indentless: false,
            });
            return self.dash(line, col, content);
        }
        if let Some((key, rest)) = split_entry(content, line)? {
            self.blocks.push(Block {
                indent: col,
                kind: BlockKind::Mapping,
                indentless: false,
            });
            return self.entry(line, col, key, rest);
        }
        self.scalar(line, col, content, owner)
    }

    fn dash(&mut self, line: usize, col: usize, content: &'a str) -> Result<(), SyntaxError> {
        let after = &content[1..];
        let (anchor, inner) = split_anchor(after.trim_start(), line)?;
        self.tokens.push(Token {
            line,
            indent: col,
            kind: TokenKind::Dash,
            anchor,
        });
        if inner.is_empty() || inner.starts_with('#') {
            self.open = Open::Child {
                parent: col,
                after_entry: false,
            };
            return Ok(());
        }
        let inner_col = col + 1 + (after.len() - inner.len());
        self.node(line, inner_col, inner, Some(col))
    }

    fn entry(
        &mut self,
        line: usize,
        col: usize,
        key: String,
        rest: &'a str,
    ) -> Result<(), SyntaxError> {
        let (anchor, rest) = split_anchor(rest.trim_start(), line)?;
        let index = self.tokens.len();
        self.tokens.push(Token {
            line,
            indent: col,
            kind: TokenKind::Entry { key, value: None },
            anchor,
        });
        if rest.is_empty() || rest.starts_with('#') {
            self.open = Open::Child {
                parent: col,
                after_entry: true,
            };
            return Ok(());
        }
        if is_dash(rest) {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MappingSyntax,
                line,
                "Sequence entries are not allowed on the same line as a key",
            )
            .with_suggestion("Move the '- ' item to the next line and indent it"));
        }
        let (source, tail) = self.value(line, rest, Some(col))?;
        if let TokenKind::Entry { value, .. } = &mut self.tokens[index].kind {
            *value = Some(source);
        }
        self.open = match tail {
            Tail::Plain => Open::Plain {
                owner: Some(col),
                token: index,
            },
            Tail::Closed => Open::Closed { owner: Some(col) },
        };
        Ok(())
    }

    fn scalar(
        &mut self,
        line: usize,
        col: usize,
        content: &'a str,
        owner: Option<usize>,
    ) -> Result<(), SyntaxError> {
        let (source, tail) = self.value(line, content, owner)?;
        let index = self.tokens.len();
        self.tokens.push(Token {
            line,
            indent: col,
            kind: TokenKind::Scalar(source),
            anchor: None,
        });
        self.open = match tail {
            Tail::Plain => Open::Plain {
                owner,
                token: index,
            },
            Tail::Closed => Open::Closed { owner },
        };
        Ok(())
    }

    fn value(
        &mut self,
        line: usize,
        text: &'a str,
        owner: Option<usize>,
    ) -> Result<(ScalarSource, Tail), SyntaxError> {
        match text.chars().next() {
            Some('|') | Some('>') => self.block_scalar(line, text, owner),
            Some('[') | Some('{') => self.flow(line, text),
            Some('*') => {
                let name = strip_comment(&text[1..]);
                if name.is_empty() || !name.chars().all(is_anchor_char) {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::Unparsable,
                        line,
                        format!("Invalid alias '{}'", strip_comment(text)),
                    )
                    .with_suggestion("An alias is '*' followed by the name of an anchor defined earlier with '&'"));
                }
                Ok((
                    ScalarSource {
                        text: name.to_string(),
                        style: ScalarStyle::Alias,
                    },
                    Tail::Closed,
                ))
            }
            Some(quote @ ('"' | '\'')) => {
                let end = quoted_end(text).ok_or_else(|| SyntaxError::unterminated_quote(line, quote))?;
                let trailing = text[end..].trim_start();
                if !trailing.is_empty() && !trailing.starts_with('#') {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::Unparsable,
                        line,
                        "Unexpected text after quoted value",
                    )
                    .with_suggestion("Quote the whole value"));
                }
                Ok((
                    ScalarSource {
                        text: text[..end].to_string(),
                        style: ScalarStyle::Quoted,
                    },
                    Tail::Closed,
                ))
            }
            Some(c @ ('@' | '`')) => Err(SyntaxError::new(
                SyntaxErrorKind::Unparsable,
                line,
                format!("A plain value cannot start with '{}'", c),
            )
            .with_suggestion("Quote the value")),
            _ => {
                let body = strip_comment(text);
                if find_plain_colon(body).is_some() {
                    return Err(SyntaxError::mapping_values_not_allowed(line));
                }
                Ok((
                    ScalarSource {
                        text: body.to_string(),
                        style: ScalarStyle::Plain,
                    },
                    Tail::Plain,
                ))
            }
        }
    }

    fn flow(&mut self, line: usize, text: &'a str) -> Result<(ScalarSource, Tail), SyntaxError> {
        let mut scanner = FlowScanner::default();
        let mut collected = String::new();
        let mut segment = text;
        let mut current = line;
        loop {
            let (used, closed) = scanner
                .feed(segment)
                .map_err(|message| SyntaxError::new(SyntaxErrorKind::Unparsable, current, message))?;
            collected.push_str(segment[..used].trim_end());
            if closed {
                let trailing = segment[used..].trim_start();
                if !trailing.is_empty() && !trailing.starts_with('#') {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::Unparsable,
                        current,
                        "Unexpected text after flow collection",
                    )
                    .with_suggestion("Remove the text after the closing bracket"));
                }
                return Ok((
                    ScalarSource {
                        text: collected,
                        style: ScalarStyle::Flow,
                    },
                    Tail::Closed,
                ));
            }
            let Some((next_line, raw)) = self.advance() else {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::Unterminated,
                    line,
                    format!("Unterminated flow collection: missing '{}'", scanner.expected_close()),
                )
                .with_suggestion(format!("Close the bracket opened on line {}", line)));
            };
            let (_, content) = indentation(raw, next_line)?;
            current = next_line;
            collected.push(' ');
            segment = content;
        }
    }

    fn block_scalar(
        &mut self,
        line: usize,
        text: &str,
        owner: Option<usize>,
    ) -> Result<(ScalarSource, Tail), SyntaxError> {
        let literal = text.starts_with('|');
        let header = strip_comment(&text[1..]).trim();
        let mut chomp = Chomp::Clip;
        let mut explicit: Option<usize> = None;
        for c in header.chars() {
            match c {
                '-' if chomp == Chomp::Clip => chomp = Chomp::Strip,
                '+' if chomp == Chomp::Clip => chomp = Chomp::Keep,
                '1'..='9' if explicit.is_none() => explicit = c.to_digit(10).map(|d| d as usize),
                _ => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::Unparsable,
                        line,
                        format!("Invalid block scalar header '{}'", text),
                    )
                    .with_suggestion("Use '|' or '>' optionally followed by '-', '+' or an indentation digit"))
                }
            }
        }

        let base = owner.map_or(0, |o| o + 1);
        let mut content_indent = explicit.map(|n| owner.unwrap_or(0) + n);
        let mut lines: Vec<String> = Vec::new();
        while let Some(raw) = self.lines.get(self.next).copied() {
            let (indent, body) = indentation(raw, self.next + 1)?;
            if body.is_empty() {
                lines.push(String::new());
                self.next += 1;
                continue;
            }
            let ci = match content_indent {
                Some(ci) => ci,
                None if indent >= base => {
                    content_indent = Some(indent);
                    indent
                }
                None => break,
            };
            if indent < ci {
                break;
            }
            lines.push(raw[ci..].trim_end().to_string());
            self.next += 1;
        }

        let trailing_blank = lines.iter().rev().take_while(|l| l.is_empty()).count();
        let body = &lines[..lines.len() - trailing_blank];
        let mut text = if literal {
            body.join("\n")
        } else {
            fold(body)
        };
        if chomp != Chomp::Strip && !body.is_empty() {
            text.push('\n');
        }
        if chomp == Chomp::Keep {
            text.extend(std::iter::repeat('\n').take(trailing_blank));
        }
        Ok((
            ScalarSource {
                text,
                style: ScalarStyle::Block,
            },
            Tail::Closed,
        ))
    }

    fn fold_continuation(&mut self, token: usize, text: &str) {
        if let Some(Token {
            kind: TokenKind::Entry {
                value: Some(source), ..
            }
            | TokenKind::Scalar(source),
            ..
        }) = self.tokens.get_mut(token)
        {
            source.text.push(' ');
            source.text.push_str(text);
        }
    }
}

fn after_root(line: usize) -> SyntaxError {
    SyntaxError::new(
        SyntaxErrorKind::Unparsable,
        line,
        "Unexpected content after the document root value",
    )
    .with_suggestion("A document holds a single root value; nest this line under a key")
}

/// Detach a leading `&name` anchor, returning it and the text after it
fn split_anchor(text: &str, line: usize) -> Result<(Option<String>, &str), SyntaxError> {
    let Some(body) = text.strip_prefix('&') else {
        return Ok((None, text));
    };
    let end = body.find(char::is_whitespace).unwrap_or(body.len());
    let name = &body[..end];
    if name.is_empty() || !name.chars().all(is_anchor_char) {
        return Err(SyntaxError::new(
            SyntaxErrorKind::Unparsable,
            line,
            format!("Invalid anchor '&{}'", name),
        )
        .with_suggestion("Name the anchor with letters, digits, '-' or '_', e.g. '&base'"));
    }
    Ok((Some(name.to_string()), body[end..].trim_start()))
}

fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}')
}

fn deeper(indent: usize, owner: Option<usize>) -> bool {
    owner.map_or(true, |o| indent > o)
}

/// Split a physical line into its indentation width and trimmed content
fn indentation(raw: &str, line: usize) -> Result<(usize, &str), SyntaxError> {
    let content = raw.trim_start_matches(|c| c == ' ' || c == '\t');
    let lead = &raw[..raw.len() - content.len()];
    if let Some(column) = lead.find('\t') {
        return Err(SyntaxError::tab(line, column + 1));
    }
    Ok((lead.len(), content.trim_end()))
}

fn is_dash(content: &str) -> bool {
    content == "-" || content.starts_with("- ") || content.starts_with("-\t")
}

/// Drop a trailing `# comment` (a `#` at the start or after whitespace)
fn strip_comment(text: &str) -> &str {
    let mut prev_ws = true;
    for (i, c) in text.char_indices() {
        if c == '#' && prev_ws {
            return text[..i].trim_end();
        }
        prev_ws = c.is_whitespace();
    }
    text.trim_end()
}

/// Byte offset of the first `:` that ends a plain key
fn find_plain_colon(text: &str) -> Option<usize> {
    let mut prev_ws = true;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '#' && prev_ws {
            return None;
        }
        if c == ':' && chars.peek().map_or(true, |(_, next)| next.is_whitespace()) {
            return Some(i);
        }
        prev_ws = c.is_whitespace();
    }
    None
}

/// Byte offset just past the closing quote of a quoted scalar at the start of `text`
fn quoted_end(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    let (_, quote) = chars.next()?;
    let mut escaped = false;
    while let Some((i, c)) = chars.next() {
        if quote == '"' {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return Some(i + 1);
            }
        } else if c == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                continue;
            }
            return Some(i + 1);
        }
    }
    None
}

/// Recognize `key: rest`, returning the unquoted key and the text after the colon
fn split_entry(content: &str, line: usize) -> Result<Option<(String, &str)>, SyntaxError> {
    match content.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let end = quoted_end(content).ok_or_else(|| SyntaxError::unterminated_quote(line, quote))?;
            let after = content[end..].trim_start();
            match after.strip_prefix(':') {
                Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                    let key = serde_yaml::from_str::<String>(&content[..end]).map_err(|e| {
                        SyntaxError::new(
                            SyntaxErrorKind::Unparsable,
                            line,
                            format!("Invalid quoted key: {}", e),
                        )
                    })?;
                    Ok(Some((key, rest)))
                }
                _ => Ok(None),
            }
        }
        Some('[') | Some('{') => Ok(None),
        Some('?') if content.len() == 1 || content[1..].starts_with(char::is_whitespace) => {
            Err(SyntaxError::new(
                SyntaxErrorKind::Unparsable,
                line,
                "Complex mapping keys ('? ') are not supported",
            )
            .with_suggestion("Use a plain 'key: value' entry"))
        }
        _ if is_dash(content) => Ok(None),
        _ => match find_plain_colon(content) {
            Some(0) => Err(SyntaxError::new(
                SyntaxErrorKind::MappingSyntax,
                line,
                "Missing key before ':'",
            )
            .with_suggestion("Add a key name before ':'")),
            Some(i) => Ok(Some((content[..i].trim_end().to_string(), &content[i + 1..]))),
            None => Ok(None),
        },
    }
}

/// Folded (`>`) block scalar line joining
fn fold(lines: &[String]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            let prev = &lines[i - 1];
            if line.is_empty() {
                out.push('\n');
            } else if prev.is_empty() {
                // the blank line already produced the break
            } else if line.starts_with(' ') || prev.starts_with(' ') {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
        out.push_str(line);
    }
    out
}

/// Bracket and quote tracker for flow collections spanning lines
#[derive(Debug, Default)]
struct FlowScanner {
    stack: Vec<char>,
    quote: Option<char>,
    escaped: bool,
    single_closed: bool,
    last: Option<char>,
}

impl FlowScanner {
    /// Consume one line of flow text; returns the bytes that belong to the
    /// collection and whether it closed
    fn feed(&mut self, segment: &str) -> Result<(usize, bool), String> {
        let mut prev_ws = true;
        for (i, c) in segment.char_indices() {
            if let Some(quote) = self.quote {
                if self.escaped {
                    self.escaped = false;
                } else if quote == '"' && c == '\\' {
                    self.escaped = true;
                } else if c == quote {
                    self.quote = None;
                    self.single_closed = quote == '\'';
                    self.last = Some(c);
                    prev_ws = false;
                }
                continue;
            }
            if self.single_closed && c == '\'' {
                self.single_closed = false;
                self.quote = Some('\'');
                continue;
            }
            self.single_closed = false;
            match c {
                '#' if prev_ws => return Ok((i, false)),
                '"' | '\'' if matches!(self.last, None | Some('[' | '{' | ',' | ':')) => {
                    self.quote = Some(c)
                }
                '[' | '{' => self.stack.push(c),
                ']' | '}' => {
                    let open = if c == ']' { '[' } else { '{' };
                    if self.stack.pop() != Some(open) {
                        return Err(format!("Unexpected '{}' in flow collection", c));
                    }
                    if self.stack.is_empty() {
                        return Ok((i + c.len_utf8(), true));
                    }
                }
                _ => {}
            }
            prev_ws = c.is_whitespace();
            if !prev_ws {
                self.last = Some(c);
            }
        }
        Ok((segment.len(), false))
    }

    fn expected_close(&self) -> char {
        if let Some(quote) = self.quote {
            return quote;
        }
        match self.stack.last() {
            Some('{') => '}',
            _ => ']',
        }
    }
}
