// ABOUTME: Document model for SSH client configuration files.
// ABOUTME: Parsed lines keep their source text so unmodified content renders byte-for-byte.

use std::fmt;

/// Indentation used for directives of blocks built in memory.
const INDENT: &str = "    ";

/// A whole `ssh_config` document.
///
/// Directives and comments before the first `Host`/`Match` line live in the
/// preamble. Comment and blank lines that trail a block are held apart from
/// it, so replacing a block leaves the separation in front of the next one
/// untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub(crate) preamble: Vec<Node>,
    pub(crate) hosts: Vec<Host>,
    /// `gaps[i]` holds the separator lines after `hosts[i]`; always the
    /// same length as `hosts`.
    pub(crate) gaps: Vec<Vec<Node>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines that precede the first block.
    pub fn preamble(&self) -> &[Node] {
        &self.preamble
    }

    /// All `Host` and `Match` blocks in document order.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Comment and blank lines between block `index` and the next block
    /// (or the end of the document).
    pub fn separators_after(&self, index: usize) -> &[Node] {
        self.gaps.get(index).map_or(&[], Vec::as_slice)
    }

    /// First `Host` block whose first pattern is exactly `pattern`.
    pub fn find_host(&self, pattern: &str) -> Option<&Host> {
        self.hosts
            .iter()
            .find(|host| host.kind == BlockKind::Host && host.first_pattern() == Some(pattern))
    }

    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.hosts.is_empty()
    }

    pub(crate) fn push_host(&mut self, host: Host) {
        self.hosts.push(host);
        self.gaps.push(Vec::new());
    }
}

/// Keyword that opened a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Host,
    Match,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Host => "Host",
            BlockKind::Match => "Match",
        }
    }
}

/// One `Host` (or `Match`) block and the lines under it.
#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub(crate) kind: BlockKind,
    pub(crate) patterns: Vec<String>,
    pub(crate) trailing_comment: Option<String>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) raw: Option<String>,
}

impl Host {
    /// A `Host` block with a single pattern and no directives.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Host,
            patterns: vec![pattern.into()],
            trailing_comment: None,
            nodes: Vec::new(),
            raw: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Comment rendered after the patterns on the header line.
    pub fn with_trailing_comment(mut self, comment: impl Into<String>) -> Self {
        self.trailing_comment = Some(comment.into());
        self
    }

    pub fn with_directive(mut self, directive: KeyValue) -> Self {
        self.nodes.push(Node::KeyValue(directive));
        self
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Patterns (for `Match`, the criteria words) in source order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// The pattern blocks are keyed by when merging.
    pub fn first_pattern(&self) -> Option<&str> {
        self.patterns.first().map(String::as_str)
    }

    pub fn trailing_comment(&self) -> Option<&str> {
        self.trailing_comment.as_deref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Directives of this block in order, skipping comments and blanks.
    pub fn directives(&self) -> impl Iterator<Item = &KeyValue> {
        self.nodes.iter().filter_map(|node| match node {
            Node::KeyValue(kv) => Some(kv),
            _ => None,
        })
    }

    /// Value of the first directive named `key`. Keys compare
    /// case-insensitively as they do in OpenSSH.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.directives()
            .find(|kv| kv.key.eq_ignore_ascii_case(key))
            .map(|kv| kv.value.as_str())
    }

    fn header(&self) -> String {
        let mut line = format!("{} {}", self.kind.as_str(), self.patterns.join(" "));
        if let Some(comment) = &self.trailing_comment {
            line.push_str(" # ");
            line.push_str(comment);
        }
        line
    }
}

/// A line inside the preamble or a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    KeyValue(KeyValue),
    Comment(Comment),
    Empty(Empty),
}

impl Node {
    /// Comment and blank lines, which separate blocks visually.
    pub fn is_separator(&self) -> bool {
        matches!(self, Node::Comment(_) | Node::Empty(_))
    }

    fn raw(&self) -> Option<&str> {
        match self {
            Node::KeyValue(kv) => kv.raw.as_deref(),
            Node::Comment(c) => c.raw.as_deref(),
            Node::Empty(e) => e.raw.as_deref(),
        }
    }

    fn render(&self, indent: &str) -> String {
        match self {
            Node::KeyValue(kv) => {
                let mut line = format!("{indent}{} {}", kv.key, kv.value);
                if let Some(comment) = &kv.comment {
                    line.push_str(" # ");
                    line.push_str(comment);
                }
                line
            }
            Node::Comment(c) => format!("{indent}# {}", c.text),
            Node::Empty(_) => String::new(),
        }
    }
}

/// A `Key Value` directive with an optional end-of-line comment.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) comment: Option<String>,
    pub(crate) raw: Option<String>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: None,
            raw: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// A full-line `#` comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub(crate) text: String,
    pub(crate) raw: Option<String>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            raw: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A blank (or whitespace-only) line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Empty {
    pub(crate) raw: Option<String>,
}

impl Empty {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Renderer::default();
        for node in &self.preamble {
            out.node(node, "");
        }
        for (index, host) in self.hosts.iter().enumerate() {
            match &host.raw {
                Some(raw) => out.raw(raw),
                None => {
                    out.separate();
                    out.line(&host.header());
                }
            }
            for node in &host.nodes {
                out.node(node, INDENT);
            }
            for node in self.separators_after(index) {
                out.node(node, "");
            }
        }
        f.write_str(&out.buf)
    }
}

#[derive(Default)]
struct Renderer {
    buf: String,
}

impl Renderer {
    fn node(&mut self, node: &Node, indent: &str) {
        match node.raw() {
            Some(raw) => self.raw(raw),
            None => self.line(&node.render(indent)),
        }
    }

    /// Source text, which already carries its own line ending (except
    /// possibly the last line of the file).
    fn raw(&mut self, text: &str) {
        self.terminate();
        self.buf.push_str(text);
    }

    fn line(&mut self, text: &str) {
        self.terminate();
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn terminate(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with('\n') {
            self.buf.push('\n');
        }
    }

    /// Ensure a blank line precedes the next block when there is content above it.
    fn separate(&mut self) {
        self.terminate();
        if !self.buf.is_empty() && !ends_with_blank_line(&self.buf) {
            self.buf.push('\n');
        }
    }
}

fn ends_with_blank_line(buf: &str) -> bool {
    let body = buf.strip_suffix('\n').unwrap_or(buf);
    let body = body.strip_suffix('\r').unwrap_or(body);
    body.rsplit('\n')
        .next()
        .is_some_and(|last| last.trim().is_empty())
}
