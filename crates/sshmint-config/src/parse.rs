// ABOUTME: Line-oriented parser for ssh_config documents.
// ABOUTME: Never fails; unrecognized lines are kept as opaque directives.

use crate::model::{BlockKind, Comment, Config, Empty, Host, KeyValue, Node};

impl Config {
    /// Parse a document. Rendering the result with `Display` reproduces
    /// `input` exactly.
    pub fn parse(input: &str) -> Self {
        let mut config = Config::new();

        for raw in input.split_inclusive('\n') {
            let content = raw.strip_suffix('\n').unwrap_or(raw);
            let content = content.strip_suffix('\r').unwrap_or(content);

            match parse_line(content, raw) {
                Line::Block(host) => {
                    detach_trailing_separators(&mut config);
                    config.push_host(host);
                }
                Line::Node(node) => match config.hosts.last_mut() {
                    Some(host) => host.nodes.push(node),
                    None => config.preamble.push(node),
                },
            }
        }
        detach_trailing_separators(&mut config);

        tracing::debug!(
            blocks = config.hosts.len(),
            preamble = config.preamble.len(),
            "parsed ssh config"
        );
        config
    }
}

/// Move the comment and blank lines ending the last block into its gap.
fn detach_trailing_separators(config: &mut Config) {
    if let (Some(host), Some(gap)) = (config.hosts.last_mut(), config.gaps.last_mut()) {
        let keep = host
            .nodes
            .iter()
            .rposition(|node| !node.is_separator())
            .map_or(0, |last| last + 1);
        *gap = host.nodes.split_off(keep);
    }
}

enum Line {
    Block(Host),
    Node(Node),
}

fn parse_line(content: &str, raw: &str) -> Line {
    let trimmed = content.trim();
    let raw = Some(raw.to_string());

    if trimmed.is_empty() {
        return Line::Node(Node::Empty(Empty { raw }));
    }
    if let Some(text) = trimmed.strip_prefix('#') {
        return Line::Node(Node::Comment(Comment {
            text: text.trim().to_string(),
            raw,
        }));
    }

    let (key, rest) = split_key(trimmed);
    let (value, comment) = split_comment(rest);

    let kind = if key.eq_ignore_ascii_case("Host") {
        Some(BlockKind::Host)
    } else if key.eq_ignore_ascii_case("Match") {
        Some(BlockKind::Match)
    } else {
        None
    };

    match kind {
        Some(kind) => Line::Block(Host {
            kind,
            patterns: value.split_whitespace().map(str::to_string).collect(),
            trailing_comment: comment,
            nodes: Vec::new(),
            raw,
        }),
        None => Line::Node(Node::KeyValue(KeyValue {
            key: key.to_string(),
            value: value.to_string(),
            comment,
            raw,
        })),
    }
}

/// Split `Key Value`, `Key=Value` or `Key = Value`.
fn split_key(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (key, rest) = line.split_at(end);

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
    (key, rest)
}

/// Split an end-of-line `# comment` off a value. A `#` only starts a
/// comment outside quotes and after whitespace.
fn split_comment(rest: &str) -> (&str, Option<String>) {
    let mut in_quotes = false;
    let mut prev_is_space = true;

    for (idx, c) in rest.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes && prev_is_space => {
                let comment = rest[idx + 1..].trim().to_string();
                return (rest[..idx].trim_end(), Some(comment));
            }
            _ => {}
        }
        prev_is_space = c.is_whitespace();
    }

    (rest.trim_end(), None)
}
