// ABOUTME: Insert-or-replace of Host blocks keyed by their first pattern.
// ABOUTME: Also builds the Host block sshmint writes for a new identity.

use crate::model::{BlockKind, Config, Host, KeyValue};
use std::path::Path;

/// Comment attached to generated blocks and their `IdentityFile` line.
pub const ATTRIBUTION: &str = "Generated by sshmint";

/// Insert `host` into `config`, replacing the first `Host` block whose
/// first pattern equals `host`'s first pattern.
///
/// Patterns compare literally and case-sensitively; `Match` blocks are
/// never replaced. The stored block is `host` itself. Comment and blank
/// lines between the replaced block and the next one stay where they were.
/// Every other block is left as it was. Without a match the block is
/// appended.
pub fn add_or_replace(config: &mut Config, host: Host) {
    let Some(key) = host.first_pattern().map(str::to_owned) else {
        tracing::debug!("appending host block without patterns");
        config.push_host(host);
        return;
    };

    let position = config
        .hosts
        .iter()
        .position(|existing| existing.kind == BlockKind::Host && existing.first_pattern() == Some(key.as_str()));

    match position {
        Some(index) => {
            config.hosts[index] = host;
            tracing::debug!(pattern = %key, index, "replaced host block");
        }
        None => {
            config.push_host(host);
            tracing::debug!(pattern = %key, "appended host block");
        }
    }
}

/// Build the block sshmint writes for identity `name`.
///
/// Directives are emitted in a fixed order: `HostName`, `IdentitiesOnly`,
/// `IdentityFile`. The header and the `IdentityFile` line carry the
/// [`ATTRIBUTION`] comment.
pub fn generate_host(name: &str, host_name: &str, key_path: &Path) -> Host {
    Host::new(name)
        .with_trailing_comment(ATTRIBUTION)
        .with_directive(KeyValue::new("HostName", host_name))
        .with_directive(KeyValue::new("IdentitiesOnly", "yes"))
        .with_directive(
            KeyValue::new("IdentityFile", quote_value(&key_path.display().to_string()))
                .with_comment(ATTRIBUTION),
        )
}

/// ssh_config splits arguments on whitespace; quote values that contain it.
fn quote_value(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use insta::assert_snapshot;

    fn simple(pattern: &str, key: &str, value: &str) -> Host {
        Host::new(pattern).with_directive(KeyValue::new(key, value))
    }

    fn document(hosts: Vec<Host>) -> Config {
        let mut config = Config::new();
        for host in hosts {
            config.push_host(host);
        }
        config
    }

    #[test]
    fn test_generate_host_directives() {
        let host = generate_host("example", "example.com", Path::new("/home/u/.ssh/example"));

        assert_eq!(host.patterns(), ["example".to_string()]);
        assert_eq!(host.trailing_comment(), Some(ATTRIBUTION));
        assert_eq!(
            host.nodes(),
            [
                Node::KeyValue(KeyValue::new("HostName", "example.com")),
                Node::KeyValue(KeyValue::new("IdentitiesOnly", "yes")),
                Node::KeyValue(
                    KeyValue::new("IdentityFile", "/home/u/.ssh/example").with_comment(ATTRIBUTION)
                ),
            ]
        );
    }

    #[test]
    fn test_generate_host_renders() {
        let config = document(vec![generate_host(
            "example",
            "example.com",
            Path::new("/home/u/.ssh/example"),
        )]);

        assert_snapshot!(config.to_string(), @r"
        Host example # Generated by sshmint
            HostName example.com
            IdentitiesOnly yes
            IdentityFile /home/u/.ssh/example # Generated by sshmint
        ");
    }

    #[test]
    fn test_generate_host_quotes_paths_with_spaces() {
        let host = generate_host("x", "x", Path::new("/Users/Jo Doe/.ssh/x"));
        assert_eq!(host.get("IdentityFile"), Some("\"/Users/Jo Doe/.ssh/x\""));
    }

    #[test]
    fn test_add_appends_new_host() {
        let mut config = document(vec![
            simple("foo.local", "FakeKey", "value1"),
        ]);

        add_or_replace(&mut config, simple("test.local", "FakeKey", "value2"));

        assert_eq!(config.hosts().len(), 2);
        assert_eq!(config.hosts()[0], simple("foo.local", "FakeKey", "value1"));
        assert_eq!(config.hosts()[1], simple("test.local", "FakeKey", "value2"));
    }

    #[test]
    fn test_replace_existing_host() {
        let mut config = document(vec![Host::new("foo.local")
            .with_directive(KeyValue::new("FakeKey", "value1"))
            .with_directive(KeyValue::new("FakeKey2", "other"))]);

        add_or_replace(&mut config, simple("foo.local", "FakeKey", "value2"));

        assert_eq!(config.hosts().len(), 1);
        assert_eq!(config.hosts()[0], simple("foo.local", "FakeKey", "value2"));
    }

    #[test]
    fn test_replace_keeps_position_and_neighbours() {
        let mut config = document(vec![
            simple("a", "User", "1"),
            simple("example", "User", "old"),
            simple("c", "User", "3"),
        ]);

        add_or_replace(&mut config, simple("example", "User", "new"));

        let firsts: Vec<_> = config.hosts().iter().filter_map(Host::first_pattern).collect();
        assert_eq!(firsts, ["a", "example", "c"]);
        assert_eq!(config.hosts()[0], simple("a", "User", "1"));
        assert_eq!(config.hosts()[1].get("User"), Some("new"));
        assert_eq!(config.hosts()[2], simple("c", "User", "3"));
    }

    #[test]
    fn test_only_first_pattern_is_the_key() {
        let mut config = document(vec![Host::new("other").with_pattern("example")]);

        add_or_replace(&mut config, Host::new("example"));

        assert_eq!(config.hosts().len(), 2, "second pattern must not match");
    }

    #[test]
    fn test_pattern_match_is_case_sensitive() {
        let mut config = document(vec![Host::new("Example")]);
        add_or_replace(&mut config, Host::new("example"));
        assert_eq!(config.hosts().len(), 2);
    }

    #[test]
    fn test_only_first_duplicate_is_replaced() {
        let mut config = document(vec![
            simple("dup", "User", "1"),
            simple("dup", "User", "2"),
        ]);

        add_or_replace(&mut config, simple("dup", "User", "new"));

        assert_eq!(config.hosts()[0].get("User"), Some("new"));
        assert_eq!(config.hosts()[1].get("User"), Some("2"));
    }

    #[test]
    fn test_match_blocks_are_not_replaced() {
        let mut config = Config::parse("Match example\n  User m\n");
        add_or_replace(&mut config, Host::new("example"));

        assert_eq!(config.hosts().len(), 2);
        assert_eq!(config.hosts()[0].kind(), BlockKind::Match);
    }

    #[test]
    fn test_add_is_idempotent() {
        let host = generate_host("example", "example.com", Path::new("/k/example"));
        let mut config = Config::parse("Host a\n  User git\n");

        add_or_replace(&mut config, host.clone());
        let once = config.to_string();
        add_or_replace(&mut config, host.clone());
        assert_eq!(config.to_string(), once);

        let mut reparsed = Config::parse(&once);
        add_or_replace(&mut reparsed, host);
        assert_eq!(reparsed.to_string(), once);
    }

    #[test]
    fn test_replace_keeps_separators_outside_the_block() {
        let mut config = Config::parse("Host example\n  User old\n  Port 1\n\n# next host\nHost next\n");

        add_or_replace(&mut config, simple("example", "User", "new"));

        assert_eq!(config.hosts()[0], simple("example", "User", "new"));
        assert_eq!(config.separators_after(0).len(), 2);
        assert_eq!(
            config.to_string(),
            "Host example\n    User new\n\n# next host\nHost next\n"
        );
    }

    #[test]
    fn test_replaced_block_equals_latest_host() {
        let mut config = Config::parse("Host a\n  User x\n\n# b section\nHost b\n");
        let untouched = config.hosts()[1].clone();

        add_or_replace(&mut config, simple("a", "User", "y"));
        add_or_replace(&mut config, simple("a", "User", "y"));

        assert_eq!(config.hosts().len(), 2);
        assert_eq!(config.hosts()[0], simple("a", "User", "y"));
        assert_eq!(config.hosts()[1], untouched);
        assert_eq!(
            config.to_string(),
            "Host a\n    User y\n\n# b section\nHost b\n"
        );
    }

    #[test]
    fn test_merge_into_parsed_document() {
        let input = "\
# personal settings
Host github.com
  User git

Host example # old entry
  HostName old.example.com
  IdentityFile ~/.ssh/old

# work
Host *.corp
  ProxyJump bastion
";
        let mut config = Config::parse(input);
        add_or_replace(
            &mut config,
            generate_host("example", "example.com", Path::new("/home/u/.ssh/example")),
        );

        assert_snapshot!(config.to_string(), @r"
        # personal settings
        Host github.com
          User git

        Host example # Generated by sshmint
            HostName example.com
            IdentitiesOnly yes
            IdentityFile /home/u/.ssh/example # Generated by sshmint

        # work
        Host *.corp
          ProxyJump bastion
        ");
    }

    #[test]
    fn test_append_separates_from_previous_block() {
        let mut config = Config::parse("Host a\n  User git");
        add_or_replace(&mut config, Host::new("b"));
        assert_eq!(config.to_string(), "Host a\n  User git\n\nHost b\n");

        let mut spaced = Config::parse("Host a\n  User git\n\n");
        add_or_replace(&mut spaced, Host::new("b"));
        assert_eq!(spaced.to_string(), "Host a\n  User git\n\nHost b\n");

        let mut empty = Config::new();
        add_or_replace(&mut empty, Host::new("b"));
        assert_eq!(empty.to_string(), "Host b\n");
    }
}
