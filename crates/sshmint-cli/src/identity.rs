// ABOUTME: Default public key comment derived from the local user and host.
// ABOUTME: Produces `<user>@<hostname> (sshmint)` or nothing when either is unknown.

/// Comment for keys created without `--comment`.
pub fn default_comment() -> String {
    match (current_user(), current_hostname()) {
        (Some(user), Some(host)) => format_comment(&user, &host),
        _ => String::new(),
    }
}

pub fn format_comment(user: &str, host: &str) -> String {
    format!("{user}@{host} (sshmint)")
}

fn current_user() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|name| !name.trim().is_empty()))
}

fn current_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned())
        .filter(|h| !h.trim().is_empty())
}
