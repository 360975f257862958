//! Wire format of callback requests
//!
//! A callback request is one HTTP-shaped line, `GET /{id}:{action} HTTP/1.1`,
//! sent by the `curl` command embedded in the display command. Only the
//! path matters; headers, if any, are never read. The response is a fixed
//! payload that nothing inspects; the external service only cares that the
//! command completed.

use std::path::Path;

use crate::action::Action;

/// Fixed response written to every successfully parsed callback request.
pub const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\r\nok";

/// Extract the `(id, action)` pair from a request line.
///
/// Returns `None` for anything malformed: wrong shape, non-numeric id,
/// unknown action token. Malformed requests are dropped by the server, so
/// there is no error detail to carry.
pub fn parse_request_line(line: &str) -> Option<(u64, Action)> {
    let mut parts = line.split_whitespace();
    let _method = parts.next()?;
    let path = parts.next()?;
    let _version = parts.next()?;

    let (id, action) = path.strip_prefix('/')?.split_once(':')?;
    let id: u64 = id.parse().ok()?;
    let action: Action = action.parse().ok()?;
    Some((id, action))
}

/// Build the shell command that delivers `(id, action)` to the listener.
///
/// The result is embedded verbatim as one argument of the display command
/// and later handed to a shell by the Termux app, so every token is quoted.
/// Distinct `(id, action)` pairs always yield distinct request paths.
pub fn callback_command(curl: &Path, socket: &Path, id: u64, action: Action) -> String {
    let tokens = [
        curl.to_string_lossy().into_owned(),
        "-GET".to_string(),
        "--unix-socket".to_string(),
        socket.to_string_lossy().into_owned(),
        format!("http://localhost/{}:{}", id, action),
    ];
    tokens
        .iter()
        .map(|t| quote(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// POSIX single-quote quoting; a plain token passes through unchanged.
fn quote(token: &str) -> String {
    let safe = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_valid_request() {
        assert_eq!(
            parse_request_line("GET /1:button1 HTTP/1.1\r\n"),
            Some((1, Action::Button1))
        );
        assert_eq!(
            parse_request_line("GET /42:media_previous HTTP/1.1"),
            Some((42, Action::MediaPrevious))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert_eq!(parse_request_line(""), None);
        assert_eq!(parse_request_line("GET /1:click"), None);
        assert_eq!(parse_request_line("GET 1:click HTTP/1.1"), None);
        assert_eq!(parse_request_line("GET /abc:click HTTP/1.1"), None);
        assert_eq!(parse_request_line("GET /1:explode HTTP/1.1"), None);
        assert_eq!(parse_request_line("GET /1 HTTP/1.1"), None);
        assert_eq!(parse_request_line("GET /-1:click HTTP/1.1"), None);
    }

    #[test]
    fn test_command_round_trips_through_parser() {
        let cmd = callback_command(
            &PathBuf::from("/usr/bin/curl"),
            &PathBuf::from("/tmp/cb.sock"),
            7,
            Action::Delete,
        );
        assert_eq!(
            cmd,
            "/usr/bin/curl -GET --unix-socket /tmp/cb.sock http://localhost/7:delete"
        );
        // The path curl will request is exactly what the parser expects.
        let url = cmd.rsplit(' ').next().unwrap();
        let path = url.strip_prefix("http://localhost").unwrap();
        let line = format!("GET {} HTTP/1.1", path);
        assert_eq!(parse_request_line(&line), Some((7, Action::Delete)));
    }

    #[test]
    fn test_commands_are_injective() {
        let curl = PathBuf::from("/usr/bin/curl");
        let sock = PathBuf::from("/tmp/cb.sock");
        let a = callback_command(&curl, &sock, 1, Action::Button2);
        let b = callback_command(&curl, &sock, 1, Action::Button3);
        let c = callback_command(&curl, &sock, 12, Action::Button2);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_quoting_of_awkward_paths() {
        let cmd = callback_command(
            &PathBuf::from("/usr/bin/curl"),
            &PathBuf::from("/tmp/odd dir/it's.sock"),
            1,
            Action::Click,
        );
        assert!(cmd.contains(r"'/tmp/odd dir/it'\''s.sock'"));
    }
}
