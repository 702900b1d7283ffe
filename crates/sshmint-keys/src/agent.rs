// ABOUTME: Minimal ssh-agent client for registering freshly generated identities.
// ABOUTME: Sends SSH_AGENTC_ADD_IDENTITY over the socket named by SSH_AUTH_SOCK.

use crate::error::{KeyError, Result};
use crate::keypair::{KeyMaterial, KeyPair};
use pkcs8::der::zeroize::Zeroizing;
use ssh_encoding::Encode;
use ssh_key::private::{Ed25519Keypair, RsaKeypair};
use ssh_key::Algorithm;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Environment variable holding the agent socket path.
pub const AUTH_SOCK_ENV: &str = "SSH_AUTH_SOCK";

const SSH_AGENT_FAILURE: u8 = 5;
const SSH_AGENT_SUCCESS: u8 = 6;
const SSH_AGENTC_ADD_IDENTITY: u8 = 17;

/// Upper bound on a reply frame; real replies to an add are one byte.
const MAX_REPLY_LEN: usize = 256 * 1024;

/// Agent socket from the environment, if one is configured.
pub fn agent_socket() -> Option<PathBuf> {
    std::env::var_os(AUTH_SOCK_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Register the key pair with the running agent.
///
/// # Errors
/// Returns `KeyError::AgentUnavailable` when `SSH_AUTH_SOCK` is unset, and
/// the errors of [`add_to_agent_at`] otherwise.
pub fn add_to_agent(pair: &KeyPair) -> Result<()> {
    let socket = agent_socket().ok_or(KeyError::AgentUnavailable)?;
    add_to_agent_at(pair, &socket)
}

/// Register the key pair with the agent listening on `socket`.
///
/// # Errors
/// Returns `KeyError::AgentConnect` for socket failures,
/// `KeyError::AgentRejected` if the agent answers with a failure and
/// `KeyError::AgentProtocol` for malformed replies.
#[cfg(unix)]
pub fn add_to_agent_at(pair: &KeyPair, socket: &Path) -> Result<()> {
    use std::io::Write;
    use std::os::unix::net::UnixStream;

    let connect_err = |source| KeyError::AgentConnect {
        socket: socket.to_path_buf(),
        source,
    };

    let message = add_identity_message(pair)?;
    let mut stream = UnixStream::connect(socket).map_err(connect_err)?;
    stream.write_all(&message).map_err(connect_err)?;
    stream.flush().map_err(connect_err)?;

    let reply = read_frame(&mut stream).map_err(|e| match e {
        FrameError::Io(source) => connect_err(source),
        FrameError::Protocol(message) => KeyError::AgentProtocol(message),
    })?;
    interpret_reply(&reply)?;

    tracing::info!(socket = %socket.display(), "added identity to ssh-agent");
    Ok(())
}

#[cfg(not(unix))]
pub fn add_to_agent_at(_pair: &KeyPair, _socket: &Path) -> Result<()> {
    Err(KeyError::AgentUnavailable)
}

/// Build the length-prefixed `SSH_AGENTC_ADD_IDENTITY` request.
///
/// The body is the key type, the private key fields in OpenSSH order and
/// the public comment.
pub fn add_identity_message(pair: &KeyPair) -> Result<Zeroizing<Vec<u8>>> {
    let encode_err = |e: ssh_encoding::Error| KeyError::AgentProtocol(e.to_string());

    let mut body = Zeroizing::new(vec![SSH_AGENTC_ADD_IDENTITY]);
    match pair.material() {
        KeyMaterial::Ed25519(key) => {
            let keypair = Ed25519Keypair::from_bytes(&key.to_keypair_bytes())
                .map_err(|e| KeyError::AgentProtocol(e.to_string()))?;
            Algorithm::Ed25519
                .as_str()
                .encode(&mut *body)
                .map_err(encode_err)?;
            keypair.encode(&mut *body).map_err(encode_err)?;
        }
        KeyMaterial::Rsa(key) => {
            let keypair = RsaKeypair::try_from(&**key)
                .map_err(|e| KeyError::AgentProtocol(e.to_string()))?;
            Algorithm::Rsa { hash: None }
                .as_str()
                .encode(&mut *body)
                .map_err(encode_err)?;
            keypair.encode(&mut *body).map_err(encode_err)?;
        }
    }
    pair.public_comment()
        .as_str()
        .encode(&mut *body)
        .map_err(encode_err)?;

    let len = u32::try_from(body.len())
        .map_err(|_| KeyError::AgentProtocol("identity too large".to_string()))?;
    let mut frame = Zeroizing::new(Vec::with_capacity(body.len() + 4));
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

#[derive(Debug)]
enum FrameError {
    Io(std::io::Error),
    Protocol(String),
}

fn read_frame(reader: &mut impl Read) -> std::result::Result<Vec<u8>, FrameError> {
    let mut len = [0u8; 4];
    reader.read_exact(&mut len).map_err(FrameError::Io)?;
    let len = u32::from_be_bytes(len) as usize;
    if len == 0 || len > MAX_REPLY_LEN {
        return Err(FrameError::Protocol(format!("invalid reply length {len}")));
    }

    let mut reply = vec![0u8; len];
    reader.read_exact(&mut reply).map_err(FrameError::Io)?;
    Ok(reply)
}

fn interpret_reply(reply: &[u8]) -> Result<()> {
    match reply.first() {
        Some(&SSH_AGENT_SUCCESS) => Ok(()),
        Some(&SSH_AGENT_FAILURE) => Err(KeyError::AgentRejected),
        Some(other) => Err(KeyError::AgentProtocol(format!(
            "unexpected message type {other}"
        ))),
        None => Err(KeyError::AgentProtocol("empty reply".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::{generate, KeyAlgorithm};

    fn read_string(buf: &[u8]) -> (&[u8], &[u8]) {
        let len = u32::from_be_bytes(buf[0..4].try_into().unwrap()) as usize;
        (&buf[4..4 + len], &buf[4 + len..])
    }

    #[test]
    fn test_ed25519_add_identity_layout() {
        let pair = generate(KeyAlgorithm::Ed25519, "me@host").unwrap();
        let crate::keypair::KeyMaterial::Ed25519(key) = pair.material() else {
            panic!("expected ed25519");
        };

        let frame = add_identity_message(&pair).unwrap();
        let len = u32::from_be_bytes(frame[0..4].try_into().unwrap()) as usize;
        assert_eq!(len, frame.len() - 4);
        assert_eq!(frame[4], SSH_AGENTC_ADD_IDENTITY);

        let (key_type, rest) = read_string(&frame[5..]);
        assert_eq!(key_type, b"ssh-ed25519");
        let (public, rest) = read_string(rest);
        assert_eq!(public, key.verifying_key().as_bytes());
        let (private, rest) = read_string(rest);
        assert_eq!(private, key.to_keypair_bytes());
        let (comment, rest) = read_string(rest);
        assert_eq!(comment, b"me@host");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_rsa_add_identity_starts_with_type() {
        let pair = crate::testing::rsa_pair("rsa@host");
        let frame = add_identity_message(&pair).unwrap();
        assert_eq!(frame[4], SSH_AGENTC_ADD_IDENTITY);
        let (key_type, _) = read_string(&frame[5..]);
        assert_eq!(key_type, b"ssh-rsa");
        assert!(frame.ends_with(b"rsa@host"));
    }

    #[test]
    fn test_interpret_reply() {
        assert!(interpret_reply(&[SSH_AGENT_SUCCESS]).is_ok());
        assert!(matches!(
            interpret_reply(&[SSH_AGENT_FAILURE]),
            Err(KeyError::AgentRejected)
        ));
        assert!(matches!(
            interpret_reply(&[42]),
            Err(KeyError::AgentProtocol(_))
        ));
        assert!(matches!(interpret_reply(&[]), Err(KeyError::AgentProtocol(_))));
    }

    #[test]
    fn test_read_frame_rejects_bad_length() {
        let mut zero: &[u8] = &[0, 0, 0, 0];
        assert!(matches!(read_frame(&mut zero), Err(FrameError::Protocol(_))));

        let mut short: &[u8] = &[0, 0, 0, 5, 6];
        assert!(matches!(read_frame(&mut short), Err(FrameError::Io(_))));
    }

    #[cfg(unix)]
    fn serve_once(socket: &Path, reply: u8) -> std::thread::JoinHandle<Vec<u8>> {
        use std::io::Write;
        use std::os::unix::net::UnixListener;

        let listener = UnixListener::bind(socket).expect("should bind agent socket");
        std::thread::spawn(move || {
            let (mut conn, _) = listener.accept().expect("should accept");
            let request = read_frame(&mut conn).expect("should read request");
            conn.write_all(&[0, 0, 0, 1, reply]).expect("should reply");
            request
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_add_to_agent_at_success() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let socket = temp_dir.path().join("agent.sock");
        let server = serve_once(&socket, SSH_AGENT_SUCCESS);

        let pair = generate(KeyAlgorithm::Ed25519, "me@host").unwrap();
        add_to_agent_at(&pair, &socket).expect("agent should accept");

        let request = server.join().unwrap();
        assert_eq!(request[0], SSH_AGENTC_ADD_IDENTITY);
        assert_eq!(&request[..], &add_identity_message(&pair).unwrap()[4..]);
    }

    #[cfg(unix)]
    #[test]
    fn test_add_to_agent_at_rejected() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let socket = temp_dir.path().join("agent.sock");
        let server = serve_once(&socket, SSH_AGENT_FAILURE);

        let pair = generate(KeyAlgorithm::Ed25519, "").unwrap();
        let err = add_to_agent_at(&pair, &socket).unwrap_err();
        assert!(matches!(err, KeyError::AgentRejected));
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_add_to_agent_at_missing_socket() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let socket = temp_dir.path().join("absent.sock");

        let pair = generate(KeyAlgorithm::Ed25519, "").unwrap();
        let err = add_to_agent_at(&pair, &socket).unwrap_err();
        match err {
            KeyError::AgentConnect { socket: reported, .. } => assert_eq!(reported, socket),
            other => panic!("expected AgentConnect, got {other:?}"),
        }
    }
}
