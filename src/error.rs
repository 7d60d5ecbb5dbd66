use std::panic::Location;

/// Error kinds that can occur in gossip-accounts
#[derive(Debug)]
pub enum ErrorKind {
    AccountNotFound(String),
    Bech32(bech32::Error),
    General(String),
    Hex(hex::FromHexError),
    JoinError(tokio::task::JoinError),
    MissingRelays(String),
    NoActiveAccount,
    Nostr(nostr_types::Error),
    NostrPublish(String),
    ProfileMetadataNotFound,
    SerdeJson(serde_json::Error),
    Sql(rusqlite::Error),
    Timeout(tokio::time::error::Elapsed),
    UnsuccessfulFileUpload(String),
    Wss(String),
}

/// How a failure is presented to the user. Every `ErrorKind` falls into
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The network (socket, relay connection) failed underneath us
    TransportFailure,

    /// The relays did not accept the event we published
    PublishFailure,

    /// The account has no usable relays configured
    MissingConfiguration,

    /// A media upload failed
    UploadFailure,

    /// Anything local: storage, serialization, programming errors
    Other,
}

/// Errors that can occur in gossip-accounts, including the file and line number
/// where they were generated
#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    location: &'static Location<'static>,
}

impl Error {
    pub fn failure_kind(&self) -> FailureKind {
        self.kind.failure_kind()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl ErrorKind {
    pub fn failure_kind(&self) -> FailureKind {
        use ErrorKind::*;
        match self {
            Wss(_) | Timeout(_) | ProfileMetadataNotFound => FailureKind::TransportFailure,
            NostrPublish(_) => FailureKind::PublishFailure,
            MissingRelays(_) => FailureKind::MissingConfiguration,
            UnsuccessfulFileUpload(_) => FailureKind::UploadFailure,
            AccountNotFound(_) | Bech32(_) | General(_) | Hex(_) | JoinError(_)
            | NoActiveAccount | Nostr(_) | SerdeJson(_) | Sql(_) => FailureKind::Other,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.kind, self.location)
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorKind::*;
        match self {
            AccountNotFound(s) => write!(f, "Account not found: {s}"),
            Bech32(e) => write!(f, "Bech32: {e}"),
            General(s) => write!(f, "{s}"),
            Hex(e) => write!(f, "Hex: {e}"),
            JoinError(e) => write!(f, "Task join error: {e}"),
            MissingRelays(s) => write!(f, "No relays configured: {s}"),
            NoActiveAccount => write!(f, "No active account."),
            Nostr(e) => write!(f, "Nostr: {e}"),
            NostrPublish(s) => write!(f, "Publish failed: {s}"),
            ProfileMetadataNotFound => write!(f, "Profile content metadata not found."),
            SerdeJson(e) => write!(f, "SerdeJson Error: {e}"),
            Sql(e) => write!(f, "SQL: {e}"),
            Timeout(e) => write!(f, "Timeout: {e}"),
            UnsuccessfulFileUpload(s) => write!(f, "File upload failed: {s}"),
            Wss(s) => write!(f, "Websocket: {s}"),
        }
    }
}

// Note: we impl Into because our typical pattern is InnerError::Variant.into()
//       when we tried implementing From, the location was deep in rust code's
//       blanket into implementation, which wasn't the line number we wanted.
//
//       As for converting other error types, the try! macro uses From so it
//       is correct.
#[allow(clippy::from_over_into)]
impl Into<Error> for ErrorKind {
    #[track_caller]
    fn into(self) -> Error {
        Error {
            kind: self,
            location: Location::caller(),
        }
    }
}

impl From<String> for Error {
    #[track_caller]
    fn from(s: String) -> Error {
        Error {
            kind: ErrorKind::General(s),
            location: Location::caller(),
        }
    }
}

impl From<&str> for Error {
    #[track_caller]
    fn from(s: &str) -> Error {
        Error {
            kind: ErrorKind::General(s.to_string()),
            location: Location::caller(),
        }
    }
}

impl From<bech32::Error> for Error {
    #[track_caller]
    fn from(e: bech32::Error) -> Error {
        Error {
            kind: ErrorKind::Bech32(e),
            location: Location::caller(),
        }
    }
}

impl From<hex::FromHexError> for Error {
    #[track_caller]
    fn from(e: hex::FromHexError) -> Error {
        Error {
            kind: ErrorKind::Hex(e),
            location: Location::caller(),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    #[track_caller]
    fn from(e: tokio::task::JoinError) -> Error {
        Error {
            kind: ErrorKind::JoinError(e),
            location: Location::caller(),
        }
    }
}

impl From<nostr_types::Error> for Error {
    #[track_caller]
    fn from(e: nostr_types::Error) -> Error {
        Error {
            kind: ErrorKind::Nostr(e),
            location: Location::caller(),
        }
    }
}

impl From<serde_json::Error> for Error {
    #[track_caller]
    fn from(e: serde_json::Error) -> Error {
        Error {
            kind: ErrorKind::SerdeJson(e),
            location: Location::caller(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    #[track_caller]
    fn from(e: rusqlite::Error) -> Error {
        Error {
            kind: ErrorKind::Sql(e),
            location: Location::caller(),
        }
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    #[track_caller]
    fn from(e: tokio::time::error::Elapsed) -> Error {
        Error {
            kind: ErrorKind::Timeout(e),
            location: Location::caller(),
        }
    }
}
