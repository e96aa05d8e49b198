/// Core error type for the homework status bot.
///
/// Adapter crates map their specific errors into this type so the poll loop
/// can decide per failure whether the operator should hear about it.
/// Notifiable variants are sent to the chat as-is, so their texts are in
/// Russian like the status messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("Сбой в работе программы: эндпоинт {url} недоступен. Код ответа API: {status}")]
    Endpoint { url: String, status: u16 },

    #[error("request error: {0}")]
    Request(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("В ответе API пришёл не словарь (получено: {found})")]
    NotAMapping { found: &'static str },

    #[error("В ответе API отсутствует ключ `{0}`")]
    MissingKey(String),

    #[error("Значение `{key}` в ответе API должно быть {expected}, получено: {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Ошибка получения данных по ключу `{0}`")]
    KeyLookup(String),

    #[error("failed to send message: {reason}")]
    Sending { reason: String },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] used by the poll loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    EndpointUnreachable,
    MissingKey,
    WrongType,
    KeyLookup,
    SendingFailed,
    Unexpected,
}

impl ErrorKind {
    /// Whether errors of this kind are reported to the chat.
    pub fn is_notifiable(self) -> bool {
        matches!(
            self,
            Self::EndpointUnreachable | Self::MissingKey | Self::WrongType | Self::KeyLookup
        )
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Endpoint { .. } => ErrorKind::EndpointUnreachable,
            Self::MissingKey(_) => ErrorKind::MissingKey,
            Self::NotAMapping { .. } | Self::WrongType { .. } => ErrorKind::WrongType,
            Self::KeyLookup(_) => ErrorKind::KeyLookup,
            Self::Sending { .. } => ErrorKind::SendingFailed,
            Self::Request(_) | Self::Json(_) | Self::External(_) => ErrorKind::Unexpected,
        }
    }

    pub fn is_notifiable(&self) -> bool {
        self.kind().is_notifiable()
    }
}
