use serenity::http::HttpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("No surprise day record with id {0}")]
    RecordNotFound(i64),

    #[error("User {0} already has a surprise day record")]
    DuplicateRecord(String),

    #[error("Remote entity no longer exists")]
    RemoteNotFound,

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }

    /// Wrap a serenity error, folding HTTP 404 responses into `RemoteNotFound`
    /// so callers can treat already-deleted channels and messages as benign.
    pub fn from_discord(err: serenity::Error) -> Self {
        if let serenity::Error::Http(HttpError::UnsuccessfulRequest(ref resp)) = err {
            if resp.status_code.as_u16() == 404 {
                return Error::RemoteNotFound;
            }
        }
        Error::Serenity(err)
    }

    pub fn is_remote_not_found(&self) -> bool {
        matches!(self, Error::RemoteNotFound)
    }
}
