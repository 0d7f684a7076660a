use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Permintaan ke server melebihi batas waktu")]
    Timeout,

    #[error("Gagal terhubung ke server: {0}")]
    Network(String),

    #[error("Sesi Anda telah berakhir, silakan masuk kembali")]
    Unauthorized,

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Respons server tidak valid: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds a server error, falling back to a generic message when the
    /// backend sent no readable body.
    pub fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Server mengembalikan status {}", status));
        ApiError::Server { status, message }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
