use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub type AppResult<T> = Result<T, AppError>;

/// Every way a request can fail. Business-rule variants carry a stable
/// machine code (see [`AppError::code`]); anything else ends up in `Internal`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: &'static str,
    },

    #[error("Receiver must be different than the current logged in user")]
    IllegalReceiver,

    #[error("Chat already exists")]
    ChatExists,

    #[error("Chat doesn't exist")]
    ChatNotExists,

    #[error("Picture doesn't exist")]
    PictureNotExists,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("content type {0:?} is not accepted, expected image/*")]
    InvalidContentType(String),

    #[error("upload exceeds {0} bytes")]
    UploadTooLarge(usize),

    #[error("uploaded file is not a decodable image")]
    InvalidImage,

    #[error(transparent)]
    Upload(#[from] MultipartError),

    /// Request body that is not JSON or does not fit the expected shape.
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, message: &'static str) -> Self {
        Self::InvalidArgument { field, message }
    }

    pub fn code(&self) -> &'static str {
        use AppError::*;
        match self {
            Unauthorized(_) => "unauthorized",
            InvalidArgument { .. } | Body(_) => "invalid-argument",
            IllegalReceiver => "illegal-receiver",
            ChatExists => "chat-exists",
            ChatNotExists => "chat-not-exists",
            PictureNotExists => "picture-not-exists",
            Forbidden(_) => "forbidden",
            InvalidContentType(_) => "invalid-content-type",
            UploadTooLarge(_) => "upload-too-large",
            InvalidImage => "invalid-image",
            Upload(_) => "invalid-upload",
            Internal(_) => "internal-error",
        }
    }

    pub fn status(&self) -> StatusCode {
        use AppError::*;
        match self {
            Unauthorized(_) => StatusCode::UNAUTHORIZED,
            InvalidArgument { .. } | IllegalReceiver | Body(_) => StatusCode::BAD_REQUEST,
            ChatExists => StatusCode::CONFLICT,
            ChatNotExists | PictureNotExists => StatusCode::NOT_FOUND,
            Forbidden(_) => StatusCode::FORBIDDEN,
            InvalidContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            InvalidImage => StatusCode::UNPROCESSABLE_ENTITY,
            Upload(err) => err.status(),
            Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    reason: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let reason = match &self {
            AppError::Internal(err) => {
                tracing::error!("{err:#}\n\n{}", err.backtrace());
                "internal server error".to_owned()
            }
            AppError::Upload(err) => err.body_text(),
            AppError::Body(err) => err.body_text(),
            other => other.to_string(),
        };

        (
            self.status(),
            Json(ErrorBody { error: self.code(), reason }),
        )
            .into_response()
    }
}

/// `Json` extractor whose rejections answer with an [`AppError`] body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(sqlx::Error);
apperr_impl!(std::io::Error);
apperr_impl!(image::ImageError);
apperr_impl!(tokio::task::JoinError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_statuses() {
        let cases = [
            (AppError::Unauthorized("nope"), "unauthorized", StatusCode::UNAUTHORIZED),
            (AppError::invalid("chatId", "must not be empty"), "invalid-argument", StatusCode::BAD_REQUEST),
            (AppError::IllegalReceiver, "illegal-receiver", StatusCode::BAD_REQUEST),
            (AppError::ChatExists, "chat-exists", StatusCode::CONFLICT),
            (AppError::ChatNotExists, "chat-not-exists", StatusCode::NOT_FOUND),
            (AppError::InvalidContentType("text/plain".into()), "invalid-content-type", StatusCode::UNSUPPORTED_MEDIA_TYPE),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status(), status);
        }
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "internal-error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_argument_names_the_field() {
        let err = AppError::invalid("receiverId", "must not be empty");
        assert_eq!(err.to_string(), "receiverId: must not be empty");
    }
}
