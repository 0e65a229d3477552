use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::{num::ParseIntError, path::PathBuf};

pub type RollcallResult<T> = Result<T, RollcallError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RollcallError {
    #[snafu(display("Error opening database: {source}"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection: {source}"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("{source}"))]
    ReadQuery { source: sqlx::Error },
    #[snafu(display("{source}"))]
    WriteQuery { source: sqlx::Error },
    #[snafu(display("Error commiting SQL transaction: {source}"))]
    CommitTransaction { source: sqlx::Error },
    #[snafu(display("Error rolling back SQL transaction: {source}"))]
    RollbackTransaction { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` from {:?}", name, value))]
    ParseEnvVar { name: &'static str, value: String },
    #[snafu(display("Env var `{}` cannot be {}, it {}", name, value, expected))]
    InvalidEnvVar {
        name: &'static str,
        value: i64,
        expected: &'static str,
    },
    #[snafu(display("Unable to create upload directory {:?}", path))]
    CreateUploadDirectory {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to store uploaded file {:?}: {source}", file_name))]
    WriteUpload {
        source: std::io::Error,
        file_name: String,
    },
    #[snafu(display("Unable to parse roll number {:?}", original))]
    InvalidRollNumber {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to find student with roll number: {}", roll_number))]
    MissingStudent { roll_number: i64 },
    #[snafu(display("Error with sessions"))]
    TowerSession {
        source: tower_sessions::session::Error,
    },
    #[snafu(display("Error serialising with rmp_serde"))]
    RmpSerdeEncode { source: rmp_serde::encode::Error },
    #[snafu(display("Error deserialising with rmp_serde"))]
    RmpSerdeDecode { source: rmp_serde::decode::Error },
    #[snafu(display("Invalid session expiry timestamp {}", timestamp))]
    InvalidExpiry {
        source: time::error::ComponentRange,
        timestamp: i64,
    },
    #[snafu(display("Error with multipart form input: {source}"))]
    Multipart {
        source: axum::extract::multipart::MultipartError,
    },
    #[snafu(display("Unable to read multipart body: {}", source.body_text()))]
    RejectedMultipart { source: MultipartRejection },
    #[snafu(display("Unable to read form body: {}", source.body_text()))]
    RejectedForm { source: FormRejection },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RollcallError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::ReadQuery { .. } => ISE,
            Self::WriteQuery { .. } => BI,
            Self::CommitTransaction { .. } | Self::RollbackTransaction { .. } => ISE,
            Self::Migrate { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseEnvVar { .. } | Self::InvalidEnvVar { .. } => {
                ISE
            }
            Self::CreateUploadDirectory { .. } | Self::WriteUpload { .. } => ISE,
            Self::InvalidRollNumber { .. } => BI,
            Self::MissingStudent { .. } => NF,
            Self::TowerSession { .. } => ISE,
            Self::RmpSerdeEncode { .. } | Self::RmpSerdeDecode { .. } => ISE,
            Self::InvalidExpiry { .. } => ISE,
            Self::Multipart { source } => source.status(),
            Self::RejectedMultipart { source } => source.status(),
            Self::RejectedForm { source } => source.status(),
        };

        error!(?self, "Error!");
        (
            status_code,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
