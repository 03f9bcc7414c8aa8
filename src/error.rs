use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

/// Which store operation a request was performing, so failures can be reported in terms the
/// caller recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    List,
    Register,
    Update,
    Delete,
}

impl StoreAction {
    pub const fn storage_failure_message(self) -> &'static str {
        match self {
            Self::List => "Database error fetching students.",
            Self::Register => "Failed to register student.",
            Self::Update => "Failed to update student.",
            Self::Delete => "Failed to delete student.",
        }
    }

    pub const fn missing_fields_message(self) -> &'static str {
        match self {
            Self::Update => "All fields are required for update.",
            Self::List | Self::Register | Self::Delete => "All fields are required.",
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("{}", action.storage_failure_message()))]
    GetDatabaseConnection {
        source: sqlx::Error,
        action: StoreAction,
    },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("{}", action.storage_failure_message()))]
    MakeQuery {
        source: sqlx::Error,
        action: StoreAction,
    },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse pool size {:?}", original))]
    ParseMaxConnections {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("API base {:?} must start with `/`", base))]
    InvalidApiBase { base: String },
    #[snafu(display("{}", action.missing_fields_message()))]
    MissingFields {
        action: StoreAction,
        missing: Vec<&'static str>,
    },
    #[snafu(display("Request body must be a JSON object."))]
    MalformedBody { source: JsonRejection },
    #[snafu(display("Student ID No. already registered."))]
    DuplicateIdNo { id_no: String },
    #[snafu(display("Student not found."))]
    StudentNotFound { id_no: String },
    #[snafu(display("Not found."))]
    UnknownRoute { path: String },
    #[snafu(display("Method not allowed."))]
    MethodNotAllowed { method: Method, path: String },
}

/// The failure envelope every API error is rendered into.
#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl RosterError {
    pub const fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;
        const NF: StatusCode = StatusCode::NOT_FOUND;
        const BI: StatusCode = StatusCode::BAD_REQUEST;

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MigrateError { .. } => ISE,
            Self::MakeQuery { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseMaxConnections { .. } => ISE,
            Self::InvalidApiBase { .. } => ISE,
            Self::MissingFields { .. } | Self::MalformedBody { .. } => BI,
            Self::DuplicateIdNo { .. } => StatusCode::CONFLICT,
            Self::StudentNotFound { .. } | Self::UnknownRoute { .. } => NF,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            debug!(?self, %status_code, "Rejected request");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_hide_the_driver_error() {
        let err = RosterError::MakeQuery {
            source: sqlx::Error::PoolClosed,
            action: StoreAction::Delete,
        };
        assert_eq!(err.to_string(), "Failed to delete student.");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unavailable_connection_reports_the_action() {
        let err = RosterError::GetDatabaseConnection {
            source: sqlx::Error::PoolTimedOut,
            action: StoreAction::List,
        };
        assert_eq!(err.to_string(), "Database error fetching students.");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_fields_message_depends_on_action() {
        let register = RosterError::MissingFields {
            action: StoreAction::Register,
            missing: vec!["course"],
        };
        let update = RosterError::MissingFields {
            action: StoreAction::Update,
            missing: vec!["course"],
        };
        assert_eq!(register.to_string(), "All fields are required.");
        assert_eq!(update.to_string(), "All fields are required for update.");
        assert_eq!(update.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn key_conflicts_map_to_their_statuses() {
        let dup = RosterError::DuplicateIdNo { id_no: "S1".into() };
        let missing = RosterError::StudentNotFound { id_no: "S1".into() };
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }
}
