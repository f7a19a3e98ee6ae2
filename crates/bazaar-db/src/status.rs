//! gRPC status mapping for database errors.

use tonic::{Code, Status};

use crate::error::{DbError, ErrorKind};

impl From<DbError> for Status {
    fn from(error: DbError) -> Self {
        let code = match error.kind() {
            ErrorKind::InvalidArgument => Code::InvalidArgument,
            ErrorKind::NotFound => Code::NotFound,
            ErrorKind::DuplicateKey => Code::AlreadyExists,
            ErrorKind::MissingField => Code::FailedPrecondition,
            ErrorKind::DeadlineExceeded => Code::DeadlineExceeded,
            ErrorKind::BeginFailed
            | ErrorKind::CommitFailed
            | ErrorKind::RollbackFailed
            | ErrorKind::Backend => Code::Internal,
        };
        Status::new(code, error.to_string())
    }
}
