use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Error)]
pub enum TodoError {
    /// 条件付き書き込みの対象アイテムが存在しない
    #[error("Todo not found: {0}")]
    NotFound(String),

    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
