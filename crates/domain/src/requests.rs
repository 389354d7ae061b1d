//! HTTP リクエストボディとその検証
//!
//! ボディのフィールドはすべて `Option` で受け取り、リモート呼び出しの前に
//! ここで検証して欠落・不正値をクライアントエラーとして返す。

use crate::errors::DomainError;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

const MAX_NAME_LENGTH: usize = 200;

/// POST /todos のボディ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub name: Option<String>,
    pub due_date: Option<String>,
}

/// PATCH /todos/{todoId} のボディ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub name: Option<String>,
    pub due_date: Option<String>,
    pub done: Option<bool>,
}

/// 検証済みの作成内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub name: String,
    pub due_date: String,
}

/// 検証済みの更新内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    pub name: String,
    pub due_date: String,
    pub done: bool,
}

impl CreateTodoRequest {
    pub fn validate(self) -> Result<NewTodo, DomainError> {
        let name = validate_name(self.name)?;
        let due_date = validate_due_date(self.due_date)?;
        Ok(NewTodo { name, due_date })
    }
}

impl UpdateTodoRequest {
    pub fn validate(self) -> Result<TodoUpdate, DomainError> {
        let name = validate_name(self.name)?;
        let due_date = validate_due_date(self.due_date)?;
        let done = self.done.ok_or(DomainError::MissingField("done"))?;
        Ok(TodoUpdate {
            name,
            due_date,
            done,
        })
    }
}

fn validate_name(name: Option<String>) -> Result<String, DomainError> {
    let name = name.ok_or(DomainError::MissingField("name"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::InvalidName("名前は必須です".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::InvalidName(format!(
            "名前は{MAX_NAME_LENGTH}文字以内で入力してください"
        )));
    }
    Ok(name.to_string())
}

/// `YYYY-MM-DD` もしくは RFC 3339 の日時を受け付ける。値は入力どおり保存する。
fn validate_due_date(due_date: Option<String>) -> Result<String, DomainError> {
    let due_date = due_date.ok_or(DomainError::MissingField("dueDate"))?;
    let due_date = due_date.trim();
    let parsed = NaiveDate::parse_from_str(due_date, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(due_date).is_ok();
    if !parsed {
        return Err(DomainError::InvalidDueDate(format!(
            "日付として解釈できません: {due_date}"
        )));
    }
    Ok(due_date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_from_json() {
        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"name":" buy milk ","dueDate":"2024-01-01"}"#).unwrap();
        let new_todo = req.validate().unwrap();

        assert_eq!(new_todo.name, "buy milk");
        assert_eq!(new_todo.due_date, "2024-01-01");
    }

    #[test]
    fn test_create_request_accepts_rfc3339_due_date() {
        let req = CreateTodoRequest {
            name: Some("a".to_string()),
            due_date: Some("2024-01-01T09:00:00.000Z".to_string()),
        };
        assert_eq!(req.validate().unwrap().due_date, "2024-01-01T09:00:00.000Z");
    }

    #[test]
    fn test_create_request_missing_fields() {
        let req: CreateTodoRequest = serde_json::from_str(r#"{"dueDate":"2024-01-01"}"#).unwrap();
        assert_eq!(req.validate(), Err(DomainError::MissingField("name")));

        let req: CreateTodoRequest = serde_json::from_str(r#"{"name":"a"}"#).unwrap();
        assert_eq!(req.validate(), Err(DomainError::MissingField("dueDate")));
    }

    #[test]
    fn test_create_request_invalid_values() {
        let blank = CreateTodoRequest {
            name: Some("   ".to_string()),
            due_date: Some("2024-01-01".to_string()),
        };
        assert!(matches!(blank.validate(), Err(DomainError::InvalidName(_))));

        let too_long = CreateTodoRequest {
            name: Some("あ".repeat(201)),
            due_date: Some("2024-01-01".to_string()),
        };
        assert!(matches!(too_long.validate(), Err(DomainError::InvalidName(_))));

        let bad_date = CreateTodoRequest {
            name: Some("a".to_string()),
            due_date: Some("tomorrow".to_string()),
        };
        assert!(matches!(
            bad_date.validate(),
            Err(DomainError::InvalidDueDate(_))
        ));

        let impossible_date = CreateTodoRequest {
            name: Some("a".to_string()),
            due_date: Some("2024-02-30".to_string()),
        };
        assert!(impossible_date.validate().is_err());
    }

    #[test]
    fn test_update_request_requires_done() {
        let req: UpdateTodoRequest =
            serde_json::from_str(r#"{"name":"a","dueDate":"2024-01-01"}"#).unwrap();
        assert_eq!(req.validate(), Err(DomainError::MissingField("done")));

        let req: UpdateTodoRequest =
            serde_json::from_str(r#"{"name":"a","dueDate":"2024-01-01","done":true}"#).unwrap();
        assert_eq!(
            req.validate().unwrap(),
            TodoUpdate {
                name: "a".to_string(),
                due_date: "2024-01-01".to_string(),
                done: true,
            }
        );
    }
}
