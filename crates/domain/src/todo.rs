use crate::errors::DomainError;
use crate::requests::{NewTodo, TodoUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_TODO_ID_LENGTH: usize = 128;
const MAX_USER_ID_LENGTH: usize = 256;

/// ToDo の識別子（ユーザー内で一意、テーブルのソートキー）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// 新しい ULID ベースの TodoId を生成
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// 外部入力（パスパラメータなど）から TodoId を作成
    ///
    /// 前後に空白を含む値は補正せずに拒否する。
    pub fn from_string(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTodoId("TodoId が空です".to_string()));
        }
        if id != id.trim() {
            return Err(DomainError::InvalidTodoId(format!(
                "TodoId の前後に空白があります: {id:?}"
            )));
        }
        if id.len() > MAX_TODO_ID_LENGTH {
            return Err(DomainError::InvalidTodoId(format!(
                "TodoId は{MAX_TODO_ID_LENGTH}文字以内である必要があります"
            )));
        }
        // オブジェクトキーや URL にそのまま使うため英数字と `-` `_` のみ許可
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidTodoId(format!(
                "TodoId に使用できない文字が含まれています: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ToDo の所有者（テーブルのパーティションキー）
///
/// 値は外部の認証ステップ（Lambda Authorizer）が検証済みトークンから取り出したもの。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_string(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUserId("UserId が空です".to_string()));
        }
        if id != id.trim() {
            return Err(DomainError::InvalidUserId(format!(
                "UserId の前後に空白があります: {id:?}"
            )));
        }
        if id.len() > MAX_USER_ID_LENGTH {
            return Err(DomainError::InvalidUserId(format!(
                "UserId は{MAX_USER_ID_LENGTH}文字以内である必要があります"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ToDo アイテム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub user_id: UserId,
    pub todo_id: TodoId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub due_date: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl TodoItem {
    /// 作成リクエストから新しいアイテムを組み立てる（未完了・添付なし）
    pub fn create(user_id: UserId, new_todo: NewTodo) -> Self {
        Self {
            user_id,
            todo_id: TodoId::new(),
            created_at: Utc::now(),
            name: new_todo.name,
            due_date: new_todo.due_date,
            done: false,
            attachment_url: None,
        }
    }

    /// 更新内容を適用する
    pub fn apply_update(&mut self, update: &TodoUpdate) {
        self.name = update.name.clone();
        self.due_date = update.due_date.clone();
        self.done = update.done;
    }
}
