//! テスト・ローカル実行用のインメモリ実装

use crate::{AttachmentStorage, TodoRepository, UploadUrl};
use async_trait::async_trait;
use chrono::Utc;
use domain::{TodoError, TodoId, TodoItem, TodoUpdate, UserId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

type ItemKey = (String, String);

fn item_key(user_id: &UserId, todo_id: &TodoId) -> ItemKey {
    (user_id.as_str().to_string(), todo_id.as_str().to_string())
}

/// DynamoDB と同じキー構造・条件付き書き込みを再現するリポジトリ
#[derive(Debug, Default)]
pub struct InMemoryTodoRepository {
    items: RwLock<BTreeMap<ItemKey, TodoItem>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存されている全ユーザー分のアイテム数
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// キーを指定して 1 件取得
    pub async fn get(&self, user_id: &UserId, todo_id: &TodoId) -> Option<TodoItem> {
        self.items
            .read()
            .await
            .get(&item_key(user_id, todo_id))
            .cloned()
    }

    fn not_found(user_id: &UserId, todo_id: &TodoId) -> TodoError {
        TodoError::NotFound(format!("todoId={todo_id}, userId={user_id}"))
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list_items(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|item| &item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_item(&self, item: TodoItem) -> Result<TodoItem, TodoError> {
        self.items
            .write()
            .await
            .insert(item_key(&item.user_id, &item.todo_id), item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        update: &TodoUpdate,
    ) -> Result<TodoId, TodoError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&item_key(user_id, todo_id))
            .ok_or_else(|| Self::not_found(user_id, todo_id))?;
        item.apply_update(update);
        Ok(todo_id.clone())
    }

    async fn delete_item(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<Option<TodoItem>, TodoError> {
        Ok(self.items.write().await.remove(&item_key(user_id, todo_id)))
    }

    async fn attach_upload_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        url: &str,
    ) -> Result<String, TodoError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&item_key(user_id, todo_id))
            .ok_or_else(|| Self::not_found(user_id, todo_id))?;
        item.attachment_url = Some(url.to_string());
        Ok(url.to_string())
    }
}

/// 署名の代わりに固定形式の URL を返すストレージ
#[derive(Debug)]
pub struct InMemoryAttachmentStorage {
    bucket: String,
    expiration: Duration,
    fail: bool,
    issued: AtomicUsize,
}

impl InMemoryAttachmentStorage {
    pub fn new(bucket: impl Into<String>, expiration: Duration) -> Self {
        Self {
            bucket: bucket.into(),
            expiration,
            fail: false,
            issued: AtomicUsize::new(0),
        }
    }

    /// URL 発行が常に失敗するストレージ
    pub fn failing(bucket: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::new(bucket, Duration::from_secs(300))
        }
    }

    /// これまでに発行した URL の数
    pub fn issued_count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttachmentStorage for InMemoryAttachmentStorage {
    async fn upload_url(&self, todo_id: &TodoId) -> Result<UploadUrl, TodoError> {
        if self.fail {
            return Err(TodoError::Storage("署名付き URL の発行に失敗しました".to_string()));
        }

        self.issued.fetch_add(1, Ordering::SeqCst);
        let expires_in = self.expiration.as_secs();
        Ok(UploadUrl {
            url: format!(
                "https://{}.s3.amazonaws.com/{}?X-Amz-Expires={}&X-Amz-Signature=test",
                self.bucket, todo_id, expires_in
            ),
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in as i64),
        })
    }

    fn object_url(&self, todo_id: &TodoId) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, todo_id)
    }
}
