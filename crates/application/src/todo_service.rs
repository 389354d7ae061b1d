use domain::{NewTodo, TodoError, TodoId, TodoItem, TodoUpdate, UserId};
use infrastructure::{AttachmentStorage, TodoRepository, UploadUrl};
use tracing::{info, warn};

/// ToDo のユースケース
///
/// 入力は呼び出し側で検証済みであることを前提とし、ここではリポジトリと
/// ストレージの呼び出し順序だけを決める。
pub struct TodoService<R, S> {
    repository: R,
    storage: S,
}

impl<R, S> TodoService<R, S>
where
    R: TodoRepository,
    S: AttachmentStorage,
{
    pub fn new(repository: R, storage: S) -> Self {
        Self {
            repository,
            storage,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn list_todos(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError> {
        self.repository.list_items(user_id).await
    }

    /// 新しい ToDo を作成（ID は ULID、未完了で作成）
    pub async fn create_todo(
        &self,
        user_id: UserId,
        new_todo: NewTodo,
    ) -> Result<TodoItem, TodoError> {
        let item = TodoItem::create(user_id, new_todo);
        info!(
            "ToDo を作成します: user_id={}, todo_id={}",
            item.user_id, item.todo_id
        );
        self.repository.create_item(item).await
    }

    pub async fn update_todo(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        update: &TodoUpdate,
    ) -> Result<TodoId, TodoError> {
        self.repository.update_item(user_id, todo_id, update).await
    }

    /// ToDo を削除する。何も保存されていなければ NotFound
    pub async fn delete_todo(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<TodoItem, TodoError> {
        match self.repository.delete_item(user_id, todo_id).await? {
            Some(item) => Ok(item),
            None => {
                info!("削除対象の ToDo が存在しません: todo_id={}", todo_id);
                Err(TodoError::NotFound(format!(
                    "todoId={todo_id}, userId={user_id}"
                )))
            }
        }
    }

    /// 添付ファイルのアップロード用 URL を発行する
    ///
    /// 先に恒久 URL をアイテムへ条件付きで記録し、存在しない（または他ユーザーの）
    /// アイテムであれば署名付き URL を発行する前に NotFound で終える。
    /// 記録後に発行が失敗した場合、attachmentUrl だけが残る（アップロードされない
    /// クライアントと同じ状態）。
    pub async fn create_attachment_upload_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<UploadUrl, TodoError> {
        let object_url = self.storage.object_url(todo_id);
        self.repository
            .attach_upload_url(user_id, todo_id, &object_url)
            .await?;

        self.storage.upload_url(todo_id).await.inspect_err(|e| {
            warn!(
                "attachmentUrl 記録後に署名付き URL の発行に失敗しました: todo_id={}, error={}",
                todo_id, e
            );
        })
    }
}
