use crate::models::{attributes, todo_key, TodoRecord};
use crate::DynamoDbClient;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use domain::{TodoError, TodoId, TodoItem, TodoUpdate, UserId};
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, error, info};

/// 対象アイテムが存在する場合のみ書き込むための条件式
const ITEM_EXISTS_CONDITION: &str = "attribute_exists(todoId)";

/// 続きのキーが返らなくなるまでページを取得し、返却順のまま連結する
///
/// Query の結果は 1MB ごとのページに分割されるため、`LastEvaluatedKey` を
/// 次の `ExclusiveStartKey` に渡して読み進める。空のキーは最終ページとして扱う。
pub(crate) async fn collect_pages<V, T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, TodoError>
where
    F: FnMut(Option<HashMap<String, V>>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<HashMap<String, V>>), TodoError>>,
{
    let mut items = Vec::new();
    let mut start_key = None;

    loop {
        let (page, next_key) = fetch_page(start_key.take()).await?;
        items.extend(page);

        match next_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => return Ok(items),
        }
    }
}

/// ToDo の永続化を担うリポジトリ
///
/// すべての操作は `user_id` をキー条件に含むため、他ユーザーのアイテムには触れない。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// ユーザーの ToDo をすべて取得（順序はストアの返却順）
    async fn list_items(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError>;

    /// 無条件に保存する
    async fn create_item(&self, item: TodoItem) -> Result<TodoItem, TodoError>;

    /// 既存アイテムの name / dueDate / done を上書きする。存在しなければ NotFound
    async fn update_item(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        update: &TodoUpdate,
    ) -> Result<TodoId, TodoError>;

    /// 削除し、削除前のアイテムを返す。何も保存されていなければ None
    async fn delete_item(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<Option<TodoItem>, TodoError>;

    /// attachmentUrl を記録する。存在しなければ NotFound
    async fn attach_upload_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        url: &str,
    ) -> Result<String, TodoError>;
}

/// DynamoDB を使った ToDo リポジトリ
#[derive(Clone)]
pub struct DynamoDbTodoRepository {
    db: DynamoDbClient,
}

impl DynamoDbTodoRepository {
    pub fn new(db: DynamoDbClient) -> Self {
        Self { db }
    }

    fn not_found(user_id: &UserId, todo_id: &TodoId) -> TodoError {
        TodoError::NotFound(format!("todoId={todo_id}, userId={user_id}"))
    }
}

#[async_trait]
impl TodoRepository for DynamoDbTodoRepository {
    async fn list_items(&self, user_id: &UserId) -> Result<Vec<TodoItem>, TodoError> {
        info!("ToDo 一覧を取得中: user_id={}", user_id);

        let items = collect_pages(|exclusive_start_key: Option<HashMap<String, AttributeValue>>| async move {
            let output = self
                .db
                .client()
                .query()
                .table_name(self.db.table_name())
                .key_condition_expression("userId = :userId")
                .expression_attribute_values(
                    ":userId",
                    AttributeValue::S(user_id.as_str().to_string()),
                )
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(|e| self.db.convert_error(e, "Query"))?;

            let page = output
                .items
                .unwrap_or_default()
                .iter()
                .map(|raw| {
                    TodoRecord::from_attribute_map(raw).map_err(|e| {
                        error!("ToDo アイテムの復元に失敗しました: {}", e);
                        TodoError::Internal(format!("不正な ToDo アイテム: {e}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok::<_, TodoError>((page, output.last_evaluated_key))
        })
        .await?;

        debug!("ToDo 一覧取得完了: {} 件", items.len());
        Ok(items)
    }

    async fn create_item(&self, item: TodoItem) -> Result<TodoItem, TodoError> {
        info!(
            "ToDo を保存中: user_id={}, todo_id={}",
            item.user_id, item.todo_id
        );

        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(TodoRecord::to_attribute_map(&item)))
            .send()
            .await
            .map_err(|e| self.db.convert_error(e, "PutItem"))?;

        debug!("ToDo 保存完了: {}", item.todo_id);
        Ok(item)
    }

    async fn update_item(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        update: &TodoUpdate,
    ) -> Result<TodoId, TodoError> {
        info!("ToDo を更新中: user_id={}, todo_id={}", user_id, todo_id);

        let result = self
            .db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .set_key(Some(todo_key(user_id, todo_id)))
            .update_expression("SET #name = :name, #dueDate = :dueDate, #done = :done")
            .condition_expression(ITEM_EXISTS_CONDITION)
            .expression_attribute_names("#name", attributes::NAME)
            .expression_attribute_names("#dueDate", attributes::DUE_DATE)
            .expression_attribute_names("#done", attributes::DONE)
            .expression_attribute_values(":name", AttributeValue::S(update.name.clone()))
            .expression_attribute_values(":dueDate", AttributeValue::S(update.due_date.clone()))
            .expression_attribute_values(":done", AttributeValue::Bool(update.done))
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!("ToDo 更新完了: {}", todo_id);
                Ok(todo_id.clone())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                info!("更新対象の ToDo が存在しません: todo_id={}", todo_id);
                Err(Self::not_found(user_id, todo_id))
            }
            Err(e) => Err(self.db.convert_error(e, "UpdateItem")),
        }
    }

    async fn delete_item(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
    ) -> Result<Option<TodoItem>, TodoError> {
        info!("ToDo を削除中: user_id={}, todo_id={}", user_id, todo_id);

        let output = self
            .db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .set_key(Some(todo_key(user_id, todo_id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| self.db.convert_error(e, "DeleteItem"))?;

        match output.attributes {
            Some(old) if !old.is_empty() => {
                let item = TodoRecord::from_attribute_map(&old).map_err(|e| {
                    error!("削除した ToDo アイテムの復元に失敗しました: {}", e);
                    TodoError::Internal(format!("不正な ToDo アイテム: {e}"))
                })?;
                debug!("ToDo 削除完了: {}", todo_id);
                Ok(Some(item))
            }
            _ => {
                debug!("削除対象の ToDo は存在しませんでした: {}", todo_id);
                Ok(None)
            }
        }
    }

    async fn attach_upload_url(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        url: &str,
    ) -> Result<String, TodoError> {
        info!(
            "添付ファイル URL を記録中: user_id={}, todo_id={}",
            user_id, todo_id
        );

        let result = self
            .db
            .client()
            .update_item()
            .table_name(self.db.table_name())
            .set_key(Some(todo_key(user_id, todo_id)))
            .update_expression("SET attachmentUrl = :attachmentUrl")
            .condition_expression(ITEM_EXISTS_CONDITION)
            .expression_attribute_values(":attachmentUrl", AttributeValue::S(url.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(url.to_string()),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                info!("添付先の ToDo が存在しません: todo_id={}", todo_id);
                Err(Self::not_found(user_id, todo_id))
            }
            Err(e) => Err(self.db.convert_error(e, "UpdateItem")),
        }
    }
}
