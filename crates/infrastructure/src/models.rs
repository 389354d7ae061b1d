use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use domain::{TodoId, TodoItem, UserId};
use std::collections::HashMap;

/// ToDo テーブルの属性名
pub mod attributes {
    pub const USER_ID: &str = "userId";
    pub const TODO_ID: &str = "todoId";
    pub const NAME: &str = "name";
    pub const DUE_DATE: &str = "dueDate";
    pub const DONE: &str = "done";
    pub const ATTACHMENT_URL: &str = "attachmentUrl";
    pub const CREATED_AT: &str = "createdAt";
}

use attributes::*;

/// 主キー（userId / todoId）のマップを作成
pub fn todo_key(user_id: &UserId, todo_id: &TodoId) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            USER_ID.to_string(),
            AttributeValue::S(user_id.as_str().to_string()),
        ),
        (
            TODO_ID.to_string(),
            AttributeValue::S(todo_id.as_str().to_string()),
        ),
    ])
}

/// TodoItem と DynamoDB アイテムの相互変換
pub struct TodoRecord;

impl TodoRecord {
    /// DynamoDB AttributeValue マップに変換
    pub fn to_attribute_map(item: &TodoItem) -> HashMap<String, AttributeValue> {
        let mut map = todo_key(&item.user_id, &item.todo_id);

        map.insert(NAME.to_string(), AttributeValue::S(item.name.clone()));
        map.insert(DUE_DATE.to_string(), AttributeValue::S(item.due_date.clone()));
        map.insert(DONE.to_string(), AttributeValue::Bool(item.done));
        map.insert(
            CREATED_AT.to_string(),
            AttributeValue::S(item.created_at.to_rfc3339()),
        );

        if let Some(url) = &item.attachment_url {
            map.insert(ATTACHMENT_URL.to_string(), AttributeValue::S(url.clone()));
        }

        map
    }

    /// DynamoDB AttributeValue マップから復元
    pub fn from_attribute_map(map: &HashMap<String, AttributeValue>) -> Result<TodoItem, String> {
        let string_attr = |name: &str| -> Result<String, String> {
            map.get(name)
                .and_then(|v| v.as_s().ok())
                .cloned()
                .ok_or_else(|| format!("Missing {name}"))
        };

        let user_id = UserId::from_string(string_attr(USER_ID)?).map_err(|e| e.to_string())?;
        let todo_id = TodoId::from_string(string_attr(TODO_ID)?).map_err(|e| e.to_string())?;

        let done = map
            .get(DONE)
            .and_then(|v| v.as_bool().ok())
            .copied()
            .ok_or("Missing or invalid done")?;

        let created_at = map
            .get(CREATED_AT)
            .and_then(|v| v.as_s().ok())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or("Missing or invalid createdAt")?;

        let attachment_url = map
            .get(ATTACHMENT_URL)
            .and_then(|v| v.as_s().ok())
            .cloned();

        Ok(TodoItem {
            user_id,
            todo_id,
            created_at,
            name: string_attr(NAME)?,
            due_date: string_attr(DUE_DATE)?,
            done,
            attachment_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::NewTodo;

    fn sample_item() -> TodoItem {
        TodoItem::create(
            UserId::from_string("U1".to_string()).unwrap(),
            NewTodo {
                name: "buy milk".to_string(),
                due_date: "2024-01-01".to_string(),
            },
        )
    }

    #[test]
    fn test_attribute_map_layout() {
        let item = sample_item();
        let map = TodoRecord::to_attribute_map(&item);

        assert_eq!(map.get(USER_ID).unwrap().as_s().unwrap(), "U1");
        assert_eq!(
            map.get(TODO_ID).unwrap().as_s().unwrap(),
            item.todo_id.as_str()
        );
        assert_eq!(map.get(DONE).unwrap().as_bool().unwrap(), &false);
        assert!(!map.contains_key(ATTACHMENT_URL));
    }

    #[test]
    fn test_from_attribute_map_restores_item() {
        let mut item = sample_item();
        item.attachment_url = Some("https://bucket.s3.amazonaws.com/x".to_string());

        let restored = TodoRecord::from_attribute_map(&TodoRecord::to_attribute_map(&item)).unwrap();
        assert_eq!(restored, item);
    }

    #[test]
    fn test_from_attribute_map_missing_fields() {
        let item = sample_item();
        let mut map = TodoRecord::to_attribute_map(&item);
        map.remove(DUE_DATE);

        let error = TodoRecord::from_attribute_map(&map).unwrap_err();
        assert!(error.contains("dueDate"));

        let mut map = TodoRecord::to_attribute_map(&item);
        map.insert(DONE.to_string(), AttributeValue::S("yes".to_string()));
        assert!(TodoRecord::from_attribute_map(&map).is_err());
    }
}
