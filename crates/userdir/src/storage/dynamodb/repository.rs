//! DynamoDB repository implementation.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use uuid::Uuid;

use userdir_core::storage::{Result, UserRepository};
use userdir_core::user::{User, UserUpdate};

use super::conversions::{item_to_user, user_to_item};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_update_item_error,
};
use super::keys;
use super::update;

/// Name of the secondary index carrying the email lookup values.
const EMAIL_INDEX: &str = "GSI1";

/// DynamoDB-based repository implementation.
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl UserRepository for DynamoDbRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(keys::user_pk(id)))
            .key("SK", AttributeValue::S(keys::user_sk(id)))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, "User", id.to_string()))?;

        match result.item {
            Some(item) => Ok(Some(item_to_user(&item)?)),
            None => Ok(None),
        }
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let item = user_to_item(user);

        // The conditional check fires server-side at write time; the
        // handler's pre-check query only exists for message quality.
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, "User", user.email.clone()))?;

        Ok(())
    }

    async fn update_user_fields(&self, id: Uuid, update: &UserUpdate) -> Result<()> {
        let builder = update::user_update(update);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(keys::user_pk(id)))
            .key("SK", AttributeValue::S(keys::user_sk(id)))
            .update_expression(builder.expression())
            .set_expression_attribute_names(Some(builder.attribute_names()))
            .set_expression_attribute_values(Some(builder.attribute_values()))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await
            .map_err(|e| map_update_item_error(e, "User", id.to_string()))?;

        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(keys::user_pk(id)))
            .key("SK", AttributeValue::S(keys::user_sk(id)))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, "User", id.to_string()))?;

        Ok(())
    }

    async fn find_by_email_prefix(&self, prefix: Option<&str>, limit: i32) -> Result<Vec<User>> {
        let mut query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(EMAIL_INDEX)
            .limit(limit)
            .expression_attribute_values(
                ":pk",
                AttributeValue::S(keys::USER_CATEGORY.to_string()),
            );

        query = match prefix {
            Some(prefix) => query
                .key_condition_expression("GSI1PK = :pk AND begins_with(GSI1SK, :prefix)")
                .expression_attribute_values(":prefix", AttributeValue::S(prefix.to_string())),
            None => query.key_condition_expression("GSI1PK = :pk"),
        };

        let result = query.send().await.map_err(map_query_error)?;

        let items = result.items.unwrap_or_default();
        items.iter().map(item_to_user).collect()
    }
}
