use super::LedgerStore;
use crate::assignments::{Assignment, AssignmentUpdate, Status};
use crate::error::StoreError;
use crate::users::{Role, User};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

type Item = HashMap<String, AttributeValue>;

/// Single-table layout:
/// - users:       PK = "USER",               SK = "USER#{user_id}"
/// - assignments: PK = "DOSSIER#{dossier_id}", SK = "TASK#{task_id}"
///
/// The assignment key is the (dossier, task) pair, so the table itself
/// guarantees there is never more than one row per pair.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Query all users under the USER partition, following pagination
    async fn query_users(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S("USER".to_string()))
                .expression_attribute_values(":sk_prefix", AttributeValue::S("USER#".to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StoreError::Backend(format!("DynamoDB query error: {}", e)))?;

            items.extend(result.items().iter().cloned());

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Scan assignment rows, optionally restricted to one assignee
    async fn scan_assignments(&self, assignee: Option<u32>) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        let filter = match assignee {
            Some(_) => "begins_with(PK, :pk_prefix) AND #assignee = :assignee",
            None => "begins_with(PK, :pk_prefix)",
        };

        loop {
            let mut builder = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression(filter)
                .expression_attribute_values(
                    ":pk_prefix",
                    AttributeValue::S("DOSSIER#".to_string()),
                )
                .set_exclusive_start_key(start_key.take());

            if let Some(user_id) = assignee {
                builder = builder
                    .expression_attribute_names("#assignee", "assignee")
                    .expression_attribute_values(":assignee", AttributeValue::N(user_id.to_string()));
            }

            let result = builder
                .send()
                .await
                .map_err(|e| StoreError::Backend(format!("DynamoDB scan error: {}", e)))?;

            items.extend(result.items().iter().cloned());

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }
}

fn user_key(user_id: u32) -> String {
    format!("USER#{}", user_id)
}

fn dossier_key(dossier_id: &str) -> String {
    format!("DOSSIER#{}", dossier_id)
}

fn task_key(task_id: u32) -> String {
    format!("TASK#{}", task_id)
}

fn get_s(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).map(|s| s.to_string())
}

fn get_n(item: &Item, name: &str) -> Option<u32> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
}

pub(crate) fn user_from_item(item: &Item) -> Result<User, StoreError> {
    let sk = get_s(item, "SK").unwrap_or_default();
    let user_id = sk
        .strip_prefix("USER#")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| StoreError::Corrupt(format!("user key {:?}", sk)))?;

    let role = get_s(item, "user_role").unwrap_or_default();
    let user_role: Role = role
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("user {}: {}", user_id, e)))?;

    Ok(User {
        user_id,
        user_name: get_s(item, "user_name").unwrap_or_default(),
        user_role,
        competence: get_s(item, "competence"),
    })
}

pub(crate) fn assignment_from_item(item: &Item) -> Result<Assignment, StoreError> {
    let pk = get_s(item, "PK").unwrap_or_default();
    let sk = get_s(item, "SK").unwrap_or_default();

    let dossier_id = pk
        .strip_prefix("DOSSIER#")
        .ok_or_else(|| StoreError::Corrupt(format!("assignment key {:?}", pk)))?
        .to_string();
    let task_id = sk
        .strip_prefix("TASK#")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| StoreError::Corrupt(format!("assignment key {:?}", sk)))?;

    let assignee_id = get_n(item, "assignee")
        .ok_or_else(|| StoreError::Corrupt(format!("{}/{} has no assignee", pk, sk)))?;

    let raw_status = get_s(item, "assignment_status").unwrap_or_default();
    let status: Status = raw_status
        .parse()
        .map_err(|s| StoreError::Corrupt(format!("{}/{} has status {:?}", pk, sk, s)))?;

    Ok(Assignment {
        assignment_id: get_s(item, "assignment_id").unwrap_or_default(),
        task_id,
        dossier_id,
        assignee_id,
        status,
        assigned_at: get_s(item, "assigned_at").unwrap_or_default(),
    })
}

/// Decode listed rows. One bad row fails the whole listing.
fn decode_assignments(items: &[Item]) -> Result<Vec<Assignment>, StoreError> {
    items.iter().map(assignment_from_item).collect()
}

#[async_trait]
impl LedgerStore for DynamoStore {
    async fn get_user(&self, user_id: u32) -> Result<Option<User>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S("USER".to_string()))
            .key("SK", AttributeValue::S(user_key(user_id)))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB get_item error: {}", e)))?;

        result.item().map(user_from_item).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let items = self.query_users().await?;
        let mut users = items
            .iter()
            .map(user_from_item)
            .collect::<Result<Vec<_>, _>>()?;
        users.sort_by_key(|u| u.user_id);
        Ok(users)
    }

    async fn find_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(dossier_key(dossier_id)))
            .key("SK", AttributeValue::S(task_key(task_id)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB get_item error: {}", e)))?;

        result.item().map(assignment_from_item).transpose()
    }

    async fn upsert_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
        assignee_id: u32,
    ) -> Result<Assignment, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        let new_id = uuid::Uuid::new_v4().to_string();

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(dossier_key(dossier_id)))
            .key("SK", AttributeValue::S(task_key(task_id)))
            .update_expression(
                "SET #assignee = :assignee, #status = :status, \
                 #assignment_id = if_not_exists(#assignment_id, :assignment_id), \
                 #assigned_at = if_not_exists(#assigned_at, :assigned_at)",
            )
            .expression_attribute_names("#assignee", "assignee")
            .expression_attribute_names("#status", "assignment_status")
            .expression_attribute_names("#assignment_id", "assignment_id")
            .expression_attribute_names("#assigned_at", "assigned_at")
            .expression_attribute_values(":assignee", AttributeValue::N(assignee_id.to_string()))
            .expression_attribute_values(":status", AttributeValue::S(Status::Todo.to_string()))
            .expression_attribute_values(":assignment_id", AttributeValue::S(new_id))
            .expression_attribute_values(":assigned_at", AttributeValue::S(now))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB update_item error: {}", e)))?;

        let attributes = result
            .attributes()
            .ok_or_else(|| StoreError::Corrupt("update_item returned no attributes".to_string()))?;
        assignment_from_item(attributes)
    }

    async fn update_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
        expected_assignee: u32,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>, StoreError> {
        let mut update_expr = vec!["#status = :status"];
        let mut builder = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(dossier_key(dossier_id)))
            .key("SK", AttributeValue::S(task_key(task_id)))
            .condition_expression("attribute_exists(PK) AND #assignee = :expected")
            .expression_attribute_names("#assignee", "assignee")
            .expression_attribute_names("#status", "assignment_status")
            .expression_attribute_values(
                ":expected",
                AttributeValue::N(expected_assignee.to_string()),
            )
            .expression_attribute_values(":status", AttributeValue::S(update.status.to_string()));

        if let Some(assignee_id) = update.assignee_id {
            update_expr.push("#assignee = :assignee");
            builder = builder
                .expression_attribute_values(":assignee", AttributeValue::N(assignee_id.to_string()));
        }

        let result = builder
            .update_expression(format!("SET {}", update_expr.join(", ")))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => output.attributes().map(assignment_from_item).transpose(),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Ok(None)
            }
            Err(e) => Err(StoreError::Backend(format!("DynamoDB update_item error: {}", e))),
        }
    }

    async fn list_assignments_for_user(
        &self,
        user_id: u32,
    ) -> Result<Vec<Assignment>, StoreError> {
        let items = self.scan_assignments(Some(user_id)).await?;
        decode_assignments(&items)
    }

    async fn list_assignments_for_dossier(
        &self,
        dossier_id: &str,
    ) -> Result<Vec<Assignment>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(dossier_key(dossier_id)))
                .expression_attribute_values(":sk_prefix", AttributeValue::S("TASK#".to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StoreError::Backend(format!("DynamoDB query error: {}", e)))?;

            items.extend(result.items().iter().cloned());

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        decode_assignments(&items)
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        let items = self.scan_assignments(None).await?;
        decode_assignments(&items)
    }
}
