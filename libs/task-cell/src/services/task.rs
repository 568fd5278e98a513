use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use family_cell::ScopeService;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::task::{Task, TaskStatus};

use crate::models::{
    completion_change, CreateTaskRequest, TaskListQuery, UpdateTaskRequest, DEFAULT_CATEGORY,
};

pub struct TaskService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl TaskService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// Tasks in the caller's families, soonest due first.
    pub async fn list_tasks(
        &self,
        user: &User,
        query: TaskListQuery,
        auth_token: &str,
    ) -> Result<Vec<Task>, AppError> {
        let scopes = ScopeService::new(&self.config);
        let Some(scope) = scopes.resolve(user, auth_token).await? else {
            return Ok(Vec::new());
        };

        let mut path = format!(
            "/rest/v1/tasks?family_id={}&order=due_date.asc",
            scope.family_filter()
        );
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status.as_str()));
        }
        if let Some(member_id) = query.member_id {
            let (member_id, _) = scopes
                .target_member(&scope, Some(member_id), auth_token)
                .await?;
            path.push_str(&format!("&member_id=eq.{}", member_id));
        }

        let tasks: Vec<Task> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(tasks)
    }

    pub async fn create_task(
        &self,
        user: &User,
        request: CreateTaskRequest,
        auth_token: &str,
    ) -> Result<Task, AppError> {
        let due_date = request.validate()?;
        debug!("Creating task '{}' for user {}", request.title.trim(), user.id);

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.ensure(user, auth_token).await?;
        let (member_id, family_id) = scopes
            .target_member(&scope, request.member_id, auth_token)
            .await?;

        let category = request
            .category
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_CATEGORY);

        let task_data = json!({
            "family_id": family_id,
            "member_id": member_id,
            "title": request.title.trim(),
            "description": request.description,
            "due_date": due_date,
            "priority": request.priority.unwrap_or_default(),
            "status": TaskStatus::Pending,
            "category": category,
        });

        let created: Vec<Task> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/tasks", auth_token, Some(task_data))
            .await?;

        let task = created
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Task insert returned no row".to_string()))?;

        info!("Task {} created for member {}", task.id, member_id);
        Ok(task)
    }

    pub async fn update_task(
        &self,
        user: &User,
        task_id: Uuid,
        request: UpdateTaskRequest,
        auth_token: &str,
    ) -> Result<Task, AppError> {
        let due_date = request.validate()?;

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let existing: Task = scopes
            .fetch_in_scope("tasks", task_id, &scope, auth_token, "Task")
            .await?;

        let mut update_data = Map::new();
        if let Some(title) = request.title {
            update_data.insert("title".to_string(), json!(title.trim()));
        }
        if let Some(description) = request.description {
            update_data.insert("description".to_string(), json!(description));
        }
        if let Some(due_date) = due_date {
            update_data.insert("due_date".to_string(), json!(due_date));
        }
        if let Some(priority) = request.priority {
            update_data.insert("priority".to_string(), json!(priority));
        }
        if let Some(category) = request.category {
            update_data.insert("category".to_string(), json!(category.trim()));
        }
        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status));
            if let Some(completed_at) = completion_change(existing.status, status, Utc::now()) {
                update_data.insert(
                    "completed_at".to_string(),
                    json!(completed_at.map(|at| at.to_rfc3339())),
                );
            }
        }

        if update_data.is_empty() {
            return Ok(existing);
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!(
            "/rest/v1/tasks?id=eq.{}&family_id={}",
            task_id,
            scope.family_filter()
        );
        let updated: Vec<Task> = self
            .supabase
            .write_returning(Method::PATCH, &path, auth_token, Some(Value::Object(update_data)))
            .await?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    pub async fn delete_task(
        &self,
        user: &User,
        task_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppError> {
        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let _: Task = scopes
            .fetch_in_scope("tasks", task_id, &scope, auth_token, "Task")
            .await?;

        let path = format!(
            "/rest/v1/tasks?id=eq.{}&family_id={}",
            task_id,
            scope.family_filter()
        );
        let removed: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, auth_token, None)
            .await?;

        if removed.is_empty() {
            return Err(AppError::NotFound("Task not found".to_string()));
        }
        info!("Task {} deleted by user {}", task_id, user.id);
        Ok(())
    }
}
