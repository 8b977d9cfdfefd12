use sqlx::PgPool;

use super::repo_types::Task;

impl Task {
    pub async fn list_by_owner(db: &PgPool, owner_id: i64) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, complete, owner_id
            FROM tasks
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Every task regardless of owner; admin oversight only.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, complete, owner_id
            FROM tasks
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Fetch one task, visible only to its owner.
    pub async fn find_owned(db: &PgPool, id: i64, owner_id: i64) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, complete, owner_id
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn create(
        db: &PgPool,
        owner_id: i64,
        title: &str,
        description: &str,
        priority: i32,
        complete: bool,
    ) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, priority, complete, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, priority, complete, owner_id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(complete)
        .bind(owner_id)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    /// Update an owned task; `None` when it does not exist or belongs to
    /// someone else.
    pub async fn update_owned(
        db: &PgPool,
        id: i64,
        owner_id: i64,
        title: &str,
        description: &str,
        priority: i32,
        complete: bool,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, priority = $5, complete = $6
            WHERE id = $1 AND owner_id = $2
            RETURNING id, title, description, priority, complete, owner_id
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(complete)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn delete_owned(db: &PgPool, id: i64, owner_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Owner check deliberately absent; admin oversight only.
    pub async fn delete_any(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
