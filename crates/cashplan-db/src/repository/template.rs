//! # Template Repository
//!
//! Salary templates: named employee profiles that feed batch runs.

use chrono::{SubsecRound, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::timestamp;
use crate::error::{DbError, DbResult};
use cashplan_core::validation::validate_uuid;
use cashplan_core::{NewTemplate, SalaryTemplate};

/// Repository for salary templates.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: SqlitePool,
}

impl TemplateRepository {
    /// Creates a new TemplateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TemplateRepository { pool }
    }

    /// All templates ordered by name.
    pub async fn list(&self) -> DbResult<Vec<SalaryTemplate>> {
        let templates = sqlx::query_as::<_, SalaryTemplate>(
            r#"
            SELECT id, name, rank, department, salary, created_at
            FROM salary_templates
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<SalaryTemplate>> {
        validate_uuid(id)?;

        let template = sqlx::query_as::<_, SalaryTemplate>(
            r#"
            SELECT id, name, rank, department, salary, created_at
            FROM salary_templates
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Creates a template. Name and a positive salary are required.
    pub async fn create(&self, input: &NewTemplate) -> DbResult<SalaryTemplate> {
        input.validate()?;

        let template = SalaryTemplate {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            rank: input.rank.trim().to_string(),
            department: input.department.trim().to_string(),
            salary: input.salary,
            created_at: Utc::now().trunc_subsecs(6),
        };

        sqlx::query(
            r#"
            INSERT INTO salary_templates (id, name, rank, department, salary, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(&template.rank)
        .bind(&template.department)
        .bind(template.salary)
        .bind(timestamp(template.created_at))
        .execute(&self.pool)
        .await?;

        info!(id = %template.id, name = %template.name, "Template created");
        Ok(template)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        validate_uuid(id)?;

        let result = sqlx::query("DELETE FROM salary_templates WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Template", id));
        }

        info!(id = %id, "Template deleted");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM salary_templates")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> TemplateRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().templates()
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let repo = repo().await;
        repo.create(&NewTemplate::new("Teacher", "Senior", "Education", 750_000))
            .await
            .unwrap();
        let accountant = repo
            .create(&NewTemplate::new("Accountant", "Grade 3", "", 980_000))
            .await
            .unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Accountant", "Teacher"]);

        let loaded = repo.get(&accountant.id).await.unwrap().unwrap();
        assert_eq!(loaded.department, "");
        assert_eq!(loaded.created_at, accountant.created_at);

        repo.delete(&accountant.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(matches!(
            repo.delete(&accountant.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_requires_name_and_salary() {
        let repo = repo().await;
        assert!(repo.create(&NewTemplate::new(" ", "", "", 1_000)).await.is_err());
        assert!(repo.create(&NewTemplate::new("Clerk", "", "", 0)).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
