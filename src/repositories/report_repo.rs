//! 报表元数据仓库

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::stores::ReportStore;
use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::{NewReport, Report, ReportState, ReportStatus, ReportType};

/// reports 表的原始行
#[derive(Debug, FromRow)]
struct ReportRow {
    id: Uuid,
    farm_id: Uuid,
    name: String,
    report_type: ReportType,
    parameters: Vec<String>,
    date_from: DateTime<Utc>,
    date_to: DateTime<Utc>,
    status: ReportStatus,
    file_size_bytes: Option<i64>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReportRow> for Report {
    fn from(row: ReportRow) -> Self {
        Report {
            id: row.id,
            farm_id: row.farm_id,
            name: row.name,
            report_type: row.report_type,
            parameters: row.parameters,
            date_from: row.date_from,
            date_to: row.date_to,
            state: ReportState::from_parts(row.status, row.file_size_bytes, row.failure_reason),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// 报表元数据仓库
#[derive(Clone)]
pub struct ReportRepository {
    pool: PostgresPool,
}

impl ReportRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for ReportRepository {
    async fn create_report(&self, report: &NewReport) -> Result<Report, AppError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, ReportRow>(
            r#"
            INSERT INTO reports (id, farm_id, name, report_type, parameters, date_from, date_to,
                                 status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report.farm_id)
        .bind(&report.name)
        .bind(report.report_type)
        .bind(&report.parameters)
        .bind(report.date_from)
        .bind(report.date_to)
        .bind(ReportStatus::Generating)
        .bind(now)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(row.into())
    }

    async fn save_state(&self, id: Uuid, state: &ReportState) -> Result<Report, AppError> {
        let next = ReportState::Generating.transition(state.clone())?;

        let row = sqlx::query_as::<_, ReportRow>(
            r#"
            UPDATE reports SET
                status = $2,
                file_size_bytes = $3,
                failure_reason = $4,
                updated_at = NOW()
            WHERE id = $1 AND status = 'generating'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next.status())
        .bind(next.file_size_bytes())
        .bind(next.failure_reason())
        .fetch_optional(self.pool.pool())
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => match self.find_report(id).await? {
                Some(current) => Err(AppError::Conflict(format!(
                    "报表 {} 已处于 {:?} 状态",
                    id,
                    current.state.status()
                ))),
                None => Err(AppError::NotFound(format!("报表不存在: {}", id))),
            },
        }
    }

    async fn find_report(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(row.map(Report::from))
    }

    async fn list_reports(&self, farm_id: Option<Uuid>, limit: i64) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT * FROM reports
            WHERE ($1::uuid IS NULL OR farm_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(farm_id)
        .bind(limit)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows.into_iter().map(Report::from).collect())
    }
}
