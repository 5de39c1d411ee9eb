use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::model::job::JobRecord;

const SELECT_JOBS: &str =
    "SELECT id, date, client, contract, settled, project_code, settlement, delivery_extra FROM jobs";

/// Fields of a job record before it is stored.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub date: NaiveDate,
    pub client: String,
    pub contract: f64,
    pub settled: f64,
    pub project_code: String,
    pub settlement: String,
    pub delivery_extra: f64,
}

/// Stores the job as given: no duplicate check and no bound on `settled`.
pub async fn record_job(pool: &SqlitePool, job: NewJob) -> AppResult<JobRecord> {
    let id = sqlx::query(
        r#"
        INSERT INTO jobs (date, client, contract, settled, project_code, settlement, delivery_extra)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(job.date)
    .bind(&job.client)
    .bind(job.contract)
    .bind(job.settled)
    .bind(&job.project_code)
    .bind(&job.settlement)
    .bind(job.delivery_extra)
    .execute(pool)
    .await?
    .last_insert_rowid();

    info!(job_id = id, date = %job.date, project_code = %job.project_code, "Job recorded");

    Ok(JobRecord {
        id,
        date: job.date,
        client: job.client,
        contract: job.contract,
        settled: job.settled,
        project_code: job.project_code,
        settlement: job.settlement,
        delivery_extra: job.delivery_extra,
    })
}

pub async fn list_jobs_by_day(pool: &SqlitePool, date: NaiveDate) -> AppResult<Vec<JobRecord>> {
    let sql = format!("{SELECT_JOBS} WHERE date = ? ORDER BY id");
    let jobs = sqlx::query_as::<_, JobRecord>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(jobs)
}

/// Jobs dated within `[from, to]`, optionally restricted to one project code.
pub async fn list_jobs_by_range(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
    project_code: Option<&str>,
) -> AppResult<Vec<JobRecord>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_JOBS);
    query
        .push(" WHERE date BETWEEN ")
        .push_bind(from)
        .push(" AND ")
        .push_bind(to);

    if let Some(code) = project_code.filter(|c| !c.is_empty()) {
        query.push(" AND project_code = ").push_bind(code.to_string());
    }
    query.push(" ORDER BY date ASC, id ASC");

    debug!(sql = %query.sql(), %from, %to, ?project_code, "Fetching jobs in range");

    let jobs = query.build_query_as::<JobRecord>().fetch_all(pool).await?;
    Ok(jobs)
}

pub async fn delete_job(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Lavoro non trovato"));
    }

    info!(job_id = id, "Job deleted");
    Ok(())
}
