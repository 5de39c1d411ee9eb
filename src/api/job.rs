use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::model::job::JobRecord;
use crate::models::MessageResponse;
use crate::report::totals::JobReport;
use crate::service::job::{self as job_service, NewJob};
use crate::utils::dates::parse_date;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateJob {
    #[serde(rename = "data")]
    #[schema(example = "2025-03-14", format = "date")]
    pub date: String,

    #[serde(rename = "cliente")]
    #[schema(example = "Rossi")]
    pub client: String,

    #[serde(rename = "contratto")]
    #[schema(example = 1000.0)]
    pub contract: f64,

    #[serde(rename = "saldato")]
    #[schema(example = 800.0)]
    pub settled: f64,

    #[serde(rename = "commessa")]
    #[schema(example = "MOV")]
    pub project_code: String,

    /// Contanti, Assegno, Bonifico, Finanziamento, Sospeso or Pag. Negozio
    #[serde(rename = "saldo")]
    #[schema(example = "Contanti")]
    pub settlement: String,

    #[serde(rename = "extra_consegna", default)]
    #[schema(example = 25.0)]
    pub delivery_extra: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobCreatedResponse {
    pub message: String,
    #[serde(rename = "lavoro")]
    pub job: JobRecord,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DayReq {
    #[serde(rename = "data")]
    #[schema(example = "2025-03-14", format = "date")]
    pub date: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// First day, inclusive (YYYY-MM-DD)
    #[param(example = "2025-03-01")]
    pub data_da: String,

    /// Last day, inclusive (YYYY-MM-DD)
    #[param(example = "2025-03-31")]
    pub data_a: String,

    /// Optional project code filter
    pub commessa: Option<String>,
}

/// Jobs of a single day
#[utoipa::path(
    post,
    path = "/lavoro",
    request_body = DayReq,
    responses(
        (status = 200, description = "Jobs dated on that day", body = [JobRecord]),
        (status = 400, description = "Malformed date")
    ),
    tag = "Job"
)]
pub async fn jobs_of_day(
    pool: web::Data<SqlitePool>,
    payload: web::Json<DayReq>,
) -> AppResult<HttpResponse> {
    let date = parse_date(&payload.date)?;
    let jobs = job_service::list_jobs_by_day(pool.get_ref(), date).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

/// Record a job
#[utoipa::path(
    post,
    path = "/lavoro/nuovo",
    request_body = CreateJob,
    responses(
        (status = 200, description = "Job recorded", body = JobCreatedResponse),
        (status = 400, description = "Malformed date")
    ),
    tag = "Job"
)]
#[instrument(skip(pool, payload))]
pub async fn create_job(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateJob>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let date = parse_date(&payload.date)?;

    let job = job_service::record_job(
        pool.get_ref(),
        NewJob {
            date,
            client: payload.client,
            contract: payload.contract,
            settled: payload.settled,
            project_code: payload.project_code,
            settlement: payload.settlement,
            delivery_extra: payload.delivery_extra.unwrap_or(0.0),
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(JobCreatedResponse {
        message: "Lavoro registrato con successo!".to_string(),
        job,
    }))
}

/// Delete a job
#[utoipa::path(
    delete,
    path = "/lavoro/{id}",
    params(
        ("id", Path, description = "Job id")
    ),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Job not found", body = Object, example = json!({
            "detail": "Lavoro non trovato"
        }))
    ),
    tag = "Job"
)]
pub async fn delete_job(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    job_service::delete_job(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Lavoro eliminato con successo!")))
}

/// Jobs in a date range with their totals
#[utoipa::path(
    get,
    path = "/attivita",
    params(RangeQuery),
    responses(
        (status = 200, description = "Jobs and totals", body = JobReport),
        (status = 400, description = "Malformed date", body = Object, example = json!({
            "detail": "Formato data non valido. Usa YYYY-MM-DD."
        }))
    ),
    tag = "Job"
)]
pub async fn activity_report(
    pool: web::Data<SqlitePool>,
    query: web::Query<RangeQuery>,
) -> AppResult<HttpResponse> {
    let from = parse_date(&query.data_da)?;
    let to = parse_date(&query.data_a)?;

    let jobs =
        job_service::list_jobs_by_range(pool.get_ref(), from, to, query.commessa.as_deref()).await?;

    Ok(HttpResponse::Ok().json(JobReport::new(jobs)))
}
