use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{instrument, warn};
use utoipa::IntoParams;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::attendance::Attendance;
use crate::report::document::{render_attendance, render_jobs, write_document};
use crate::report::totals::JobReport;
use crate::service::{
    attendance as attendance_service, employee as employee_service, job as job_service,
};
use crate::utils::dates::parse_date;

const ATTENDANCE_FILE: &str = "timbrature.pdf";
const ACTIVITY_FILE: &str = "attivita.pdf";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceMonthQuery {
    /// Employee id
    #[param(example = 1)]
    pub utente: i64,

    #[param(example = 3)]
    pub mese: u32,

    #[param(example = 2025)]
    pub anno: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityExportQuery {
    /// First day, inclusive (YYYY-MM-DD)
    #[param(example = "2025-03-01")]
    pub data_da: String,

    /// Last day, inclusive (YYYY-MM-DD)
    #[param(example = "2025-03-31")]
    pub data_a: String,

    /// Optional project code filter
    pub commessa: Option<String>,

    /// Also save the document under the configured export directory
    pub salva: Option<bool>,
}

fn pdf_attachment(file_name: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name.to_string())],
        })
        .body(bytes)
}

/// Attendance of an employee for a month, as JSON
#[utoipa::path(
    get,
    path = "/esportazione/timbrature",
    params(AttendanceMonthQuery),
    responses(
        (status = 200, description = "Records of the month", body = [Attendance]),
        (status = 400, description = "Invalid month")
    ),
    tag = "Export"
)]
pub async fn attendance_month(
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceMonthQuery>,
) -> AppResult<HttpResponse> {
    let records: Vec<Attendance> =
        attendance_service::list_attendance(pool.get_ref(), query.utente, query.mese, query.anno)
            .await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Attendance of an employee for a month, as a PDF download
#[utoipa::path(
    get,
    path = "/esporta/timbrature",
    params(AttendanceMonthQuery),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 400, description = "Invalid month")
    ),
    tag = "Export"
)]
#[instrument(skip(pool, query), fields(employee_id = query.utente, month = query.mese, year = query.anno))]
pub async fn attendance_pdf(
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceMonthQuery>,
) -> AppResult<HttpResponse> {
    let records =
        attendance_service::list_attendance(pool.get_ref(), query.utente, query.mese, query.anno)
            .await?;
    let employee = employee_service::find_employee(pool.get_ref(), query.utente).await?;

    let bytes = render_attendance(
        employee.as_ref().map(|e| e.full_name.as_str()),
        query.mese,
        query.anno,
        &records,
    )?;

    Ok(pdf_attachment(ATTENDANCE_FILE, bytes))
}

/// Activity report for a date range, as a PDF download
#[utoipa::path(
    get,
    path = "/esporta/attivita",
    params(ActivityExportQuery),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 400, description = "Malformed date"),
        (status = 404, description = "No jobs in the range", body = Object, example = json!({
            "detail": "Nessuna attività trovata per il periodo selezionato."
        }))
    ),
    tag = "Export"
)]
#[instrument(skip(pool, config, query))]
pub async fn activity_pdf(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    query: web::Query<ActivityExportQuery>,
) -> AppResult<HttpResponse> {
    let from = parse_date(&query.data_da)?;
    let to = parse_date(&query.data_a)?;

    let jobs =
        job_service::list_jobs_by_range(pool.get_ref(), from, to, query.commessa.as_deref()).await?;
    if jobs.is_empty() {
        return Err(AppError::not_found(
            "Nessuna attività trovata per il periodo selezionato.",
        ));
    }

    let bytes = render_jobs(from, to, &JobReport::new(jobs))?;

    if query.salva.unwrap_or(false) {
        match &config.export_dir {
            Some(dir) => {
                write_document(dir, ACTIVITY_FILE, &bytes)?;
            }
            None => warn!("Save requested but EXPORT_DIR is not set, skipping disk write"),
        }
    }

    Ok(pdf_attachment(ACTIVITY_FILE, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::service::attendance::record_attendance;
    use crate::service::employee::create_employee;
    use crate::service::job::{NewJob, record_job};
    use actix_web::{http::StatusCode, http::header, test};
    use chrono::{NaiveDate, NaiveTime};

    async fn seed_job(pool: &SqlitePool, date: NaiveDate) {
        record_job(
            pool,
            NewJob {
                date,
                client: "Rossi".into(),
                contract: 1000.0,
                settled: 1000.0,
                project_code: "MOV".into(),
                settlement: "Contanti".into(),
                delivery_extra: 0.0,
            },
        )
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn attendance_json_and_pdf() {
        let pool = test_pool().await;
        let emp = create_employee(&pool, "Giovanni Tarantino").await.unwrap();
        record_attendance(
            &pool,
            emp.id,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        )
        .await
        .unwrap();
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri(&format!("/esportazione/timbrature?utente={}&mese=12&anno=2025", emp.id))
            .to_request();
        let records: Vec<Attendance> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.len(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/esporta/timbrature?utente={}&mese=12&anno=2025", emp.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("timbrature.pdf"));

        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF-1.5"));
    }

    #[actix_web::test]
    async fn invalid_month_is_bad_request() {
        let pool = test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri("/esporta/timbrature?utente=1&mese=13&anno=2025")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn activity_pdf_needs_matching_jobs() {
        let pool = test_pool().await;
        seed_job(&pool, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()).await;
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri("/esporta/attivita?data_da=2025-04-01&data_a=2025-04-30")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::get()
            .uri("/esporta/attivita?data_da=2025-03-01&data_a=2025-03-31&commessa=MOV")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF"));
    }

    #[actix_web::test]
    async fn activity_pdf_is_saved_only_on_request() {
        let pool = test_pool().await;
        seed_job(&pool, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()).await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_tests();
        config.export_dir = Some(dir.path().to_path_buf());
        let app = test_app!(pool, config);
        let saved = dir.path().join(ACTIVITY_FILE);

        let req = test::TestRequest::get()
            .uri("/esporta/attivita?data_da=2025-03-01&data_a=2025-03-31")
            .to_request();
        test::call_service(&app, req).await;
        assert!(!saved.exists());

        let req = test::TestRequest::get()
            .uri("/esporta/attivita?data_da=2025-03-01&data_a=2025-03-31&salva=true")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = test::read_body(resp).await;
        assert_eq!(std::fs::read(&saved).unwrap(), body.to_vec());
    }
}
