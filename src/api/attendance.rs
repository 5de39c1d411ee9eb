use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::model::attendance::Attendance;
use crate::models::MessageResponse;
use crate::service::attendance as attendance_service;
use crate::utils::dates::{month_of, parse_date, parse_time};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAttendance {
    #[serde(rename = "id_utente")]
    #[schema(example = 1)]
    pub employee_id: i64,

    #[serde(rename = "data")]
    #[schema(example = "2025-03-14", format = "date")]
    pub date: String,

    #[serde(rename = "orario_ingresso")]
    #[schema(example = "08:30")]
    pub entry_time: String,

    #[serde(rename = "orario_uscita")]
    #[schema(example = "17:00")]
    pub exit_time: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub message: String,

    #[serde(rename = "timbratura")]
    pub record: Attendance,

    /// True when a record for that day already existed; it is returned unchanged
    #[serde(rename = "modifica")]
    pub can_edit: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceDayQuery {
    /// Employee id
    #[param(example = 1)]
    pub utente: i64,

    /// Any day of the wanted month
    #[param(example = "2025-03-14")]
    pub data: String,
}

/// Record a clock-in/clock-out pair
#[utoipa::path(
    post,
    path = "/timbrature",
    request_body = CreateAttendance,
    responses(
        (status = 200, description = "Recorded, or the existing record for that day", body = AttendanceResponse),
        (status = 400, description = "Entry not before exit, or malformed date/time", body = Object, example = json!({
            "detail": "L'orario di ingresso deve essere minore di quello di uscita."
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(skip(pool, payload), fields(employee_id = payload.employee_id))]
pub async fn create_attendance(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateAttendance>,
) -> AppResult<HttpResponse> {
    let date = parse_date(&payload.date)?;
    let entry_time = parse_time(&payload.entry_time)?;
    let exit_time = parse_time(&payload.exit_time)?;

    let outcome = attendance_service::record_attendance(
        pool.get_ref(),
        payload.employee_id,
        date,
        entry_time,
        exit_time,
    )
    .await?;

    let message = if outcome.can_edit {
        "Esiste già una timbratura per questo utente in questa data."
    } else {
        "Timbratura registrata con successo!"
    };

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        message: message.to_string(),
        record: outcome.record,
        can_edit: outcome.can_edit,
    }))
}

/// Month of attendance records for an employee
#[utoipa::path(
    get,
    path = "/timbrature",
    params(AttendanceDayQuery),
    responses(
        (status = 200, description = "Records of the month containing `data`", body = [Attendance]),
        (status = 400, description = "Malformed date")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceDayQuery>,
) -> AppResult<HttpResponse> {
    let (month, year) = month_of(parse_date(&query.data)?);
    let records =
        attendance_service::list_attendance(pool.get_ref(), query.utente, month, year).await?;

    Ok(HttpResponse::Ok().json(records))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/timbrature/{id}",
    params(
        ("id", Path, description = "Attendance record id")
    ),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "detail": "Timbratura non trovata."
        }))
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    attendance_service::delete_attendance(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Timbratura eliminata con successo.")))
}
