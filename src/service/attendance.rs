use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{Attendance, worked_minutes};
use crate::service::employee::find_employee;
use crate::utils::dates::month_bounds;

const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";

const SELECT_ATTENDANCE: &str =
    "SELECT id, employee_id, date, entry_time, exit_time, worked_minutes FROM attendance";

/// Outcome of a clock-in/clock-out submission.
#[derive(Debug)]
pub struct RecordedAttendance {
    pub record: Attendance,
    /// True when a record for the same employee and day already existed and was returned unchanged
    pub can_edit: bool,
}

pub async fn record_attendance(
    pool: &SqlitePool,
    employee_id: i64,
    date: NaiveDate,
    entry_time: NaiveTime,
    exit_time: NaiveTime,
) -> AppResult<RecordedAttendance> {
    if entry_time >= exit_time {
        return Err(AppError::validation(
            "L'orario di ingresso deve essere minore di quello di uscita.",
        ));
    }

    if find_employee(pool, employee_id).await?.is_none() {
        return Err(AppError::not_found("Utente non trovato."));
    }

    if let Some(existing) = find_for_day(pool, employee_id, date).await? {
        return Ok(RecordedAttendance {
            record: existing,
            can_edit: true,
        });
    }

    insert_attendance(pool, employee_id, date, entry_time, exit_time).await
}

/// Inserts the record, falling back to the stored one when the same day is already taken.
async fn insert_attendance(
    pool: &SqlitePool,
    employee_id: i64,
    date: NaiveDate,
    entry_time: NaiveTime,
    exit_time: NaiveTime,
) -> AppResult<RecordedAttendance> {
    let minutes = worked_minutes(entry_time, exit_time);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, entry_time, exit_time, worked_minutes)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .bind(entry_time)
    .bind(exit_time)
    .bind(minutes)
    .execute(pool)
    .await;

    match result {
        Ok(done) => {
            let id = done.last_insert_rowid();
            info!(attendance_id = id, employee_id, %date, minutes, "Attendance recorded");
            Ok(RecordedAttendance {
                record: Attendance {
                    id,
                    employee_id,
                    date,
                    entry_time,
                    exit_time,
                    worked_minutes: minutes,
                },
                can_edit: false,
            })
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                match db_err.code().as_deref() {
                    // Another submission for the same day won the race
                    Some(SQLITE_CONSTRAINT_UNIQUE) => {
                        warn!(employee_id, %date, "Concurrent attendance submission");
                        if let Some(existing) = find_for_day(pool, employee_id, date).await? {
                            return Ok(RecordedAttendance {
                                record: existing,
                                can_edit: true,
                            });
                        }
                    }
                    Some(SQLITE_CONSTRAINT_FOREIGNKEY) => {
                        return Err(AppError::not_found("Utente non trovato."));
                    }
                    _ => {}
                }
            }
            Err(e.into())
        }
    }
}

async fn find_for_day(
    pool: &SqlitePool,
    employee_id: i64,
    date: NaiveDate,
) -> AppResult<Option<Attendance>> {
    let sql = format!("{SELECT_ATTENDANCE} WHERE employee_id = ? AND date = ?");
    let record = sqlx::query_as::<_, Attendance>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// Records of `employee_id` dated within `month`/`year`, by date then entry time.
pub async fn list_attendance(
    pool: &SqlitePool,
    employee_id: i64,
    month: u32,
    year: i32,
) -> AppResult<Vec<Attendance>> {
    let (start, end) = month_bounds(month, year)?;

    let sql = format!(
        "{SELECT_ATTENDANCE} WHERE employee_id = ? AND date >= ? AND date < ? ORDER BY date ASC, entry_time ASC, id ASC"
    );
    let records = sqlx::query_as::<_, Attendance>(&sql)
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

pub async fn delete_attendance(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Timbratura non trovata."));
    }

    info!(attendance_id = id, "Attendance deleted");
    Ok(())
}
