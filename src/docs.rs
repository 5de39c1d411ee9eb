use crate::api::attendance::{AttendanceResponse, CreateAttendance};
use crate::api::employee::CreateEmployee;
use crate::api::job::{CreateJob, DayReq, JobCreatedResponse};
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::job::JobRecord;
use crate::models::{LoginReq, LoginResponse, MessageResponse};
use crate::report::totals::{JobReport, JobTotals};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presenze API",
        version = "0.1.0",
        description = r#"
## Attendance and job billing

Backend for a small removal company's office: employees clock in and out,
completed jobs are recorded with their contract and settlement, and both can
be exported as printable PDF reports.

### Key Features
- **Attendance**
  - One clock-in/clock-out pair per employee and day, worked minutes computed on save
- **Employees**
  - List, add and remove employees; removing one also removes their attendance
- **Jobs**
  - Daily listing, range listing with totals per settlement method
- **Exports**
  - Monthly attendance sheet and activity report as PDF downloads

### Errors
Every error answers with `{"detail": "<message>"}`.

---
Built with **Rust**, **Actix Web**, **SQLx**, **lopdf** and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::attendance::create_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::delete_employee,

        crate::api::job::jobs_of_day,
        crate::api::job::create_job,
        crate::api::job::delete_job,
        crate::api::job::activity_report,

        crate::api::export::attendance_month,
        crate::api::export::attendance_pdf,
        crate::api::export::activity_pdf
    ),
    components(
        schemas(
            LoginReq,
            LoginResponse,
            MessageResponse,
            CreateAttendance,
            AttendanceResponse,
            Attendance,
            CreateEmployee,
            Employee,
            CreateJob,
            DayReq,
            JobCreatedResponse,
            JobRecord,
            JobTotals,
            JobReport
        )
    ),
    tags(
        (name = "Auth", description = "Passcode login"),
        (name = "Attendance", description = "Clock-in/clock-out records"),
        (name = "Employee", description = "Employee management"),
        (name = "Job", description = "Job records and activity totals"),
        (name = "Export", description = "Monthly and range exports, JSON and PDF"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/login",
            "/timbrature",
            "/timbrature/{id}",
            "/users",
            "/users/{id}",
            "/lavoro",
            "/lavoro/nuovo",
            "/lavoro/{id}",
            "/attivita",
            "/esportazione/timbrature",
            "/esporta/timbrature",
            "/esporta/attivita",
        ] {
            assert!(paths.contains(&expected), "{expected} missing from the API doc");
        }
    }
}
