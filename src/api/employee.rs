use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::model::employee::Employee;
use crate::models::MessageResponse;
use crate::service::employee as employee_service;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Anna Verdi")]
    pub full_name: String,
}

/// List employees
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All employees", body = [Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let employees = employee_service::list_employees(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Empty name")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateEmployee>,
) -> AppResult<HttpResponse> {
    let employee = employee_service::create_employee(pool.get_ref(), &payload.full_name).await?;
    Ok(HttpResponse::Created().json(employee))
}

/// Delete Employee and all of their attendance records
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "detail": "Utente non trovato."
        }))
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    employee_service::delete_employee(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Utente eliminato con successo.")))
}
