use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "Carlo D'Elia"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Carlo D'Elia")]
    pub full_name: String,
}

/// Employees created on first start when the table is empty.
pub const DEFAULT_EMPLOYEES: [&str; 3] = [
    "Carlo D'Elia",
    "Giovanni Tarantino",
    "Samuele Tarantino",
];
