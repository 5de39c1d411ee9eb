use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// How the settled amount of a job was paid. Labels are the ones stored in the `settlement` column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumString, EnumIter, AsRefStr)]
pub enum SettlementMethod {
    #[strum(serialize = "Contanti")]
    Cash,
    #[strum(serialize = "Assegno")]
    Check,
    #[strum(serialize = "Bonifico")]
    BankTransfer,
    #[strum(serialize = "Finanziamento")]
    Financing,
    #[strum(serialize = "Sospeso")]
    Pending,
    #[strum(serialize = "Pag. Negozio")]
    InStore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 4,
        "data": "2025-03-14",
        "cliente": "Rossi",
        "contratto": 1000.0,
        "saldato": 800.0,
        "commessa": "MOV",
        "saldo": "Contanti",
        "extra_consegna": 25.0
    })
)]
pub struct JobRecord {
    pub id: i64,

    #[serde(rename = "data")]
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,

    #[serde(rename = "cliente")]
    pub client: String,

    #[serde(rename = "contratto")]
    pub contract: f64,

    #[serde(rename = "saldato")]
    pub settled: f64,

    /// Project code, e.g. "MOV" or "OLIE"
    #[serde(rename = "commessa")]
    pub project_code: String,

    #[serde(rename = "saldo")]
    pub settlement: String,

    #[serde(rename = "extra_consegna")]
    pub delivery_extra: f64,
}

impl JobRecord {
    /// `None` when the stored label is not one of the known settlement methods.
    pub fn method(&self) -> Option<SettlementMethod> {
        self.settlement.parse().ok()
    }
}
