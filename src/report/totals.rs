use serde::Serialize;
use utoipa::ToSchema;

use crate::model::job::{JobRecord, SettlementMethod};

/// Transport share levied on the total contract amount.
pub const TRANSPORT_RATE: f64 = 0.06;

/// Totals of a job listing, as shown in the activity report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct JobTotals {
    #[serde(rename = "contratto")]
    pub total_contract: f64,
    /// Cash + check + bank transfer + financing. Pending and in-store payments are not counted.
    #[serde(rename = "saldato")]
    pub total_settled: f64,
    #[serde(rename = "percentuale_trasporto")]
    pub transport_share: f64,
    #[serde(rename = "extra_su_consegne")]
    pub total_extras: f64,
    #[serde(rename = "totale_lordo")]
    pub gross_total: f64,

    #[serde(rename = "contanti")]
    pub cash: f64,
    #[serde(rename = "assegni")]
    pub check: f64,
    #[serde(rename = "bonifico")]
    pub bank_transfer: f64,
    #[serde(rename = "finanziamento")]
    pub financing: f64,
    #[serde(rename = "negozio")]
    pub in_store: f64,
    #[serde(rename = "sospeso")]
    pub pending: f64,
}

impl JobTotals {
    pub fn compute(jobs: &[JobRecord]) -> Self {
        let mut totals = JobTotals::default();

        for job in jobs {
            totals.total_contract += job.contract;
            totals.total_extras += job.delivery_extra;

            if let Some(method) = job.method() {
                *totals.subtotal_mut(method) += job.settled;
            }
        }

        totals.transport_share = totals.total_contract * TRANSPORT_RATE;
        totals.gross_total = totals.transport_share + totals.total_extras;
        totals.total_settled = totals.cash + totals.check + totals.bank_transfer + totals.financing;
        totals
    }

    pub fn subtotal(&self, method: SettlementMethod) -> f64 {
        match method {
            SettlementMethod::Cash => self.cash,
            SettlementMethod::Check => self.check,
            SettlementMethod::BankTransfer => self.bank_transfer,
            SettlementMethod::Financing => self.financing,
            SettlementMethod::Pending => self.pending,
            SettlementMethod::InStore => self.in_store,
        }
    }

    fn subtotal_mut(&mut self, method: SettlementMethod) -> &mut f64 {
        match method {
            SettlementMethod::Cash => &mut self.cash,
            SettlementMethod::Check => &mut self.check,
            SettlementMethod::BankTransfer => &mut self.bank_transfer,
            SettlementMethod::Financing => &mut self.financing,
            SettlementMethod::Pending => &mut self.pending,
            SettlementMethod::InStore => &mut self.in_store,
        }
    }

    /// Money actually received: cash, check, bank transfer and in-store payments.
    pub fn collected_total(&self) -> f64 {
        self.cash + self.check + self.bank_transfer + self.in_store
    }
}

/// Sum of every settled amount regardless of settlement method.
///
/// Kept apart from [`JobTotals::total_settled`]: the printed report's table total uses this one.
pub fn naive_settled_total(jobs: &[JobRecord]) -> f64 {
    jobs.iter().map(|job| job.settled).sum()
}

/// A job listing together with its totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobReport {
    #[serde(rename = "lavori")]
    pub jobs: Vec<JobRecord>,
    #[serde(rename = "totali")]
    pub totals: JobTotals,
}

impl JobReport {
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        let totals = JobTotals::compute(&jobs);
        Self { jobs, totals }
    }
}
