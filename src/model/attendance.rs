use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::dates::hhmm;

/// One employee's clock-in/clock-out pair for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 12)]
    pub id: i64,

    #[serde(rename = "id_utente")]
    #[schema(example = 1)]
    pub employee_id: i64,

    #[serde(rename = "data")]
    #[schema(example = "2025-03-14", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[serde(rename = "orario_ingresso", with = "hhmm")]
    #[schema(example = "08:30", value_type = String)]
    pub entry_time: NaiveTime,

    #[serde(rename = "orario_uscita", with = "hhmm")]
    #[schema(example = "17:00", value_type = String)]
    pub exit_time: NaiveTime,

    /// Minutes between entry and exit
    #[serde(rename = "tempo_lavorativo")]
    #[schema(example = 510)]
    pub worked_minutes: i64,
}

impl Attendance {
    pub fn worked_hours(&self) -> f64 {
        self.worked_minutes as f64 / 60.0
    }
}

/// Whole minutes from `entry` to `exit`. Callers guarantee `entry < exit`.
pub fn worked_minutes(entry: NaiveTime, exit: NaiveTime) -> i64 {
    (exit - entry).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn worked_minutes_counts_whole_minutes() {
        assert_eq!(worked_minutes(t(8, 30), t(17, 0)), 510);
        assert_eq!(worked_minutes(t(0, 0), t(23, 59)), 1439);
        assert_eq!(worked_minutes(t(12, 0), t(12, 1)), 1);
    }

    #[test]
    fn worked_minutes_matches_difference_for_every_quarter_hour() {
        for start in (0..24 * 60).step_by(15) {
            for end in ((start + 15)..24 * 60).step_by(45) {
                let entry = t(start / 60, start % 60);
                let exit = t(end / 60, end % 60);
                assert_eq!(worked_minutes(entry, exit), (end - start) as i64);
            }
        }
    }

    #[test]
    fn serializes_with_front_end_field_names() {
        let record = Attendance {
            id: 3,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            entry_time: t(8, 30),
            exit_time: t(17, 0),
            worked_minutes: 510,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["data"], "2025-03-14");
        assert_eq!(value["orario_ingresso"], "08:30");
        assert_eq!(value["orario_uscita"], "17:00");
        assert_eq!(value["tempo_lavorativo"], 510);
        assert_eq!(record.worked_hours(), 8.5);
    }
}
