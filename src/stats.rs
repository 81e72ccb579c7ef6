use serde::Serialize;

use crate::models::{AttendanceData, Status};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub present: i64,
    pub absent: i64,
    pub total: i64,
    pub percentage: f64,
}

/// Aggregates a set of ledger rows into present/absent counts and a
/// percentage. NO_CLASS days count neither for nor against attendance, so
/// they stay out of `total` and out of the percentage base. Order of the
/// input rows does not matter.
pub fn calculate_stats(records: &[AttendanceData]) -> AttendanceStats {
    let present = records
        .iter()
        .filter(|r| r.status == Status::Present)
        .count() as i64;
    let absent = records
        .iter()
        .filter(|r| r.status == Status::Absent)
        .count() as i64;

    let total = present + absent;
    let percentage = if total > 0 {
        let raw = present as f64 / total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    } else {
        0.0
    };

    AttendanceStats {
        present,
        absent,
        total,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record(day: u32, status: Status) -> AttendanceData {
        AttendanceData {
            uuid: Uuid::new_v4(),
            subject: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn records(present: u32, absent: u32, no_class: u32) -> Vec<AttendanceData> {
        let mut out = Vec::new();
        let mut day = 1;
        for _ in 0..present {
            out.push(record(day, Status::Present));
            day += 1;
        }
        for _ in 0..absent {
            out.push(record(day, Status::Absent));
            day += 1;
        }
        for _ in 0..no_class {
            out.push(record(day, Status::NoClass));
            day += 1;
        }
        out
    }

    #[test]
    fn empty_ledger_is_all_zeros() {
        let stats = calculate_stats(&[]);
        assert_eq!(
            stats,
            AttendanceStats {
                present: 0,
                absent: 0,
                total: 0,
                percentage: 0.0
            }
        );
    }

    #[test]
    fn eight_present_two_absent_is_eighty_percent() {
        let stats = calculate_stats(&records(8, 2, 0));
        assert_eq!(stats.present, 8);
        assert_eq!(stats.absent, 2);
        assert_eq!(stats.total, 10);
        assert_eq!(stats.percentage, 80.0);
    }

    #[test]
    fn no_class_days_do_not_touch_the_percentage_base() {
        let with_gaps = calculate_stats(&records(8, 2, 5));
        let without = calculate_stats(&records(8, 2, 0));
        assert_eq!(with_gaps, without);
    }

    #[test]
    fn only_no_class_days_behave_like_an_empty_ledger() {
        let stats = calculate_stats(&records(0, 0, 4));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percentage, 0.0);
    }

    #[test]
    fn total_is_always_present_plus_absent() {
        for (p, a, n) in [(0, 0, 0), (1, 0, 3), (5, 7, 2), (13, 1, 0)] {
            let stats = calculate_stats(&records(p, a, n));
            assert_eq!(stats.total, stats.present + stats.absent);
        }
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        // 1/3 -> 33.333.. -> 33.33
        let stats = calculate_stats(&records(1, 2, 0));
        assert_eq!(stats.percentage, 33.33);
        // 2/3 -> 66.666.. -> 66.67
        let stats = calculate_stats(&records(2, 1, 0));
        assert_eq!(stats.percentage, 66.67);
    }
}
