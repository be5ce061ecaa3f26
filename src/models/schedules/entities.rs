use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 班级的学期安排
///
/// 一个班级可以有多条安排，id 最小的一条视为主安排。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub class_id: i64,
    pub term: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Schedule {
    /// 学期时长，结束早于开始时为负
    pub fn duration(&self) -> chrono::Duration {
        self.end_date.signed_duration_since(self.start_date)
    }

    /// `today` 是否落在学期内（含首尾）
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

/// 写入用的安排字段
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInput {
    pub term: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(start: (i32, u32, u32), end: (i32, u32, u32)) -> Schedule {
        Schedule {
            id: 1,
            class_id: 1,
            term: "Spring 2024".to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn test_duration() {
        let s = schedule((2024, 3, 1), (2024, 3, 31));
        assert_eq!(s.duration().num_days(), 30);
    }

    #[test]
    fn test_is_current_inclusive() {
        let s = schedule((2024, 3, 1), (2024, 3, 31));
        assert!(s.is_current(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(s.is_current(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!s.is_current(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_inverted_range_is_kept() {
        let s = schedule((2024, 3, 10), (2024, 3, 1));
        assert!(s.duration().num_days() < 0);
        assert!(!s.is_current(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
    }
}
