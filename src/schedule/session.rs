use serde::{Deserialize, Serialize};

/// One scheduled occurrence of a course section on a day/period range.
///
/// Days run 1..=6 (Monday..Saturday) and periods 1..=13 in normal use, but the
/// record itself does not enforce either range. The provider filters before
/// anything reaches the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub course_id: String,
    pub section_id: String,
    #[serde(default)]
    pub course_name: Option<String>,
    pub day_of_week: i32,
    pub start_period: i32,
    pub end_period: i32,
    #[serde(default)]
    pub rooms_info: Option<String>,
}

impl Session {
    /// Number of period rows the session spans. Zero or negative for malformed
    /// records where `end_period < start_period`.
    pub fn span(&self) -> i32 {
        self.end_period - self.start_period + 1
    }

    /// True if `period` falls inside `[start_period, end_period]`
    pub fn covers(&self, period: i32) -> bool {
        self.start_period <= period && period <= self.end_period
    }

    /// Course name when known, otherwise the course id
    pub fn display_label(&self) -> &str {
        self.course_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.course_id)
    }

    /// Identity used for dedup and for matching optimistic updates
    pub fn key(&self) -> (&str, &str, i32, i32, i32) {
        (
            &self.section_id,
            &self.course_id,
            self.day_of_week,
            self.start_period,
            self.end_period,
        )
    }
}

#[cfg(test)]
pub(crate) fn session(course_id: &str, section_id: &str, day: i32, start: i32, end: i32) -> Session {
    Session {
        course_id: course_id.to_string(),
        section_id: section_id.to_string(),
        course_name: None,
        day_of_week: day,
        start_period: start,
        end_period: end,
        rooms_info: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_counts_inclusive_periods() {
        assert_eq!(session("CS101", "S1", 2, 3, 4).span(), 2);
        assert_eq!(session("CS101", "S1", 2, 5, 5).span(), 1);
        assert_eq!(session("CS101", "S1", 2, 5, 3).span(), -1);
    }

    #[test]
    fn covers_is_inclusive_on_both_ends() {
        let s = session("CS101", "S1", 1, 3, 5);
        assert!(!s.covers(2));
        assert!(s.covers(3));
        assert!(s.covers(5));
        assert!(!s.covers(6));
    }

    #[test]
    fn display_label_falls_back_to_course_id() {
        let mut s = session("CO2013", "L01", 1, 1, 2);
        assert_eq!(s.display_label(), "CO2013");

        s.course_name = Some("   ".to_string());
        assert_eq!(s.display_label(), "CO2013");

        s.course_name = Some("Database Systems".to_string());
        assert_eq!(s.display_label(), "Database Systems");
    }
}
