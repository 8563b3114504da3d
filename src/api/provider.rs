//! Session data provider: picks the endpoint for the selected view and
//! cleans what comes back before it reaches the layout engine.

use std::collections::HashSet;

use anyhow::Result;

use super::client::ScheduleClient;
use crate::config::UserType;
use crate::schedule::Session;

/// Days the grid can show (Monday..Saturday)
const FIRST_DAY: i32 = 1;
const LAST_DAY: i32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionQuery {
    All {
        course_id: Option<String>,
        semester: Option<String>,
    },
    ByRoom {
        building: Option<String>,
        room: Option<String>,
        semester: Option<String>,
    },
    ByUser {
        university_id: i64,
        user_type: UserType,
        semester: Option<String>,
    },
}

impl SessionQuery {
    pub fn semester(&self) -> Option<&str> {
        match self {
            SessionQuery::All { semester, .. }
            | SessionQuery::ByRoom { semester, .. }
            | SessionQuery::ByUser { semester, .. } => semester.as_deref(),
        }
    }
}

pub async fn fetch_sessions(client: &ScheduleClient, query: &SessionQuery) -> Result<Vec<Session>> {
    tracing::info!(?query, "fetching sessions");
    let sessions = match query {
        SessionQuery::All { course_id, semester } => {
            client
                .get_all_schedules(course_id.as_deref(), semester.as_deref())
                .await?
        }
        SessionQuery::ByRoom { building, room, semester } => {
            client
                .get_schedules_by_room(building.as_deref(), room.as_deref(), semester.as_deref())
                .await?
        }
        SessionQuery::ByUser { university_id, user_type, semester } => {
            client
                .get_schedules_by_user(*university_id, *user_type, semester.as_deref())
                .await?
        }
    };
    tracing::info!(count = sessions.len(), "sessions fetched");
    Ok(sessions)
}

/// Output of [`prepare_sessions`]
#[derive(Debug, Default)]
pub struct Prepared {
    pub sessions: Vec<Session>,
    /// Rows dropped for failing range checks (duplicates are not counted)
    pub rejected: usize,
}

/// Why a row can't be laid out, or `None` if it is fine
fn rejection_reason(session: &Session, period_count: i32) -> Option<&'static str> {
    if session.course_id.trim().is_empty() || session.section_id.trim().is_empty() {
        return Some("missing course or section id");
    }
    if !(FIRST_DAY..=LAST_DAY).contains(&session.day_of_week) {
        return Some("day outside Monday..Saturday");
    }
    let periods = 1..=period_count;
    if !periods.contains(&session.start_period) || !periods.contains(&session.end_period) {
        return Some("period outside the grid");
    }
    if session.end_period < session.start_period {
        return Some("end period before start period");
    }
    None
}

/// Validate and dedup a raw fetch. Keeps first-seen order.
pub fn prepare_sessions(raw: Vec<Session>, period_count: i32) -> Prepared {
    let mut prepared = Prepared::default();
    let mut seen = HashSet::new();

    for session in raw {
        if let Some(reason) = rejection_reason(&session, period_count) {
            tracing::warn!(
                course = %session.course_id,
                section = %session.section_id,
                day = session.day_of_week,
                start = session.start_period,
                end = session.end_period,
                reason,
                "dropping schedule row"
            );
            prepared.rejected += 1;
            continue;
        }

        let key = {
            let (c, s, d, a, b) = session.key();
            (c.to_string(), s.to_string(), d, a, b)
        };
        if !seen.insert(key) {
            tracing::debug!(course = %session.course_id, section = %session.section_id, "duplicate row");
            continue;
        }
        prepared.sessions.push(session);
    }

    prepared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::session;

    #[test]
    fn keeps_valid_rows_in_order() {
        let raw = vec![
            session("CO2013", "L01", 2, 3, 4),
            session("MT1003", "L02", 1, 1, 2),
            session("PH1003", "L01", 6, 12, 13),
        ];
        let prepared = prepare_sessions(raw.clone(), 13);
        assert_eq!(prepared.sessions, raw);
        assert_eq!(prepared.rejected, 0);
    }

    #[test]
    fn rejects_out_of_range_rows() {
        let raw = vec![
            session("CO2013", "L01", 0, 3, 4),
            session("CO2013", "L01", 7, 3, 4),
            session("CO2013", "L01", 2, 0, 4),
            session("CO2013", "L01", 2, 3, 14),
            session("CO2013", "L01", 2, 5, 4),
            session("", "L01", 2, 3, 4),
            session("CO2013", " ", 2, 3, 4),
            session("CO2013", "L01", 2, 3, 4),
        ];
        let prepared = prepare_sessions(raw, 13);
        assert_eq!(prepared.rejected, 7);
        assert_eq!(prepared.sessions, vec![session("CO2013", "L01", 2, 3, 4)]);
    }

    #[test]
    fn period_limit_follows_grid_size() {
        let raw = vec![session("CO2013", "L01", 2, 9, 10)];
        assert_eq!(prepare_sessions(raw.clone(), 10).sessions.len(), 1);
        assert_eq!(prepare_sessions(raw, 9).rejected, 1);
    }

    #[test]
    fn removes_exact_duplicates_only() {
        let mut renamed = session("CO2013", "L01", 2, 3, 4);
        renamed.course_name = Some("Database Systems".to_string());

        let raw = vec![
            session("CO2013", "L01", 2, 3, 4),
            session("CO2013", "L02", 2, 3, 4),
            renamed,
            session("CO2013", "L01", 2, 3, 5),
        ];
        let prepared = prepare_sessions(raw, 13);
        assert_eq!(prepared.rejected, 0);
        let keys: Vec<_> = prepared.sessions.iter().map(|s| (s.section_id.as_str(), s.end_period)).collect();
        assert_eq!(keys, vec![("L01", 4), ("L02", 4), ("L01", 5)]);
        // first-seen row wins
        assert_eq!(prepared.sessions[0].course_name, None);
    }

    #[test]
    fn query_semester() {
        let q = SessionQuery::ByUser {
            university_id: 2210001,
            user_type: UserType::Student,
            semester: Some("242".to_string()),
        };
        assert_eq!(q.semester(), Some("242"));
        let q = SessionQuery::All { course_id: None, semester: None };
        assert_eq!(q.semester(), None);
    }
}
