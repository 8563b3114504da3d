use std::collections::BTreeMap;

use super::session::Session;

/// Sessions of one day keyed by their start period
pub type DayBuckets<'a> = BTreeMap<i32, Vec<&'a Session>>;

/// Day -> start period -> sessions, in input order within each bucket
pub type Buckets<'a> = BTreeMap<i32, DayBuckets<'a>>;

/// Group sessions by day, then by start period.
///
/// Grouping is stable: the first session seen for a (day, start period) is the
/// one rendered as the primary block. Out-of-range days and periods are kept
/// under their literal value.
pub fn bucketize(sessions: &[Session]) -> Buckets<'_> {
    let mut buckets = Buckets::new();

    for session in sessions {
        buckets
            .entry(session.day_of_week)
            .or_default()
            .entry(session.start_period)
            .or_default()
            .push(session);
    }

    tracing::trace!(sessions = bucket_len(&buckets), days = buckets.len(), "bucketized sessions");
    buckets
}

/// Total number of sessions across all buckets
pub fn bucket_len(buckets: &Buckets<'_>) -> usize {
    buckets
        .values()
        .flat_map(|day| day.values())
        .map(Vec::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::session::session;

    #[test]
    fn empty_input_gives_no_buckets() {
        let buckets = bucketize(&[]);
        assert!(buckets.is_empty());
        assert_eq!(bucket_len(&buckets), 0);
    }

    #[test]
    fn groups_by_day_then_start_period() {
        let sessions = vec![
            session("CS101", "S1", 2, 3, 4),
            session("MA201", "S1", 2, 1, 2),
            session("PH101", "S2", 5, 3, 3),
            session("CS102", "S3", 2, 3, 5),
        ];
        let buckets = bucketize(&sessions);

        assert_eq!(buckets.len(), 2);
        let tuesday = &buckets[&2];
        assert_eq!(tuesday.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(tuesday[&3].len(), 2);
        assert_eq!(tuesday[&1][0].course_id, "MA201");
        assert_eq!(buckets[&5][&3][0].course_id, "PH101");
    }

    #[test]
    fn every_session_lands_in_exactly_one_bucket() {
        let sessions = vec![
            session("A", "1", 1, 1, 1),
            session("A", "1", 1, 1, 1),
            session("B", "2", 3, 7, 9),
            session("C", "3", 6, 13, 13),
            session("D", "4", 3, 7, 7),
        ];
        let buckets = bucketize(&sessions);
        assert_eq!(bucket_len(&buckets), sessions.len());

        // Each input element is referenced exactly once, duplicates included
        for original in &sessions {
            let hits = buckets
                .values()
                .flat_map(|day| day.values())
                .flatten()
                .filter(|s| std::ptr::eq(**s, original))
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn bucket_order_follows_input_order() {
        let sessions = vec![
            session("Z", "1", 4, 2, 2),
            session("A", "1", 4, 2, 3),
            session("M", "1", 4, 2, 6),
        ];
        let buckets = bucketize(&sessions);
        let ids: Vec<&str> = buckets[&4][&2].iter().map(|s| s.course_id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A", "M"]);
    }

    #[test]
    fn out_of_range_values_are_kept_literally() {
        let sessions = vec![session("X", "1", 0, 14, 15), session("Y", "1", 9, -1, 2)];
        let buckets = bucketize(&sessions);
        assert_eq!(buckets[&0][&14].len(), 1);
        assert_eq!(buckets[&9][&-1].len(), 1);
    }
}
