//! Weekly grid layout: turns bucketed sessions into per-cell render instructions.
//!
//! For every configured day and every period row the engine emits one of:
//! an `Empty` cell, one or more `Block`s for sessions starting in that row
//! (plus an `OverflowBadge` when the bucket holds more than fit), or nothing
//! at all when the row is covered by a longer block started above it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bucket::{Buckets, DayBuckets};
use super::session::Session;
use crate::color::{course_color, Hsl};

/// Pixels reserved above and below each block so adjacent blocks separate
pub const BLOCK_SEAM_PX: f32 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("invalid layout configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub period_count: i32,
    pub period_height_px: f32,
    pub days: Vec<i32>,
    pub max_primary_per_cell: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            period_count: 13,
            period_height_px: 80.0,
            days: vec![1, 2, 3, 4, 5, 6],
            max_primary_per_cell: 1,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.period_count < 1 {
            return Err(LayoutError::InvalidConfiguration(format!(
                "period_count must be at least 1, got {}",
                self.period_count
            )));
        }
        // Also rejects NaN
        if !(self.period_height_px > 0.0) {
            return Err(LayoutError::InvalidConfiguration(format!(
                "period_height_px must be positive, got {}",
                self.period_height_px
            )));
        }
        if self.max_primary_per_cell < 1 {
            return Err(LayoutError::InvalidConfiguration(
                "max_primary_per_cell must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Height of the whole grid body in pixels
    pub fn grid_height_px(&self) -> f32 {
        self.period_count.max(0) as f32 * self.period_height_px
    }
}

/// A primary session drawn directly in the grid
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInstruction<'a> {
    pub session: &'a Session,
    pub top_offset_px: f32,
    pub height_px: f32,
    pub color: Hsl,
    pub stack_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellKind<'a> {
    Empty,
    Block(BlockInstruction<'a>),
    OverflowBadge {
        remaining_count: usize,
        remaining_sessions: Vec<&'a Session>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellInstruction<'a> {
    pub day: i32,
    pub period: i32,
    pub kind: CellKind<'a>,
}

impl CellInstruction<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, CellKind::Empty)
    }
}

/// Pixel offset of the block top for a session starting at `start_period`
pub fn top_offset_px(start_period: i32, period_height_px: f32) -> f32 {
    (start_period - 1) as f32 * period_height_px + BLOCK_SEAM_PX
}

/// Block height for a session spanning `[start_period, end_period]`.
///
/// Malformed spans (`end < start`) clamp to zero instead of going negative.
pub fn block_height_px(start_period: i32, end_period: i32, period_height_px: f32) -> f32 {
    let span = (end_period - start_period + 1) as f32;
    (span * period_height_px - 2.0 * BLOCK_SEAM_PX).max(0.0)
}

/// Lay out the whole grid.
///
/// Output order is day-major in `config.days` order, then period ascending;
/// within a cell, blocks come in stack order followed by the overflow badge.
pub fn layout<'a>(
    buckets: &Buckets<'a>,
    config: &LayoutConfig,
) -> Result<Vec<CellInstruction<'a>>, LayoutError> {
    config.validate()?;

    let empty = DayBuckets::new();
    let mut instructions = Vec::new();

    for &day in &config.days {
        let day_buckets = buckets.get(&day).unwrap_or(&empty);
        layout_day(day, day_buckets, config, &mut instructions);
    }

    tracing::debug!(
        days = config.days.len(),
        periods = config.period_count,
        instructions = instructions.len(),
        "grid layout computed"
    );
    Ok(instructions)
}

fn layout_day<'a>(
    day: i32,
    day_buckets: &DayBuckets<'a>,
    config: &LayoutConfig,
    out: &mut Vec<CellInstruction<'a>>,
) {
    // Furthest end period of any session that started in an earlier row.
    // Sessions keyed below row 1 still count.
    let mut covered_until = day_buckets
        .range(..1)
        .flat_map(|(_, bucket)| bucket.iter())
        .map(|s| s.end_period)
        .max()
        .unwrap_or(i32::MIN);

    for period in 1..=config.period_count {
        match day_buckets.get(&period).filter(|bucket| !bucket.is_empty()) {
            Some(bucket) => {
                emit_bucket(day, period, bucket, config, out);
                if let Some(end) = bucket.iter().map(|s| s.end_period).max() {
                    covered_until = covered_until.max(end);
                }
            }
            None if period <= covered_until => {
                // Row sits under a taller block; nothing to draw
            }
            None => out.push(CellInstruction {
                day,
                period,
                kind: CellKind::Empty,
            }),
        }
    }
}

fn emit_bucket<'a>(
    day: i32,
    period: i32,
    bucket: &[&'a Session],
    config: &LayoutConfig,
    out: &mut Vec<CellInstruction<'a>>,
) {
    let shown = bucket.len().min(config.max_primary_per_cell);
    let (primary, rest) = bucket.split_at(shown);

    for (stack_index, &session) in primary.iter().enumerate() {
        out.push(CellInstruction {
            day,
            period,
            kind: CellKind::Block(BlockInstruction {
                session,
                top_offset_px: top_offset_px(session.start_period, config.period_height_px),
                height_px: block_height_px(
                    session.start_period,
                    session.end_period,
                    config.period_height_px,
                ),
                color: course_color(&session.course_id),
                stack_index,
            }),
        });
    }

    if !rest.is_empty() {
        out.push(CellInstruction {
            day,
            period,
            kind: CellKind::OverflowBadge {
                remaining_count: rest.len(),
                remaining_sessions: rest.to_vec(),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::bucket::bucketize;
    use crate::schedule::session::session;

    fn cells_for<'a, 'b>(
        instructions: &'b [CellInstruction<'a>],
        day: i32,
        period: i32,
    ) -> Vec<&'b CellInstruction<'a>> {
        instructions
            .iter()
            .filter(|c| c.day == day && c.period == period)
            .collect()
    }

    fn block<'a, 'b>(cell: &'b CellInstruction<'a>) -> &'b BlockInstruction<'a> {
        match &cell.kind {
            CellKind::Block(block) => block,
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn single_session_block_geometry() {
        let sessions = vec![session("CS101", "S1", 2, 3, 4)];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        let at_start = cells_for(&out, 2, 3);
        assert_eq!(at_start.len(), 1);
        let b = block(at_start[0]);
        assert_eq!(b.top_offset_px, 161.0);
        assert_eq!(b.height_px, 158.0);
        assert_eq!(b.stack_index, 0);
        assert_eq!(b.session.course_id, "CS101");

        // Covered row emits nothing
        assert!(cells_for(&out, 2, 4).is_empty());

        for p in (1..=13).filter(|p| *p != 3 && *p != 4) {
            let cells = cells_for(&out, 2, p);
            assert_eq!(cells.len(), 1, "period {}", p);
            assert!(cells[0].is_empty());
        }
    }

    #[test]
    fn two_sessions_in_one_cell_overflow() {
        let sessions = vec![
            session("CS101", "S1", 1, 5, 5),
            session("MA201", "S2", 1, 5, 5),
        ];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        let cell = cells_for(&out, 1, 5);
        assert_eq!(cell.len(), 2);
        assert_eq!(block(cell[0]).session.course_id, "CS101");
        match &cell[1].kind {
            CellKind::OverflowBadge {
                remaining_count,
                remaining_sessions,
            } => {
                assert_eq!(*remaining_count, 1);
                assert_eq!(remaining_sessions.len(), 1);
                assert_eq!(remaining_sessions[0].course_id, "MA201");
            }
            other => panic!("expected overflow badge, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_gives_all_empty_grid() {
        let buckets = bucketize(&[]);
        let config = LayoutConfig::default();
        let out = layout(&buckets, &config).unwrap();

        assert_eq!(out.len(), 6 * 13);
        assert!(out.iter().all(CellInstruction::is_empty));
        for day in 1..=6 {
            for period in 1..=13 {
                assert_eq!(cells_for(&out, day, period).len(), 1);
            }
        }
    }

    #[test]
    fn full_day_session_covers_every_row() {
        let sessions = vec![session("PE100", "S1", 3, 1, 13)];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        let first = cells_for(&out, 3, 1);
        assert_eq!(first.len(), 1);
        assert_eq!(block(first[0]).height_px, 1038.0);
        assert_eq!(block(first[0]).top_offset_px, 1.0);
        for p in 2..=13 {
            assert!(cells_for(&out, 3, p).is_empty());
        }
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let buckets = bucketize(&[]);

        let config = LayoutConfig {
            period_count: 0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            layout(&buckets, &config),
            Err(LayoutError::InvalidConfiguration(_))
        ));

        let config = LayoutConfig {
            period_height_px: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            layout(&buckets, &config),
            Err(LayoutError::InvalidConfiguration(_))
        ));

        let config = LayoutConfig {
            period_height_px: f32::NAN,
            ..LayoutConfig::default()
        };
        assert!(layout(&buckets, &config).is_err());

        let config = LayoutConfig {
            max_primary_per_cell: 0,
            ..LayoutConfig::default()
        };
        assert!(layout(&buckets, &config).is_err());
    }

    #[test]
    fn single_row_grid() {
        let sessions = vec![session("CS101", "S1", 1, 1, 1)];
        let buckets = bucketize(&sessions);
        let config = LayoutConfig {
            period_count: 1,
            days: vec![1, 2],
            ..LayoutConfig::default()
        };
        let out = layout(&buckets, &config).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(block(&out[0]).height_px, 78.0);
        assert!(out[1].is_empty());
        assert_eq!((out[1].day, out[1].period), (2, 1));
    }

    #[test]
    fn overflow_accounting_with_wider_primary_limit() {
        let sessions: Vec<Session> = (0..5)
            .map(|i| session(&format!("C{}", i), "S1", 4, 2, 3))
            .collect();
        let buckets = bucketize(&sessions);
        let config = LayoutConfig {
            max_primary_per_cell: 2,
            ..LayoutConfig::default()
        };
        let out = layout(&buckets, &config).unwrap();

        let cell = cells_for(&out, 4, 2);
        let blocks: Vec<_> = cell
            .iter()
            .filter_map(|c| match &c.kind {
                CellKind::Block(b) => Some(b),
                _ => None,
            })
            .collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].stack_index, 0);
        assert_eq!(blocks[1].stack_index, 1);

        let remaining = cell
            .iter()
            .find_map(|c| match &c.kind {
                CellKind::OverflowBadge {
                    remaining_count,
                    remaining_sessions,
                } => Some((*remaining_count, remaining_sessions)),
                _ => None,
            })
            .expect("overflow badge");
        assert_eq!(remaining.0 + blocks.len(), 5);
        let ids: Vec<&str> = remaining.1.iter().map(|s| s.course_id.as_str()).collect();
        assert_eq!(ids, vec!["C2", "C3", "C4"]);
    }

    #[test]
    fn no_overflow_when_bucket_fits() {
        let sessions = vec![session("A", "1", 1, 1, 1), session("B", "1", 1, 1, 1)];
        let buckets = bucketize(&sessions);
        let config = LayoutConfig {
            max_primary_per_cell: 3,
            ..LayoutConfig::default()
        };
        let out = layout(&buckets, &config).unwrap();
        assert!(!out
            .iter()
            .any(|c| matches!(c.kind, CellKind::OverflowBadge { .. })));
    }

    #[test]
    fn each_session_is_drawn_once() {
        let sessions = vec![
            session("A", "1", 1, 1, 3),
            session("B", "1", 1, 5, 9),
            session("C", "1", 2, 2, 2),
            session("D", "1", 6, 10, 13),
        ];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        for s in &sessions {
            let draws = out
                .iter()
                .filter(|c| matches!(&c.kind, CellKind::Block(b) if std::ptr::eq(b.session, s)))
                .count();
            assert_eq!(draws, 1);
            for p in (s.start_period + 1)..=s.end_period {
                assert!(cells_for(&out, s.day_of_week, p).is_empty());
            }
        }
    }

    #[test]
    fn overlapping_spans_with_different_starts() {
        // 1-4 and 3-5 on the same day: both blocks drawn, row 5 still covered
        let sessions = vec![session("A", "1", 1, 1, 4), session("B", "1", 1, 3, 5)];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        assert_eq!(block(cells_for(&out, 1, 1)[0]).session.course_id, "A");
        assert_eq!(block(cells_for(&out, 1, 3)[0]).session.course_id, "B");
        assert!(cells_for(&out, 1, 2).is_empty());
        assert!(cells_for(&out, 1, 4).is_empty());
        assert!(cells_for(&out, 1, 5).is_empty());
        assert!(cells_for(&out, 1, 6)[0].is_empty());
    }

    #[test]
    fn malformed_span_clamps_height_to_zero() {
        let sessions = vec![session("A", "1", 1, 5, 3)];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        let b = block(cells_for(&out, 1, 5)[0]);
        assert_eq!(b.height_px, 0.0);
        // Nothing below is treated as covered
        assert!(cells_for(&out, 1, 6)[0].is_empty());
    }

    #[test]
    fn session_running_past_grid_is_accepted() {
        let sessions = vec![session("A", "1", 1, 12, 15)];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        let b = block(cells_for(&out, 1, 12)[0]);
        assert_eq!(b.height_px, 4.0 * 80.0 - 2.0);
        assert!(cells_for(&out, 1, 13).is_empty());
    }

    #[test]
    fn session_keyed_above_grid_still_covers_rows() {
        let sessions = vec![session("A", "1", 1, 0, 2)];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        assert!(cells_for(&out, 1, 1).is_empty());
        assert!(cells_for(&out, 1, 2).is_empty());
        assert!(cells_for(&out, 1, 3)[0].is_empty());
    }

    #[test]
    fn days_follow_config_order_and_skip_unlisted_days() {
        let sessions = vec![session("A", "1", 7, 1, 1), session("B", "1", 2, 1, 1)];
        let buckets = bucketize(&sessions);
        let config = LayoutConfig {
            period_count: 2,
            days: vec![3, 2],
            ..LayoutConfig::default()
        };
        let out = layout(&buckets, &config).unwrap();

        let days: Vec<i32> = out.iter().map(|c| c.day).collect();
        assert_eq!(days, vec![3, 3, 2, 2]);
        assert!(!out.iter().any(|c| c.day == 7));
    }

    #[test]
    fn same_course_gets_same_color_across_cells() {
        let sessions = vec![session("CS101", "S1", 1, 1, 2), session("CS101", "S2", 4, 7, 8)];
        let buckets = bucketize(&sessions);
        let out = layout(&buckets, &LayoutConfig::default()).unwrap();

        let first = block(cells_for(&out, 1, 1)[0]).color;
        let second = block(cells_for(&out, 4, 7)[0]).color;
        assert_eq!(first, second);
    }
}
