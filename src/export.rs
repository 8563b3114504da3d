use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::course_color;
use crate::config::{Config, ScheduleView};
use crate::schedule::{CellInstruction, CellKind, Session};

#[derive(Serialize)]
pub struct GridExport {
    pub exported_at: String,
    pub view: ScheduleView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    pub period_count: i32,
    pub days: Vec<i32>,
    pub sessions: Vec<ExportSession>,
    pub cells: Vec<ExportCell>,
}

#[derive(Serialize)]
pub struct ExportSession {
    pub course_id: String,
    pub section_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    pub day_of_week: i32,
    pub start_period: i32,
    pub end_period: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_info: Option<String>,
    pub color: String,
}

impl From<&Session> for ExportSession {
    fn from(session: &Session) -> Self {
        Self {
            course_id: session.course_id.clone(),
            section_id: session.section_id.clone(),
            course_name: session.course_name.clone(),
            day_of_week: session.day_of_week,
            start_period: session.start_period,
            end_period: session.end_period,
            rooms_info: session.rooms_info.clone(),
            color: course_color(&session.course_id).to_rgb().to_hex(),
        }
    }
}

/// Non-empty cell of the laid-out grid
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportCell {
    Block {
        day: i32,
        period: i32,
        course_id: String,
        section_id: String,
        top_offset_px: f32,
        height_px: f32,
        stack_index: usize,
        color: String,
    },
    Overflow {
        day: i32,
        period: i32,
        remaining_count: usize,
        /// "COURSE/SECTION" of each hidden session
        remaining: Vec<String>,
    },
}

impl ExportCell {
    fn from_instruction(cell: &CellInstruction<'_>) -> Option<Self> {
        match &cell.kind {
            CellKind::Empty => None,
            CellKind::Block(block) => Some(ExportCell::Block {
                day: cell.day,
                period: cell.period,
                course_id: block.session.course_id.clone(),
                section_id: block.session.section_id.clone(),
                top_offset_px: block.top_offset_px,
                height_px: block.height_px,
                stack_index: block.stack_index,
                color: block.color.to_rgb().to_hex(),
            }),
            CellKind::OverflowBadge { remaining_count, remaining_sessions } => Some(ExportCell::Overflow {
                day: cell.day,
                period: cell.period,
                remaining_count: *remaining_count,
                remaining: remaining_sessions
                    .iter()
                    .map(|s| format!("{}/{}", s.course_id, s.section_id))
                    .collect(),
            }),
        }
    }
}

pub fn build_export(sessions: &[Session], config: &Config, instructions: &[CellInstruction<'_>]) -> GridExport {
    let semester = config.semester.trim();
    GridExport {
        exported_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        view: config.view,
        semester: (!semester.is_empty()).then(|| semester.to_string()),
        period_count: config.period_count,
        days: config.days.clone(),
        sessions: sessions.iter().map(ExportSession::from).collect(),
        cells: instructions.iter().filter_map(ExportCell::from_instruction).collect(),
    }
}

/// File name like `classgrid-242-20250314-091500.json`
fn export_file_name(semester: Option<&str>) -> String {
    // Sanitize for filename
    let label: String = semester
        .unwrap_or("all")
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("classgrid-{}-{}.json", label, Local::now().format("%Y%m%d-%H%M%S"))
}

/// Write the export into `dir`, creating it if needed.
/// Returns the path of the created file.
pub fn export_grid_to(
    dir: &Path,
    sessions: &[Session],
    config: &Config,
    instructions: &[CellInstruction<'_>],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let export = build_export(sessions, config, instructions);
    let file_path = dir.join(export_file_name(export.semester.as_deref()));

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize export")?;
    fs::write(&file_path, json)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    tracing::info!(path = %file_path.display(), cells = export.cells.len(), "grid exported");
    Ok(file_path)
}

/// Export next to the executable, under `schedule-exports/`
pub fn export_grid(
    sessions: &[Session],
    config: &Config,
    instructions: &[CellInstruction<'_>],
) -> Result<PathBuf> {
    let exe_path = std::env::current_exe()
        .context("Failed to get exe path")?;
    let exe_dir = exe_path.parent()
        .context("Failed to get exe directory")?;

    export_grid_to(&exe_dir.join("schedule-exports"), sessions, config, instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{bucketize, layout, session};

    fn sample() -> (Vec<Session>, Config) {
        let sessions = vec![
            session("CS101", "S1", 1, 2, 3),
            session("CS202", "S1", 1, 2, 2),
            session("MA101", "L01", 3, 5, 5),
        ];
        let config = Config {
            semester: "242".to_string(),
            ..Config::default()
        };
        (sessions, config)
    }

    #[test]
    fn export_lists_only_drawn_cells() {
        let (sessions, config) = sample();
        let buckets = bucketize(&sessions);
        let cells = layout(&buckets, &config.layout_config()).unwrap();

        let export = build_export(&sessions, &config, &cells);
        assert_eq!(export.sessions.len(), 3);
        assert_eq!(export.semester.as_deref(), Some("242"));

        // one block + one overflow on Monday P2, one block on Wednesday P5
        assert_eq!(export.cells.len(), 3);
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["cells"][0]["kind"], "block");
        assert_eq!(json["cells"][0]["course_id"], "CS101");
        assert_eq!(json["cells"][1]["kind"], "overflow");
        assert_eq!(json["cells"][1]["remaining_count"], 1);
        assert_eq!(json["cells"][1]["remaining"][0], "CS202/S1");
        assert_eq!(json["cells"][2]["day"], 3);
        assert_eq!(json["view"], "All");
    }

    #[test]
    fn session_colors_are_hex() {
        let (sessions, config) = sample();
        let export = build_export(&sessions, &config, &[]);
        let color = &export.sessions[0].color;
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert_eq!(color, &course_color("CS101").to_rgb().to_hex());
    }

    #[test]
    fn writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let (sessions, config) = sample();
        let buckets = bucketize(&sessions);
        let cells = layout(&buckets, &config.layout_config()).unwrap();

        let path = export_grid_to(&target, &sessions, &config, &cells).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("classgrid-242-"));
        assert!(name.ends_with(".json"));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["sessions"].as_array().unwrap().len(), 3);
        assert_eq!(written["period_count"], 13);
    }

    #[test]
    fn file_name_without_semester() {
        let name = export_file_name(None);
        assert!(name.starts_with("classgrid-all-"));
        assert!(export_file_name(Some("HK 2/2024")).starts_with("classgrid-hk-2-2024-"));
    }
}
