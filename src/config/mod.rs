use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{PeriodClock, SessionQuery};
use crate::schedule::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockFormat {
    #[default]
    Hour24,      // "14:30"
    Hour12,      // "2:30pm"
}

/// Which schedule endpoint feeds the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScheduleView {
    #[default]
    All,         // every section, optionally one course
    ByRoom,      // one building/room
    ByUser,      // one student's or tutor's timetable
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserType {
    #[default]
    Student,
    Tutor,
}

impl UserType {
    /// Value of the backend's `user_type` query parameter
    pub fn as_param(self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Tutor => "tutor",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    #[serde(default)]
    pub clock_format: ClockFormat,
    #[serde(default)]
    pub view: ScheduleView,

    // Filters
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub university_id: Option<i64>,
    #[serde(default)]
    pub user_type: UserType,

    // Grid
    #[serde(default = "default_period_count")]
    pub period_count: i32,
    #[serde(default = "default_period_height_px")]
    pub period_height_px: f32,
    #[serde(default = "default_days")]
    pub days: Vec<i32>,
    #[serde(default = "default_max_primary_per_cell")]
    pub max_primary_per_cell: usize,
    #[serde(default = "default_first_period_hour")]
    pub first_period_hour: u8,
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u32,

    /// Accent colour as a theme string, "H S% L%"
    #[serde(default = "default_accent_hsl")]
    pub accent_hsl: String,
}

fn default_api_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_font_scale() -> f32 {
    1.0
}

fn default_period_count() -> i32 {
    13
}

fn default_period_height_px() -> f32 {
    80.0
}

fn default_days() -> Vec<i32> {
    (1..=6).collect()
}

fn default_max_primary_per_cell() -> usize {
    1
}

fn default_first_period_hour() -> u8 {
    6  // 6am
}

fn default_period_minutes() -> u32 {
    60
}

fn default_accent_hsl() -> String {
    "205 91% 52%".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_token: None,
            font_scale: default_font_scale(),
            clock_format: ClockFormat::Hour24,
            view: ScheduleView::All,
            semester: String::new(),
            course_id: String::new(),
            building_name: String::new(),
            room_name: String::new(),
            university_id: None,
            user_type: UserType::Student,
            period_count: default_period_count(),
            period_height_px: default_period_height_px(),
            days: default_days(),
            max_primary_per_cell: default_max_primary_per_cell(),
            first_period_hour: default_first_period_hour(),
            period_minutes: default_period_minutes(),
            accent_hsl: default_accent_hsl(),
        }
    }
}

/// Blank filter text means "no filter"
fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            serde_json::from_str(&contents)
                .context("Failed to parse config file")
        } else {
            tracing::info!(path = %config_path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        tracing::debug!(path = %config_path.display(), "config saved");
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url().is_empty()
            && self.api_token.as_ref().is_some_and(|t| !t.trim().is_empty())
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "classgrid", "classgrid")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    pub fn base_url(&self) -> String {
        self.api_base_url.trim().trim_end_matches('/').to_string()
    }

    /// Grid settings for the layout engine. Not validated here; `layout` does that.
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            period_count: self.period_count,
            period_height_px: self.period_height_px,
            days: self.days.clone(),
            max_primary_per_cell: self.max_primary_per_cell,
        }
    }

    pub fn period_clock(&self) -> PeriodClock {
        PeriodClock::new(self.first_period_hour, self.period_minutes)
    }

    /// Query for the selected view, or an error naming the missing filter
    pub fn session_query(&self) -> Result<SessionQuery> {
        let semester = non_blank(&self.semester);
        let query = match self.view {
            ScheduleView::All => SessionQuery::All {
                course_id: non_blank(&self.course_id),
                semester,
            },
            ScheduleView::ByRoom => SessionQuery::ByRoom {
                building: non_blank(&self.building_name),
                room: non_blank(&self.room_name),
                semester,
            },
            ScheduleView::ByUser => SessionQuery::ByUser {
                university_id: self.university_id
                    .context("University ID is required for the user view")?,
                user_type: self.user_type,
                semester,
            },
        };
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_grid() {
        let config = Config::default();
        let layout = config.layout_config();
        assert_eq!(layout.period_count, 13);
        assert_eq!(layout.period_height_px, 80.0);
        assert_eq!(layout.days, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(layout.max_primary_per_cell, 1);
        assert!(layout.validate().is_ok());
        assert_eq!(config.period_clock(), PeriodClock::default());
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"api_token": "t", "period_count": 10}"#).unwrap();
        assert_eq!(config.period_count, 10);
        assert_eq!(config.api_base_url, "http://localhost:3001/api");
        assert_eq!(config.view, ScheduleView::All);
        assert_eq!(config.days, vec![1, 2, 3, 4, 5, 6]);
        assert!(config.is_configured());
    }

    #[test]
    fn is_configured_needs_token() {
        let mut config = Config::default();
        assert!(!config.is_configured());
        config.api_token = Some("  ".to_string());
        assert!(!config.is_configured());
        config.api_token = Some("abc".to_string());
        assert!(config.is_configured());
        config.api_base_url = " / ".to_string();
        assert!(!config.is_configured());
    }

    #[test]
    fn base_url_trims() {
        let config = Config {
            api_base_url: "  https://lms.example.edu/api/// ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.base_url(), "https://lms.example.edu/api");
    }

    #[test]
    fn session_query_per_view() {
        let mut config = Config {
            semester: " 242 ".to_string(),
            course_id: "".to_string(),
            building_name: "H6".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.session_query().unwrap(),
            SessionQuery::All { course_id: None, semester: Some("242".to_string()) }
        );

        config.view = ScheduleView::ByRoom;
        assert_eq!(
            config.session_query().unwrap(),
            SessionQuery::ByRoom {
                building: Some("H6".to_string()),
                room: None,
                semester: Some("242".to_string()),
            }
        );

        config.view = ScheduleView::ByUser;
        assert!(config.session_query().is_err());
        config.university_id = Some(2210001);
        config.user_type = UserType::Tutor;
        assert_eq!(
            config.session_query().unwrap(),
            SessionQuery::ByUser {
                university_id: 2210001,
                user_type: UserType::Tutor,
                semester: Some("242".to_string()),
            }
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert_eq!(Config::load_from(&path).unwrap().period_count, 13);

        let config = Config {
            api_token: Some("secret".to_string()),
            view: ScheduleView::ByRoom,
            room_name: "301".to_string(),
            period_count: 10,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_token.as_deref(), Some("secret"));
        assert_eq!(loaded.view, ScheduleView::ByRoom);
        assert_eq!(loaded.room_name, "301");
        assert_eq!(loaded.period_count, 10);
    }

    #[test]
    fn user_type_params() {
        assert_eq!(UserType::Student.as_param(), "student");
        assert_eq!(UserType::Tutor.as_param(), "tutor");
    }
}
