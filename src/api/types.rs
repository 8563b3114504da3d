use serde::{Deserialize, Deserializer, Serialize};

use super::period::parse_day_name;
use crate::schedule::Session;

/// Backend ids arrive either as JSON strings or numbers depending on the endpoint.
/// `null` becomes an empty id, which ingestion rejects.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Int(n)) => n.to_string(),
        Some(RawId::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Like `id_string`, keeping `null` as `None`
fn id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = id_string(deserializer)?;
    Ok((!id.is_empty()).then_some(id))
}

/// Row of `/admin/schedules` and the section schedule endpoint.
///
/// Slot columns come straight from nullable DB columns, so every one of them
/// may be missing or `null`. Such rows still decode and are dropped later by
/// `prepare_sessions` instead of failing the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "Section_ID", default, deserialize_with = "id_string")]
    pub section_id: String,
    #[serde(rename = "Course_ID", default, deserialize_with = "id_string")]
    pub course_id: String,
    #[serde(rename = "Semester", default, deserialize_with = "id_opt")]
    pub semester: Option<String>,
    #[serde(rename = "Day_of_Week", default)]
    pub day_of_week: Option<i32>,
    #[serde(rename = "Day_Name", default)]
    pub day_name: Option<String>,
    #[serde(rename = "Start_Period", default)]
    pub start_period: Option<i32>,
    #[serde(rename = "End_Period", default)]
    pub end_period: Option<i32>,
    #[serde(rename = "Course_Name", default)]
    pub course_name: Option<String>,
}

/// Row of `/admin/schedules/by-room`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleByRoomEntry {
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    #[serde(rename = "Building_Name", default)]
    pub building_name: Option<String>,
    #[serde(rename = "Room_Name", default)]
    pub room_name: Option<String>,
}

/// Row of `/admin/schedules/by-user`. Students carry enrollment fields,
/// tutors carry their role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleByUserEntry {
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    #[serde(rename = "Enrollment_Status", default)]
    pub enrollment_status: Option<String>,
    #[serde(rename = "Final_Grade", default)]
    pub final_grade: Option<f64>,
    #[serde(rename = "Role_Specification", default)]
    pub role_specification: Option<String>,
    #[serde(rename = "RoomsInfo", default)]
    pub rooms_info: Option<String>,
}

/// Error payload returned by the backend on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateScheduleRequest {
    #[serde(rename = "Day_of_Week")]
    pub day_of_week: i32,
    #[serde(rename = "Start_Period")]
    pub start_period: i32,
    #[serde(rename = "End_Period")]
    pub end_period: i32,
}

/// Delete identifies the slot with the same body shape as create
pub type DeleteScheduleRequest = CreateScheduleRequest;

#[derive(Debug, Clone, Serialize)]
pub struct UpdateScheduleRequest {
    #[serde(rename = "Old_Day_of_Week")]
    pub old_day_of_week: i32,
    #[serde(rename = "Old_Start_Period")]
    pub old_start_period: i32,
    #[serde(rename = "Old_End_Period")]
    pub old_end_period: i32,
    #[serde(rename = "New_Day_of_Week", skip_serializing_if = "Option::is_none")]
    pub new_day_of_week: Option<i32>,
    #[serde(rename = "New_Start_Period", skip_serializing_if = "Option::is_none")]
    pub new_start_period: Option<i32>,
    #[serde(rename = "New_End_Period", skip_serializing_if = "Option::is_none")]
    pub new_end_period: Option<i32>,
}

impl CreateScheduleRequest {
    pub fn for_session(session: &Session) -> Self {
        Self {
            day_of_week: session.day_of_week,
            start_period: session.start_period,
            end_period: session.end_period,
        }
    }
}

impl UpdateScheduleRequest {
    /// Move `old` to the slot of `new`; unchanged fields are left out of the body
    pub fn between(old: &Session, new: &Session) -> Self {
        let changed = |a: i32, b: i32| if a == b { None } else { Some(b) };
        Self {
            old_day_of_week: old.day_of_week,
            old_start_period: old.start_period,
            old_end_period: old.end_period,
            new_day_of_week: changed(old.day_of_week, new.day_of_week),
            new_start_period: changed(old.start_period, new.start_period),
            new_end_period: changed(old.end_period, new.end_period),
        }
    }
}

impl From<ScheduleEntry> for Session {
    fn from(entry: ScheduleEntry) -> Self {
        // Some rows only carry the day name. Anything still missing maps to
        // 0, which is outside every valid range and gets the row rejected.
        let day_of_week = entry
            .day_of_week
            .filter(|&day| day != 0)
            .or_else(|| entry.day_name.as_deref().and_then(parse_day_name))
            .unwrap_or(0);
        Session {
            course_id: entry.course_id,
            section_id: entry.section_id,
            course_name: entry.course_name,
            day_of_week,
            start_period: entry.start_period.unwrap_or(0),
            end_period: entry.end_period.unwrap_or(0),
            rooms_info: None,
        }
    }
}

impl From<ScheduleByRoomEntry> for Session {
    fn from(row: ScheduleByRoomEntry) -> Self {
        let rooms_info = [row.building_name, row.room_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" - ");
        Session {
            rooms_info: (!rooms_info.is_empty()).then_some(rooms_info),
            ..Session::from(row.entry)
        }
    }
}

impl From<ScheduleByUserEntry> for Session {
    fn from(row: ScheduleByUserEntry) -> Self {
        let rooms_info = row.rooms_info.filter(|r| !r.trim().is_empty());
        Session {
            rooms_info,
            ..Session::from(row.entry)
        }
    }
}
