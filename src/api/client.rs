use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder, StatusCode};

use super::types::*;
use crate::config::{Config, UserType};
use crate::schedule::Session;

/// Backend queries can be slow (stored procedures), match the portal's timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ScheduleClient {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl ScheduleClient {
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.api_token.as_ref()
            .filter(|t| !t.trim().is_empty())
            .context("API token not configured")?;

        let base_url = config.base_url();
        if base_url.is_empty() {
            anyhow::bail!("API base URL not configured");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth_header: format!("Bearer {}", token.trim()),
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::debug!(%status, "failed to read error body: {}", e);
                    None
                }
            };
            let message = failure_message(status, body.as_deref());
            tracing::warn!(%status, %message, "schedule API request failed");
            anyhow::bail!("API request failed: {} - {}", status, message);
        }

        Ok(response)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(&url)).await?;
        let result = response.json::<T>().await
            .with_context(|| format!("Failed to decode response from {}", endpoint))?;
        Ok(result)
    }

    async fn send_json<B: serde::Serialize>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: &B,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%method, %url, "sending");
        let request = self.client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);
        self.send(request).await?;
        Ok(())
    }

    /// All schedules, optionally narrowed to a course and semester
    pub async fn get_all_schedules(
        &self,
        course_id: Option<&str>,
        semester: Option<&str>,
    ) -> Result<Vec<Session>> {
        let endpoint = format!(
            "/admin/schedules{}",
            build_query(&[("course_id", course_id), ("semester", semester)])
        );
        let rows: Vec<ScheduleEntry> = self.get(&endpoint).await?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    /// Schedules of a building/room
    pub async fn get_schedules_by_room(
        &self,
        building_name: Option<&str>,
        room_name: Option<&str>,
        semester: Option<&str>,
    ) -> Result<Vec<Session>> {
        let endpoint = format!(
            "/admin/schedules/by-room{}",
            build_query(&[
                ("building_name", building_name),
                ("room_name", room_name),
                ("semester", semester),
            ])
        );
        let rows: Vec<ScheduleByRoomEntry> = self.get(&endpoint).await?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    /// Schedule of one student or tutor
    pub async fn get_schedules_by_user(
        &self,
        university_id: i64,
        user_type: UserType,
        semester: Option<&str>,
    ) -> Result<Vec<Session>> {
        let id = university_id.to_string();
        let endpoint = format!(
            "/admin/schedules/by-user{}",
            build_query(&[
                ("university_id", Some(id.as_str())),
                ("user_type", Some(user_type.as_param())),
                ("semester", semester),
            ])
        );
        let rows: Vec<ScheduleByUserEntry> = self.get(&endpoint).await?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    /// Slots of a single section
    pub async fn get_section_schedule(
        &self,
        section_id: &str,
        course_id: &str,
        semester: &str,
    ) -> Result<Vec<Session>> {
        let endpoint = section_schedule_path(section_id, course_id, semester);
        let rows: Vec<ScheduleEntry> = self.get(&endpoint).await?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    /// Add a slot for `session`'s section
    pub async fn create_schedule_entry(&self, semester: &str, session: &Session) -> Result<()> {
        let endpoint = section_schedule_path(&session.section_id, &session.course_id, semester);
        let body = CreateScheduleRequest::for_session(session);
        self.send_json(reqwest::Method::POST, &endpoint, &body).await
    }

    /// Move the slot `old` to the day/periods of `new`
    pub async fn update_schedule_entry(&self, semester: &str, old: &Session, new: &Session) -> Result<()> {
        let endpoint = section_schedule_path(&old.section_id, &old.course_id, semester);
        let body = UpdateScheduleRequest::between(old, new);
        self.send_json(reqwest::Method::PUT, &endpoint, &body).await
    }

    pub async fn delete_schedule_entry(&self, semester: &str, session: &Session) -> Result<()> {
        let endpoint = section_schedule_path(&session.section_id, &session.course_id, semester);
        let body: DeleteScheduleRequest = CreateScheduleRequest::for_session(session);
        self.send_json(reqwest::Method::DELETE, &endpoint, &body).await
    }
}

/// Text for a failed request: the backend's `error` field, else the raw
/// body, else the status reason when the body is empty or unreadable
fn failure_message(status: StatusCode, body: Option<&str>) -> String {
    let body = body.map(str::trim).filter(|b| !b.is_empty());
    match body {
        Some(body) => serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| body.to_string()),
        None => status.canonical_reason().unwrap_or("no response body").to_string(),
    }
}

/// `/admin/sections/{section}/{course}/{semester}/schedule` with encoded segments
fn section_schedule_path(section_id: &str, course_id: &str, semester: &str) -> String {
    format!(
        "/admin/sections/{}/{}/{}/schedule",
        urlencoding::encode(section_id),
        urlencoding::encode(course_id),
        urlencoding::encode(semester)
    )
}

/// Query string from optional params; blank values are left out.
/// Returns "" when nothing is set, otherwise "?a=1&b=2".
fn build_query(params: &[(&str, Option<&str>)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            let value = value.map(str::trim).filter(|v| !v.is_empty())?;
            Some(format!("{}={}", key, urlencoding::encode(value)))
        })
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_skips_blank_values() {
        assert_eq!(build_query(&[]), "");
        assert_eq!(build_query(&[("semester", None), ("course_id", Some("  "))]), "");
        assert_eq!(
            build_query(&[("course_id", Some("CO2013")), ("semester", Some("242"))]),
            "?course_id=CO2013&semester=242"
        );
    }

    #[test]
    fn query_values_are_encoded() {
        assert_eq!(
            build_query(&[("building_name", Some("H6 & B1"))]),
            "?building_name=H6%20%26%20B1"
        );
    }

    #[test]
    fn section_path_encodes_segments() {
        assert_eq!(
            section_schedule_path("L01", "CO2013", "242"),
            "/admin/sections/L01/CO2013/242/schedule"
        );
        assert_eq!(
            section_schedule_path("L/01", "CO 2013", "242"),
            "/admin/sections/L%2F01/CO%202013/242/schedule"
        );
    }

    #[test]
    fn failure_message_sources() {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(
            failure_message(status, Some(r#"{"success": false, "error": "Section not found"}"#)),
            "Section not found"
        );
        assert_eq!(failure_message(status, Some("Bad gateway upstream")), "Bad gateway upstream");
        // Unreadable or empty body falls back to the status reason
        assert_eq!(failure_message(status, None), "Internal Server Error");
        assert_eq!(failure_message(StatusCode::NOT_FOUND, Some("  ")), "Not Found");
    }

    #[test]
    fn client_requires_token() {
        let config = Config::default();
        assert!(ScheduleClient::new(&config).is_err());

        let config = Config {
            api_token: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(ScheduleClient::new(&config).is_err());

        let config = Config {
            api_token: Some("abc".to_string()),
            ..Config::default()
        };
        let client = ScheduleClient::new(&config).unwrap();
        assert_eq!(client.auth_header, "Bearer abc");
        assert_eq!(client.base_url, "http://localhost:3001/api");
    }
}
