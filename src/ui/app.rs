use eframe::egui;
use egui::{Color32, RichText};
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::api::{day_name, day_short_name, fetch_sessions, prepare_sessions, Prepared, ScheduleClient};
use crate::color::{hex_to_theme_hsl, theme_hsl_to_hex};
use crate::config::{ClockFormat, Config, ScheduleView, UserType};
use crate::export;
use crate::schedule::{bucketize, layout, LayoutConfig, Session};
use super::theme::accent_color;
use super::store::{LocalChange, SessionStore};
use super::views::{self, OverflowSelection};

/// Days offered in the settings and entry dialogs (Monday..Saturday)
const GRID_DAYS: std::ops::RangeInclusive<i32> = 1..=6;

pub struct ClassGridApp {
    config: Config,
    state: AppState,

    // Data
    store: SessionStore,
    // Laid out every frame; rebuilt from `store` whenever it changes
    sessions: Vec<Session>,
    rejected_rows: usize,

    // Add/edit dialog
    dialog: Option<EntryDialog>,

    // Overflow window ("+N" badge)
    overflow: Option<OverflowSelection>,

    // Delete confirmation
    pending_delete: Option<Session>,
    show_delete_confirm: bool,

    // Settings dialog
    show_settings: bool,
    settings: SettingsForm,
    settings_error: Option<String>,
    theme_dirty: bool,

    // Status
    status_message: Option<(String, bool)>, // (message, is_error)
    is_offline: bool,

    // Progress bar state
    progress: f32,           // Current progress 0.0-1.0
    progress_start: std::time::Instant,
    progress_phase: ProgressPhase,

    // Async communication
    runtime: tokio::runtime::Runtime,
    result_rx: Receiver<AsyncResult>,
    result_tx: Sender<AsyncResult>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AppState {
    Setup,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DialogMode {
    Add,
    Edit,
}

enum AsyncResult {
    SessionsLoaded { generation: u64, prepared: Prepared },
    FetchFailed { generation: u64, failure: Failure },
    EntrySaved { op: u64, message: String },
    EntryFailed { op: u64, failure: Failure },
    // Every slot of the section open in the edit dialog
    SectionLoaded { course_id: String, section_id: String, slots: Vec<Session> },
}

enum Failure {
    Offline,
    Error(String),
}

impl Failure {
    fn from_error(err: anyhow::Error, prefix: &str) -> Self {
        if is_offline_error(&err) {
            tracing::warn!("backend unreachable: {:#}", err);
            Failure::Offline
        } else {
            Failure::Error(format!("{}: {:#}", prefix, err))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProgressPhase {
    Idle,
    FastStart,    // 0→17% in 0.25s
    SlowCrawl,    // 17%→50% slowly
    Completing,   // snap to 100%
    FadingOut,    // fade out after completion
    Shrinking,    // shrink back on error
}

/// Connection-level failures show the offline screen instead of an error line
fn is_offline_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .is_some_and(|e| e.is_connect() || e.is_timeout())
    })
}

#[derive(Debug, Clone, PartialEq)]
struct EntryForm {
    course_id: String,
    section_id: String,
    course_name: Option<String>,
    rooms_info: Option<String>,
    day: i32,
    start_period: i32,
    end_period: i32,
}

impl EntryForm {
    /// Blank form for a clicked empty cell, one period long
    fn for_cell(day: i32, period: i32) -> Self {
        Self {
            course_id: String::new(),
            section_id: String::new(),
            course_name: None,
            rooms_info: None,
            day,
            start_period: period,
            end_period: period,
        }
    }

    fn from_session(session: &Session) -> Self {
        Self {
            course_id: session.course_id.clone(),
            section_id: session.section_id.clone(),
            course_name: session.course_name.clone(),
            rooms_info: session.rooms_info.clone(),
            day: session.day_of_week,
            start_period: session.start_period,
            end_period: session.end_period,
        }
    }

    fn to_session(&self, period_count: i32) -> Result<Session, String> {
        let course_id = self.course_id.trim();
        let section_id = self.section_id.trim();
        if course_id.is_empty() || section_id.is_empty() {
            return Err("Course and section are required".to_string());
        }
        if !GRID_DAYS.contains(&self.day) {
            return Err("Pick a day between Monday and Saturday".to_string());
        }
        if self.start_period < 1 || self.end_period > period_count {
            return Err(format!("Periods must be within 1-{}", period_count));
        }
        if self.end_period < self.start_period {
            return Err("End period can't be before start period".to_string());
        }
        Ok(Session {
            course_id: course_id.to_string(),
            section_id: section_id.to_string(),
            course_name: self.course_name.clone(),
            day_of_week: self.day,
            start_period: self.start_period,
            end_period: self.end_period,
            rooms_info: self.rooms_info.clone(),
        })
    }
}

struct EntryDialog {
    mode: DialogMode,
    form: EntryForm,
    original: Option<Session>,
    error: Option<String>,
    section_slots: Option<Vec<Session>>,
}

/// Editable copy of the config shown in the settings window
#[derive(Debug, Clone)]
struct SettingsForm {
    api_base_url: String,
    token: String,
    font_scale: f32,
    clock_format: ClockFormat,
    view: ScheduleView,
    semester: String,
    course_id: String,
    building_name: String,
    room_name: String,
    university_id: String,
    user_type: UserType,
    period_count: i32,
    period_height_px: f32,
    max_primary_per_cell: usize,
    first_period_hour: u8,
    period_minutes: u32,
    days: [bool; 6],
    accent_hex: String,
}

impl SettingsForm {
    fn from_config(config: &Config) -> Self {
        let mut days = [false; 6];
        for &day in &config.days {
            if let Some(slot) = usize::try_from(day - 1).ok().and_then(|i| days.get_mut(i)) {
                *slot = true;
            }
        }
        Self {
            api_base_url: config.api_base_url.clone(),
            token: String::new(),
            font_scale: config.font_scale,
            clock_format: config.clock_format,
            view: config.view,
            semester: config.semester.clone(),
            course_id: config.course_id.clone(),
            building_name: config.building_name.clone(),
            room_name: config.room_name.clone(),
            university_id: config.university_id.map(|id| id.to_string()).unwrap_or_default(),
            user_type: config.user_type,
            period_count: config.period_count,
            period_height_px: config.period_height_px,
            max_primary_per_cell: config.max_primary_per_cell,
            first_period_hour: config.first_period_hour,
            period_minutes: config.period_minutes,
            days,
            accent_hex: theme_hsl_to_hex(&config.accent_hsl).unwrap_or_else(|_| "#1398f4".to_string()),
        }
    }

    /// Validate and copy into `config`. Returns true when sessions need refetching.
    fn apply_to(&self, config: &mut Config) -> Result<bool, String> {
        let university_id = match self.university_id.trim() {
            "" => None,
            id => Some(id.parse::<i64>().map_err(|_| "University ID must be a number".to_string())?),
        };
        let accent_hsl = hex_to_theme_hsl(&self.accent_hex).map_err(|e| e.to_string())?;
        let days: Vec<i32> = GRID_DAYS
            .zip(self.days.iter())
            .filter(|(_, &on)| on)
            .map(|(day, _)| day)
            .collect();
        if days.is_empty() {
            return Err("Pick at least one day".to_string());
        }

        let layout = LayoutConfig {
            period_count: self.period_count,
            period_height_px: self.period_height_px,
            days: days.clone(),
            max_primary_per_cell: self.max_primary_per_cell,
        };
        layout.validate().map_err(|e| e.to_string())?;

        let needs_reload = config.api_base_url != self.api_base_url
            || !self.token.is_empty()
            || config.view != self.view
            || config.semester != self.semester
            || config.course_id != self.course_id
            || config.building_name != self.building_name
            || config.room_name != self.room_name
            || config.university_id != university_id
            || config.user_type != self.user_type
            || config.period_count != self.period_count;

        config.api_base_url = self.api_base_url.trim().to_string();
        if !self.token.is_empty() {
            config.api_token = Some(self.token.trim().to_string());
        }
        config.font_scale = self.font_scale;
        config.clock_format = self.clock_format;
        config.view = self.view;
        config.semester = self.semester.trim().to_string();
        config.course_id = self.course_id.trim().to_string();
        config.building_name = self.building_name.trim().to_string();
        config.room_name = self.room_name.trim().to_string();
        config.university_id = university_id;
        config.user_type = self.user_type;
        config.period_count = self.period_count;
        config.period_height_px = self.period_height_px;
        config.days = days;
        config.max_primary_per_cell = self.max_primary_per_cell;
        config.first_period_hour = self.first_period_hour;
        config.period_minutes = self.period_minutes;
        config.accent_hsl = accent_hsl;

        Ok(needs_reload)
    }
}

fn view_label(view: ScheduleView) -> &'static str {
    match view {
        ScheduleView::All => "All sections",
        ScheduleView::ByRoom => "By room",
        ScheduleView::ByUser => "By user",
    }
}

fn view_icon(view: ScheduleView) -> &'static str {
    match view {
        ScheduleView::All => egui_phosphor::regular::CALENDAR,
        ScheduleView::ByRoom => egui_phosphor::regular::BUILDINGS,
        ScheduleView::ByUser => egui_phosphor::regular::USER,
    }
}

/// Short description of the active filters for the header
fn filter_summary(config: &Config) -> String {
    let mut parts = Vec::new();
    match config.view {
        ScheduleView::All => {
            if !config.course_id.is_empty() {
                parts.push(config.course_id.clone());
            }
        }
        ScheduleView::ByRoom => {
            let room = [config.building_name.as_str(), config.room_name.as_str()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" - ");
            if !room.is_empty() {
                parts.push(room);
            }
        }
        ScheduleView::ByUser => {
            if let Some(id) = config.university_id {
                let who = match config.user_type {
                    UserType::Student => "Student",
                    UserType::Tutor => "Tutor",
                };
                parts.push(format!("{} {}", who, id));
            }
        }
    }
    if !config.semester.is_empty() {
        parts.push(format!("Semester {}", config.semester));
    }
    parts.join(" · ")
}

impl ClassGridApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {:#}", e);
            Config::default()
        });
        super::setup_fonts(&cc.egui_ctx);
        super::setup_theme(&cc.egui_ctx, accent_color(&config.accent_hsl));
        let state = if config.is_configured() {
            AppState::Main
        } else {
            AppState::Setup
        };

        let runtime = tokio::runtime::Runtime::new()?;
        let (result_tx, result_rx) = channel();

        let mut app = Self {
            settings: SettingsForm::from_config(&config),
            settings_error: None,
            show_settings: false,
            theme_dirty: false,
            config,
            state,
            store: SessionStore::default(),
            sessions: Vec::new(),
            rejected_rows: 0,
            dialog: None,
            overflow: None,
            pending_delete: None,
            show_delete_confirm: false,
            status_message: None,
            is_offline: false,
            progress: 0.0,
            progress_start: std::time::Instant::now(),
            progress_phase: ProgressPhase::Idle,
            runtime,
            result_rx,
            result_tx,
        };

        if state == AppState::Main {
            app.refresh_data();
        }

        Ok(app)
    }

    fn start_progress(&mut self) {
        // Keep one animation running across overlapping requests
        if matches!(self.progress_phase, ProgressPhase::FastStart | ProgressPhase::SlowCrawl) {
            return;
        }
        self.progress = 0.0;
        self.progress_phase = ProgressPhase::FastStart;
        self.progress_start = std::time::Instant::now();
    }

    fn finish_progress(&mut self, ok: bool) {
        if self.store.is_busy() {
            return;
        }
        self.progress_phase = if ok { ProgressPhase::Completing } else { ProgressPhase::Shrinking };
        self.progress_start = std::time::Instant::now();
    }

    /// Recompute the laid-out list after the store changed
    fn rebuild_sessions(&mut self) {
        // Same cleanup a fresh fetch gets
        self.sessions = prepare_sessions(self.store.current(), self.config.period_count).sessions;
        // Cells in the overflow window may no longer exist
        self.overflow = None;
    }

    fn show_failure(&mut self, failure: Failure) {
        match failure {
            Failure::Offline => {
                self.is_offline = true;
                self.status_message = None;
            }
            Failure::Error(msg) => {
                self.is_offline = false;
                self.status_message = Some((msg, true));
            }
        }
    }

    fn check_async_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                AsyncResult::SessionsLoaded { generation, prepared } => {
                    if !self.store.finish_fetch(generation, Some(prepared.sessions)) {
                        continue;
                    }
                    self.rejected_rows = prepared.rejected;
                    self.is_offline = false;
                    self.status_message = None;
                    self.rebuild_sessions();
                    self.finish_progress(true);
                }
                AsyncResult::FetchFailed { generation, failure } => {
                    if !self.store.finish_fetch(generation, None) {
                        continue;
                    }
                    self.show_failure(failure);
                    self.finish_progress(false);
                }
                AsyncResult::EntrySaved { op, message } => {
                    self.store.confirm(op);
                    self.rebuild_sessions();
                    self.status_message = Some((message, false));
                    self.finish_progress(true);
                }
                AsyncResult::EntryFailed { op, failure } => {
                    self.store.reject(op);
                    self.rebuild_sessions();
                    self.show_failure(failure);
                    self.finish_progress(false);
                }
                AsyncResult::SectionLoaded { course_id, section_id, mut slots } => {
                    if let Some(dialog) = self.dialog.as_mut() {
                        let same_section = dialog.original.as_ref().is_some_and(|s| {
                            s.course_id == course_id && s.section_id == section_id
                        });
                        if same_section {
                            slots.sort_by_key(|s| (s.day_of_week, s.start_period));
                            dialog.section_slots = Some(slots);
                        }
                    }
                }
            }
        }

        // Reload asked for while the previous fetch was running
        if self.store.take_reload() {
            self.refresh_data();
        }
    }

    /// Drop rows of the previous view or filters and fetch again
    fn reload_from_scratch(&mut self) {
        self.store.invalidate();
        self.rejected_rows = 0;
        self.rebuild_sessions();
        self.refresh_data();
    }

    fn refresh_data(&mut self) {
        if !self.config.is_configured() {
            return;
        }

        let query = match self.config.session_query() {
            Ok(query) => query,
            Err(e) => {
                self.status_message = Some((format!("{:#}", e), true));
                return;
            }
        };

        // A fetch is already running; this one starts when it reports back
        let Some(generation) = self.store.begin_fetch() else {
            return;
        };

        self.start_progress();

        let config = self.config.clone();
        let period_count = self.config.period_count;
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = ScheduleClient::new(&config)?;
                fetch_sessions(&client, &query).await
            }.await;

            let message = match result {
                Ok(raw) => {
                    let prepared = prepare_sessions(raw, period_count);
                    if prepared.rejected > 0 {
                        tracing::warn!(rejected = prepared.rejected, "some schedule rows were dropped");
                    }
                    AsyncResult::SessionsLoaded { generation, prepared }
                }
                Err(e) => {
                    tracing::error!(generation, "failed to load sessions: {:#}", e);
                    AsyncResult::FetchFailed { generation, failure: Failure::from_error(e, "Error") }
                }
            };
            let _ = tx.send(message);
        });
    }

    /// Apply `change` locally right away, then send it to the backend
    fn submit_change(&mut self, change: LocalChange) {
        let semester = self.config.semester.trim().to_string();
        if semester.is_empty() {
            self.status_message = Some(("Set a semester in settings before editing schedules".to_string(), true));
            return;
        }

        let op = self.store.submit(change.clone());
        self.rebuild_sessions();
        self.start_progress();

        let config = self.config.clone();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result: Result<String, anyhow::Error> = async {
                let client = ScheduleClient::new(&config)?;
                match &change {
                    LocalChange::Insert(session) => {
                        client.create_schedule_entry(&semester, session).await?;
                        Ok(format!("Added {} {}", session.course_id, session.section_id))
                    }
                    LocalChange::Replace { old, new } => {
                        client.update_schedule_entry(&semester, old, new).await?;
                        Ok(format!("Updated {} {}", new.course_id, new.section_id))
                    }
                    LocalChange::Remove(session) => {
                        client.delete_schedule_entry(&semester, session).await?;
                        Ok(format!("Deleted {} {}", session.course_id, session.section_id))
                    }
                }
            }.await;

            let message = match result {
                Ok(message) => {
                    tracing::info!(op, "{}", message);
                    AsyncResult::EntrySaved { op, message }
                }
                Err(e) => {
                    tracing::error!(op, ?change, "schedule change rejected: {:#}", e);
                    AsyncResult::EntryFailed { op, failure: Failure::from_error(e, "Failed") }
                }
            };
            let _ = tx.send(message);
        });
    }

    fn save_settings(&mut self) {
        let mut config = self.config.clone();
        let needs_reload = match self.settings.apply_to(&mut config) {
            Ok(reload) => reload,
            Err(msg) => {
                self.settings_error = Some(msg);
                return;
            }
        };

        if config.accent_hsl != self.config.accent_hsl {
            self.theme_dirty = true;
        }
        self.config = config;
        self.settings_error = None;

        match self.config.save() {
            Ok(_) => {
                self.show_settings = false;
                // Transition from Setup to Main if now configured
                if self.config.is_configured() && self.state == AppState::Setup {
                    self.state = AppState::Main;
                }
                if needs_reload {
                    self.reload_from_scratch();
                }
            }
            Err(e) => {
                self.status_message = Some((format!("Failed to save: {:#}", e), true));
            }
        }
    }

    fn open_settings(&mut self) {
        self.settings = SettingsForm::from_config(&self.config);
        self.settings_error = None;
        self.show_settings = true;
    }

    fn open_add_dialog(&mut self, day: i32, period: i32) {
        self.dialog = Some(EntryDialog {
            mode: DialogMode::Add,
            form: EntryForm::for_cell(day, period),
            original: None,
            error: None,
            section_slots: None,
        });
    }

    fn open_edit_dialog(&mut self, session: &Session) {
        self.dialog = Some(EntryDialog {
            mode: DialogMode::Edit,
            form: EntryForm::from_session(session),
            original: Some(session.clone()),
            error: None,
            section_slots: None,
        });
        self.load_section_slots(session);
    }

    /// Fetch the other meetings of `session`'s section for the edit dialog.
    /// Runs beside the grid fetch and leaves the progress bar alone.
    fn load_section_slots(&mut self, session: &Session) {
        let semester = self.config.semester.trim().to_string();
        if semester.is_empty() || !self.config.is_configured() {
            return;
        }

        let config = self.config.clone();
        let course_id = session.course_id.clone();
        let section_id = session.section_id.clone();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = ScheduleClient::new(&config)?;
                client.get_section_schedule(&section_id, &course_id, &semester).await
            }.await;

            match result {
                Ok(slots) => {
                    let _ = tx.send(AsyncResult::SectionLoaded { course_id, section_id, slots });
                }
                // Only informational; the dialog works without it
                Err(e) => tracing::debug!(%course_id, %section_id, "section schedule unavailable: {:#}", e),
            }
        });
    }

    fn save_dialog(&mut self) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };

        let session = match dialog.form.to_session(self.config.period_count) {
            Ok(session) => session,
            Err(msg) => {
                dialog.error = Some(msg);
                return;
            }
        };

        let change = match dialog.original.clone() {
            Some(old) if old == session => {
                // Nothing changed
                self.dialog = None;
                return;
            }
            Some(old) => LocalChange::Replace { old, new: session },
            None => LocalChange::Insert(session),
        };

        self.dialog = None;
        self.submit_change(change);
    }

    fn set_view(&mut self, view: ScheduleView) {
        if self.config.view == view {
            return;
        }
        self.config.view = view;
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {:#}", e);
        }
        self.reload_from_scratch();
    }

    fn export_grid(&mut self) {
        let buckets = bucketize(&self.sessions);
        let result = layout(&buckets, &self.config.layout_config())
            .map_err(anyhow::Error::from)
            .and_then(|cells| export::export_grid(&self.sessions, &self.config, &cells));
        self.status_message = Some(match result {
            Ok(path) => (format!("Exported to {}", path.display()), false),
            Err(e) => (format!("Export failed: {:#}", e), true),
        });
    }

    fn render_setup(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("ClassGrid setup");
            ui.add_space(20.0);

            ui.label("Connect to the LMS backend to load class schedules.");
            ui.add_space(8.0);

            let link = egui::Label::new(
                RichText::new("Check the backend is reachable")
                    .color(accent_color(&self.config.accent_hsl))
            ).sense(egui::Sense::click());
            let response = ui.add(link);
            if response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if response.clicked() {
                let url = format!("{}/health", self.settings.api_base_url.trim().trim_end_matches('/'));
                if let Err(e) = open::that(&url) {
                    tracing::warn!(%url, "failed to open browser: {}", e);
                }
            }

            ui.add_space(20.0);
        });

        egui::Grid::new("setup_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("API URL:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings.api_base_url)
                        .hint_text("http://localhost:3001/api")
                        .desired_width(350.0)
                );
                ui.end_row();

                ui.label("Access token:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings.token)
                        .password(true)
                        .hint_text("Paste your bearer token here")
                        .desired_width(350.0)
                );
                ui.end_row();

                ui.label("Semester:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings.semester)
                        .hint_text("e.g. 242 (optional)")
                        .desired_width(150.0)
                );
                ui.end_row();
            });

        ui.add_space(20.0);

        if let Some(err) = &self.settings_error {
            ui.label(RichText::new(err).color(Color32::from_rgb(224, 108, 117)));
            ui.add_space(8.0);
        }

        if ui.button("Save and connect").clicked() {
            self.save_settings();
        }
    }

    fn render_main(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // View picker styled like a pill button
            let (button_bg, button_text) = super::theme::button_colors();
            let view_menu_id = ui.make_persistent_id("view_menu");

            let view_response = egui::Frame::none()
                .fill(button_bg)
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::symmetric(10.0, 4.0))
                .show(ui, |ui| {
                    ui.add(egui::Label::new(
                        RichText::new(format!(
                            "{} {} {}",
                            view_icon(self.config.view),
                            view_label(self.config.view),
                            egui_phosphor::regular::CARET_DOWN
                        ))
                        .size(14.0)
                        .color(button_text)
                    ).sense(egui::Sense::click()))
                })
                .inner;
            if view_response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if view_response.clicked() {
                ui.memory_mut(|mem| mem.toggle_popup(view_menu_id));
            }

            let mut picked_view = None;
            egui::popup::popup_below_widget(ui, view_menu_id, &view_response, egui::PopupCloseBehavior::CloseOnClick, |ui| {
                ui.set_min_width(160.0);
                ui.style_mut().spacing.button_padding = egui::vec2(12.0, 8.0);
                for view in [ScheduleView::All, ScheduleView::ByRoom, ScheduleView::ByUser] {
                    let text = format!("{} {}", view_icon(view), view_label(view));
                    if ui.add(egui::Button::new(RichText::new(text).size(14.0)).frame(false)).clicked() {
                        picked_view = Some(view);
                    }
                }
            });
            if let Some(view) = picked_view {
                self.set_view(view);
            }

            ui.add_space(16.0);
            let summary = filter_summary(&self.config);
            if !summary.is_empty() {
                ui.label(RichText::new(summary).size(14.0).color(Color32::from_rgb(176, 176, 168)));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Icon-only buttons - gray, white on hover
                let text_color = Color32::from_rgb(150, 150, 150);
                let hover_color = Color32::WHITE;
                let font_id = egui::FontId::proportional(18.0);

                let icon_button = |ui: &mut egui::Ui, icon: &str, hover_text: &str| -> bool {
                    let icon_size = ui.fonts(|f| f.layout_no_wrap(icon.to_string(), font_id.clone(), Color32::WHITE).size());
                    let (rect, response) = ui.allocate_exact_size(icon_size + egui::vec2(8.0, 4.0), egui::Sense::click());
                    let col = if response.hovered() { hover_color } else { text_color };
                    ui.painter().text(rect.center(), egui::Align2::CENTER_CENTER, icon, font_id.clone(), col);
                    let clicked = response.on_hover_text(hover_text).clicked();
                    ui.add_space(12.0);
                    clicked
                };

                if icon_button(ui, egui_phosphor::regular::FADERS_HORIZONTAL, "Settings") {
                    self.open_settings();
                }
                if icon_button(ui, egui_phosphor::regular::CLOUD_ARROW_DOWN, "Reload schedules") {
                    self.refresh_data();
                }
                if icon_button(ui, egui_phosphor::regular::BRACKETS_CURLY, "Export grid to JSON") {
                    self.export_grid();
                }
            });
        });

        ui.add_space(8.0);

        if self.is_offline {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(egui_phosphor::regular::WIFI_SLASH)
                        .size(34.0)
                        .color(Color32::from_rgb(224, 108, 117))
                );
                ui.add_space(16.0);
                ui.label(
                    RichText::new("Backend unreachable")
                        .size(20.0)
                        .color(Color32::from_rgb(200, 200, 210))
                );
                ui.add_space(8.0);
                ui.label(
                    RichText::new(format!("Could not reach {}", self.config.base_url()))
                        .size(14.0)
                        .color(Color32::from_rgb(120, 120, 140))
                );
                ui.add_space(24.0);
                if ui.add(
                    egui::Button::new(
                        RichText::new(format!("{} Retry", egui_phosphor::regular::ARROWS_CLOCKWISE))
                            .size(17.0)
                            .color(Color32::WHITE)
                    )
                    .fill(accent_color(&self.config.accent_hsl))
                    .rounding(6.0)
                ).clicked() {
                    self.is_offline = false;
                    self.refresh_data();
                }
            });
            return;
        }

        if self.rejected_rows > 0 {
            ui.label(
                RichText::new(format!(
                    "{} {} schedule row(s) were outside the grid and are not shown",
                    egui_phosphor::regular::WARNING,
                    self.rejected_rows
                ))
                .size(12.0)
                .color(Color32::from_rgb(229, 192, 123))
            );
            ui.add_space(4.0);
        }

        let clock = self.config.period_clock();
        let clock_format = self.config.clock_format;
        let layout_config = self.config.layout_config();

        // Recomputed every frame from the current session list
        let grid_result = {
            let buckets = bucketize(&self.sessions);
            match layout(&buckets, &layout_config) {
                Ok(cells) => Some(views::render_schedule_grid(ui, &cells, &layout_config, &clock, clock_format)),
                Err(e) => {
                    ui.label(RichText::new(e.to_string()).color(Color32::from_rgb(224, 108, 117)));
                    None
                }
            }
        };

        if let Some(result) = grid_result {
            if let Some(session) = result.edit_session {
                self.open_edit_dialog(&session);
            }
            if let Some(session) = result.delete_session {
                self.pending_delete = Some(session);
                self.show_delete_confirm = true;
            }
            if let Some((day, period)) = result.add_at {
                self.open_add_dialog(day, period);
            }
            if let Some(selection) = result.open_overflow {
                self.overflow = Some(selection);
            }
        }
    }

    fn render_entry_dialog(&mut self, ctx: &egui::Context) {
        let period_count = self.config.period_count;
        let clock = self.config.period_clock();
        let clock_format = self.config.clock_format;
        let mut save_requested = false;
        let mut delete_requested = false;
        let mut close_requested = false;

        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        let title = match dialog.mode {
            DialogMode::Add => "Add schedule entry",
            DialogMode::Edit => "Edit schedule entry",
        };

        let (content_bg, frame_color, _) = super::theme::dialog_colors();
        let dialog_frame = egui::Frame::none()
            .fill(content_bg)
            .stroke(egui::Stroke::new(2.0, frame_color))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(20.0));

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .default_width(480.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame)
            .show(ctx, |ui| {
                let form = &mut dialog.form;
                // The backend identifies a slot by its section, so ids are fixed when editing
                let ids_editable = dialog.mode == DialogMode::Add;

                egui::Grid::new("entry_grid")
                    .num_columns(2)
                    .spacing([12.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Course");
                        if ids_editable {
                            ui.add(egui::TextEdit::singleline(&mut form.course_id)
                                .hint_text("CO2013")
                                .desired_width(200.0));
                        } else {
                            let label = match &form.course_name {
                                Some(name) if !name.trim().is_empty() => format!("{} - {}", form.course_id, name),
                                _ => form.course_id.clone(),
                            };
                            ui.label(RichText::new(label).strong());
                        }
                        ui.end_row();

                        ui.label("Section");
                        if ids_editable {
                            ui.add(egui::TextEdit::singleline(&mut form.section_id)
                                .hint_text("L01")
                                .desired_width(200.0));
                        } else {
                            ui.label(RichText::new(&form.section_id).strong());
                        }
                        ui.end_row();

                        ui.label("Day");
                        ui.horizontal_wrapped(|ui| {
                            for day in GRID_DAYS {
                                ui.selectable_value(&mut form.day, day, day_short_name(day));
                            }
                        });
                        ui.end_row();

                        ui.label("Start period");
                        ui.add(egui::Slider::new(&mut form.start_period, 1..=period_count));
                        ui.end_row();

                        ui.label("End period");
                        ui.add(egui::Slider::new(&mut form.end_period, 1..=period_count));
                        ui.end_row();
                    });

                if let Some(slots) = dialog.section_slots.as_ref().filter(|slots| slots.len() > 1) {
                    ui.add_space(10.0);
                    ui.label(RichText::new("This section meets").color(Color32::from_rgb(140, 140, 160)));
                    for slot in slots {
                        ui.label(RichText::new(format!(
                            "{} {}",
                            day_short_name(slot.day_of_week),
                            clock.range_label(slot.start_period, slot.end_period, clock_format)
                        )).size(13.0));
                    }
                }

                if let Some(err) = &dialog.error {
                    ui.add_space(8.0);
                    ui.label(RichText::new(err).color(Color32::from_rgb(0xff, 0x44, 0x44)));
                }

                ui.add_space(14.0);

                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save_requested = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close_requested = true;
                    }
                    if dialog.mode == DialogMode::Edit {
                        let delete = egui::Button::new(
                            RichText::new(format!("{} Delete", egui_phosphor::regular::TRASH))
                                .color(Color32::from_rgb(224, 108, 117))
                        );
                        if ui.add(delete).clicked() {
                            delete_requested = true;
                        }
                    }
                });
            });

        // Act after the window closure for the borrow checker
        if save_requested {
            self.save_dialog();
        } else if delete_requested {
            self.pending_delete = self.dialog.take().and_then(|d| d.original);
            self.show_delete_confirm = self.pending_delete.is_some();
        } else if close_requested {
            self.dialog = None;
        }
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        let section_color = Color32::from_rgb(140, 140, 160);
        let form = &mut self.settings;

        // === Connection ===
        ui.label(RichText::new("Connection").color(section_color).strong());
        ui.add_space(8.0);

        egui::Grid::new("connection_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("API URL");
                ui.add(egui::TextEdit::singleline(&mut form.api_base_url)
                    .desired_width(350.0));
                ui.end_row();

                ui.label("Access token");
                ui.add(
                    egui::TextEdit::singleline(&mut form.token)
                        .password(true)
                        .hint_text("Leave blank to keep existing")
                        .desired_width(350.0)
                );
                ui.end_row();
            });

        ui.add_space(20.0);

        // === Schedule ===
        ui.label(RichText::new("Schedule").color(section_color).strong());
        ui.add_space(8.0);

        egui::Grid::new("filter_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("View");
                ui.horizontal(|ui| {
                    for view in [ScheduleView::All, ScheduleView::ByRoom, ScheduleView::ByUser] {
                        ui.radio_value(&mut form.view, view, view_label(view));
                    }
                });
                ui.end_row();

                ui.label("Semester");
                ui.add(egui::TextEdit::singleline(&mut form.semester)
                    .hint_text("e.g. 242")
                    .desired_width(150.0));
                ui.end_row();

                match form.view {
                    ScheduleView::All => {
                        ui.label("Course");
                        ui.add(egui::TextEdit::singleline(&mut form.course_id)
                            .hint_text("All courses")
                            .desired_width(150.0));
                        ui.end_row();
                    }
                    ScheduleView::ByRoom => {
                        ui.label("Building");
                        ui.add(egui::TextEdit::singleline(&mut form.building_name)
                            .desired_width(150.0));
                        ui.end_row();

                        ui.label("Room");
                        ui.add(egui::TextEdit::singleline(&mut form.room_name)
                            .desired_width(150.0));
                        ui.end_row();
                    }
                    ScheduleView::ByUser => {
                        ui.label("University ID");
                        ui.add(egui::TextEdit::singleline(&mut form.university_id)
                            .desired_width(150.0));
                        ui.end_row();

                        ui.label("User type");
                        ui.horizontal(|ui| {
                            ui.radio_value(&mut form.user_type, UserType::Student, "Student");
                            ui.radio_value(&mut form.user_type, UserType::Tutor, "Tutor");
                        });
                        ui.end_row();
                    }
                }
            });

        ui.add_space(20.0);

        // === Grid ===
        ui.label(RichText::new("Grid").color(section_color).strong());
        ui.add_space(8.0);

        egui::Grid::new("grid_settings")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Days");
                ui.horizontal_wrapped(|ui| {
                    for (day, on) in GRID_DAYS.zip(form.days.iter_mut()) {
                        ui.checkbox(on, day_short_name(day));
                    }
                });
                ui.end_row();

                ui.label("Periods per day");
                ui.add(egui::Slider::new(&mut form.period_count, 1..=16));
                ui.end_row();

                ui.label("First period starts");
                ui.add(egui::Slider::new(&mut form.first_period_hour, 0..=23).suffix(":00"));
                ui.end_row();

                ui.label("Period length");
                ui.add(egui::Slider::new(&mut form.period_minutes, 15..=120).suffix(" min"));
                ui.end_row();

                ui.label("Row height");
                ui.add(egui::Slider::new(&mut form.period_height_px, 40.0..=160.0).suffix(" px"));
                ui.end_row();

                ui.label("Blocks per cell");
                ui.add(egui::Slider::new(&mut form.max_primary_per_cell, 1..=4));
                ui.end_row();
            });

        ui.add_space(20.0);

        // === Display ===
        ui.label(RichText::new("Display").color(section_color).strong());
        ui.add_space(8.0);

        egui::Grid::new("display_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Font scale");
                ui.horizontal(|ui| {
                    ui.add(egui::Slider::new(&mut form.font_scale, 0.75..=2.0).show_value(false));
                    ui.label(format!("{:.0}%", form.font_scale * 100.0));
                });
                ui.end_row();

                ui.label("Clock format");
                ui.horizontal(|ui| {
                    ui.radio_value(&mut form.clock_format, ClockFormat::Hour24, "14:30");
                    ui.radio_value(&mut form.clock_format, ClockFormat::Hour12, "2:30pm");
                });
                ui.end_row();

                ui.label("Accent colour");
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut form.accent_hex)
                        .hint_text("#1398f4")
                        .desired_width(100.0));
                    if let Ok(rgb) = crate::color::Rgb::from_hex(&form.accent_hex) {
                        let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 3.0, super::theme::rgb_to_color32(rgb));
                    }
                });
                ui.end_row();
            });

        ui.add_space(16.0);

        if let Some(err) = &self.settings_error {
            ui.label(RichText::new(err).color(Color32::from_rgb(224, 108, 117)));
            ui.add_space(8.0);
        }

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                self.save_settings();
            }
            if ui.button("Cancel").clicked() {
                self.show_settings = false;
            }
        });
    }
}

impl eframe::App for ClassGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle pinch-to-zoom (trackpad pinch or Ctrl+scroll)
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            self.config.font_scale = (self.config.font_scale * zoom_delta).clamp(0.75, 2.5);
            if (zoom_delta - 1.0).abs() > 0.01 {
                if let Err(e) = self.config.save() {
                    tracing::warn!("Failed to save config: {:#}", e);
                }
            }
        }

        ctx.set_pixels_per_point(self.config.font_scale);

        if self.theme_dirty {
            super::setup_theme(ctx, accent_color(&self.config.accent_hsl));
            self.theme_dirty = false;
        }

        self.check_async_results();

        // Update progress bar animation
        let elapsed = self.progress_start.elapsed().as_secs_f32();
        match self.progress_phase {
            ProgressPhase::Idle => {}
            ProgressPhase::FastStart => {
                self.progress = (elapsed / 0.25 * 0.17).min(0.17);
                if elapsed >= 0.25 {
                    self.progress_phase = ProgressPhase::SlowCrawl;
                    self.progress_start = std::time::Instant::now();
                }
                ctx.request_repaint();
            }
            ProgressPhase::SlowCrawl => {
                self.progress = 0.17 + (elapsed / 7.5 * 0.33).min(0.33);
                ctx.request_repaint();
            }
            ProgressPhase::Completing => {
                let t = (elapsed / 0.15).min(1.0);
                self.progress = self.progress + (1.0 - self.progress) * t;
                if elapsed >= 0.15 {
                    self.progress = 1.0;
                    self.progress_phase = ProgressPhase::FadingOut;
                    self.progress_start = std::time::Instant::now();
                }
                ctx.request_repaint();
            }
            ProgressPhase::FadingOut => {
                if elapsed >= 0.3 {
                    self.progress_phase = ProgressPhase::Idle;
                    self.progress = 0.0;
                }
                ctx.request_repaint();
            }
            ProgressPhase::Shrinking => {
                let t = (elapsed / 0.2).min(1.0);
                self.progress *= 1.0 - t;
                if elapsed >= 0.2 {
                    self.progress_phase = ProgressPhase::Idle;
                    self.progress = 0.0;
                }
                ctx.request_repaint();
            }
        }

        // Section slots arrive outside any progress animation
        if self.dialog.as_ref().is_some_and(|d| d.mode == DialogMode::Edit && d.section_slots.is_none()) {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }
        self.render_entry_dialog(ctx);

        // Overflow window for a "+N" badge
        if let Some(selection) = self.overflow.clone() {
            let mut open = true;
            let mut picked = None;
            let clock = self.config.period_clock();
            let clock_format = self.config.clock_format;
            egui::Window::new(format!("{} more", selection.sessions.len()))
                .id(egui::Id::new("overflow_window"))
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .show(ctx, |ui| {
                    picked = views::render_overflow_list(ui, &selection, &clock, clock_format);
                });
            if let Some(session) = picked {
                self.overflow = None;
                self.open_edit_dialog(&session);
            } else if !open {
                self.overflow = None;
            }
        }

        if self.show_settings {
            let (content_bg, frame_color, _) = super::theme::dialog_colors();
            let dialog_frame = egui::Frame::none()
                .fill(content_bg)
                .stroke(egui::Stroke::new(2.0, frame_color))
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(20.0));

            egui::Window::new("Settings")
                .collapsible(false)
                .resizable(false)
                .default_width(650.0)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .frame(dialog_frame)
                .vscroll(true)
                .show(ctx, |ui| {
                    self.render_settings(ui);
                });
        }

        if self.show_delete_confirm {
            let mut do_delete = false;
            let mut cancel_delete = false;

            let (content_bg, frame_color, _) = super::theme::dialog_colors();
            let dialog_frame = egui::Frame::none()
                .fill(content_bg)
                .stroke(egui::Stroke::new(2.0, frame_color))
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(20.0));

            let clock = self.config.period_clock();
            egui::Window::new("Confirm Delete")
                .collapsible(false)
                .resizable(false)
                .default_width(400.0)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .frame(dialog_frame)
                .show(ctx, |ui| {
                    ui.add_space(10.0);

                    if let Some(session) = &self.pending_delete {
                        ui.label(RichText::new("Delete this schedule entry?").size(14.0));
                        ui.add_space(10.0);
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&session.course_id).strong());
                            ui.label("-");
                            ui.add(egui::Label::new(session.display_label()).truncate());
                        });
                        ui.label(format!(
                            "Section {}, {} {}",
                            session.section_id,
                            day_name(session.day_of_week).unwrap_or("?"),
                            clock.range_label(session.start_period, session.end_period, self.config.clock_format)
                        ));
                    }

                    ui.add_space(20.0);

                    ui.horizontal(|ui| {
                        let delete = egui::Button::new(
                            RichText::new("Delete").color(Color32::from_rgb(224, 108, 117))
                        );
                        if ui.add(delete).clicked() {
                            do_delete = true;
                        }
                        if ui.button("Cancel").clicked() {
                            cancel_delete = true;
                        }
                    });
                });

            if do_delete {
                if let Some(session) = self.pending_delete.take() {
                    self.submit_change(LocalChange::Remove(session));
                }
                self.show_delete_confirm = false;
            }
            if cancel_delete {
                self.pending_delete = None;
                self.show_delete_confirm = false;
            }
        }

        egui::CentralPanel::default().frame(
            egui::Frame::none().inner_margin(egui::Margin::symmetric(12.0, 0.0))
        ).show(ctx, |ui| {
            // Progress bar at top (fixed height, no layout shift)
            let bar_height = 4.0;
            let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), bar_height), egui::Sense::hover());

            if self.progress_phase != ProgressPhase::Idle && ui.is_rect_visible(rect) && self.progress > 0.0 {
                let fill_width = rect.width() * self.progress;
                let bar_rect = egui::Rect::from_min_size(rect.min, egui::vec2(fill_width, bar_height));
                let alpha = if self.progress_phase == ProgressPhase::FadingOut {
                    let t = self.progress_start.elapsed().as_secs_f32() / 0.3;
                    ((1.0 - t).clamp(0.0, 1.0) * 255.0) as u8
                } else {
                    255
                };
                ui.painter().rect_filled(bar_rect, 0.0, Color32::from_rgba_unmultiplied(255, 255, 255, alpha));
            }

            // Status message with copy and close buttons
            let mut dismiss_message = false;
            let mut copy_message: Option<String> = None;
            if !self.store.is_busy() {
                if let Some((msg, is_error)) = &self.status_message {
                    let color = if *is_error {
                        Color32::from_rgb(224, 108, 117)
                    } else {
                        Color32::from_rgb(152, 195, 121)
                    };
                    let dim_color = Color32::from_rgb(120, 120, 130);
                    ui.horizontal(|ui| {
                        ui.add(egui::Label::new(RichText::new(msg).color(color)));

                        ui.add_space(8.0);

                        let copy_btn = ui.add(egui::Label::new(
                            RichText::new(egui_phosphor::regular::COPY).size(14.0).color(dim_color)
                        ).sense(egui::Sense::click()));
                        if copy_btn.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        if copy_btn.clicked() {
                            copy_message = Some(msg.clone());
                        }

                        let close_btn = ui.add(egui::Label::new(
                            RichText::new(egui_phosphor::regular::X).size(14.0).color(dim_color)
                        ).sense(egui::Sense::click()));
                        if close_btn.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        if close_btn.clicked() {
                            dismiss_message = true;
                        }
                    });
                    ui.add_space(8.0);
                }
            }
            if let Some(text) = copy_message {
                ui.ctx().copy_text(text);
            }
            if dismiss_message {
                self.status_message = None;
            }

            match self.state {
                AppState::Setup => self.render_setup(ui),
                AppState::Main => self.render_main(ui),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::session;

    #[test]
    fn entry_form_validation() {
        let mut form = EntryForm::for_cell(2, 5);
        assert_eq!(form.to_session(13).unwrap_err(), "Course and section are required");

        form.course_id = " CO2013 ".to_string();
        form.section_id = "L01".to_string();
        let s = form.to_session(13).unwrap();
        assert_eq!(s.course_id, "CO2013");
        assert_eq!((s.day_of_week, s.start_period, s.end_period), (2, 5, 5));

        form.end_period = 4;
        assert!(form.to_session(13).is_err());

        form.end_period = 14;
        assert!(form.to_session(13).is_err());

        form.end_period = 6;
        form.day = 7;
        assert!(form.to_session(13).is_err());
    }

    #[test]
    fn edit_form_keeps_session_details() {
        let mut s = session("CO2013", "L01", 2, 3, 4);
        s.course_name = Some("Database Systems".to_string());
        s.rooms_info = Some("H6 - 301".to_string());
        let form = EntryForm::from_session(&s);
        assert_eq!(form.to_session(13).unwrap(), s);
    }

    #[test]
    fn settings_round_trip_through_form() {
        let config = Config {
            api_token: Some("t".to_string()),
            semester: "242".to_string(),
            ..Config::default()
        };
        let form = SettingsForm::from_config(&config);
        assert_eq!(form.days, [true; 6]);

        let mut updated = config.clone();
        let reload = form.apply_to(&mut updated).unwrap();
        assert!(!reload);
        assert_eq!(updated.days, config.days);
        assert_eq!(updated.api_token.as_deref(), Some("t"));
    }

    #[test]
    fn settings_changes_trigger_reload() {
        let config = Config::default();
        let mut form = SettingsForm::from_config(&config);
        form.view = ScheduleView::ByUser;
        form.university_id = "2210001".to_string();
        form.days = [true, true, true, true, true, false];
        form.accent_hex = "#ff0000".to_string();

        let mut updated = config.clone();
        assert!(form.apply_to(&mut updated).unwrap());
        assert_eq!(updated.university_id, Some(2210001));
        assert_eq!(updated.days, vec![1, 2, 3, 4, 5]);
        assert_eq!(updated.accent_hsl, "0 100% 50%");
    }

    #[test]
    fn settings_reject_bad_input() {
        let config = Config::default();

        let mut form = SettingsForm::from_config(&config);
        form.university_id = "abc".to_string();
        assert!(form.apply_to(&mut config.clone()).is_err());

        let mut form = SettingsForm::from_config(&config);
        form.days = [false; 6];
        assert_eq!(form.apply_to(&mut config.clone()).unwrap_err(), "Pick at least one day");

        let mut form = SettingsForm::from_config(&config);
        form.accent_hex = "blue".to_string();
        assert!(form.apply_to(&mut config.clone()).is_err());

        let mut form = SettingsForm::from_config(&config);
        form.max_primary_per_cell = 0;
        assert!(form.apply_to(&mut config.clone()).is_err());
    }

    #[test]
    fn filter_summary_per_view() {
        let mut config = Config {
            semester: "242".to_string(),
            course_id: "CO2013".to_string(),
            ..Config::default()
        };
        assert_eq!(filter_summary(&config), "CO2013 · Semester 242");

        config.view = ScheduleView::ByRoom;
        config.building_name = "H6".to_string();
        config.room_name = "301".to_string();
        assert_eq!(filter_summary(&config), "H6 - 301 · Semester 242");

        config.view = ScheduleView::ByUser;
        config.semester.clear();
        assert_eq!(filter_summary(&config), "");
        config.university_id = Some(7);
        config.user_type = UserType::Tutor;
        assert_eq!(filter_summary(&config), "Tutor 7");
    }
}
