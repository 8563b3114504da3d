use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Local};
use egui::{Color32, Pos2, Rect, Ui};

use crate::api::{day_short_name, PeriodClock};
use crate::config::ClockFormat;
use crate::schedule::{BlockInstruction, CellInstruction, CellKind, LayoutConfig, Session};
use super::theme::{grid_colors, hsl_to_color32, phosphor_fill_family, text_on};

/// Result from grid interactions
#[derive(Default)]
pub struct GridResult {
    pub edit_session: Option<Session>,
    pub delete_session: Option<Session>,
    pub add_at: Option<(i32, i32)>,  // (day, period)
    pub open_overflow: Option<OverflowSelection>,
}

/// Sessions hidden behind a "+N" badge, shown in their own window
#[derive(Debug, Clone)]
pub struct OverflowSelection {
    pub day: i32,
    pub period: i32,
    pub sessions: Vec<Session>,
}

const AXIS_WIDTH: f32 = 84.0;
const HEADER_HEIGHT: f32 = 32.0;
const BLOCK_MARGIN: f32 = 2.0;
const BADGE_SIZE: egui::Vec2 = egui::vec2(34.0, 20.0);
/// Width kept free of blocks in cells that show a "+N" badge
const BADGE_STRIP: f32 = BADGE_SIZE.x + 8.0;

/// Pixel geometry of the grid body; y = 0 is the top of period 1
#[derive(Debug, Clone, Copy)]
struct GridGeometry {
    origin: Pos2,
    day_width: f32,
    period_height: f32,
}

impl GridGeometry {
    fn column_x(&self, day_index: usize) -> f32 {
        self.origin.x + AXIS_WIDTH + day_index as f32 * self.day_width
    }

    fn cell_rect(&self, day_index: usize, period: i32) -> Rect {
        Rect::from_min_size(
            egui::pos2(
                self.column_x(day_index),
                self.origin.y + (period - 1) as f32 * self.period_height,
            ),
            egui::vec2(self.day_width, self.period_height),
        )
    }

    /// Blocks sharing a cell split the column width in stack order,
    /// minus `reserved` on the right
    fn block_rect(
        &self,
        day_index: usize,
        block: &BlockInstruction<'_>,
        stack_count: usize,
        reserved: f32,
    ) -> Rect {
        let lane_width = (self.day_width - reserved).max(0.0) / stack_count.max(1) as f32;
        let x = self.column_x(day_index) + block.stack_index as f32 * lane_width;
        Rect::from_min_size(
            egui::pos2(x + BLOCK_MARGIN, self.origin.y + block.top_offset_px),
            egui::vec2((lane_width - BLOCK_MARGIN * 2.0).max(0.0), block.height_px),
        )
    }

    /// "+N" chip in the top-right corner of a cell
    fn badge_rect(&self, day_index: usize, period: i32) -> Rect {
        let cell = self.cell_rect(day_index, period);
        Rect::from_min_size(
            egui::pos2(cell.max.x - BADGE_SIZE.x - 4.0, cell.min.y + 4.0),
            BADGE_SIZE,
        )
    }
}

/// Cells that carry an overflow badge
fn overflow_cells(cells: &[CellInstruction<'_>]) -> HashSet<(i32, i32)> {
    cells
        .iter()
        .filter(|cell| matches!(cell.kind, CellKind::OverflowBadge { .. }))
        .map(|cell| (cell.day, cell.period))
        .collect()
}

/// Number of blocks per (day, period) cell
fn stack_counts(cells: &[CellInstruction<'_>]) -> HashMap<(i32, i32), usize> {
    let mut counts = HashMap::new();
    for cell in cells {
        if let CellKind::Block(_) = cell.kind {
            *counts.entry((cell.day, cell.period)).or_insert(0) += 1;
        }
    }
    counts
}

pub fn render_schedule_grid(
    ui: &mut Ui,
    cells: &[CellInstruction<'_>],
    config: &LayoutConfig,
    clock: &PeriodClock,
    clock_format: ClockFormat,
) -> GridResult {
    let mut result = GridResult::default();
    let (header_bg, grid_line_color, axis_text) = grid_colors();

    let day_index: HashMap<i32, usize> = config.days
        .iter()
        .enumerate()
        .map(|(i, &day)| (day, i))
        .collect();
    let today = Local::now().weekday().number_from_monday() as i32;

    let available_width = ui.available_width();
    let num_days = config.days.len().max(1);
    let day_width = (available_width - AXIS_WIDTH) / num_days as f32;

    // Fixed day headers (outside ScrollArea)
    let (header_rect, _) = ui.allocate_exact_size(
        egui::vec2(available_width, HEADER_HEIGHT),
        egui::Sense::hover(),
    );
    let painter = ui.painter();
    painter.rect_filled(header_rect, 0.0, header_bg);

    for (i, &day) in config.days.iter().enumerate() {
        let x = header_rect.min.x + AXIS_WIDTH + i as f32 * day_width;
        let color = if day == today { Color32::WHITE } else { axis_text };
        painter.text(
            egui::pos2(x + 8.0, header_rect.center().y),
            egui::Align2::LEFT_CENTER,
            day_short_name(day),
            egui::FontId::proportional(14.0),
            color,
        );

        if i > 0 {
            painter.line_segment(
                [
                    egui::pos2(x, header_rect.min.y + 4.0),
                    egui::pos2(x, header_rect.max.y - 4.0),
                ],
                egui::Stroke::new(1.0, grid_line_color),
            );
        }
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        let (grid_rect, _) = ui.allocate_exact_size(
            egui::vec2(available_width, config.grid_height_px()),
            egui::Sense::hover(),
        );
        let geometry = GridGeometry {
            origin: grid_rect.min,
            day_width,
            period_height: config.period_height_px,
        };

        paint_grid_lines(ui, &geometry, grid_rect, config, clock, clock_format, today);

        let counts = stack_counts(cells);
        let with_badge = overflow_cells(cells);

        for cell in cells {
            // Days outside the configured set never reach here, but don't panic if one does
            let Some(&col) = day_index.get(&cell.day) else {
                continue;
            };

            match &cell.kind {
                CellKind::Empty => {
                    let rect = geometry.cell_rect(col, cell.period);
                    let response = ui.interact(
                        rect,
                        ui.id().with(("empty", cell.day, cell.period)),
                        egui::Sense::click(),
                    );
                    if response.hovered() {
                        paint_add_hint(ui, rect);
                    }
                    if response.clicked() {
                        result.add_at = Some((cell.day, cell.period));
                    }
                }
                CellKind::Block(block) => {
                    let stack_count = counts.get(&(cell.day, cell.period)).copied().unwrap_or(1);
                    let reserved = if with_badge.contains(&(cell.day, cell.period)) {
                        BADGE_STRIP
                    } else {
                        0.0
                    };
                    let rect = geometry.block_rect(col, block, stack_count, reserved);
                    if rect.height() <= 0.0 || rect.width() <= 0.0 {
                        continue;
                    }
                    paint_block(ui, rect, block, clock, clock_format);

                    let response = ui
                        .interact(
                            rect,
                            ui.id().with(("block", cell.day, cell.period, block.stack_index)),
                            egui::Sense::click(),
                        )
                        .on_hover_text(block_tooltip(block.session, clock, clock_format));
                    if response.hovered() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                    if response.clicked() {
                        result.edit_session = Some(block.session.clone());
                    }
                    response.context_menu(|ui| {
                        if ui.button(format!("{} Edit", egui_phosphor::regular::PENCIL_SIMPLE)).clicked() {
                            result.edit_session = Some(block.session.clone());
                            ui.close_menu();
                        }
                        if ui.button(format!("{} Delete", egui_phosphor::regular::TRASH)).clicked() {
                            result.delete_session = Some(block.session.clone());
                            ui.close_menu();
                        }
                    });
                }
                CellKind::OverflowBadge { remaining_count, remaining_sessions } => {
                    let rect = geometry.badge_rect(col, cell.period);
                    let response = ui.interact(
                        rect,
                        ui.id().with(("overflow", cell.day, cell.period)),
                        egui::Sense::click(),
                    );
                    paint_badge(ui, rect, *remaining_count, response.hovered());
                    if response.clicked() {
                        result.open_overflow = Some(OverflowSelection {
                            day: cell.day,
                            period: cell.period,
                            sessions: remaining_sessions.iter().map(|&s| s.clone()).collect(),
                        });
                    }
                }
            }
        }
    });

    result
}

fn paint_grid_lines(
    ui: &Ui,
    geometry: &GridGeometry,
    grid_rect: Rect,
    config: &LayoutConfig,
    clock: &PeriodClock,
    clock_format: ClockFormat,
    today: i32,
) {
    let painter = ui.painter();
    let (_, grid_line_color, axis_text) = grid_colors();
    let body_left = grid_rect.min.x + AXIS_WIDTH;

    // Dim background on today's column
    if let Some(i) = config.days.iter().position(|&d| d == today) {
        let x = geometry.column_x(i);
        let col_rect = Rect::from_min_max(
            egui::pos2(x, grid_rect.min.y),
            egui::pos2(x + geometry.day_width, grid_rect.max.y),
        );
        painter.rect_filled(col_rect, 0.0, Color32::from_rgb(0x11, 0x11, 0x10));
    }

    for i in 0..=config.days.len() {
        let x = geometry.column_x(i);
        painter.line_segment(
            [egui::pos2(x, grid_rect.min.y), egui::pos2(x, grid_rect.max.y)],
            egui::Stroke::new(1.0, grid_line_color),
        );
    }

    for period in 1..=config.period_count + 1 {
        let y = grid_rect.min.y + (period - 1) as f32 * geometry.period_height;
        if period <= config.period_count {
            painter.text(
                egui::pos2(body_left - 8.0, y + 4.0),
                egui::Align2::RIGHT_TOP,
                clock.label(period, clock_format),
                egui::FontId::proportional(11.0),
                axis_text,
            );
        }
        painter.line_segment(
            [egui::pos2(body_left, y), egui::pos2(grid_rect.max.x, y)],
            egui::Stroke::new(1.0, grid_line_color),
        );
    }
}

fn paint_add_hint(ui: &Ui, rect: Rect) {
    let hint = rect.shrink(BLOCK_MARGIN);
    let fill = Color32::from_rgba_unmultiplied(0x61, 0xAF, 0xEF, 30);
    let border = Color32::from_rgba_unmultiplied(0x61, 0xAF, 0xEF, 100);
    ui.painter().rect(hint, 4.0, fill, egui::Stroke::new(1.0, border));
    ui.painter().text(
        hint.center(),
        egui::Align2::CENTER_CENTER,
        egui_phosphor::fill::PLUS_CIRCLE,
        egui::FontId::new(16.0, phosphor_fill_family()),
        Color32::from_rgba_unmultiplied(255, 255, 255, 150),
    );
    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
}

/// Paint a session block (interaction is handled by the caller)
fn paint_block(
    ui: &Ui,
    rect: Rect,
    block: &BlockInstruction<'_>,
    clock: &PeriodClock,
    clock_format: ClockFormat,
) {
    let fill = hsl_to_color32(block.color);
    let text_color = text_on(fill);
    let painter = ui.painter().with_clip_rect(rect);

    painter.rect(rect, 4.0, fill, egui::Stroke::NONE);

    let session = block.session;
    let left = rect.min.x + 6.0;
    let mut y = rect.min.y + 4.0;
    let line_height = 16.0;

    let lines = [
        (session.display_label().to_string(), egui::FontId::proportional(13.0)),
        (
            format!("{} · {}", session.course_id, session.section_id),
            egui::FontId::proportional(11.0),
        ),
        (
            clock.range_label(session.start_period, session.end_period, clock_format),
            egui::FontId::proportional(11.0),
        ),
    ];

    for (text, font) in lines {
        if y + line_height > rect.max.y {
            break;
        }
        painter.text(egui::pos2(left, y), egui::Align2::LEFT_TOP, text, font, text_color);
        y += line_height;
    }

    if let Some(rooms) = &session.rooms_info {
        if y + line_height <= rect.max.y {
            painter.text(
                egui::pos2(left, y),
                egui::Align2::LEFT_TOP,
                format!("{} {}", egui_phosphor::regular::MAP_PIN, rooms),
                egui::FontId::proportional(11.0),
                text_color,
            );
        }
    }
}

fn paint_badge(ui: &Ui, rect: Rect, remaining_count: usize, hovered: bool) {
    let fill = if hovered {
        Color32::from_rgb(80, 80, 74)
    } else {
        Color32::from_rgb(56, 56, 52)
    };
    ui.painter().rect(rect, 10.0, fill, egui::Stroke::new(1.0, Color32::from_rgb(176, 176, 168)));
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        format!("+{}", remaining_count),
        egui::FontId::proportional(12.0),
        Color32::WHITE,
    );
    if hovered {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
}

fn block_tooltip(session: &Session, clock: &PeriodClock, clock_format: ClockFormat) -> String {
    let mut text = format!(
        "{} ({})\nSection {}\nPeriods {}-{}, {}",
        session.display_label(),
        session.course_id,
        session.section_id,
        session.start_period,
        session.end_period,
        clock.range_label(session.start_period, session.end_period, clock_format),
    );
    if let Some(rooms) = &session.rooms_info {
        text.push_str(&format!("\nRoom {}", rooms));
    }
    text
}

/// Body of the overflow window. Returns a session the user picked to edit.
pub fn render_overflow_list(
    ui: &mut Ui,
    selection: &OverflowSelection,
    clock: &PeriodClock,
    clock_format: ClockFormat,
) -> Option<Session> {
    let mut picked = None;
    ui.label(format!(
        "{}, {}",
        day_short_name(selection.day),
        clock.label(selection.period, clock_format)
    ));
    ui.separator();

    for session in &selection.sessions {
        ui.horizontal(|ui| {
            let swatch = hsl_to_color32(crate::color::course_color(&session.course_id));
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, swatch);

            ui.label(format!(
                "{}  {}  {}",
                session.display_label(),
                session.section_id,
                clock.range_label(session.start_period, session.end_period, clock_format)
            ));
            if ui.small_button(egui_phosphor::regular::PENCIL_SIMPLE).clicked() {
                picked = Some(session.clone());
            }
        });
    }
    picked
}
