use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

use crate::color::{Hsl, Rgb};

/// Fallback when the configured accent string doesn't parse
const DEFAULT_ACCENT: Color32 = Color32::from_rgb(19, 152, 244);

/// Font family for filled Phosphor icons
pub fn phosphor_fill_family() -> FontFamily {
    FontFamily::Name("phosphor-fill".into())
}

pub fn setup_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    // Phosphor Regular icons as fallback in the Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    // Phosphor Fill as its own family, with the default text font behind it
    fonts.font_data.insert(
        "phosphor-fill".into(),
        egui_phosphor::Variant::Fill.font_data(),
    );
    let mut fill_family = vec!["phosphor-fill".to_owned()];
    if let Some(proportional) = fonts.families.get(&FontFamily::Proportional) {
        fill_family.extend(proportional.iter().cloned());
    }
    fonts.families.insert(phosphor_fill_family(), fill_family);

    ctx.set_fonts(fonts);
}

pub fn rgb_to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

pub fn hsl_to_color32(hsl: Hsl) -> Color32 {
    rgb_to_color32(hsl.to_rgb())
}

/// Accent from a theme string ("205 91% 52%")
pub fn accent_color(accent_hsl: &str) -> Color32 {
    match Hsl::parse_theme(accent_hsl) {
        Ok(hsl) => hsl_to_color32(hsl),
        Err(err) => {
            tracing::warn!(%err, "invalid accent colour, using default");
            DEFAULT_ACCENT
        }
    }
}

/// Dark text on light course colours, white on dark ones
pub fn text_on(fill: Color32) -> Color32 {
    let [r, g, b, _] = fill.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 150.0 {
        Color32::from_rgb(20, 20, 18)
    } else {
        Color32::WHITE
    }
}

pub fn setup_theme(ctx: &egui::Context, accent: Color32) {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();

    let bg = Color32::BLACK;
    visuals.panel_fill = bg;
    visuals.window_fill = bg;
    visuals.faint_bg_color = Color32::from_rgb(20, 20, 18);
    visuals.extreme_bg_color = bg;

    // Warm grays (R=G > B)
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(40, 40, 38);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(176, 176, 168));

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(56, 56, 52);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(200, 200, 192));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(80, 80, 74);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::from_rgb(255, 255, 255));

    visuals.widgets.active.bg_fill = accent;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = accent;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.hyperlink_color = accent;

    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);
    visuals.widgets.active.rounding = Rounding::same(6.0);
    visuals.window_rounding = Rounding::same(8.0);

    style.visuals = visuals;

    // Font sizes - 14pt, scaled via pixels_per_point
    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(12.0, 10.0);
    style.spacing.button_padding = egui::vec2(18.0, 10.0);
    style.spacing.window_margin = egui::Margin::same(24.0);

    ctx.set_style(style);
}

/// Returns (header_bg, grid_line, axis_text) for the schedule grid
pub fn grid_colors() -> (Color32, Color32, Color32) {
    (
        Color32::from_rgb(20, 20, 18),       // header bg
        Color32::from_rgb(56, 56, 52),       // grid lines - warm gray
        Color32::from_rgb(176, 176, 168),    // axis text
    )
}

/// Returns (bg_color, text_color) for button-like elements to ensure consistency
pub fn button_colors() -> (Color32, Color32) {
    (
        Color32::from_rgb(56, 56, 52),       // bg - warm gray
        Color32::from_rgb(200, 200, 192),    // text - warm gray
    )
}

/// Returns (content_bg, frame_color, frame_text) for dialogs
pub fn dialog_colors() -> (Color32, Color32, Color32) {
    (
        Color32::BLACK,                      // content bg
        Color32::from_rgb(40, 40, 38),       // frame/border - warm gray
        Color32::from_rgb(176, 176, 168),    // frame text - warm gray
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_parses_theme_string() {
        assert_eq!(accent_color("0 100% 50%"), Color32::from_rgb(255, 0, 0));
        assert_eq!(accent_color("not a colour"), DEFAULT_ACCENT);
    }

    #[test]
    fn text_contrast() {
        assert_eq!(text_on(Color32::from_rgb(250, 240, 100)), Color32::from_rgb(20, 20, 18));
        assert_eq!(text_on(Color32::from_rgb(30, 40, 120)), Color32::WHITE);
    }
}
