// Tailview - ui/theme.rs
//
// Colour scheme, severity colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::Severity;
use egui::Color32;

/// Colour for a given severity badge.
pub fn severity_colour(severity: Severity) -> Color32 {
    match severity {
        Severity::Emergency => Color32::from_rgb(252, 165, 165), // Red 300
        Severity::Alert => Color32::from_rgb(248, 113, 113),     // Red 400
        Severity::Critical => Color32::from_rgb(220, 38, 38),    // Red 600
        Severity::Error => Color32::from_rgb(185, 28, 28),       // Red 800
        Severity::Warning => Color32::from_rgb(217, 119, 6),     // Amber 600
        Severity::Notice => Color32::from_rgb(96, 165, 250),     // Blue 400
        Severity::Info => Color32::from_rgb(209, 213, 219),      // Gray 300
        Severity::Debug => Color32::from_rgb(107, 114, 128),     // Gray 500
    }
}

/// Body text colour for the rest of a log row.
pub const ROW_TEXT: Color32 = Color32::from_rgb(229, 231, 235); // Gray 200

/// Background tint for the current (most recent) entry.
pub const CURRENT_ROW_BG: Color32 = Color32::from_rgba_premultiplied(59, 130, 246, 18);

/// Status bar colours.
pub const STATUS_BG: Color32 = Color32::from_rgb(31, 41, 55); // Gray 800
pub const STATUS_TEXT: Color32 = Color32::from_rgb(209, 213, 219); // Gray 300
pub const STATUS_DISCONNECTED: Color32 = Color32::from_rgb(248, 113, 113); // Red 400

/// Layout constants.
pub const LOG_FONT_SIZE: f32 = 12.0;
pub const STATUS_BAR_HEIGHT: f32 = 28.0;
