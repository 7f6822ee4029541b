//! Draw engine that logs what a panel would show

use chatface_core::{DrawEngine, Surface, WidgetRole};
use tracing::{debug, info, trace};

/// Logs each presented frame as a one-line summary
#[derive(Debug, Default)]
pub struct LogDrawEngine {
    presents: u64,
    last_line: String,
}

impl LogDrawEngine {
    fn summarize(surface: &Surface) -> String {
        let status = if surface.notification_label().is_visible() {
            surface.notification_label().text()
        } else {
            surface.status_label().text()
        };
        let canvas = surface.emotion_canvas();
        let emotion = match canvas.clip() {
            Some(clip) if canvas.is_visible() => format!("{clip}#{}", canvas.frame_index()),
            _ => surface.emotion_glyph().text().to_string(),
        };
        let chat = if surface.chat().is_empty() {
            surface.chat_label().text().to_string()
        } else {
            surface
                .chat()
                .latest()
                .map(|b| format!("[{}] {}", b.role().as_str(), b.text()))
                .unwrap_or_default()
        };
        let banner = if surface.low_battery_banner().is_visible() {
            " LOW"
        } else {
            ""
        };

        format!(
            "{theme} | {status} | {net} {bat}{banner} | {emotion} | {chat}",
            theme = surface.theme().name(),
            net = surface.network_label().text(),
            bat = surface.battery_label().text(),
        )
    }
}

impl DrawEngine for LogDrawEngine {
    fn present(&mut self, surface: &Surface) {
        self.presents += 1;
        let line = Self::summarize(surface);
        // Animation frames change the line constantly; only log other changes at info
        if line == self.last_line {
            return;
        }
        if surface.emotion_canvas().is_visible() {
            debug!(revision = surface.revision(), "{line}");
        } else {
            info!(revision = surface.revision(), "{line}");
        }
        self.last_line = line;
    }

    fn widget_destroyed(&mut self, role: WidgetRole) {
        trace!(?role, "Widget destroyed");
    }

    fn release(&mut self) {
        info!(presents = self.presents, "Panel released");
    }
}
