use eframe::egui;

/// Square icon button used in the side panel toolbar
pub struct ToolButton {
    pub icon: &'static str,
    pub tooltip: &'static str,
    pub enabled: bool,
}

impl ToolButton {
    pub fn new(icon: &'static str, tooltip: &'static str) -> Self {
        Self {
            icon,
            tooltip,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns true when clicked while enabled
    pub fn show(&self, ui: &mut egui::Ui) -> bool {
        let sense = if self.enabled {
            egui::Sense::click()
        } else {
            egui::Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(egui::vec2(32.0, 32.0), sense);
        let response = response.on_hover_text(self.tooltip);

        if ui.is_rect_visible(rect) {
            let fill = if response.hovered() && self.enabled {
                egui::Color32::from_gray(70)
            } else {
                egui::Color32::from_gray(45)
            };
            ui.painter().rect_filled(rect, 4.0, fill);

            let ink = if self.enabled {
                egui::Color32::WHITE
            } else {
                egui::Color32::from_gray(110)
            };
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                self.icon,
                egui::FontId::proportional(20.0),
                ink,
            );
        }

        self.enabled && response.clicked()
    }
}
