use egui::{Pos2, Rect, Vec2};

use crate::geometry::{rotate_point, rotated_corners, Handle, HandleMetrics};
use crate::id_generator::ElementId;
use crate::interaction::Direction;
use crate::state::EditorStore;

/// Spacing between overlay buttons, canvas pixels
const BUTTON_SPACING: f32 = 24.0;
/// Gap between the selection's bounds and the button row
const BUTTON_GAP: f32 = 20.0;

/// Where the selection overlay's pieces go, in canvas space.
///
/// Follows the element's rotation so it sits exactly over the painted pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub element: ElementId,
    pub rotation: f32,
    /// Painted outline, clockwise from top-left
    pub quad: [Pos2; 4],
    pub handles: [(Handle, Pos2); 8],
    /// Where the stem of the rotate handle meets the element
    pub rotate_stem: Pos2,
    pub rotate_handle: Pos2,
    pub nudge: [(Direction, Pos2); 4],
    pub delete: Pos2,
}

impl OverlayLayout {
    /// Layout for the selected element, if the selection resolves in the current view
    pub fn for_selection(store: &EditorStore, metrics: &HandleMetrics) -> Option<Self> {
        let element = store.selected_element()?;
        let rect = element.rect();
        let center = rect.center();
        let turn = |p: Pos2| rotate_point(p, center, element.rotation);

        let handles = Handle::ALL.map(|handle| {
            let a = handle.anchor();
            (handle, turn(rect.min + rect.size() * a))
        });

        let top_mid = Pos2::new(center.x, rect.min.y);
        let rotate_stem = turn(top_mid);
        let rotate_handle = turn(top_mid - Vec2::new(0.0, metrics.rotate_offset));

        let quad = rotated_corners(element);
        let bounds = Rect::from_points(&quad);
        let row_y = bounds.max.y + BUTTON_GAP;
        let nudge = [
            (Direction::Left, Pos2::new(bounds.center().x - 1.5 * BUTTON_SPACING, row_y)),
            (Direction::Up, Pos2::new(bounds.center().x - 0.5 * BUTTON_SPACING, row_y)),
            (Direction::Down, Pos2::new(bounds.center().x + 0.5 * BUTTON_SPACING, row_y)),
            (Direction::Right, Pos2::new(bounds.center().x + 1.5 * BUTTON_SPACING, row_y)),
        ];
        let delete = Pos2::new(bounds.max.x + BUTTON_GAP / 2.0, bounds.min.y - BUTTON_GAP / 2.0);

        Some(Self {
            element: element.id,
            rotation: element.rotation,
            quad,
            handles,
            rotate_stem,
            rotate_handle,
            nudge,
            delete,
        })
    }

    pub fn handle_pos(&self, handle: Handle) -> Pos2 {
        self.handles
            .iter()
            .find(|(h, _)| *h == handle)
            .map_or(self.quad[0], |(_, p)| *p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_selected_means_no_overlay() {
        let mut store = EditorStore::default();
        store.add_text(0.0, 0.0, "Hi");
        assert!(OverlayLayout::for_selection(&store, &HandleMetrics::default()).is_none());
    }

    #[test]
    fn unrotated_layout_matches_the_box() {
        let mut store = EditorStore::default();
        let id = store.add_image(100.0, 100.0, "a.png", 100.0, 50.0);
        store.select(Some(id));
        let layout = OverlayLayout::for_selection(&store, &HandleMetrics::default()).unwrap();
        assert_eq!(layout.element, id);
        assert_eq!(layout.handle_pos(Handle::BottomRight), Pos2::new(200.0, 150.0));
        assert_eq!(layout.handle_pos(Handle::Left), Pos2::new(100.0, 125.0));
        assert_eq!(layout.rotate_handle, Pos2::new(150.0, 70.0));
        assert!(layout.nudge.iter().all(|(_, p)| p.y > 150.0));
    }

    #[test]
    fn layout_follows_rotation() {
        let mut store = EditorStore::default();
        let id = store.add_image(100.0, 100.0, "a.png", 100.0, 50.0);
        store.update_element(id, &crate::element::ElementPatch::rotation(180.0));
        store.select(Some(id));
        let layout = OverlayLayout::for_selection(&store, &HandleMetrics::default()).unwrap();
        let br = layout.handle_pos(Handle::BottomRight);
        assert!((br.x - 100.0).abs() < 1e-3 && (br.y - 100.0).abs() < 1e-3);
        // rotate handle flips below the element
        assert!((layout.rotate_handle.y - 180.0).abs() < 1e-3);
    }
}
