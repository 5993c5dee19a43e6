//! Parameter panel.
//!
//! Widgets edit a private draft of [`GalaxyParameters`]. The draft is
//! committed as a new snapshot only once an edit completes: the pointer
//! is released and no text field holds focus. Dragging a slider
//! therefore regenerates once, on release, not on every frame.

use egui::Ui;

use crate::camera::{CameraMode, OrbitController, ZOOM_MAX, ZOOM_MIN};
use crate::params::{Bound, Color, GalaxyParameters, ParamBounds};

/// Read-only figures shown in the panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelStats {
    pub fps: f32,
    pub points: usize,
    pub generation: u64,
}

/// What the user asked for this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelResponse {
    /// A completed edit, already pinned into bounds.
    pub commit: Option<GalaxyParameters>,
    pub regenerate: bool,
    pub save: bool,
}

pub struct GalaxyPanel {
    draft: GalaxyParameters,
    /// The last snapshot handed out (or the one the panel started from).
    committed: GalaxyParameters,
    dirty: bool,
    status: Option<String>,
}

impl GalaxyPanel {
    pub fn new(params: &GalaxyParameters) -> Self {
        Self {
            draft: params.clone(),
            committed: params.clone(),
            dirty: false,
            status: None,
        }
    }

    /// One-line message under the buttons, e.g. the result of a save.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Draw the panel and collect the user's requests.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        controller: &mut OrbitController,
        stats: PanelStats,
    ) -> PanelResponse {
        let mut response = PanelResponse::default();

        egui::Window::new("Galaxy")
            .default_width(260.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!(
                    "{:.0} fps  |  {} points  |  #{}",
                    stats.fps, stats.points, stats.generation
                ));
                ui.separator();

                self.dirty |= render_parameters(ui, &mut self.draft);

                ui.separator();
                render_camera(ui, controller);

                ui.separator();
                ui.horizontal(|ui| {
                    response.regenerate = ui.button("Regenerate").clicked();
                    response.save = ui.button("Save preset").clicked();
                });
                if let Some(status) = &self.status {
                    ui.small(status);
                }
            });

        let pointer_down = ctx.input(|i| i.pointer.any_down());
        let focused = ctx.memory(|m| m.focused()).is_some();
        response.commit = self.take_commit(pointer_down, focused);
        response
    }

    /// Hand out the draft if an edit just completed and it differs from
    /// the last committed snapshot.
    fn take_commit(&mut self, pointer_down: bool, focused: bool) -> Option<GalaxyParameters> {
        if !self.dirty || pointer_down || focused {
            return None;
        }
        self.dirty = false;
        self.draft = self.draft.clamped();
        if self.draft == self.committed {
            return None;
        }
        self.committed = self.draft.clone();
        Some(self.draft.clone())
    }
}

// Sliders don't use `step_by`: egui snaps onto a grid counted from the
// range minimum, which would move in-range values (radius 5.0 -> 5.01)
// without any input. The bound step only sets the drag speed.
fn slider_f32<'a>(value: &'a mut f32, bound: Bound<f32>, text: &str) -> egui::Slider<'a> {
    egui::Slider::new(value, bound.min..=bound.max)
        .drag_value_speed(bound.step as f64)
        .text(text)
}

/// Store a color picked in 8-bit sRGB. Returns whether it changed.
fn apply_picked(color: &mut Color, rgb: [u8; 3]) -> bool {
    if rgb == color.to_srgb8() {
        return false;
    }
    *color = Color::from_srgb8(rgb);
    true
}

fn color_row(ui: &mut Ui, label: &str, color: &mut Color) -> bool {
    ui.horizontal(|ui| {
        // Colors are stored sRGB-encoded, so edit them as sRGB
        let mut rgb = color.to_srgb8();
        let edited = ui.color_edit_button_srgb(&mut rgb).changed();
        ui.label(label);
        edited && apply_picked(color, rgb)
    })
    .inner
}

fn render_parameters(ui: &mut Ui, draft: &mut GalaxyParameters) -> bool {
    let mut changed = false;

    ui.heading("Generation");

    let count = ParamBounds::COUNT;
    changed |= ui
        .add(
            egui::Slider::new(&mut draft.count, count.min..=count.max)
                .drag_value_speed(count.step as f64)
                .logarithmic(true)
                .text("Count"),
        )
        .changed();
    changed |= ui
        .add(slider_f32(&mut draft.size, ParamBounds::SIZE, "Size").logarithmic(true))
        .changed();
    changed |= ui
        .add(slider_f32(&mut draft.radius, ParamBounds::RADIUS, "Radius"))
        .changed();

    let branches = ParamBounds::BRANCHES;
    changed |= ui
        .add(egui::Slider::new(&mut draft.branches, branches.min..=branches.max).text("Branches"))
        .changed();
    changed |= ui
        .add(slider_f32(&mut draft.spin, ParamBounds::SPIN, "Spin"))
        .changed();
    changed |= ui
        .add(slider_f32(&mut draft.randomness, ParamBounds::RANDOMNESS, "Randomness"))
        .changed();
    changed |= ui
        .add(slider_f32(
            &mut draft.randomness_power,
            ParamBounds::RANDOMNESS_POWER,
            "Randomness power",
        ))
        .changed();

    changed |= color_row(ui, "Inside color", &mut draft.inside_color);
    changed |= color_row(ui, "Outside color", &mut draft.outside_color);

    changed
}

fn render_camera(ui: &mut Ui, controller: &mut OrbitController) {
    ui.heading("Camera");

    let mut paused = controller.is_paused();
    if ui.checkbox(&mut paused, "Paused (Space)").changed() {
        controller.set_paused(paused);
    }

    let mut mode = controller.mode();
    ui.horizontal(|ui| {
        ui.label("Mode (C):");
        ui.selectable_value(&mut mode, CameraMode::Follow, "Follow");
        ui.selectable_value(&mut mode, CameraMode::Free, "Free");
    });
    if mode != controller.mode() {
        controller.set_mode(mode);
    }

    let mut y_offset = controller.y_offset();
    if ui
        .add(egui::Slider::new(&mut y_offset, -10.0..=10.0).text("Height"))
        .changed()
    {
        controller.set_y_offset(y_offset);
    }

    let mut zoom = controller.zoom();
    if ui
        .add(egui::Slider::new(&mut zoom, ZOOM_MIN..=ZOOM_MAX).text("Zoom"))
        .changed()
    {
        controller.set_zoom(zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_idle_frames(panel: &mut GalaxyPanel, frames: usize) -> Vec<PanelResponse> {
        let ctx = egui::Context::default();
        let mut controller = OrbitController::new();
        let mut responses = Vec::new();
        for _ in 0..frames {
            let mut response = PanelResponse::default();
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                response = panel.show(ctx, &mut controller, PanelStats::default());
            });
            responses.push(response);
        }
        assert_eq!(controller, OrbitController::new());
        responses
    }

    #[test]
    fn test_no_commit_while_dragging() {
        let mut panel = GalaxyPanel::new(&GalaxyParameters::default());
        panel.draft.count = 2_000;
        panel.dirty = true;

        assert_eq!(panel.take_commit(true, false), None);
        assert_eq!(panel.take_commit(false, true), None);
        assert!(panel.dirty);

        let committed = panel.take_commit(false, false).unwrap();
        assert_eq!(committed.count, 2_000);
        assert!(!panel.dirty);
        assert_eq!(panel.take_commit(false, false), None);
    }

    #[test]
    fn test_commit_is_clamped() {
        let mut panel = GalaxyPanel::new(&GalaxyParameters::default());
        panel.draft.branches = 40;
        panel.dirty = true;
        let committed = panel.take_commit(false, false).unwrap();
        assert_eq!(committed.branches, ParamBounds::BRANCHES.max);
        assert_eq!(panel.draft.branches, ParamBounds::BRANCHES.max);
    }

    #[test]
    fn test_edit_back_to_committed_value_commits_nothing() {
        let mut panel = GalaxyPanel::new(&GalaxyParameters::default());
        panel.draft.spin = -3.0;
        panel.draft.spin = GalaxyParameters::default().spin;
        panel.dirty = true;
        assert_eq!(panel.take_commit(false, false), None);
        assert!(!panel.dirty);
    }

    #[test]
    fn test_idle_frames_commit_nothing() {
        let mut panel = GalaxyPanel::new(&GalaxyParameters::default());
        for response in run_idle_frames(&mut panel, 5) {
            assert_eq!(response, PanelResponse::default());
        }
        assert_eq!(panel.draft, GalaxyParameters::default());
    }

    #[test]
    fn test_idle_frames_keep_off_grid_preset_values() {
        let preset = GalaxyParameters {
            count: 12_345,
            size: 0.0137,
            radius: 7.77,
            spin: -1.23,
            randomness: 0.4321,
            randomness_power: 2.5,
            ..Default::default()
        };
        let mut panel = GalaxyPanel::new(&preset);
        for response in run_idle_frames(&mut panel, 3) {
            assert_eq!(response.commit, None);
        }
        assert_eq!(panel.draft, preset);
    }

    #[test]
    fn test_picked_color_is_stored_as_srgb() {
        let mut color = Color::from_hex("#ff6030").unwrap();
        // The swatch shows the stored hex, so re-picking it is a no-op
        assert!(!apply_picked(&mut color, [0xff, 0x60, 0x30]));
        assert_eq!(color.to_hex(), "#ff6030");

        assert!(apply_picked(&mut color, [0x80, 0x80, 0x80]));
        assert_eq!(color.to_hex(), "#808080");
        assert_eq!(color, Color::from_srgb8([128, 128, 128]));
    }
}
