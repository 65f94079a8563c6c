//! Parameter panel of the isosurface raycasters.
//!
//! Widgets never write parameters directly: each widget interaction becomes
//! an [`IsoPanelEdit`] applied through [`apply_iso_edit`], which routes it
//! through the clamping setters and flags the renderer outdated.

use egui::{CollapsingHeader, DragValue, Ui};
use glam::Vec4;
use volrend_core::iso_parameters::{INTERVAL_RANGE, ISOVALUE_RANGE, STEP_SIZE_RANGE};
use volrend_core::{AdaptiveIsoParameters, RendererState};

/// A single user edit of the isosurface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IsoPanelEdit {
    Isovalue(f32),
    StepSize(f32),
    Color(Vec4),
    GradientShading(bool),
    Interpolation(bool),
    /// Signed because keyboard entry in a drag widget can go negative.
    Interval(i32),
    DebugTempTexture(bool),
}

/// What a panel frame changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelResponse {
    /// Any parameter changed; a new frame is needed.
    pub changed: bool,
    /// The gradient-shading toggle flipped; the gradient input must be
    /// re-bound.
    pub gradient_toggled: bool,
}

impl PanelResponse {
    /// Combines two responses.
    #[must_use]
    pub fn merge(self, other: PanelResponse) -> PanelResponse {
        PanelResponse {
            changed: self.changed || other.changed,
            gradient_toggled: self.gradient_toggled || other.gradient_toggled,
        }
    }
}

/// Applies one edit. Values are clamped into their valid ranges, and the
/// renderer is flagged outdated when the stored value actually changed.
pub fn apply_iso_edit(
    params: &mut AdaptiveIsoParameters,
    state: &mut RendererState,
    edit: IsoPanelEdit,
) -> PanelResponse {
    let before = params.clone();
    match edit {
        IsoPanelEdit::Isovalue(v) => params.set_isovalue(v),
        IsoPanelEdit::StepSize(v) => params.set_step_size(v),
        IsoPanelEdit::Color(c) => params.set_color(c),
        IsoPanelEdit::GradientShading(on) => params.set_apply_gradient_shading(on),
        IsoPanelEdit::Interpolation(on) => params.set_do_interpolation(on),
        IsoPanelEdit::Interval(v) => params.set_interval_i32(v),
        IsoPanelEdit::DebugTempTexture(on) => params.set_debug_temp_texture(on),
    }

    let changed = *params != before;
    if changed {
        state.set_outdated();
    }
    PanelResponse {
        changed,
        gradient_toggled: changed && matches!(edit, IsoPanelEdit::GradientShading(_)),
    }
}

/// Widgets shared by both isosurface panels; pushes edits into `edits`.
fn surface_widgets(
    ui: &mut Ui,
    params: &AdaptiveIsoParameters,
    has_gradient: bool,
    edits: &mut Vec<IsoPanelEdit>,
) {
    ui.horizontal(|ui| {
        ui.label("Isovalue:");
        let mut value = params.isovalue();
        if ui
            .add(DragValue::new(&mut value).speed(0.01).range(ISOVALUE_RANGE))
            .changed()
        {
            edits.push(IsoPanelEdit::Isovalue(value));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Step size:");
        let mut value = params.step_size();
        if ui
            .add(DragValue::new(&mut value).speed(0.01).range(STEP_SIZE_RANGE))
            .changed()
        {
            edits.push(IsoPanelEdit::StepSize(value));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Color:");
        let mut rgba = params.color().to_array();
        if ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed() {
            edits.push(IsoPanelEdit::Color(Vec4::from_array(rgba)));
        }
    });

    if has_gradient {
        let mut shading = params.apply_gradient_shading();
        if ui.checkbox(&mut shading, "Apply gradient shading").changed() {
            edits.push(IsoPanelEdit::GradientShading(shading));
        }
    }
}

fn apply_all(
    params: &mut AdaptiveIsoParameters,
    state: &mut RendererState,
    edits: Vec<IsoPanelEdit>,
) -> PanelResponse {
    edits
        .into_iter()
        .map(|edit| apply_iso_edit(params, state, edit))
        .fold(PanelResponse::default(), PanelResponse::merge)
}

/// Builds the adaptive-resolution panel.
///
/// The gradient-shading toggle only appears when `has_gradient` is set.
pub fn build_adaptive_iso_panel(
    ui: &mut Ui,
    params: &mut AdaptiveIsoParameters,
    state: &mut RendererState,
    has_gradient: bool,
) -> PanelResponse {
    let mut edits = Vec::new();

    CollapsingHeader::new("Isosurface")
        .default_open(true)
        .show(ui, |ui| {
            surface_widgets(ui, params, has_gradient, &mut edits);
        });

    CollapsingHeader::new("Adaptive Resolution")
        .default_open(true)
        .show(ui, |ui| {
            let mut interpolate = params.do_interpolation();
            if ui.checkbox(&mut interpolate, "Interpolation").changed() {
                edits.push(IsoPanelEdit::Interpolation(interpolate));
            }

            ui.add_enabled_ui(params.do_interpolation(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Interval:");
                    let mut interval = params.interval() as i32;
                    let range = *INTERVAL_RANGE.start() as i32..=*INTERVAL_RANGE.end() as i32;
                    if ui
                        .add(DragValue::new(&mut interval).speed(0.1).range(range))
                        .changed()
                    {
                        edits.push(IsoPanelEdit::Interval(interval));
                    }
                });

                let mut debug = params.debug_temp_texture();
                if ui.checkbox(&mut debug, "Show sparse samples only").changed() {
                    edits.push(IsoPanelEdit::DebugTempTexture(debug));
                }
            });
        });

    apply_all(params, state, edits)
}

/// Builds the panel of the single-pass raycaster (no adaptive controls).
pub fn build_single_pass_iso_panel(
    ui: &mut Ui,
    params: &mut AdaptiveIsoParameters,
    state: &mut RendererState,
    has_gradient: bool,
) -> PanelResponse {
    let mut edits = Vec::new();
    CollapsingHeader::new("Isosurface")
        .default_open(true)
        .show(ui, |ui| {
            surface_widgets(ui, params, has_gradient, &mut edits);
        });
    apply_all(params, state, edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn built_state() -> RendererState {
        let mut state = RendererState::default();
        state.mark_built();
        state.mark_up_to_date();
        state
    }

    #[test]
    fn test_edit_marks_outdated() {
        let mut params = AdaptiveIsoParameters::new();
        let mut state = built_state();
        let response = apply_iso_edit(&mut params, &mut state, IsoPanelEdit::Isovalue(0.75));
        assert!(response.changed);
        assert!(!response.gradient_toggled);
        assert_eq!(state, RendererState::Outdated);
        assert_eq!(params.isovalue(), 0.75);
    }

    #[test]
    fn test_repeated_edit_is_idempotent() {
        let mut params = AdaptiveIsoParameters::new();
        let mut state = built_state();
        apply_iso_edit(&mut params, &mut state, IsoPanelEdit::StepSize(1.5));
        let snapshot = params.clone();
        state.mark_up_to_date();

        let response = apply_iso_edit(&mut params, &mut state, IsoPanelEdit::StepSize(1.5));
        assert!(!response.changed);
        assert_eq!(params, snapshot);
        assert_eq!(state, RendererState::UpToDate);
    }

    #[test]
    fn test_out_of_range_entry_is_clamped() {
        let mut params = AdaptiveIsoParameters::new();
        let mut state = built_state();
        apply_iso_edit(&mut params, &mut state, IsoPanelEdit::Interval(-5));
        assert_eq!(params.interval(), 1);
        apply_iso_edit(&mut params, &mut state, IsoPanelEdit::Interval(99));
        assert_eq!(params.interval(), 16);
        apply_iso_edit(&mut params, &mut state, IsoPanelEdit::Isovalue(1.0e9));
        assert_eq!(params.isovalue(), 100.0);
    }

    #[test]
    fn test_gradient_toggle_reported() {
        let mut params = AdaptiveIsoParameters::new();
        let mut state = built_state();
        let on = apply_iso_edit(&mut params, &mut state, IsoPanelEdit::GradientShading(true));
        assert!(on.gradient_toggled);
        let again = apply_iso_edit(&mut params, &mut state, IsoPanelEdit::GradientShading(true));
        assert!(!again.gradient_toggled);
        let off = apply_iso_edit(&mut params, &mut state, IsoPanelEdit::GradientShading(false));
        assert!(off.gradient_toggled);
    }

    #[test]
    fn test_edit_on_uninitialized_renderer_keeps_state() {
        let mut params = AdaptiveIsoParameters::new();
        let mut state = RendererState::default();
        let response = apply_iso_edit(&mut params, &mut state, IsoPanelEdit::Interpolation(true));
        assert!(response.changed);
        assert_eq!(state, RendererState::Uninitialized);
    }

    #[test]
    fn test_panel_without_input_changes_nothing() {
        let ctx = egui::Context::default();
        let mut params = AdaptiveIsoParameters::new();
        let mut state = built_state();
        let mut response = PanelResponse::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                response = build_adaptive_iso_panel(ui, &mut params, &mut state, true);
            });
        });
        assert_eq!(response, PanelResponse::default());
        assert_eq!(params, AdaptiveIsoParameters::default());
        assert_eq!(state, RendererState::UpToDate);
    }

    fn arb_edit() -> impl Strategy<Value = IsoPanelEdit> {
        prop_oneof![
            (-1.0e4f32..1.0e4).prop_map(IsoPanelEdit::Isovalue),
            (-50.0f32..50.0).prop_map(IsoPanelEdit::StepSize),
            (-100i32..100).prop_map(IsoPanelEdit::Interval),
            any::<bool>().prop_map(IsoPanelEdit::Interpolation),
            any::<bool>().prop_map(IsoPanelEdit::DebugTempTexture),
            (-2.0f32..2.0, -2.0f32..2.0, -2.0f32..2.0, -2.0f32..2.0)
                .prop_map(|(r, g, b, a)| IsoPanelEdit::Color(Vec4::new(r, g, b, a))),
        ]
    }

    proptest! {
        #[test]
        fn prop_edits_preserve_invariants(edits in proptest::collection::vec(arb_edit(), 1..32)) {
            let mut params = AdaptiveIsoParameters::new();
            let mut state = built_state();
            for edit in edits {
                apply_iso_edit(&mut params, &mut state, edit);
                prop_assert!(ISOVALUE_RANGE.contains(&params.isovalue()));
                prop_assert!(STEP_SIZE_RANGE.contains(&params.step_size()));
                prop_assert!(INTERVAL_RANGE.contains(&params.interval()));
                prop_assert!(params.color().cmpge(Vec4::ZERO).all());
                prop_assert!(params.color().cmple(Vec4::ONE).all());
            }
        }
    }
}
