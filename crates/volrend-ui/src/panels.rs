//! UI panel builders.

use egui::{CollapsingHeader, Context, DragValue, SidePanel, Slider, Ui};
use volrend_core::rendering_parameters::MULTI_SCALING_RANGE;
use volrend_core::{RendererState, RenderingParameters};

/// Read-only facts about the loaded volume.
#[derive(Debug, Clone, Default)]
pub struct VolumeInfo {
    pub name: String,
    pub resolution: [u32; 3],
    pub voxel_size: [f32; 3],
    pub value_range: (f32, f32),
    pub has_gradient: bool,
}

/// Builds the main left panel.
pub fn build_left_panel(ctx: &Context, build_contents: impl FnOnce(&mut Ui)) {
    SidePanel::left("volrend_main_panel")
        .default_width(305.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("volrend-rs");
            ui.separator();
            build_contents(ui);
        });
}

/// Builds the renderer selector. Returns the newly selected index, if the
/// selection changed.
pub fn build_renderer_selector(ui: &mut Ui, names: &[&str], current: usize) -> Option<usize> {
    let mut selected = current;
    egui::ComboBox::from_label("Renderer")
        .selected_text(names.get(current).copied().unwrap_or("-"))
        .show_ui(ui, |ui| {
            for (i, name) in names.iter().enumerate() {
                ui.selectable_value(&mut selected, i, *name);
            }
        });
    (selected != current).then_some(selected)
}

/// Builds the lighting section.
/// Returns true (and marks `state` outdated) if any setting changed.
pub fn build_lighting_section(
    ui: &mut Ui,
    params: &mut RenderingParameters,
    state: &mut RendererState,
) -> bool {
    let mut changed = false;

    CollapsingHeader::new("Lighting")
        .default_open(false)
        .show(ui, |ui| {
            changed |= ui
                .add(Slider::new(&mut params.blinn_phong_ka, 0.0..=1.0).text("Ambient"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut params.blinn_phong_kd, 0.0..=1.0).text("Diffuse"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut params.blinn_phong_ks, 0.0..=1.0).text("Specular"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut params.blinn_phong_shininess, 1.0..=256.0).text("Shininess"))
                .changed();

            ui.horizontal(|ui| {
                ui.label("Light:");
                for axis in 0..3 {
                    changed |= ui
                        .add(DragValue::new(&mut params.light_position[axis]).speed(1.0))
                        .changed();
                }
            });

            ui.horizontal(|ui| {
                ui.label("Background:");
                let mut rgb = params.background_color.truncate().to_array();
                if ui.color_edit_button_rgb(&mut rgb).changed() {
                    params.background_color = glam::Vec3::from_array(rgb).extend(1.0);
                    changed = true;
                }
            });

            ui.horizontal(|ui| {
                ui.label("Multi-scaling:");
                changed |= ui
                    .add(DragValue::new(&mut params.multi_scaling_mode).range(MULTI_SCALING_RANGE))
                    .changed();
            });
        });

    if changed {
        state.set_outdated();
    }
    changed
}

/// Builds the volume information section.
pub fn build_volume_section(ui: &mut Ui, info: Option<&VolumeInfo>) {
    CollapsingHeader::new("Volume")
        .default_open(true)
        .show(ui, |ui| {
            let Some(info) = info else {
                ui.label("No volume loaded");
                return;
            };
            ui.label(format!("Name: {}", info.name));
            ui.label(format!(
                "Resolution: {} x {} x {}",
                info.resolution[0], info.resolution[1], info.resolution[2]
            ));
            ui.label(format!(
                "Voxel size: ({:.3}, {:.3}, {:.3})",
                info.voxel_size[0], info.voxel_size[1], info.voxel_size[2]
            ));
            ui.label(format!(
                "Value range: [{:.3}, {:.3}]",
                info.value_range.0, info.value_range.1
            ));
            ui.label(if info.has_gradient {
                "Gradient: available"
            } else {
                "Gradient: none"
            });
        });
}

/// Builds the frame statistics line.
pub fn build_frame_stats(ui: &mut Ui, frame_ms: f32, dispatches: u32) {
    ui.separator();
    ui.label(format!("{frame_ms:.2} ms  |  {dispatches} dispatch(es)"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_without_input_keeps_selection() {
        let ctx = egui::Context::default();
        let mut selection = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                selection = build_renderer_selector(ui, &["Adaptive", "1-Pass"], 1);
            });
        });
        assert_eq!(selection, None);
    }

    #[test]
    fn test_lighting_without_input_is_unchanged() {
        let ctx = egui::Context::default();
        let mut params = RenderingParameters::default();
        let mut state = RendererState::default();
        state.mark_built();
        state.mark_up_to_date();
        let mut changed = true;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = build_lighting_section(ui, &mut params, &mut state);
            });
        });
        assert!(!changed);
        assert_eq!(state, RendererState::UpToDate);
        assert_eq!(params, RenderingParameters::default());
    }
}
