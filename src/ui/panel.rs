// src/ui/panel.rs
//! Shading parameters panel
//!
//! The panel never writes viewer state directly. Each widget that changed
//! this frame yields a [`PanelEdit`]; the application applies them through
//! [`apply_edit`], which routes every value through the validating setters.

use cgmath::Vector3;

use crate::gfx::resources::material::{ShadingParameters, SheenModel};
use crate::gfx::scene::SceneId;

pub const INTENSITY_RANGE: (f32, f32) = (0.0, 50.0);
pub const ROUGHNESS_RANGE: (f32, f32) = (0.0, 1.0);
pub const SPECULAR_RANGE: (f32, f32) = (0.0, 10.0);
pub const ALPHA_RANGE: (f32, f32) = (0.0, 1.0);
pub const BETA_RANGE: (f32, f32) = (-10.0, 10.0);
pub const CSHEEN_RANGE: (f32, f32) = (0.0, 20.0);

/// One value changed in the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEdit {
    Scene(SceneId),
    LightIntensity(f32),
    FabricColor([f32; 3]),
    FabricRoughness(f32),
    FabricSpecular(f32),
    SheenAlpha(f32),
    SheenBeta(f32),
    Csheen(f32),
    SheenModel(SheenModel),
}

/// What the panel displays besides the editable values.
pub struct PanelStatus<'a> {
    pub fps: Option<f64>,
    pub frame_times: &'a [f32],
}

/// Draws the parameters panel and returns this frame's edits.
pub fn parameters_panel(
    ui: &imgui::Ui,
    shading: &ShadingParameters,
    active_scene: SceneId,
    status: &PanelStatus<'_>,
) -> Vec<PanelEdit> {
    let mut edits = Vec::new();

    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return edits;
    }

    ui.window("Parameters")
        .size([380.0, 520.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            ui.text("Scene");
            let mut scene = active_scene;
            for id in SceneId::ALL {
                if ui.radio_button(id.label(), &mut scene, id) {
                    edits.push(PanelEdit::Scene(scene));
                }
                ui.same_line();
            }
            ui.new_line();
            ui.separator();

            let mut intensity = shading.light.intensity();
            if ui.slider("Light intensity", INTENSITY_RANGE.0, INTENSITY_RANGE.1, &mut intensity) {
                edits.push(PanelEdit::LightIntensity(intensity));
            }

            if ui.collapsing_header("Fabric", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                let mut color: [f32; 3] = shading.fabric.color.into();
                if ui.slider_config("Color", 0.0, 1.0).build_array(&mut color) {
                    edits.push(PanelEdit::FabricColor(color));
                }
                let mut roughness = shading.fabric.roughness;
                if ui.slider("Roughness", ROUGHNESS_RANGE.0, ROUGHNESS_RANGE.1, &mut roughness) {
                    edits.push(PanelEdit::FabricRoughness(roughness));
                }
                let mut specular = shading.fabric.specular;
                if ui.slider("Specular", SPECULAR_RANGE.0, SPECULAR_RANGE.1, &mut specular) {
                    edits.push(PanelEdit::FabricSpecular(specular));
                }
            }

            if ui.collapsing_header("Sheen", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                let mut alpha = shading.sheen.alpha();
                if ui.slider("Alpha", ALPHA_RANGE.0, ALPHA_RANGE.1, &mut alpha) {
                    edits.push(PanelEdit::SheenAlpha(alpha));
                }
                let mut beta = shading.sheen.beta();
                if ui.slider("Beta", BETA_RANGE.0, BETA_RANGE.1, &mut beta) {
                    edits.push(PanelEdit::SheenBeta(beta));
                }
                let mut csheen = shading.sheen.csheen();
                if ui.slider("Csheen", CSHEEN_RANGE.0, CSHEEN_RANGE.1, &mut csheen) {
                    edits.push(PanelEdit::Csheen(csheen));
                }

                let mut model = shading.sheen.model();
                for option in SheenModel::ALL {
                    if ui.radio_button(option.label(), &mut model, option) {
                        edits.push(PanelEdit::SheenModel(model));
                    }
                }
            }

            ui.separator();
            match status.fps {
                Some(fps) => ui.text(format!("FPS: {fps:.1}")),
                None => ui.text("FPS: measuring..."),
            }
            if !status.frame_times.is_empty() {
                ui.plot_lines("##frame_times", status.frame_times)
                    .graph_size([340.0, 60.0])
                    .scale_min(0.0)
                    .scale_max(50.0)
                    .build();
            }
        });

    edits
}

/// Applies one edit. Rejected values are logged and leave state untouched.
///
/// # Returns
/// True if the edit was accepted
pub fn apply_edit(edit: PanelEdit, shading: &mut ShadingParameters, scene: &mut SceneId) -> bool {
    let result = match edit {
        PanelEdit::Scene(id) => {
            if *scene != id {
                log::info!("Switching to {}", id.label());
            }
            *scene = id;
            Ok(())
        }
        PanelEdit::LightIntensity(value) => {
            shading.light.set_intensity(value).map_err(|e| e.to_string())
        }
        PanelEdit::FabricColor(color) => {
            if color.iter().all(|c| (0.0..=1.0).contains(c)) {
                shading.fabric.color = Vector3::from(color);
                Ok(())
            } else {
                Err(format!("fabric colour {color:?} outside [0, 1]"))
            }
        }
        PanelEdit::FabricRoughness(value) => {
            if (ROUGHNESS_RANGE.0..=ROUGHNESS_RANGE.1).contains(&value) {
                shading.fabric.roughness = value;
                Ok(())
            } else {
                Err(format!("fabric roughness {value} outside [0, 1]"))
            }
        }
        PanelEdit::FabricSpecular(value) => {
            if value >= 0.0 {
                shading.fabric.specular = value;
                Ok(())
            } else {
                Err(format!("fabric specular {value} is negative"))
            }
        }
        PanelEdit::SheenAlpha(value) => shading.sheen.set_alpha(value).map_err(|e| e.to_string()),
        PanelEdit::SheenBeta(value) => {
            shading.sheen.set_beta(value);
            Ok(())
        }
        PanelEdit::Csheen(value) => shading.sheen.set_csheen(value).map_err(|e| e.to_string()),
        PanelEdit::SheenModel(model) => {
            shading.sheen.set_model(model);
            Ok(())
        }
    };

    match result {
        Ok(()) => true,
        Err(reason) => {
            log::warn!("Rejected panel edit: {reason}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShadingConfig;

    fn shading() -> ShadingParameters {
        ShadingParameters::from_config(&ShadingConfig::default()).unwrap()
    }

    #[test]
    fn test_edits_go_through_setters() {
        let mut shading = shading();
        let mut scene = SceneId::Scene1;

        assert!(apply_edit(PanelEdit::Scene(SceneId::Scene2), &mut shading, &mut scene));
        assert!(apply_edit(PanelEdit::LightIntensity(25.0), &mut shading, &mut scene));
        assert!(apply_edit(PanelEdit::FabricColor([0.1, 0.2, 0.3]), &mut shading, &mut scene));
        assert!(apply_edit(PanelEdit::SheenBeta(-4.0), &mut shading, &mut scene));
        assert!(apply_edit(
            PanelEdit::SheenModel(SheenModel::Zeltner),
            &mut shading,
            &mut scene
        ));

        assert_eq!(scene, SceneId::Scene2);
        assert_eq!(shading.light.intensity(), 25.0);
        assert_eq!(shading.fabric.color, Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(shading.sheen.beta(), -4.0);
        assert_eq!(shading.sheen.model(), SheenModel::Zeltner);
    }

    #[test]
    fn test_rejected_edits_leave_state() {
        let mut shading = shading();
        let before = shading.clone();
        let mut scene = SceneId::Scene1;

        assert!(!apply_edit(PanelEdit::LightIntensity(-1.0), &mut shading, &mut scene));
        assert!(!apply_edit(PanelEdit::SheenAlpha(1.5), &mut shading, &mut scene));
        assert!(!apply_edit(PanelEdit::Csheen(-0.1), &mut shading, &mut scene));
        assert!(!apply_edit(PanelEdit::FabricRoughness(2.0), &mut shading, &mut scene));
        assert!(!apply_edit(PanelEdit::FabricSpecular(-3.0), &mut shading, &mut scene));
        assert!(!apply_edit(PanelEdit::FabricColor([1.2, 0.0, 0.0]), &mut shading, &mut scene));

        assert_eq!(shading, before);
        assert_eq!(scene, SceneId::Scene1);
    }
}
