//! Equations sidebar and parameter panel for the refraction simulation

use crate::optics::{Material, RayGeometry, Refraction};
use common::{numeric_entry, Equation};
use egui::{Color32, Context, RichText};

pub const REFRACTION_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Law of Reflection",
        formula: "θr = θi",
        description: "The reflected ray leaves at the incidence angle",
    },
    Equation {
        name: "Snell's Law",
        formula: "n1·sin(θi) = n2·sin(θt)",
        description: "Bending of the ray entering the second medium",
    },
    Equation {
        name: "Critical Angle",
        formula: "θc = asin(n2 / n1)",
        description: "Above θc all light is reflected (only when n1 > n2)",
    },
    Equation {
        name: "Refractive Index",
        formula: "n = c / v",
        description: "Speed of light in vacuum over speed in the medium",
    },
];

pub const REFRACTION_VARIABLES: &[(&str, &str)] = &[
    ("θi", "Incidence angle from the normal (°)"),
    ("θr", "Reflection angle (°)"),
    ("θt", "Refraction angle (°)"),
    ("n1", "Index of the upper medium"),
    ("n2", "Index of the lower medium"),
];

/// Entry field text and the media currently in use
pub struct ParameterPanel {
    pub n1_text: String,
    pub n2_text: String,
    pub upper: Material,
    pub lower: Material,
}

impl ParameterPanel {
    pub fn new(upper: Material, lower: Material) -> Self {
        Self {
            n1_text: upper.index.to_string(),
            n2_text: lower.index.to_string(),
            upper,
            lower,
        }
    }

    pub fn sync_text(&mut self) {
        self.n1_text = self.upper.index.to_string();
        self.n2_text = self.lower.index.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    /// Apply the values typed in the entries
    ChangeParameter,
    SelectUpper(Material),
    SelectLower(Material),
}

fn preset_combo(ui: &mut egui::Ui, id: &str, current: &Material) -> Option<Material> {
    let mut selected = None;
    egui::ComboBox::from_id_source(id)
        .selected_text(current.name)
        .show_ui(ui, |ui| {
            for preset in Material::PRESETS {
                let label = format!("{} ({})", preset.name, preset.index);
                if ui.selectable_label(*current == preset, label).clicked() {
                    selected = Some(preset);
                }
            }
        });
    selected
}

pub fn draw_control_panel(
    ctx: &Context,
    panel: &mut ParameterPanel,
    rays: &RayGeometry,
    critical: Option<f32>,
    status: Option<&str>,
) -> Option<PanelAction> {
    let mut action = None;

    egui::SidePanel::right("controls_panel")
        .resizable(false)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Refraction");
            ui.separator();

            egui::Grid::new("parameters_grid")
                .num_columns(3)
                .spacing([8.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("N1").strong());
                    numeric_entry(ui, &mut panel.n1_text, true);
                    if let Some(m) = preset_combo(ui, "upper_preset", &panel.upper) {
                        action = Some(PanelAction::SelectUpper(m));
                    }
                    ui.end_row();

                    ui.label(RichText::new("N2").strong());
                    numeric_entry(ui, &mut panel.n2_text, true);
                    if let Some(m) = preset_combo(ui, "lower_preset", &panel.lower) {
                        action = Some(PanelAction::SelectLower(m));
                    }
                    ui.end_row();
                });

            ui.add_space(8.0);
            if ui.button("Change Parameter").clicked() {
                action = Some(PanelAction::ChangeParameter);
            }

            ui.add_space(12.0);
            ui.separator();
            ui.label(format!("N1: {} ({})", panel.upper.index, panel.upper.name));
            ui.label(format!("N2: {} ({})", panel.lower.index, panel.lower.name));
            match rays.incidence {
                Some(i) => ui.label(format!("I : {:.2}°", i)),
                None => ui.label("I : -"),
            };
            match rays.refraction {
                Some(Refraction::Refracted(r)) => ui.label(format!("R : {:.2}°", r)),
                Some(Refraction::TotalInternal) => ui.label(
                    RichText::new("R : total internal reflection").color(Color32::YELLOW),
                ),
                None => ui.label("R : -"),
            };
            if let Some(c) = critical {
                ui.label(format!("Critical angle: {:.2}°", c));
            }

            if let Some(text) = status {
                ui.add_space(8.0);
                ui.label(RichText::new(text).color(Color32::LIGHT_RED));
            }

            ui.add_space(12.0);
            ui.label(
                RichText::new("Hold the left button in the upper left to shine the light")
                    .small()
                    .italics(),
            );
        });

    action
}
