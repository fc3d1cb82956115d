//! Equations sidebar and control panel for the free fall simulation

use common::{numeric_entry, Equation};
use egui::{Color32, Context, RichText};

pub const FREEFALL_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Distance Fallen",
        formula: "h = ½·g·t²",
        description: "Height lost after falling from rest for t seconds",
    },
    Equation {
        name: "Velocity",
        formula: "v = g·t",
        description: "Speed reached after t seconds",
    },
    Equation {
        name: "Fall Time",
        formula: "t = √(2h / g)",
        description: "Time to fall a height h",
    },
    Equation {
        name: "Impact Velocity",
        formula: "v = √(2·g·h)",
        description: "Speed on reaching the ground",
    },
];

pub const FREEFALL_VARIABLES: &[(&str, &str)] = &[
    ("g", "Gravitational acceleration (m/s²)"),
    ("h", "Height (m)"),
    ("t", "Fall time (s)"),
    ("v", "Velocity (m/s)"),
];

/// Text of the four entry fields
#[derive(Debug, Clone)]
pub struct FallPanel {
    pub gravity: String,
    pub height: String,
    pub time: String,
    pub velocity: String,
}

impl FallPanel {
    pub fn new(gravity: f64, height: f64) -> Self {
        Self {
            gravity: gravity.to_string(),
            height: height.to_string(),
            time: "0".into(),
            velocity: "0".into(),
        }
    }

    pub fn clear(&mut self) {
        for field in [&mut self.gravity, &mut self.height, &mut self.time, &mut self.velocity] {
            *field = "0".into();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Set,
    Calculate,
    Reset,
    Drop,
    Abort,
}

/// Live readout of the falling block
pub struct Readout {
    pub elapsed: f32,
    pub height: f32,
    pub speed: f32,
}

pub fn draw_control_panel(
    ctx: &Context,
    panel: &mut FallPanel,
    falling: bool,
    readout: &Readout,
    status: Option<&str>,
) -> Option<PanelAction> {
    let mut action = None;
    let editable = !falling;

    egui::SidePanel::right("controls_panel")
        .resizable(false)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Free Fall");
            ui.separator();

            egui::Grid::new("entries_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Grav. Accel (m/s²)");
                    numeric_entry(ui, &mut panel.gravity, editable);
                    ui.end_row();

                    ui.label("Height (m)");
                    numeric_entry(ui, &mut panel.height, editable);
                    ui.end_row();

                    ui.label("Fall Time (s)");
                    numeric_entry(ui, &mut panel.time, editable);
                    ui.end_row();

                    ui.label("Velocity (m/s)");
                    numeric_entry(ui, &mut panel.velocity, editable);
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(editable, egui::Button::new("Set")).clicked() {
                    action = Some(PanelAction::Set);
                }
                if ui.add_enabled(editable, egui::Button::new("Calculate")).clicked() {
                    action = Some(PanelAction::Calculate);
                }
                if ui.add_enabled(editable, egui::Button::new("Reset")).clicked() {
                    action = Some(PanelAction::Reset);
                }
            });

            let (label, drop_action) = if falling {
                ("Abort", PanelAction::Abort)
            } else {
                ("Drop", PanelAction::Drop)
            };
            if ui.button(RichText::new(label).strong()).clicked() {
                action = Some(drop_action);
            }

            ui.add_space(12.0);
            ui.separator();
            ui.label(format!("t = {:.2} s", readout.elapsed));
            ui.label(format!("h = {:.2} m", readout.height));
            ui.label(format!("v = {:.2} m/s", readout.speed));

            if let Some(text) = status {
                ui.add_space(8.0);
                ui.label(RichText::new(text).color(Color32::LIGHT_RED));
            }

            ui.add_space(12.0);
            ui.label(RichText::new("W/S: pan, Enter: reset view").small().italics());
        });

    action
}
