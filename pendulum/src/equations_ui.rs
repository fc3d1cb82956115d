//! Equations sidebar and control panel for the pendulum

use common::Equation;
use egui::{Color32, Context, RichText};

pub const PENDULUM_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Angular Acceleration",
        formula: "α = -k·sin(θ)",
        description: "Restoring acceleration per tick towards the balance line",
    },
    Equation {
        name: "Damping",
        formula: "ω ← (ω + α)·(1 + d)",
        description: "Angular velocity after one tick with damping change d ≤ 0",
    },
    Equation {
        name: "Bob Position",
        formula: "p = pivot + L·(sin θ, cos θ)",
        description: "Screen position of the bob on an arm of length L",
    },
    Equation {
        name: "Small Angle Period",
        formula: "T ≈ 2π / √k",
        description: "Ticks per swing for small amplitudes",
    },
];

pub const PENDULUM_VARIABLES: &[(&str, &str)] = &[
    ("θ", "Angle from the vertical (rad)"),
    ("ω", "Angular velocity (rad/tick)"),
    ("α", "Angular acceleration (rad/tick²)"),
    ("k", "Base acceleration plus velocity boost"),
    ("d", "Damping change"),
    ("L", "Arm length (px)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    IncreaseVelocity,
    DecreaseVelocity,
    IncreaseDamping,
    DecreaseDamping,
    Reset,
}

pub struct Readout {
    pub accel_boost: f32,
    pub damping_change: f32,
    pub angle: Option<f32>,
    pub angular_velocity: Option<f32>,
    pub samples: usize,
    pub last_offset: Option<f32>,
}

fn plus_minus(ui: &mut egui::Ui, label: &str, more: PanelAction, less: PanelAction) -> Option<PanelAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).strong());
        if ui.button(" + ").clicked() {
            action = Some(more);
        }
        if ui.button(" - ").clicked() {
            action = Some(less);
        }
    });
    action
}

pub fn draw_control_panel(ctx: &Context, readout: &Readout, status: Option<&str>) -> Option<PanelAction> {
    let mut action = None;

    egui::SidePanel::right("controls_panel")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Pendulum");
            ui.separator();

            action = action.or(plus_minus(
                ui,
                "VELOCITY",
                PanelAction::IncreaseVelocity,
                PanelAction::DecreaseVelocity,
            ));
            ui.label(format!("boost = {:.4}", readout.accel_boost));
            ui.add_space(6.0);

            action = action.or(plus_minus(
                ui,
                "DAMPING",
                PanelAction::IncreaseDamping,
                PanelAction::DecreaseDamping,
            ));
            ui.label(format!("change = {:.4}", readout.damping_change));
            ui.add_space(6.0);

            if ui.button("Reset").clicked() {
                action = Some(PanelAction::Reset);
            }

            ui.add_space(12.0);
            ui.separator();
            match (readout.angle, readout.angular_velocity) {
                (Some(angle), Some(velocity)) => {
                    ui.label(format!("θ = {:.1}°", angle.to_degrees()));
                    ui.label(format!("ω = {:.4} rad/tick", velocity));
                }
                _ => {
                    ui.label(RichText::new("Click to release the bob").italics());
                }
            }
            ui.label(format!("Samples: {}", readout.samples));
            if let Some(offset) = readout.last_offset {
                ui.label(format!("Offset: {:.1} px", offset));
            }

            if let Some(text) = status {
                ui.add_space(8.0);
                ui.label(RichText::new(text).color(Color32::LIGHT_RED));
            }
        });

    action
}
