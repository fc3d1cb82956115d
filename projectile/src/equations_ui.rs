//! Equations sidebar and obstacle menu for the projectile simulation

use common::Equation;
use egui::{Align2, Color32, Context, RichText};

use crate::obstacles::{ObstacleForm, ObstacleShape};

pub const PROJECTILE_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Launch Impulse",
        formula: "J = k·(c - p)",
        description: "Impulse toward the release point c from the projectile at p",
    },
    Equation {
        name: "Velocity Change",
        formula: "Δv = J / m",
        description: "Velocity gained from the launch impulse",
    },
    Equation {
        name: "Mass",
        formula: "m = ρ·π·r²",
        description: "Mass of a disc of radius r",
    },
    Equation {
        name: "Trajectory",
        formula: "y = y₀ + v₀·t + ½·g·t²",
        description: "Position under constant gravity",
    },
    Equation {
        name: "Restitution",
        formula: "v'ₙ = -e·vₙ",
        description: "Normal speed after a bounce, e = e₁·e₂",
    },
];

pub const PROJECTILE_VARIABLES: &[(&str, &str)] = &[
    ("J", "Impulse"),
    ("k", "Impulse per pixel of pull"),
    ("m", "Mass"),
    ("ρ", "Density (0.1)"),
    ("g", "Gravity (px/s²)"),
    ("e", "Elasticity"),
];

/// Menu and description visibility, hidden while pulling a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    visible: bool,
    descriptions: bool,
    visible_before_pull: bool,
    descriptions_before_pull: bool,
    pulling: bool,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            visible: true,
            descriptions: false,
            visible_before_pull: true,
            descriptions_before_pull: false,
            pulling: false,
        }
    }
}

impl MenuState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn shows_descriptions(&self) -> bool {
        self.descriptions
    }

    pub fn toggle_menu(&mut self) {
        if self.pulling {
            return;
        }
        self.visible = !self.visible;
        self.visible_before_pull = self.visible;
        if !self.visible {
            self.descriptions = false;
            self.descriptions_before_pull = false;
        }
    }

    pub fn toggle_descriptions(&mut self) {
        if self.pulling {
            return;
        }
        self.descriptions = !self.descriptions;
        self.descriptions_before_pull = self.descriptions;
    }

    /// Hide everything while pulling and restore it afterwards
    pub fn set_pulling(&mut self, pulling: bool) {
        if pulling == self.pulling {
            return;
        }
        self.pulling = pulling;
        if pulling {
            self.visible = false;
            self.descriptions = false;
        } else {
            self.visible = self.visible_before_pull;
            self.descriptions = self.descriptions_before_pull;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    PreviousShape,
    NextShape,
    Create(ObstacleShape),
    Remove,
    ToggleMenu,
    ToggleDescriptions,
}

/// Keep digits, plus a leading minus sign when `signed`
fn whole_number_text(text: &str, signed: bool) -> String {
    let (sign, digits) = match text.trim_start().strip_prefix('-') {
        Some(rest) if signed => ("-", rest),
        _ => ("", text),
    };
    let digits: String = digits.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{}{}", sign, digits)
}

/// Text field for whole numbers
fn whole_number_entry(ui: &mut egui::Ui, text: &mut String, width: f32, signed: bool) {
    let response = ui.add(egui::TextEdit::singleline(text).desired_width(width));
    if response.changed() {
        *text = whole_number_text(text, signed);
    }
}

fn described(ui: &mut egui::Ui, show: bool, description: &str) {
    if show {
        ui.label(RichText::new(description).small().color(Color32::LIGHT_GRAY));
    }
}

pub fn draw_menu(
    ctx: &Context,
    menu: &MenuState,
    shape: ObstacleShape,
    form: &mut ObstacleForm,
    obstacle_names: &[String],
) -> Option<MenuAction> {
    let mut action = None;

    if !menu.is_visible() {
        egui::Area::new(egui::Id::new("menu_expand"))
            .anchor(Align2::RIGHT_TOP, [-10.0, 10.0])
            .show(ctx, |ui| {
                if ui.add_enabled(!menu.pulling, egui::Button::new(" + ")).clicked() {
                    action = Some(MenuAction::ToggleMenu);
                }
            });
        return action;
    }

    egui::SidePanel::right("controls_panel")
        .resizable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Obstacles");
            ui.separator();

            ui.vertical_centered_justified(|ui| {
                if ui.button("/\\").clicked() {
                    action = Some(MenuAction::PreviousShape);
                }
                ui.label(RichText::new(shape.name()).strong().size(18.0));
                if ui.button("\\/").clicked() {
                    action = Some(MenuAction::NextShape);
                }
            });
            ui.add_space(8.0);

            let show = menu.shows_descriptions();
            ui.label("Name");
            ui.text_edit_singleline(&mut form.name);
            described(ui, show, "Obstacles sharing a name are removed together");

            ui.label(if shape == ObstacleShape::Circle {
                "Multiplier (Radius)"
            } else {
                "Multiplier"
            });
            whole_number_entry(ui, &mut form.multiplier, 200.0, false);
            described(ui, show, "Scales the base outline; the radius for circles");

            ui.label("Position (x, y)");
            ui.horizontal(|ui| {
                whole_number_entry(ui, &mut form.x, 95.0, true);
                whole_number_entry(ui, &mut form.y, 95.0, true);
            });
            described(ui, show, "World position of the outline's origin");

            ui.add_space(8.0);
            ui.vertical_centered_justified(|ui| {
                if ui.button(format!("Create {}", shape.name())).clicked() {
                    action = Some(MenuAction::Create(shape));
                }
                if ui.button("Remove Object By Name").clicked() {
                    action = Some(MenuAction::Remove);
                }
                let label = if show { "Hide Descriptions" } else { "Show Descriptions" };
                if ui.button(label).clicked() {
                    action = Some(MenuAction::ToggleDescriptions);
                }
                if ui.button("Collapse Menu").clicked() {
                    action = Some(MenuAction::ToggleMenu);
                }
            });

            if !obstacle_names.is_empty() {
                ui.add_space(12.0);
                ui.separator();
                ui.label(RichText::new("Placed").strong());
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for name in obstacle_names {
                        if ui.selectable_label(form.name == *name, name).clicked() {
                            form.name = name.clone();
                        }
                    }
                });
            }

            ui.add_space(12.0);
            ui.label(
                RichText::new("Drag a ball to launch, C: new ball, Backspace: delete selected")
                    .small()
                    .italics(),
            );
            ui.label(
                RichText::new("WASD: pan, Q/E: zoom, Space: reset view")
                    .small()
                    .italics(),
            );
        });

    action
}

/// Info banner across the top of the window
pub fn draw_info(ctx: &Context, text: Option<&str>) {
    if let Some(text) = text {
        egui::TopBottomPanel::top("info_banner").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(text).size(18.0).color(Color32::LIGHT_RED));
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulling_hides_and_restores_menu() {
        let mut menu = MenuState::default();
        menu.toggle_descriptions();
        menu.set_pulling(true);
        assert!(!menu.is_visible());
        assert!(!menu.shows_descriptions());

        menu.set_pulling(false);
        assert!(menu.is_visible());
        assert!(menu.shows_descriptions());
    }

    #[test]
    fn test_collapsed_menu_stays_collapsed_after_pull() {
        let mut menu = MenuState::default();
        menu.toggle_menu();
        menu.set_pulling(true);
        menu.set_pulling(false);
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_collapsing_hides_descriptions() {
        let mut menu = MenuState::default();
        menu.toggle_descriptions();
        menu.toggle_menu();
        assert!(!menu.shows_descriptions());
        menu.toggle_menu();
        assert!(menu.is_visible());
        assert!(!menu.shows_descriptions());
    }

    #[test]
    fn test_whole_number_text_filter() {
        assert_eq!(whole_number_text("-12a3", true), "-123");
        assert_eq!(whole_number_text("-12a3", false), "123");
        assert_eq!(whole_number_text("4-5", true), "45");
        assert_eq!(whole_number_text("-", true), "-");
    }

    #[test]
    fn test_toggles_ignored_while_pulling() {
        let mut menu = MenuState::default();
        menu.set_pulling(true);
        menu.toggle_menu();
        menu.toggle_descriptions();
        menu.set_pulling(false);
        assert_eq!(menu, MenuState::default());
    }
}
