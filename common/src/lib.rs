//! Common utilities for physics simulations
//!
//! This crate provides the shared core used by every simulation binary: graphics setup,
//! the 2D viewport camera, explicit Euler integration, the shape renderer, the egui
//! overlay, layered configuration and the error types.

pub mod camera;
pub mod config;
pub mod error;
pub mod graphics;
pub mod integrate;
pub mod overlay;
pub mod shapes;

pub use camera::*;
pub use config::{AppConfig, ConfigError};
pub use error::PhysicsError;
pub use graphics::*;
pub use integrate::*;
pub use overlay::{draw_equations_sidebar, numeric_entry, Equation, Overlay, StatusMessage};
pub use shapes::{ShapeBatch, ShapeRenderer};

/// Colors shared by the simulations, linear RGBA
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const RED: [f32; 4] = [0.79, 0.16, 0.16, 1.0];
    pub const DARK_RED: [f32; 4] = [0.59, 0.0, 0.0, 1.0];
    pub const LIGHT_GRAY: [f32; 4] = [0.86, 0.86, 0.86, 1.0];
    pub const GRAY: [f32; 4] = [0.61, 0.61, 0.61, 1.0];
    pub const WATER: [f32; 4] = [0.05, 0.22, 0.91, 0.39];

    /// Parse a `#RGB` or `#RRGGBB` hex string
    pub fn from_hex(hex: &str) -> Option<[f32; 4]> {
        let digits = hex.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some([channel(0)?, channel(2)?, channel(4)?, 1.0])
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_from_hex_long_and_short() {
            assert_eq!(from_hex("#000000"), Some(BLACK));
            assert_eq!(from_hex("#fff"), Some(WHITE));
            let red = from_hex("#FF0000").unwrap();
            assert_eq!(red, [1.0, 0.0, 0.0, 1.0]);
        }

        #[test]
        fn test_from_hex_rejects_malformed() {
            assert_eq!(from_hex("000000"), None);
            assert_eq!(from_hex("#12345"), None);
            assert_eq!(from_hex("#GGGGGG"), None);
        }
    }
}
