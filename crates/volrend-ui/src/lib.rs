//! UI layer for volrend-rs using egui.

pub mod integration;
pub mod iso_panel;
pub mod panels;

pub use integration::EguiIntegration;
pub use iso_panel::*;
pub use panels::*;
