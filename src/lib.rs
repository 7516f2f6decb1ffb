pub mod config;
pub mod controllers;
pub mod core;
pub mod storage;

pub use crate::config::{ConfigError, ExplorerConfig};
pub use crate::controllers::interactive::{
    Explorer, ExplorerError, ExplorerInfo, FrameData, InteractiveController, PresenterPort, RenderEvent, RenderRequest,
    RenderState,
};
pub use crate::core::data::complex::Complex;
pub use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;
pub use crate::storage::write_ppm::write_ppm;
