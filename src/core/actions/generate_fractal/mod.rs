pub mod generate_fractal;
pub mod ports;
pub mod tile_scheduler;
