pub mod colorize;
pub mod generate_pixel_buffer;
pub mod ports;
