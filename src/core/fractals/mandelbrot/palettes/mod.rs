pub mod colour_cache;
pub mod gradients;
pub mod kinds;
pub mod palette_map;
