pub mod algorithm;
pub mod iteration_policy;
pub mod palettes;
