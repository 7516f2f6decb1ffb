use crate::core::data::colour::Colour;

/// Maps one field value to a colour.
///
/// Called concurrently from the colouring workers, so implementations must be
/// `Sync` and deterministic.
pub trait ColourMap: Sync {
    type T;

    fn map(&self, value: Self::T) -> Colour;
}
