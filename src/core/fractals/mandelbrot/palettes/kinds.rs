use crate::core::data::colour::Colour;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown palette '{0}'")]
pub struct UnknownPalette(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    #[default]
    Rainbow,
    Ocean,
    Fire,
    Electric,
    Cosmic,
    Vintage,
    Neon,
    Ice,
    Sunset,
    Matrix,
}

impl PaletteKind {
    pub const ALL: &'static [Self] = &[
        Self::Rainbow,
        Self::Ocean,
        Self::Fire,
        Self::Electric,
        Self::Cosmic,
        Self::Vintage,
        Self::Neon,
        Self::Ice,
        Self::Sunset,
        Self::Matrix,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Rainbow => "Rainbow",
            Self::Ocean => "Ocean Waves",
            Self::Fire => "Fire & Magma",
            Self::Electric => "Electric Plasma",
            Self::Cosmic => "Cosmic Nebula",
            Self::Vintage => "Vintage Sepia",
            Self::Neon => "Neon Dreams",
            Self::Ice => "Ice Crystal",
            Self::Sunset => "Sunset Glow",
            Self::Matrix => "Matrix Code",
        }
    }

    /// Short identifier used in config files and on the command line.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Rainbow => "rainbow",
            Self::Ocean => "ocean",
            Self::Fire => "fire",
            Self::Electric => "electric",
            Self::Cosmic => "cosmic",
            Self::Vintage => "vintage",
            Self::Neon => "neon",
            Self::Ice => "ice",
            Self::Sunset => "sunset",
            Self::Matrix => "matrix",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&kind| kind == self).unwrap_or(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Whether the palette's output depends on the animation phase.
    #[must_use]
    pub const fn is_animated(self) -> bool {
        !matches!(self, Self::Vintage | Self::Sunset)
    }

    #[must_use]
    pub const fn interior_colour(self) -> Colour {
        Colour::BLACK
    }
}

impl std::fmt::Display for PaletteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).display_name())
    }
}

impl FromStr for PaletteKind {
    type Err = UnknownPalette;

    /// Accepts either the identifier (`"fire"`) or the display name
    /// (`"Fire & Magma"`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();

        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.id().eq_ignore_ascii_case(wanted) || kind.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPalette(s.to_string()))
    }
}
