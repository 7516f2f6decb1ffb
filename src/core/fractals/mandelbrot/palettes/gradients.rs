//! Colour functions for each palette.
//!
//! Every function takes the normalised escape value `t` in `[0, 1]`, the
//! brightness `intensity` in `[0, 1]` and the animation `phase` in radians, and
//! is pure in those three inputs.

use std::f64::consts::PI;

use crate::core::data::colour::Colour;
use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;

#[must_use]
pub fn evaluate(kind: PaletteKind, t: f64, intensity: f64, phase: f64) -> Colour {
    match kind {
        PaletteKind::Rainbow => rainbow(t, intensity, phase),
        PaletteKind::Ocean => ocean(t, intensity, phase),
        PaletteKind::Fire => fire(t, intensity, phase),
        PaletteKind::Electric => electric(t, intensity, phase),
        PaletteKind::Cosmic => cosmic(t, intensity, phase),
        PaletteKind::Vintage => vintage(t, intensity),
        PaletteKind::Neon => neon(t, intensity, phase),
        PaletteKind::Ice => ice(t, intensity, phase),
        PaletteKind::Sunset => sunset(t, intensity),
        PaletteKind::Matrix => matrix(t, intensity, phase),
    }
}

/// Brightness for a normalised value: `min(1, 1.2 * sqrt(t))`.
#[must_use]
#[inline]
pub fn intensity_for(t: f64) -> f64 {
    (t.max(0.0).sqrt() * 1.2).min(1.0)
}

/// HSV to RGB with all components in `[0, 1]`; hue wraps.
#[must_use]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Colour {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match sector as i32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Colour::from_clamped(r * 255.0, g * 255.0, b * 255.0)
}

fn rainbow(t: f64, intensity: f64, phase: f64) -> Colour {
    let hue = t * 6.0 + phase;
    let saturation = 0.8 + 0.2 * (t * PI * 4.0 + phase * 2.0).sin();
    let value = intensity * (0.5 + 0.5 * (t * PI * 2.0).sin());

    hsv_to_rgb(hue, saturation, value)
}

fn ocean(t: f64, intensity: f64, phase: f64) -> Colour {
    if t < 0.1 {
        // Deep water.
        Colour::from_clamped(0.0, 5.0 + t * 300.0 * intensity, 10.0 + t * 500.0 * intensity)
    } else if t < 0.6 {
        let wave = (t * PI * 8.0 + phase * 3.0).sin();
        Colour::from_clamped(
            trunc(wave * 20.0),
            trunc(30.0 + (t - 0.1) * 300.0 * intensity + wave * 40.0),
            trunc(50.0 + (t - 0.1) * 400.0 * intensity + wave * 30.0),
        )
    } else {
        let foam = (t * PI * 16.0 + phase * 5.0).sin();
        Colour::from_clamped(
            trunc(100.0 + foam * 40.0),
            trunc(200.0 + (t - 0.6) * 50.0 + foam * 30.0),
            trunc(150.0 + (t - 0.6) * 200.0 + foam * 50.0),
        )
    }
}

fn fire(t: f64, intensity: f64, phase: f64) -> Colour {
    let flicker = (t * PI * 12.0 + phase * 8.0).sin() * 0.1;
    let t = (t + flicker).clamp(0.0, 1.0);

    if t < 0.2 {
        Colour::from_clamped(20.0 + t * 600.0 * intensity, t * 100.0 * intensity, 0.0)
    } else if t < 0.5 {
        Colour::from_clamped(
            120.0 + (t - 0.2) * 400.0 * intensity,
            20.0 + (t - 0.2) * 600.0 * intensity,
            (t - 0.2) * 100.0 * intensity,
        )
    } else if t < 0.8 {
        Colour::from_clamped(
            200.0 + (t - 0.5) * 150.0 * intensity,
            120.0 + (t - 0.5) * 400.0 * intensity,
            30.0 + (t - 0.5) * 200.0 * intensity,
        )
    } else {
        Colour::from_clamped(
            255.0,
            220.0 + (t - 0.8) * 175.0 * intensity,
            60.0 + (t - 0.8) * 700.0 * intensity,
        )
    }
}

fn electric(t: f64, intensity: f64, phase: f64) -> Colour {
    let pulse = (t * PI * 6.0 + phase * 10.0).sin() * 0.3;
    let spark = (t * PI * 20.0 + phase * 15.0).sin() * 0.1;

    let hue = 0.6 + t * 0.3 + pulse * 0.1;
    let saturation = (0.9 + spark * 0.1).min(1.0);
    let value = (intensity * (0.3 + 0.7 * t + pulse * 0.3)).min(1.0);

    hsv_to_rgb(hue, saturation, value)
}

fn cosmic(t: f64, intensity: f64, phase: f64) -> Colour {
    let swirl = (t * PI * 3.0 + phase * 2.0).sin() * 0.2;
    let twinkle = (t * PI * 25.0 + phase * 12.0).sin() * 0.1;

    if t < 0.3 {
        Colour::from_clamped(
            trunc(20.0 + t * 200.0 * intensity + twinkle * 50.0),
            5.0 + t * 50.0 * intensity,
            trunc(40.0 + t * 400.0 * intensity + swirl * 60.0),
        )
    } else if t < 0.7 {
        Colour::from_clamped(
            trunc(60.0 + (t - 0.3) * 400.0 * intensity + swirl * 80.0),
            trunc(20.0 + (t - 0.3) * 200.0 * intensity + twinkle * 40.0),
            120.0 + (t - 0.3) * 300.0 * intensity,
        )
    } else {
        Colour::from_clamped(
            200.0 + (t - 0.7) * 180.0 * intensity,
            150.0 + (t - 0.7) * 300.0 * intensity,
            trunc(50.0 + (t - 0.7) * 400.0 * intensity + twinkle * 100.0),
        )
    }
}

fn vintage(t: f64, intensity: f64) -> Colour {
    let base = t * intensity;

    Colour::from_clamped(100.0 + base * 120.0, 80.0 + base * 100.0, 50.0 + base * 60.0)
}

fn neon(t: f64, intensity: f64, phase: f64) -> Colour {
    let glow = (t * PI * 8.0 + phase * 6.0).sin() * 0.2;
    let hue = t * 0.8 + phase * 0.1;

    hsv_to_rgb(hue, 1.0, (intensity * (0.7 + 0.3 * t + glow)).min(1.0))
}

fn ice(t: f64, intensity: f64, phase: f64) -> Colour {
    let crystal = (t * PI * 15.0 + phase * 4.0).sin() * 0.1;

    Colour::from_clamped(
        100.0 + t * 120.0 * intensity + crystal * 50.0,
        130.0 + t * 110.0 * intensity + crystal * 40.0,
        150.0 + t * 100.0 * intensity + crystal * 30.0,
    )
}

fn sunset(t: f64, intensity: f64) -> Colour {
    if t < 0.4 {
        Colour::from_clamped(255.0 * intensity, 120.0 + t * 300.0 * intensity, 30.0 + t * 100.0 * intensity)
    } else {
        Colour::from_clamped(
            200.0 + (1.0 - t) * 100.0 * intensity,
            50.0 + t * 150.0 * intensity,
            80.0 + t * 300.0 * intensity,
        )
    }
}

fn matrix(t: f64, intensity: f64, phase: f64) -> Colour {
    let digital = (t * PI * 30.0 + phase * 20.0).sin() * 0.2;

    Colour::from_clamped(
        t * 50.0 * intensity,
        trunc(50.0 + t * 200.0 * intensity + digital * 50.0),
        t * 30.0 * intensity,
    )
}

// Channels that can go negative truncate toward zero before clamping.
#[inline]
fn trunc(value: f64) -> f64 {
    value.trunc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primary_colours() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Colour::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), Colour::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), Colour::new(0, 0, 255));
    }

    #[test]
    fn test_hsv_wraps_hue_and_handles_greys() {
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), hsv_to_rgb(0.0, 1.0, 1.0));
        assert_eq!(hsv_to_rgb(-0.5, 1.0, 1.0), hsv_to_rgb(0.5, 1.0, 1.0));
        assert_eq!(hsv_to_rgb(0.3, 0.0, 0.5), Colour::new(127, 127, 127));
        assert_eq!(hsv_to_rgb(0.3, 1.0, 0.0), Colour::BLACK);
    }

    #[test]
    fn test_intensity_curve() {
        assert_eq!(intensity_for(0.0), 0.0);
        assert!((intensity_for(0.25) - 0.6).abs() < 1e-12);
        assert_eq!(intensity_for(1.0), 1.0);
        assert_eq!(intensity_for(0.9), 1.0);
    }

    #[test]
    fn test_static_palettes_ignore_phase() {
        for kind in [PaletteKind::Vintage, PaletteKind::Sunset] {
            for step in 0..=20 {
                let t = f64::from(step) / 20.0;
                let intensity = intensity_for(t);

                assert_eq!(evaluate(kind, t, intensity, 0.0), evaluate(kind, t, intensity, 4.2));
            }
        }
    }

    #[test]
    fn test_animated_palettes_respond_to_phase() {
        for &kind in PaletteKind::ALL.iter().filter(|kind| kind.is_animated()) {
            let changed = (0..=50).any(|step| {
                let t = f64::from(step) / 50.0;
                let intensity = intensity_for(t);
                evaluate(kind, t, intensity, 0.0) != evaluate(kind, t, intensity, 1.5)
            });

            assert!(changed, "{kind} did not change with phase");
        }
    }

    #[test]
    fn test_vintage_endpoints() {
        assert_eq!(evaluate(PaletteKind::Vintage, 0.0, 0.0, 0.0), Colour::new(100, 80, 50));
        assert_eq!(evaluate(PaletteKind::Vintage, 1.0, 1.0, 0.0), Colour::new(220, 180, 110));
    }

    #[test]
    fn test_fire_is_dark_red_at_low_values() {
        // phase 0, t 0: flicker is sin(0) = 0.
        assert_eq!(evaluate(PaletteKind::Fire, 0.0, 0.0, 0.0), Colour::new(20, 0, 0));
    }

    #[test]
    fn test_all_palettes_accept_full_range() {
        for &kind in PaletteKind::ALL {
            for step in 0..=100 {
                let t = f64::from(step) / 100.0;
                let _ = evaluate(kind, t, intensity_for(t), 6.0);
            }
        }
    }
}
