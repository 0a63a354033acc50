//! Color token substitution
//!
//! Templates reference palette entries with `{name}` for the hex value and
//! `{name.r}`, `{name.g}`, `{name.b}`, `{name.h}`, `{name.l}`, `{name.s}` for
//! derived components. Tokens naming colors absent from the palette are left
//! as written.

use tracing::debug;

use crate::palette::Palette;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees `[0, 360)`, lightness and saturation in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hls {
    pub hue: f64,
    pub lightness: f64,
    pub saturation: f64,
}

impl Rgb {
    /// Parse `#RRGGBB` (the `#` is optional, a trailing alpha pair is ignored)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim_start_matches('#');
        if !(digits.len() == 6 || digits.len() == 8)
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Convert with the conventional normalized RGB -> HLS transform, scaled
    /// to degrees and percent
    pub fn to_hls(self) -> Hls {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let maxc = r.max(g).max(b);
        let minc = r.min(g).min(b);
        let sumc = maxc + minc;
        let rangec = maxc - minc;
        let l = sumc / 2.0;
        if minc == maxc {
            return Hls {
                hue: 0.0,
                lightness: l * 100.0,
                saturation: 0.0,
            };
        }

        let s = if l <= 0.5 {
            rangec / sumc
        } else {
            rangec / (2.0 - maxc - minc)
        };
        let rc = (maxc - r) / rangec;
        let gc = (maxc - g) / rangec;
        let bc = (maxc - b) / rangec;
        let h = if r == maxc {
            bc - gc
        } else if g == maxc {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };
        let h = (h / 6.0).rem_euclid(1.0);

        Hls {
            hue: h * 360.0,
            lightness: l * 100.0,
            saturation: s * 100.0,
        }
    }
}

/// Shortest round-trip decimal that always shows a fractional part
/// (`210.0`, `12.549019607843137`)
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Replace every palette token in `content`
pub fn substitute(content: &str, palette: &Palette) -> String {
    let mut result = content.to_string();

    for (name, hex) in palette.iter() {
        let token = format!("{{{}}}", name);
        if result.contains(&token) {
            result = result.replace(&token, hex);
        }

        if !result.contains(&format!("{{{}.", name)) {
            continue;
        }
        let Some(rgb) = Rgb::from_hex(hex) else {
            debug!(color = name, value = hex, "not a hex color, component tokens left as-is");
            continue;
        };
        let hls = rgb.to_hls();

        let components = [
            ("r", rgb.r.to_string()),
            ("g", rgb.g.to_string()),
            ("b", rgb.b.to_string()),
            ("h", format_float(hls.hue)),
            ("l", format!("{}%", format_float(hls.lightness))),
            ("s", format!("{}%", format_float(hls.saturation))),
        ];
        for (component, value) in components {
            result = result.replace(&format!("{{{}.{}}}", name, component), &value);
        }
    }

    result
}
