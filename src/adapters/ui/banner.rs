//! Startup banner: "HR-ASSIST" in figlet's standard font with a teal-to-violet gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

const BANNER_TEXT: &str = "HR-ASSIST";

/// Teal (#14b8a6).
const TEAL: (u8, u8, u8) = (0x14, 0xb8, 0xa6);
/// Violet (#8b5cf6).
const VIOLET: (u8, u8, u8) = (0x8b, 0x5c, 0xf6);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// ASCII art for the banner, falling back to the bare name if the font fails.
fn banner_art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(BANNER_TEXT).map(|f| f.to_string()))
        .unwrap_or_else(|| BANNER_TEXT.to_string())
}

/// Prints the welcome banner, version, and a one-line hint.
pub fn print_welcome() {
    let mut out = stdout();
    let art = banner_art();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(TEAL, VIOLET, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: TEAL.0,
        g: TEAL.1,
        b: TEAL.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Ask about the HR dataset, preview recipients, send reports.\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_rgb(TEAL, VIOLET, 0.0), TEAL);
        assert_eq!(lerp_rgb(TEAL, VIOLET, 1.0), VIOLET);
    }

    #[test]
    fn test_banner_art_is_multiline() {
        assert!(banner_art().lines().count() > 1);
    }
}
