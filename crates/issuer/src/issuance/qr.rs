//! Scannable-code rendering of verification URLs.

use qrcode::{render::svg, EcLevel, QrCode};
use thiserror::Error;

/// Pixel size of one QR module in the rendered SVG.
const MODULE_PX: u32 = 10;

/// Errors from QR rendering.
#[derive(Debug, Error)]
pub enum QrError {
    /// The data does not fit in any QR version at the chosen error correction level.
    #[error("cannot encode data as QR code: {0}")]
    Encode(String),
}

/// Render `data` as a black-on-white SVG QR code with the standard 4-module
/// quiet zone. The smallest version that fits is chosen automatically.
pub fn render_svg(data: &str) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| QrError::Encode(e.to_string()))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .module_dimensions(MODULE_PX, MODULE_PX)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_svg_document() {
        let svg = render_svg("http://localhost:5000/verify/abc").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
    }

    #[test]
    fn longer_urls_still_fit() {
        let url = format!("https://certs.example.org/verify/{}", "A".repeat(300));
        assert!(render_svg(&url).is_ok());
    }

    #[test]
    fn oversized_data_is_an_error() {
        let data = "x".repeat(5000);
        assert!(matches!(render_svg(&data), Err(QrError::Encode(_))));
    }
}
