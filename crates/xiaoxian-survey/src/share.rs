//! Sharing the survey address.
//!
//! Renders the survey link as a QR code for the terminal or as an SVG image,
//! and copies the link to the system clipboard.

use std::path::Path;

use clipboard_rs::{Clipboard, ClipboardContext};
use qrcode::render::{svg, unicode};
use qrcode::{EcLevel, QrCode};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Address used when no survey URL is configured.
pub const FALLBACK_URL: &str = "https://example.com";

/// The survey link being shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    url: String,
}

impl ShareLink {
    /// Create a link, using [`FALLBACK_URL`] when `url` is missing or blank.
    #[must_use]
    pub fn new(url: Option<&str>) -> Self {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(FALLBACK_URL);
        Self {
            url: url.to_string(),
        }
    }

    /// Replace the displayed address.
    ///
    /// Only this value changes; nothing is persisted.
    pub fn set_url(&mut self, url: &str) {
        *self = Self::new(Some(url));
    }

    /// The address.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Encode the address at the highest error-correction level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QrEncode`] if the address is too long to encode.
    pub fn qr_code(&self) -> Result<QrCode> {
        Ok(QrCode::with_error_correction_level(
            self.url.as_bytes(),
            EcLevel::H,
        )?)
    }

    /// Render the QR code with half-height block characters.
    ///
    /// # Errors
    ///
    /// See [`ShareLink::qr_code`].
    pub fn render_terminal(&self) -> Result<String> {
        let code = self.qr_code()?;
        Ok(code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .quiet_zone(true)
            .build())
    }

    /// Render the QR code as an SVG document.
    ///
    /// `size` is the minimum edge length in pixels.
    ///
    /// # Errors
    ///
    /// See [`ShareLink::qr_code`].
    pub fn render_svg(&self, dark: &str, light: &str, size: u32) -> Result<String> {
        let code = self.qr_code()?;
        Ok(code
            .render::<svg::Color<'_>>()
            .min_dimensions(size, size)
            .dark_color(svg::Color(dark))
            .light_color(svg::Color(light))
            .quiet_zone(true)
            .build())
    }

    /// Write the SVG rendering to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the file write fails.
    pub fn save_svg(&self, path: &Path, dark: &str, light: &str, size: u32) -> Result<()> {
        let svg = self.render_svg(dark, light, size)?;
        std::fs::write(path, svg)?;
        info!("Saved QR code to {}", path.display());
        Ok(())
    }

    /// Copy the address to the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Clipboard`] if the clipboard is unavailable.
    pub fn copy_to_clipboard(&self) -> Result<()> {
        let ctx = ClipboardContext::new().map_err(|e| Error::clipboard(e.to_string()))?;
        ctx.set_text(self.url.clone())
            .map_err(|e| Error::clipboard(e.to_string()))?;
        debug!("Copied {} to clipboard", self.url);
        Ok(())
    }
}

impl Default for ShareLink {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_url() {
        assert_eq!(ShareLink::new(None).url(), FALLBACK_URL);
        assert_eq!(ShareLink::new(Some("   ")).url(), FALLBACK_URL);
        assert_eq!(ShareLink::default().url(), FALLBACK_URL);
    }

    #[test]
    fn test_configured_url() {
        let link = ShareLink::new(Some(" https://survey.example.org/xiaoxian "));
        assert_eq!(link.url(), "https://survey.example.org/xiaoxian");
    }

    #[test]
    fn test_set_url() {
        let mut link = ShareLink::default();
        link.set_url("https://a.example");
        assert_eq!(link.url(), "https://a.example");
        link.set_url("");
        assert_eq!(link.url(), FALLBACK_URL);
    }

    #[test]
    fn test_qr_code_uses_high_correction() {
        let code = ShareLink::default().qr_code().unwrap();
        assert_eq!(code.error_correction_level(), EcLevel::H);
        assert!(code.width() >= 21);
    }

    #[test]
    fn test_render_terminal() {
        let rendered = ShareLink::default().render_terminal().unwrap();
        assert!(rendered.lines().count() > 10);
        assert!(rendered.contains('█') || rendered.contains('▀') || rendered.contains('▄'));
    }

    #[test]
    fn test_render_svg_colours() {
        let svg = ShareLink::default()
            .render_svg("#7f1d1d", "#ffffff", 180)
            .unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("#7f1d1d"));
        assert!(svg.contains("#ffffff"));
    }

    #[test]
    fn test_save_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.svg");
        ShareLink::default()
            .save_svg(&path, "#000000", "#ffffff", 120)
            .unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("<svg"));
    }

    #[test]
    fn test_oversized_url_fails_to_encode() {
        let long = format!("https://example.com/{}", "x".repeat(4000));
        assert!(matches!(
            ShareLink::new(Some(&long)).qr_code(),
            Err(Error::QrEncode(_))
        ));
    }
}
