use resvg::{tiny_skia, usvg};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use crate::errors::LogoError;

/// System font database, loaded once per process.
fn fontdb() -> Arc<usvg::fontdb::Database> {
    static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// Label drawn on a placeholder: the full code for the known short-label
/// codes, otherwise the first six characters.
pub fn pick_label(code: &str, full_label_codes: &BTreeSet<String>) -> String {
    if full_label_codes.contains(code) {
        code.to_string()
    } else {
        code.chars().take(6).collect()
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Synthesize the terminal-fallback logo: a transparent square with a 2px
/// light-gray border and the channel label centered in dark gray.
///
/// Rendering goes through a small SVG template so text layout and font
/// fallback are handled by the renderer; if the preferred family is missing
/// the generic sans-serif fallback is used, and with no usable font at all
/// the bordered square still renders.
pub fn placeholder_png(
    code: &str,
    target_px: u32,
    full_label_codes: &BTreeSet<String>,
    font_family: &str,
) -> Result<Vec<u8>, LogoError> {
    let label = xml_escape(&pick_label(code, full_label_codes));
    let font_size = (target_px as f32 * 0.28).round();
    // baseline sits below the vertical midpoint by ~35% of the font size
    let baseline = target_px as f32 / 2.0 + font_size * 0.35;

    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{px}" height="{px}" viewBox="0 0 {px} {px}">
  <rect x="2" y="2" width="{inner}" height="{inner}" fill="none" stroke="rgb(180,180,180)" stroke-width="2"/>
  <text x="{cx}" y="{baseline}" text-anchor="middle" font-family="{font}, sans-serif" font-weight="bold" font-size="{font_size}" fill="rgb(80,80,80)">{label}</text>
</svg>"#,
        px = target_px,
        inner = target_px.saturating_sub(4),
        cx = target_px as f32 / 2.0,
        font = xml_escape(font_family),
    );

    let mut options = usvg::Options::default();
    options.fontdb = fontdb();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|e| LogoError::placeholder(e.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(target_px, target_px)
        .ok_or_else(|| LogoError::placeholder("zero-sized canvas"))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| LogoError::placeholder(e.to_string()))
}
