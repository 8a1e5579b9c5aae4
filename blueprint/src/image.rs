use std::fs;
use std::path::Path;

use base64::Engine;
use bag_core::svg_escape;

use crate::error::ElementError;

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else if bytes.len() > 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
        head.contains("<svg").then_some("image/svg+xml")
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// A `data:` URL for an overlay source: data URLs pass through, anything
/// else is read as a file path.
pub fn resolve_href(src: &str) -> Result<String, ElementError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(ElementError::Image("empty source".into()));
    }
    if src.starts_with("data:") {
        return Ok(src.to_string());
    }
    let path = Path::new(src);
    let bytes =
        fs::read(path).map_err(|e| ElementError::Image(format!("{}: {e}", path.display())))?;
    let mime = sniff_mime(&bytes)
        .ok_or_else(|| ElementError::Image(format!("{}: unknown image format", path.display())))?;
    Ok(data_url(mime, &bytes))
}

/// SVG that stretches `href` over a `width`x`height` canvas.
pub fn image_svg(href: &str, width: f64, height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w:.3}\" height=\"{h:.3}\" viewBox=\"0 0 {w:.3} {h:.3}\">\n<image x=\"0\" y=\"0\" width=\"{w:.3}\" height=\"{h:.3}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>\n</svg>\n",
        svg_escape(href),
        w = width,
        h = height
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn data_urls_pass_through() {
        assert_eq!(
            resolve_href(" data:image/png;base64,AAAA ").unwrap(),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn reads_files_into_data_urls() {
        let png = bag_core::encode_rgba_to_png_bytes(1, 1, &[0, 0, 0, 255]).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&png).unwrap();
        let href = resolve_href(file.path().to_str().unwrap()).unwrap();
        assert!(href.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn unreadable_sources_fail() {
        assert!(matches!(
            resolve_href("/definitely/not/here.png"),
            Err(ElementError::Image(_))
        ));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain text").unwrap();
        assert!(resolve_href(file.path().to_str().unwrap()).is_err());
        assert!(resolve_href("  ").is_err());
    }

    #[test]
    fn wrapper_stretches_image() {
        let svg = image_svg("data:image/png;base64,AAAA", 120.0, 40.0);
        assert!(svg.contains("viewBox=\"0 0 120.000 40.000\""));
        assert!(svg.contains("preserveAspectRatio=\"none\""));
    }
}
