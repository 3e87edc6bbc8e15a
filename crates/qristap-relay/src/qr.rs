use crate::{Error, Result};
use base64::Engine as _;
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

/// Pixels per QR module.
const MODULE_PIXELS: u32 = 10;

/// Quiet-zone border, in modules.
const QUIET_MODULES: u32 = 4;

/// POST to the upstream endpoint and pull the payment code out of its JSON
/// answer.
pub async fn fetch_payment_code(client: &reqwest::Client, endpoint: &str) -> Result<String> {
    let response = client
        .post(endpoint)
        .send()
        .await
        .map_err(|e| Error::Upstream(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Upstream(format!(
            "endpoint answered {}",
            response.status()
        )));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| Error::Upstream(format!("invalid json: {e}")))?;

    extract_code(&body)
}

fn extract_code(body: &serde_json::Value) -> Result<String> {
    body.get("qr_string")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or(Error::MissingCode)
}

/// Render a payment code as a PNG: dark modules on white, 10 px per module,
/// 4-module quiet zone.
pub fn render_png(code: &str) -> Result<Vec<u8>> {
    let qr = QrCode::with_error_correction_level(code.as_bytes(), EcLevel::L)
        .map_err(|e| Error::Render(format!("qr encoding failed: {e}")))?;

    let modules = qr.width() as u32;
    let dim = (modules + 2 * QUIET_MODULES) * MODULE_PIXELS;
    let mut img = GrayImage::from_pixel(dim, dim, Luma([255]));

    for (i, color) in qr.to_colors().iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let px = (i as u32 % modules + QUIET_MODULES) * MODULE_PIXELS;
        let py = (i as u32 / modules + QUIET_MODULES) * MODULE_PIXELS;
        for dy in 0..MODULE_PIXELS {
            for dx in 0..MODULE_PIXELS {
                img.put_pixel(px + dx, py + dy, Luma([0]));
            }
        }
    }

    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| Error::Render(format!("png encoding failed: {e}")))?;

    Ok(png)
}

/// HTML page embedding the rendered QR inline; a spacebar press reloads it
/// so the operator can pull a fresh code.
pub fn qr_page(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!(
        r#"<html>
    <head><title>QR Code Response</title></head>
    <body>
        <h2>QR Code Image:</h2>
        <img src="data:image/png;base64,{encoded}" alt="QR Code">
        <p>Press Space to reload the page</p>
        <script>
            window.addEventListener('keydown', function(event) {{
                if (event.key === " ") {{
                    location.reload();
                }}
            }});
        </script>
    </body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_code_from_upstream_body() {
        let body = json!({ "qr_string": "00020101021226..." });
        assert_eq!(extract_code(&body).unwrap(), "00020101021226...");
    }

    #[test]
    fn missing_or_non_string_code_is_an_error() {
        assert!(matches!(
            extract_code(&json!({})),
            Err(Error::MissingCode)
        ));
        assert!(matches!(
            extract_code(&json!({ "qr_string": 42 })),
            Err(Error::MissingCode)
        ));
    }

    #[test]
    fn renders_a_png_with_quiet_zone() {
        let png = render_png("00020101021226580016ID.CO.EXAMPLE.WWW").unwrap();

        // PNG signature.
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);

        // Deterministic output for a fixed payload.
        assert_eq!(png, render_png("00020101021226580016ID.CO.EXAMPLE.WWW").unwrap());
    }

    #[test]
    fn page_embeds_image_and_reload_handler() {
        let page = qr_page(&[1, 2, 3]);

        assert!(page.contains("data:image/png;base64,"));
        assert!(page.contains("keydown"));
        assert!(page.contains("location.reload()"));
    }
}
