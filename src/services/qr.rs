use qrcode::render::svg;
use qrcode::QrCode;

#[derive(thiserror::Error, Debug)]
pub enum QrRenderError {
    #[error("QR code generation failed: {0}")]
    QrCode(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed")]
    PngEncoding,
}

/// Renders a card token as an SVG QR code.
pub fn render_svg(token: &str) -> Result<String, QrRenderError> {
    let code = QrCode::new(token.as_bytes())?;
    let svg = code.render::<svg::Color>().min_dimensions(200, 200).build();

    Ok(svg)
}

/// Renders a card token as a PNG QR code (kiosk displays).
pub fn render_png(token: &str) -> Result<Vec<u8>, QrRenderError> {
    use image::{ImageBuffer, Luma};

    let code = QrCode::new(token.as_bytes())?;

    let module_size = 10u32;
    let width = code.width() as u32;
    let img_size = width * module_size;

    let mut img = ImageBuffer::<Luma<u8>, Vec<u8>>::new(img_size, img_size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let module_x = x / module_size;
        let module_y = y / module_size;
        *pixel = match code[(module_x as usize, module_y as usize)] {
            qrcode::types::Color::Dark => Luma([0u8]),
            qrcode::types::Color::Light => Luma([255u8]),
        };
    }

    let mut png_data = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut png_data),
            image::ImageFormat::Png,
        )
        .map_err(|_| QrRenderError::PngEncoding)?;

    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_rendering() {
        let svg = render_svg("eyJjYXJkX2lkIjoiMDAwMCJ9.deadbeef").unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_png_rendering() {
        let png = render_png("eyJjYXJkX2lkIjoiMDAwMCJ9.deadbeef").unwrap();

        // PNG magic bytes
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
