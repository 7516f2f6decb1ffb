use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::data::pixel_buffer::PixelBuffer;

/// Encodes `buffer` as binary PPM.
pub fn encode_ppm(buffer: &PixelBuffer, out: &mut impl Write) -> std::io::Result<()> {
    let width = buffer.pixel_rect().width();
    let height = buffer.pixel_rect().height();

    // P6 means binary RGB, then width, height and max_colour
    writeln!(out, "P6")?;
    writeln!(out, "{width} {height}")?;
    writeln!(out, "255")?;
    out.write_all(buffer.buffer())?;

    Ok(())
}

/// Writes `buffer` to `filepath`, creating missing parent directories.
pub fn write_ppm(buffer: &PixelBuffer, filepath: impl AsRef<Path>) -> std::io::Result<()> {
    let filepath = filepath.as_ref();

    if let Some(parent) = filepath.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = BufWriter::new(File::create(filepath)?);
    encode_ppm(buffer, &mut file)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::colour::Colour;
    use crate::core::data::pixel_rect::PixelRect;
    use crate::core::data::point::Point;

    fn sample_buffer() -> PixelBuffer {
        let mut buffer = PixelBuffer::new(PixelRect::new(2, 1).unwrap());
        buffer.set_pixel(Point { x: 1, y: 0 }, Colour { r: 255, g: 10, b: 1 }).unwrap();
        buffer
    }

    #[test]
    fn test_encode_ppm_header_and_body() {
        let mut out = Vec::new();

        encode_ppm(&sample_buffer(), &mut out).unwrap();

        assert_eq!(out, b"P6\n2 1\n255\n\x00\x00\x00\xff\x0a\x01".to_vec());
    }

    #[test]
    fn test_write_ppm_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("mandelbrot-explorer-ppm-{}", std::process::id()));
        let path = dir.join("nested").join("frame.ppm");

        write_ppm(&sample_buffer(), &path).unwrap();
        let written = std::fs::read(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(written.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(written.len(), 11 + 6);
    }
}
