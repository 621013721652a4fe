use std::io::BufWriter;

use inf::Color;

use crate::{tiledata::TileData, tiledata::TileFormat, Error, Result, TileBitmap};

/// Encodes an RGBA pixel buffer as png
pub fn encode_png(colors: &[Color], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut data: Vec<u8> = Vec::new();

    {
        let writer = BufWriter::new(&mut data);
        let mut encoder = png::Encoder::new(writer, width, height);

        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::Sub);
        encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);

        let mut writer = encoder
            .write_header()
            .map_err(|err| Error::Runtime(format!("Failed to write png header: {}", err)))?;

        writer
            .write_image_data(bytemuck::cast_slice(colors))
            .map_err(|err| Error::Runtime(format!("Failed to write png data: {}", err)))?;
        writer
            .finish()
            .map_err(|err| Error::Runtime(format!("Failed to finish png writer: {}", err)))?;
    }

    Ok(data)
}

pub fn bitmap_to_png(bitmap: &TileBitmap) -> Result<TileData> {
    Ok(TileData::new(
        TileFormat::Png,
        encode_png(bitmap.pixels(), bitmap.width() as u32, bitmap.height() as u32)?,
    ))
}

#[cfg(test)]
mod tests {
    use geo::RasterSize;
    use inf::color;

    use super::*;

    #[test]
    fn encode_decode_round_trip() -> Result {
        let bitmap = TileBitmap::filled(RasterSize::square(8), color::RED);
        let tile_data = bitmap_to_png(&bitmap)?;
        assert_eq!(tile_data.format, TileFormat::Png);
        assert!(!tile_data.is_empty());

        let decoder = png::Decoder::new(std::io::Cursor::new(tile_data.data.as_slice()));
        let mut reader = decoder.read_info().map_err(|err| Error::Runtime(err.to_string()))?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).map_err(|err| Error::Runtime(err.to_string()))?;

        assert_eq!(info.width, 8);
        assert_eq!(info.height, 8);
        assert_eq!(&buf[..4], &[255, 0, 0, 255]);
        Ok(())
    }
}
