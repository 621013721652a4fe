use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use geo::{
    constants::EARTH_CIRCUMFERENCE_M, crs, crs::Epsg, Coordinate, CoordinateTransformer, GeoReference, LatLonBounds, Nodata,
    RasterSize, Rect, Tile, ZoomLevelStrategy,
};

use crate::{Band, ColorInterpretation, Dataset, Driver, Error, Raster, RasterQuery, Result};

const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Driver for MBTiles raster tile databases
pub struct MbtilesDriver;

impl Driver for MbtilesDriver {
    fn name(&self) -> &'static str {
        "mbtiles"
    }

    fn can_open(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mbtiles"));
        if !has_extension {
            return false;
        }

        // probe the sqlite magic, any io failure means the driver does not apply
        let mut magic = [0u8; 16];
        match std::fs::File::open(path).and_then(|mut file| file.read_exact(&mut magic)) {
            Ok(()) => &magic == SQLITE_MAGIC,
            Err(_) => false,
        }
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Dataset>> {
        Ok(Box::new(MbtilesDataset::new(path)?))
    }
}

fn parse_bounds(bounds: &str) -> Result<LatLonBounds> {
    if !bounds.is_empty() {
        let values: Vec<f64> = bounds.split(',').filter_map(|val| val.trim().parse::<f64>().ok()).collect();
        if let [west, south, east, north] = values.as_slice() {
            return Ok(LatLonBounds::hull(
                Coordinate::latlon(*south, *west),
                Coordinate::latlon(*north, *east),
            ));
        }
    }

    Err(Error::Runtime(format!("Invalid mbtiles bounds: {}", bounds)))
}

struct TileImage {
    width: usize,
    height: usize,
    /// RGBA interleaved
    pixels: Vec<u8>,
}

impl TileImage {
    /// All white opaque substitute for tiles that cannot be decoded
    fn placeholder() -> Self {
        let size = Tile::TILE_SIZE as usize;
        TileImage {
            width: size,
            height: size,
            pixels: vec![255; size * size * 4],
        }
    }
}

fn decode_tile(blob: &[u8]) -> Result<TileImage> {
    let mut decoder = png::Decoder::new(std::io::Cursor::new(blob));
    decoder.set_transformations(png::Transformations::normalize_to_color8() | png::Transformations::ALPHA);

    let mut reader = decoder
        .read_info()
        .map_err(|err| Error::Runtime(format!("Invalid png tile: {}", err)))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|err| Error::Runtime(format!("Failed to decode png tile: {}", err)))?;
    buf.truncate(info.buffer_size());

    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::GrayscaleAlpha => buf.chunks_exact(2).flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]]).collect(),
        other => {
            return Err(Error::Runtime(format!("Unsupported png tile color type: {:?}", other)));
        }
    };

    Ok(TileImage {
        width: info.width as usize,
        height: info.height as usize,
        pixels,
    })
}

/// Dataset view of an MBTiles database.
/// The database connection is serialized, shared access goes through sqlite itself.
pub struct MbtilesDataset {
    db: mbtilesdb::MbtilesDb,
    path: PathBuf,
    name: String,
    description: String,
    bands: Vec<Band>,
    georef: GeoReference,
    min_zoom: i32,
    max_zoom: i32,
    scheme: String,
    closed: bool,
}

impl MbtilesDataset {
    pub fn new(path: &Path) -> Result<Self> {
        let db = mbtilesdb::MbtilesDb::new(path)?;
        let mut meta = db.metadata()?;

        // missing or unparsable bounds block activation of the dataset
        let bounds = parse_bounds(meta.remove("bounds").unwrap_or_default().as_str())?;
        let min_zoom: i32 = meta.remove("minzoom").unwrap_or_default().parse().unwrap_or(0);
        let max_zoom: i32 = meta.remove("maxzoom").unwrap_or_default().parse().unwrap_or(20);

        let nw = crs::lat_lon_to_web_mercator(bounds.northwest());
        let se = crs::lat_lon_to_web_mercator(bounds.southeast());
        let extent = Rect::from_points(nw, se);

        let pixel_size = Tile::pixel_size_at_zoom(max_zoom);
        let size = RasterSize::with_rows_cols(
            (extent.height() / pixel_size).round().max(1.0) as usize,
            (extent.width() / pixel_size).round().max(1.0) as usize,
        );

        let georef = GeoReference::with_extent(crs::epsg::WGS84_WEB_MERCATOR, extent, size, None);
        if !georef.is_valid() {
            return Err(Error::Runtime(format!("Unusable mbtiles extent: {}", path.display())));
        }

        let name = meta
            .remove("name")
            .or_else(|| meta.remove("basename"))
            .unwrap_or_else(|| path.file_stem().unwrap_or_default().to_string_lossy().to_string());

        let dataset = MbtilesDataset {
            db,
            path: path.to_path_buf(),
            name,
            description: meta.remove("description").unwrap_or_default(),
            bands: vec![
                Band::new("red", geo::ArrayDataType::Uint8).with_interpretation(ColorInterpretation::Red),
                Band::new("green", geo::ArrayDataType::Uint8).with_interpretation(ColorInterpretation::Green),
                Band::new("blue", geo::ArrayDataType::Uint8).with_interpretation(ColorInterpretation::Blue),
                Band::new("alpha", geo::ArrayDataType::Uint8).with_interpretation(ColorInterpretation::Other),
            ],
            georef,
            min_zoom,
            max_zoom,
            scheme: meta.remove("scheme").unwrap_or_else(|| "tms".to_string()),
            closed: false,
        };

        log::info!("[MBTILES] Serving {} ({})", dataset.name, path.display());
        Ok(dataset)
    }

    fn storage_row(&self, zoom: i32, tile_row: i32) -> i32 {
        if self.scheme == "xyz" {
            tile_row
        } else {
            (1 << zoom) - 1 - tile_row
        }
    }
}

impl Dataset for MbtilesDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn crs(&self) -> Epsg {
        crs::epsg::WGS84_WEB_MERCATOR
    }

    fn bounding_box(&self) -> Rect<f64> {
        self.georef.bounding_box()
    }

    fn raster_size(&self) -> RasterSize {
        self.georef.size()
    }

    fn bands(&self) -> &[Band] {
        &self.bands
    }

    fn read(&mut self, query: &RasterQuery) -> Result<Raster> {
        if self.closed {
            return Err(Error::Runtime(format!("Dataset {} is closed", self.name)));
        }

        let window = if query.crs == self.crs() {
            query.bounds
        } else {
            CoordinateTransformer::from_epsg(query.crs, self.crs())?.transform_rect(&query.bounds)?
        };

        let selection = query.band_selection(self.bands.len());
        for &band in &selection {
            if band >= self.bands.len() {
                return Err(Error::InvalidArgument(format!("Band index {} out of range", band)));
            }
        }

        let pixel_size = window.width() / query.size.cols.max(1) as f64;
        let zoom = Tile::zoom_level_for_pixel_size(pixel_size, ZoomLevelStrategy::Closest).clamp(self.min_zoom, self.max_zoom);
        let tile_span = EARTH_CIRCUMFERENCE_M / f64::powi(2.0, zoom);
        let half_circumference = EARTH_CIRCUMFERENCE_M / 2.0;

        let out_georef = GeoReference::with_extent(query.crs, query.bounds, query.size, None);
        let bands: Vec<Band> = selection.iter().map(|&band| self.bands[band].clone()).collect();
        let plane_len = query.size.cell_count() * query.dtype.size();
        let mut result = Raster::new(
            out_georef,
            query.dtype,
            bands,
            Nodata::NONE,
            vec![0; plane_len * selection.len()],
        )?;

        // decoded tiles are memoized per read, a missing tile stays transparent,
        // an undecodable tile contributes the white placeholder block
        let mut tiles: HashMap<(i32, i32), Option<TileImage>> = HashMap::new();

        let cell_width = window.width() / query.size.cols as f64;
        let cell_height = window.height() / query.size.rows as f64;

        for row in 0..query.size.rows {
            let y = window.top_left().y() - (row as f64 + 0.5) * cell_height;
            for col in 0..query.size.cols {
                let x = window.top_left().x() + (col as f64 + 0.5) * cell_width;

                let tile_col = ((x + half_circumference) / tile_span).floor() as i32;
                let tile_row = ((half_circumference - y) / tile_span).floor() as i32;
                if tile_col < 0 || tile_row < 0 || tile_col >= (1 << zoom) || tile_row >= (1 << zoom) {
                    continue;
                }

                let stored_row = self.storage_row(zoom, tile_row);
                let image = tiles.entry((tile_col, tile_row)).or_insert_with(|| {
                    match self.db.tile_data(zoom, tile_col, stored_row) {
                        Ok(Some(blob)) => Some(decode_tile(&blob).unwrap_or_else(|err| {
                            log::warn!("Tile {}/{}/{} is not decodable: {}", zoom, tile_col, tile_row, err);
                            TileImage::placeholder()
                        })),
                        Ok(None) => None,
                        Err(err) => {
                            log::warn!("Tile {}/{}/{} lookup failed: {}", zoom, tile_col, tile_row, err);
                            None
                        }
                    }
                });

                let Some(image) = image else {
                    continue;
                };

                let tile_left = tile_col as f64 * tile_span - half_circumference;
                let tile_top = half_circumference - tile_row as f64 * tile_span;
                let px = (((x - tile_left) / tile_span) * image.width as f64) as usize;
                let py = (((tile_top - y) / tile_span) * image.height as f64) as usize;
                let pixel = &image.pixels[(py.min(image.height - 1) * image.width + px.min(image.width - 1)) * 4..][..4];

                let index = row * query.size.cols + col;
                for (out_band, &src_band) in selection.iter().enumerate() {
                    result.write_sample(out_band, index, f64::from(pixel[src_band]));
                }
            }
        }

        Ok(result)
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

mod mbtilesdb {
    use std::collections::HashMap;
    use std::path::Path;

    use sqlite::{AccessMode, Connection, Statement};

    use crate::{Error, Result};

    pub struct MbtilesDb {
        conn: Connection,
        tile_query: Statement,
    }

    impl MbtilesDb {
        pub fn new(db_path: &Path) -> Result<Self> {
            let conn = Connection::new(db_path, AccessMode::ReadOnly)?;
            let tile_query = conn.prepare_statement(
                "SELECT tile_data
                FROM tiles
                WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3;",
            )?;

            Ok(MbtilesDb { conn, tile_query })
        }

        pub fn metadata(&self) -> Result<HashMap<String, String>> {
            let stmt = self.conn.prepare_statement("SELECT name, value FROM metadata;")?;

            Ok(stmt
                .into_iter()
                .filter_map(|row| {
                    let key = row.column_string(0)?.to_string();
                    let value = row.column_string(1)?.to_string();
                    Some((key, value))
                })
                .collect())
        }

        pub fn tile_data(&mut self, zoom: i32, column: i32, row: i32) -> Result<Option<Vec<u8>>> {
            self.tile_query.reset()?;
            self.tile_query.bind(1, zoom)?;
            self.tile_query.bind(2, column)?;
            self.tile_query.bind(3, row)?;

            match self.tile_query.next() {
                Some(result_row) => {
                    let blob = result_row
                        .column_blob(0)
                        .ok_or_else(|| Error::Runtime("Tile blob read error".to_string()))?;
                    Ok(Some(Vec::from(blob)))
                }
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::ArrayDataType;
    use sqlite::{AccessMode, Connection};

    use super::*;

    fn encode_solid_png(color: [u8; 4]) -> Vec<u8> {
        let size = Tile::TILE_SIZE;
        let mut data = Vec::new();
        {
            let writer = std::io::BufWriter::new(&mut data);
            let mut encoder = png::Encoder::new(writer, size, size);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder.write_header().expect("png header");
            let pixels: Vec<u8> = std::iter::repeat_n(color, (size * size) as usize).flatten().collect();
            writer.write_image_data(&pixels).expect("png data");
            writer.finish().expect("png finish");
        }

        data
    }

    fn create_test_mbtiles(path: &Path, tile_blob: &[u8]) {
        let conn = Connection::new(path, AccessMode::Create).expect("create db");
        conn.execute("CREATE TABLE metadata (name TEXT, value TEXT);").expect("metadata table");
        conn.execute("CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);")
            .expect("tiles table");

        // the extent of tile 5/16/15: lon [0, 11.25], lat [0, 11.178]
        let tile = Tile { x: 16, y: 15, z: 5 };
        let bounds = tile.bounds();
        for (key, value) in [
            ("name", "test_layer".to_string()),
            ("format", "png".to_string()),
            ("minzoom", "5".to_string()),
            ("maxzoom", "5".to_string()),
            ("scheme", "tms".to_string()),
            (
                "bounds",
                format!("{},{},{},{}", bounds.west(), bounds.south(), bounds.east(), bounds.north()),
            ),
        ] {
            let stmt = conn
                .prepare_statement("INSERT INTO metadata VALUES (?1, ?2);")
                .expect("prepare");
            stmt.bind_text(1, key).expect("bind");
            stmt.bind_text(2, &value).expect("bind");
            stmt.execute().expect("insert metadata");
        }

        let stmt = conn
            .prepare_statement("INSERT INTO tiles VALUES (?1, ?2, ?3, ?4);")
            .expect("prepare");
        stmt.bind(1, 5).expect("bind");
        stmt.bind(2, 16).expect("bind");
        stmt.bind(3, 31 - 15).expect("bind"); // tms row flip
        stmt.bind_blob(4, tile_blob).expect("bind");
        stmt.execute().expect("insert tile");
    }

    fn full_extent_query(dataset: &MbtilesDataset, size: usize) -> RasterQuery {
        RasterQuery::new(
            dataset.bounding_box(),
            crs::epsg::WGS84_WEB_MERCATOR,
            RasterSize::square(size),
            ArrayDataType::Uint8,
        )
    }

    #[test_log::test]
    fn serves_decoded_tile_pixels() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("test.mbtiles");
        create_test_mbtiles(&db_path, &encode_solid_png([200, 100, 50, 255]));

        let driver = MbtilesDriver;
        assert!(driver.can_open(&db_path));

        let mut dataset = MbtilesDataset::new(&db_path)?;
        assert_eq!(dataset.name(), "test_layer");
        assert_eq!(dataset.bands().len(), 4);

        let raster = dataset.read(&full_extent_query(&dataset, 16))?;
        let center = 8 * 16 + 8;
        assert_eq!(raster.read_sample(0, center), 200.0);
        assert_eq!(raster.read_sample(1, center), 100.0);
        assert_eq!(raster.read_sample(2, center), 50.0);
        assert_eq!(raster.read_sample(3, center), 255.0);
        Ok(())
    }

    #[test]
    fn undecodable_tile_becomes_the_white_placeholder() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("broken.mbtiles");
        create_test_mbtiles(&db_path, b"certainly not a png");

        let mut dataset = MbtilesDataset::new(&db_path)?;
        let raster = dataset.read(&full_extent_query(&dataset, 8))?;

        let center = 4 * 8 + 4;
        for band in 0..4 {
            assert_eq!(raster.read_sample(band, center), 255.0);
        }
        Ok(())
    }

    #[test]
    fn band_subset_read() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("subset.mbtiles");
        create_test_mbtiles(&db_path, &encode_solid_png([10, 20, 30, 255]));

        let mut dataset = MbtilesDataset::new(&db_path)?;
        let query = full_extent_query(&dataset, 4).with_bands(vec![2]);
        let raster = dataset.read(&query)?;

        assert_eq!(raster.band_count(), 1);
        assert_eq!(raster.read_sample(0, 2 * 4 + 2), 30.0);
        Ok(())
    }

    #[test]
    fn missing_bounds_metadata_blocks_activation() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("nobounds.mbtiles");

        let conn = Connection::new(&db_path, AccessMode::Create)?;
        conn.execute("CREATE TABLE metadata (name TEXT, value TEXT);")?;
        conn.execute("CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);")?;
        drop(conn);

        assert!(MbtilesDataset::new(&db_path).is_err());
        Ok(())
    }

    #[test]
    fn can_open_rejects_foreign_files() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let driver = MbtilesDriver;
        assert!(!driver.can_open(&dir.path().join("missing.mbtiles")));
        assert!(!driver.can_open(Path::new("image.tif")));

        // correct extension but not a sqlite database
        let fake = dir.path().join("fake.mbtiles");
        std::fs::write(&fake, b"just some text, long enough for the magic probe")?;
        assert!(!driver.can_open(&fake));
        Ok(())
    }

    #[test]
    fn read_after_close_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("closing.mbtiles");
        create_test_mbtiles(&db_path, &encode_solid_png([1, 2, 3, 255]));

        let mut dataset = MbtilesDataset::new(&db_path)?;
        let query = full_extent_query(&dataset, 4);
        dataset.close();
        assert!(dataset.read(&query).is_err());
        Ok(())
    }
}
