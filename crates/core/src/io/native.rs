//! Single-band TIFF reading/writing
//!
//! Height grids come in as Gray8, Gray16, Gray32 or Gray32Float (the signed
//! and 64-bit float layouts decode too). Every sample goes through
//! [`HeightField::from_raw`], so it is clamped and rounded into the elevation
//! domain. Label grids go out as Gray32.

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::height_field::HeightField;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32;
use tiff::encoder::TiffEncoder;

/// Read the first image of a TIFF file into a [`HeightField`]
pub fn read_tiff<P: AsRef<Path>>(path: P) -> Result<HeightField> {
    let file = File::open(path.as_ref())?;
    decode_tiff(file)
}

/// Same as [`read_tiff`], from an in-memory buffer
pub fn read_tiff_from_buffer(data: &[u8]) -> Result<HeightField> {
    decode_tiff(Cursor::new(data))
}

fn decode_tiff<R: Read + Seek>(reader: R) -> Result<HeightField> {
    let mut decoder = Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let (width, height) = (width as usize, height as usize);

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    match result {
        DecodingResult::U8(buf) => HeightField::from_raw(&buf, width, height),
        DecodingResult::U16(buf) => HeightField::from_raw(&buf, width, height),
        DecodingResult::U32(buf) => HeightField::from_raw(&buf, width, height),
        DecodingResult::F32(buf) => HeightField::from_raw(&buf, width, height),
        DecodingResult::F64(buf) => HeightField::from_raw(&buf, width, height),
        DecodingResult::I8(buf) => HeightField::from_raw(&buf, width, height),
        DecodingResult::I16(buf) => HeightField::from_raw(&buf, width, height),
        DecodingResult::I32(buf) => HeightField::from_raw(&buf, width, height),
        _ => Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    }
}

/// Write a label grid as a Gray32 TIFF file
pub fn write_tiff<P: AsRef<Path>>(grid: &Grid<u32>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_tiff(grid, file)
}

/// Same as [`write_tiff`], into a new buffer
pub fn write_tiff_to_buffer(grid: &Grid<u32>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_tiff(grid, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_tiff<W: Write + Seek>(grid: &Grid<u32>, writer: W) -> Result<()> {
    let mut encoder = TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let data: Vec<u32> = grid.iter().collect();
    encoder
        .write_image::<Gray32>(grid.cols() as u32, grid.rows() as u32, &data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::colortype::{Gray16, Gray32Float, Gray8};

    #[test]
    fn test_tiff_label_roundtrip() {
        let grid = Grid::from_vec(vec![0_u32, 1, 2, 3, 4, 70_000], 2, 3).unwrap();
        let tmp = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
        write_tiff(&grid, tmp.path()).unwrap();

        let field = read_tiff(tmp.path()).unwrap();
        assert_eq!((field.width(), field.height()), (3, 2));
        assert_eq!(field.grid(), &grid);
    }

    #[test]
    fn test_read_gray8() {
        let mut buf = Vec::new();
        TiffEncoder::new(Cursor::new(&mut buf))
            .unwrap()
            .write_image::<Gray8>(2, 2, &[0_u8, 9, 200, 255])
            .unwrap();

        let field = read_tiff_from_buffer(&buf).unwrap();
        assert_eq!(field.elevations().collect::<Vec<_>>(), vec![0, 9, 200, 255]);
    }

    #[test]
    fn test_read_gray16() {
        let mut buf = Vec::new();
        TiffEncoder::new(Cursor::new(&mut buf))
            .unwrap()
            .write_image::<Gray16>(3, 1, &[1_u16, 40_000, 65_535])
            .unwrap();

        let field = read_tiff_from_buffer(&buf).unwrap();
        assert_eq!((field.width(), field.height()), (3, 1));
        assert_eq!(field.elevations().collect::<Vec<_>>(), vec![1, 40_000, 65_535]);
    }

    #[test]
    fn test_read_gray32_float_clamps() {
        let mut buf = Vec::new();
        TiffEncoder::new(Cursor::new(&mut buf))
            .unwrap()
            .write_image::<Gray32Float>(2, 2, &[2.4_f32, 2.6, -5.0, f32::NAN])
            .unwrap();

        let field = read_tiff_from_buffer(&buf).unwrap();
        assert_eq!(field.elevations().collect::<Vec<_>>(), vec![2, 3, 0, 0]);
    }

    #[test]
    fn test_label_buffer_is_gray32() {
        let grid = Grid::from_vec(vec![5_u32, 6], 1, 2).unwrap();
        let buf = write_tiff_to_buffer(&grid).unwrap();

        let mut decoder = Decoder::new(Cursor::new(&buf)).unwrap();
        assert_eq!(decoder.colortype().unwrap(), tiff::ColorType::Gray(32));
        assert!(matches!(decoder.read_image().unwrap(), DecodingResult::U32(ref v) if v == &[5, 6]));
    }

    #[test]
    fn test_read_garbage_fails() {
        assert!(read_tiff_from_buffer(b"not a tiff").is_err());
    }
}
