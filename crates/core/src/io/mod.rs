//! I/O for rasters, point files and vector layers
//!
//! - GeoTIFF via the `tiff` crate (bands as f64/f32, masks as u8)
//! - Line-oriented point files (`x,y,weight` raw, `x,y` averaged)
//! - GeoJSON region polygons in, point/polyline feature collections out

mod geojson_io;
mod geotiff;
mod point_file;

pub use geojson_io::{
    read_regions, read_regions_from_str, to_geojson, write_feature_collection,
};
pub use geotiff::{
    read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer,
    write_mask_geotiff, GeoTiffOptions,
};
pub use point_file::{
    read_averaged_points, read_raw_points, write_averaged_points, write_raw_points,
};
