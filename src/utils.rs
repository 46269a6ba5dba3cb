use wasm_bindgen::prelude::*;

use crate::types::GeoPoint;

#[wasm_bindgen]
pub fn format_area(square_meters: f64) -> String {
    if square_meters >= 10_000.0 {
        format!("{:.2} ha", square_meters / 10_000.0)
    } else {
        format!("{:.1} m²", square_meters)
    }
}

#[wasm_bindgen]
pub fn format_lat_lon(latitude_deg: f64, longitude_deg: f64) -> String {
    let ns = if latitude_deg < 0.0 { 'S' } else { 'N' };
    let ew = if longitude_deg < 0.0 { 'W' } else { 'E' };
    format!("{:.8}°{} {:.8}°{}", latitude_deg.abs(), ns, longitude_deg.abs(), ew)
}

pub fn format_coordinate(point: GeoPoint) -> String {
    format_lat_lon(point.latitude_deg, point.longitude_deg)
}
