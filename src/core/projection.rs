//! Web Mercator transforms between geographic coordinates, projected meters,
//! fractional tile coordinates and scene pixels.
//!
//! Every forward transform has an exact inverse. The tile pair and the scene
//! pair are computed independently (the scene pair does not go through the
//! tile pair), so each pair is tested on its own.

use std::f64::consts::PI;

use crate::core::{
    camera::Camera,
    constants::EARTH_RADIUS,
    geo::{FractionalTile, GeoPoint, Point, ScenePoint},
};

/// Geographic degrees to Web Mercator meters (EPSG:4326 to EPSG:3857)
pub fn geo_to_mercator_meters(pos: GeoPoint) -> Point {
    let x = EARTH_RADIUS * pos.lon * PI / 180.0;
    let y = (PI / 4.0 + pos.lat * PI / 360.0).tan().ln() * EARTH_RADIUS;
    Point::new(x, y)
}

/// Web Mercator meters back to geographic degrees
pub fn mercator_meters_to_geo(point: Point) -> GeoPoint {
    let lon = (point.x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    GeoPoint::new(lon, lat)
}

/// Camera position to fractional tile coordinates at the camera's zoom
pub fn geo_zoom_to_tile(cam: Camera) -> FractionalTile {
    let n = 2_f64.powf(cam.zoom);
    let lat_rad = cam.lat.to_radians();
    FractionalTile::new(
        n * (cam.lon + 180.0) / 360.0,
        n * (1.0 - lat_rad.tan().asinh() / PI) / 2.0,
        cam.zoom,
    )
}

/// Fractional tile coordinates back to a camera position
pub fn tile_to_geo_zoom(tile: FractionalTile) -> Camera {
    let n = 2_f64.powf(tile.zoom);
    let lat_rad = (PI * (1.0 - 2.0 * tile.y / n)).sinh().atan();
    Camera::new(tile.x / n * 360.0 - 180.0, lat_rad.to_degrees(), tile.zoom)
}

/// Camera position to scene pixels for the given tile size
pub fn geo_zoom_to_scene_point(cam: Camera, tile_size: u32) -> ScenePoint {
    let size = map_size(cam.zoom, tile_size);
    ScenePoint::new(
        (cam.lon + 180.0) * size / 360.0,
        (1.0 - (PI / 4.0 + cam.lat.to_radians() / 2.0).tan().ln() / PI) / 2.0 * size,
    )
}

/// Scene pixels back to a camera position at `zoom`
pub fn scene_point_to_geo_zoom(scene_point: ScenePoint, zoom: f64, tile_size: u32) -> Camera {
    let size = map_size(zoom, tile_size);
    let lon = scene_point.x * (360.0 / size) - 180.0;
    let lat = ((1.0 - scene_point.y * (2.0 / size)) * PI).sinh().atan().to_degrees();
    Camera::new(lon, lat, zoom)
}

/// Width (and height) of the whole world in scene pixels at `zoom`
pub fn map_size(zoom: f64, tile_size: u32) -> f64 {
    2_f64.powf(zoom) * tile_size as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEG_TOLERANCE: f64 = 1e-6;

    fn assert_camera_close(a: Camera, b: Camera) {
        assert!((a.lon - b.lon).abs() < DEG_TOLERANCE, "lon {} vs {}", a.lon, b.lon);
        assert!((a.lat - b.lat).abs() < DEG_TOLERANCE, "lat {} vs {}", a.lat, b.lat);
        assert_eq!(a.zoom, b.zoom);
    }

    fn sample_points() -> Vec<GeoPoint> {
        let mut points = Vec::new();
        let mut lat = -84.5;
        while lat < 85.0 {
            let mut lon = -179.5;
            while lon <= 180.0 {
                points.push(GeoPoint::new(lon, lat));
                lon += 37.25;
            }
            lat += 13.0;
        }
        points.push(GeoPoint::new(30.3223, 59.9292));
        points.push(GeoPoint::new(0.0, 0.0));
        points
    }

    #[test]
    fn test_mercator_meters_round_trip() {
        for p in sample_points() {
            let back = mercator_meters_to_geo(geo_to_mercator_meters(p));
            assert!((back.lon - p.lon).abs() < DEG_TOLERANCE);
            assert!((back.lat - p.lat).abs() < DEG_TOLERANCE);
        }
    }

    #[test]
    fn test_mercator_meters_known_values() {
        let origin = geo_to_mercator_meters(GeoPoint::new(0.0, 0.0));
        assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);

        let east = geo_to_mercator_meters(GeoPoint::new(180.0, 0.0));
        assert!((east.x - PI * EARTH_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn test_tile_round_trip_all_zooms() {
        for zoom in 0..=18 {
            for p in sample_points() {
                let cam = Camera::new(p.lon, p.lat, zoom as f64);
                assert_camera_close(tile_to_geo_zoom(geo_zoom_to_tile(cam)), cam);
            }
        }
    }

    #[test]
    fn test_tile_known_values() {
        let tile = geo_zoom_to_tile(Camera::new(0.0, 0.0, 1.0));
        assert!((tile.x - 1.0).abs() < 1e-12);
        assert!((tile.y - 1.0).abs() < 1e-12);

        let corner = tile_to_geo_zoom(FractionalTile::new(0.0, 0.0, 0.0));
        assert!((corner.lon + 180.0).abs() < 1e-12);
        assert!((corner.lat - crate::core::constants::MAX_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn test_scene_point_round_trip_all_zooms() {
        for zoom in 0..=18 {
            for p in sample_points() {
                let cam = Camera::new(p.lon, p.lat, zoom as f64);
                let scene = geo_zoom_to_scene_point(cam, 256);
                assert_camera_close(scene_point_to_geo_zoom(scene, cam.zoom, 256), cam);
            }
        }
    }

    #[test]
    fn test_scene_point_is_scaled_tile_coordinate() {
        let cam = Camera::new(30.3223, 59.9292, 12.0);
        let tile = geo_zoom_to_tile(cam);
        let scene = geo_zoom_to_scene_point(cam, 256);
        assert!((scene.x - tile.x * 256.0).abs() < 1e-6);
        assert!((scene.y - tile.y * 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_scene_point_inverse_from_pixels() {
        let scene = ScenePoint::new(128.0, 128.0);
        let cam = scene_point_to_geo_zoom(scene, 0.0, 256);
        assert!(cam.lon.abs() < 1e-12);
        assert!(cam.lat.abs() < 1e-12);
        assert_eq!(cam.zoom, 0.0);
    }
}
