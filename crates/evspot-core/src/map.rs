//! Map widget description.
//!
//! The page shows one map centered on a fixed point with an OpenStreetMap
//! tile layer and a single marker. This module holds that view as data and
//! the slippy-map maths needed to resolve tiles for it; drawing is left to
//! whatever front end embeds it.

use serde::Serialize;

/// Element the map is mounted in
pub const MAP_CONTAINER: &str = "map-container";

/// San Francisco
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 37.7749,
    lng: -122.4194,
};

pub const DEFAULT_ZOOM: u8 = 13;

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
pub const OSM_MAX_ZOOM: u8 = 19;
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap";

pub const DEFAULT_MARKER_POPUP: &str = "EV Charging Station";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub max_zoom: u8,
    pub attribution: String,
}

impl TileLayer {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: OSM_TILE_URL.to_string(),
            subdomains: OSM_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            max_zoom: OSM_MAX_ZOOM,
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }

    /// URL of one tile. The subdomain rotates with the tile position so
    /// neighbouring tiles spread across hosts.
    pub fn tile_url(&self, tile: TileCoord) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let index = (tile.x as usize + tile.y as usize) % self.subdomains.len();
            self.subdomains[index].as_str()
        };

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub popup: Option<String>,
    pub popup_open: bool,
}

/// A map view: center, zoom, one tile layer and its markers
#[derive(Debug, Clone, Serialize)]
pub struct MapWidget {
    pub container: String,
    pub center: LatLng,
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub markers: Vec<Marker>,
}

impl MapWidget {
    /// The page's map: default center and zoom, OSM tiles, one station
    /// marker with its popup open.
    pub fn init() -> Self {
        let mut map = Self {
            container: MAP_CONTAINER.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_layer: TileLayer::openstreetmap(),
            markers: Vec::new(),
        };
        map.add_marker(DEFAULT_CENTER, Some(DEFAULT_MARKER_POPUP.to_string()), true);
        map
    }

    pub fn add_marker(&mut self, position: LatLng, popup: Option<String>, popup_open: bool) {
        self.markers.push(Marker {
            position,
            popup,
            popup_open,
        });
    }

    /// Move the view. Zoom is clamped to what the tile layer serves.
    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.center = center;
        self.zoom = zoom.min(self.tile_layer.max_zoom);
    }

    pub fn center_tile(&self) -> TileCoord {
        tile_for(self.center, self.zoom)
    }

    pub fn center_tile_url(&self) -> String {
        self.tile_layer.tile_url(self.center_tile())
    }
}

/// Slippy-map tile containing `point` at `zoom`
pub fn tile_for(point: LatLng, zoom: u8) -> TileCoord {
    let zoom = zoom.min(OSM_MAX_ZOOM);
    let n = 1_i64 << zoom;
    let x_raw = ((point.lng + 180.0) / 360.0 * (n as f64)).floor() as i64;
    let lat_rad = point.lat.to_radians();
    let y_raw = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * (n as f64))
        .floor() as i64;

    // Wrap longitude, clamp latitude to the Mercator range
    let x = ((x_raw % n) + n) % n;
    let y = y_raw.clamp(0, n - 1);
    TileCoord {
        x: x as u32,
        y: y as u32,
        z: zoom,
    }
}
