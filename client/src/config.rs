use geobox_shared::{DrawerConfig, GeoPoint, MinimumSize};

pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(51.505, -0.09);
pub const DEFAULT_ZOOM: f64 = 10.0;

/// Page settings taken from the query string, e.g.
/// `?debug=1&lat=40.7128&lng=-74.006&zoom=11&min_span=0.002`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub debug: bool,
    pub center: GeoPoint,
    pub zoom: f64,
    pub drawer: DrawerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            debug: false,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            drawer: DrawerConfig::default(),
        }
    }
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|value| value.is_finite())
}

impl ClientConfig {
    pub fn from_query(search: &str) -> Self {
        let mut config = Self::default();
        let mut lat = None;
        let mut lng = None;
        for pair in search.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "debug" | "log" => config.debug = matches!(value, "1" | "true"),
                "lat" => lat = parse_finite(value).filter(|lat| lat.abs() <= 90.0),
                "lng" => lng = parse_finite(value).filter(|lng| lng.abs() <= 180.0),
                "zoom" => {
                    if let Some(zoom) = parse_finite(value) {
                        config.zoom = zoom;
                    }
                }
                "min_span" => {
                    if let Some(span) = parse_finite(value).filter(|span| *span > 0.0) {
                        config.drawer.minimum_size = MinimumSize::Degrees(span);
                    }
                }
                _ => {}
            }
        }
        if let (Some(lat), Some(lng)) = (lat, lng) {
            config.center = GeoPoint::new(lat, lng);
        }
        config
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
