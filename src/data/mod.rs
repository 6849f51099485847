mod details;

pub use details::{AvailabilityZone, LocalZone, LookupTables, Partition, RegionDetails};

use std::fs;
use std::path::{Path, PathBuf};

use geojson::{GeoJson, Geometry, Value};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::globe::land::{LandFeature, LandGeometry, Ring};

/// A named point of interest shown as a marker on the globe
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Region {
    pub name: String,
    /// Unique, stable identifier
    pub code: String,
    #[serde(default)]
    pub city: String,
    /// ISO 3166 alpha-2, or empty
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    /// `"Label: value"` lines
    #[serde(default)]
    pub info: Vec<String>,
}

impl Region {
    /// Value of an `info` line by label, e.g. `info_value("Partition")`
    pub fn info_value(&self, label: &str) -> Option<&str> {
        self.info.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.trim() == label).then(|| value.trim())
        })
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },
    #[error("invalid GeoJSON in {}: {source}", path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },
    #[error("no land features in {}", .0.display())]
    NoLandFeatures(PathBuf),
}

fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize a JSON file with simd-json's serde bridge
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let mut bytes = read(path)?;
    simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the region list
pub fn load_regions(path: &Path) -> Result<Vec<Region>, LoadError> {
    let regions: Vec<Region> = read_json(path)?;
    info!(count = regions.len(), path = %path.display(), "loaded regions");
    Ok(regions)
}

/// Load land polygons from a GeoJSON file
pub fn load_land(path: &Path) -> Result<Vec<LandFeature>, LoadError> {
    let bytes = read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let geojson: GeoJson = text.parse().map_err(|source| LoadError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    let features = parse_land(&geojson);
    if features.is_empty() {
        return Err(LoadError::NoLandFeatures(path.to_path_buf()));
    }

    info!(count = features.len(), path = %path.display(), "loaded land features");
    Ok(features)
}

/// Extract land features from parsed GeoJSON
pub fn parse_land(geojson: &GeoJson) -> Vec<LandFeature> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .filter_map(|feature| {
                let geometry = feature.geometry.as_ref()?;
                let class = feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get("featurecla"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                Some(LandFeature { geometry: land_geometry(geometry), class })
            })
            .collect(),
        GeoJson::Feature(f) => f
            .geometry
            .as_ref()
            .map(|g| vec![LandFeature::new(land_geometry(g))])
            .unwrap_or_default(),
        GeoJson::Geometry(geometry) => vec![LandFeature::new(land_geometry(geometry))],
    }
}

fn to_ring(positions: &[Vec<f64>]) -> Ring {
    positions
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn land_geometry(geometry: &Geometry) -> LandGeometry {
    match &geometry.value {
        Value::Polygon(rings) => LandGeometry::Polygon(rings.iter().map(|r| to_ring(r)).collect()),
        Value::MultiPolygon(polygons) => LandGeometry::MultiPolygon(
            polygons
                .iter()
                .map(|rings| rings.iter().map(|r| to_ring(r)).collect())
                .collect(),
        ),
        _ => {
            debug!("skipping non-polygon land geometry");
            LandGeometry::Unsupported
        }
    }
}

/// Flag emoji for a two-letter country code, built from regional indicator symbols
pub fn flag_glyph(country: &str) -> Option<String> {
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    country
        .to_ascii_uppercase()
        .chars()
        .map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

/// Everything read from disk at start-up
pub struct DataSet {
    /// Land polygons, or why they could not be loaded
    pub land: Result<Vec<LandFeature>, LoadError>,
    pub regions: Vec<Region>,
    pub tables: LookupTables,
}

/// Load land, regions, and lookup tables. Only the land result is kept as an
/// error; regions and tables degrade to empty with a warning.
pub fn load_all(land_path: &Path, regions_path: &Path, data_dir: &Path) -> DataSet {
    let land = load_land(land_path);
    if let Err(e) = &land {
        warn!(error = %e, "land data unavailable, rendering ocean only");
    }

    let regions = load_regions(regions_path).unwrap_or_else(|e| {
        warn!(error = %e, "region list unavailable");
        Vec::new()
    });

    DataSet {
        land,
        regions,
        tables: LookupTables::load(data_dir),
    }
}
