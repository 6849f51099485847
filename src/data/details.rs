use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::{read_json, Region};

pub const AVAILABILITY_ZONES_FILE: &str = "availability-zones.json";
pub const LOCAL_ZONES_FILE: &str = "local-zones.json";
pub const PARTITIONS_FILE: &str = "partitions.json";
pub const REGION_CODE_MAPPING_FILE: &str = "region-code-mapping.json";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AvailabilityZone {
    #[serde(rename = "Availability Zone Name")]
    pub name: String,
    #[serde(rename = "Parent Region")]
    pub parent_region: String,
    #[serde(rename = "Availability Zone ID")]
    pub id: String,
    #[serde(rename = "Build Order")]
    pub build_order: u32,
    #[serde(rename = "Parent Region Status")]
    pub parent_region_status: String,
    #[serde(rename = "Data Centers")]
    pub data_centers: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocalZone {
    #[serde(rename = "Titan Name")]
    pub titan_name: String,
    #[serde(rename = "Titan Id")]
    pub titan_id: String,
    #[serde(rename = "External Name")]
    pub external_name: String,
    #[serde(rename = "Parent Dimension")]
    pub parent_dimension: String,
    #[serde(rename = "Group Name")]
    pub group_name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Launch Date (UTC)")]
    pub launch_date: String,
    #[serde(rename = "Region Code")]
    pub region_code: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Partition {
    #[serde(rename = "Partition Name")]
    pub name: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Public DNS Suffix")]
    pub dns_suffix: String,
    #[serde(rename = "Regions")]
    pub regions: String,
    #[serde(rename = "Website Domain")]
    pub website_domain: String,
}

/// Reference tables joined against a region when its details are shown
#[derive(Clone, Debug, Default)]
pub struct LookupTables {
    pub availability_zones: Vec<AvailabilityZone>,
    pub local_zones: Vec<LocalZone>,
    pub partitions: Vec<Partition>,
    /// Region code to the code availability zones name as their parent
    pub region_code_mapping: HashMap<String, String>,
}

impl LookupTables {
    /// Read every table from `dir`. A missing or malformed table is logged
    /// and left empty.
    pub fn load(dir: &Path) -> Self {
        let tables = Self {
            availability_zones: load_table(dir, AVAILABILITY_ZONES_FILE),
            local_zones: load_table(dir, LOCAL_ZONES_FILE),
            partitions: load_table(dir, PARTITIONS_FILE),
            region_code_mapping: load_table(dir, REGION_CODE_MAPPING_FILE),
        };
        info!(
            availability_zones = tables.availability_zones.len(),
            local_zones = tables.local_zones.len(),
            partitions = tables.partitions.len(),
            "loaded lookup tables"
        );
        tables
    }
}

fn load_table<T: serde::de::DeserializeOwned + Default>(dir: &Path, file: &str) -> T {
    read_json(&dir.join(file)).unwrap_or_else(|e| {
        warn!(error = %e, "lookup table unavailable");
        T::default()
    })
}

/// Everything known about one region
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionDetails {
    pub availability_zones: Vec<AvailabilityZone>,
    pub local_zones: Vec<LocalZone>,
    pub partition: Option<Partition>,
}

impl RegionDetails {
    pub fn resolve(region: &Region, tables: &LookupTables) -> Self {
        let availability_zones = match tables.region_code_mapping.get(&region.code) {
            Some(parent) => tables
                .availability_zones
                .iter()
                .filter(|az| &az.parent_region == parent)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let local_zones = tables
            .local_zones
            .iter()
            .filter(|lz| lz.region_code == region.code)
            .cloned()
            .collect();

        let partition = region.info_value("Partition").and_then(|name| {
            tables.partitions.iter().find(|p| p.name == name).cloned()
        });

        Self {
            availability_zones,
            local_zones,
            partition,
        }
    }
}
