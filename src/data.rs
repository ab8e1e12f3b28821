use crate::catalog::Brand;
use crate::config::AppConfig;
use crate::metrics::{FactsTable, RegionFacts};
use crate::types::{LocationPoint, Region};
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Trim};
use geo::MultiPolygon;
use geojson::{Feature, GeoJson, Value};
use shapefile::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

pub struct Datasets {
    pub regions: Vec<Region>,
    pub points: Vec<LocationPoint>,
    pub facts: FactsTable,
}

pub fn load_data(config: &AppConfig) -> Result<Datasets> {
    info!("Loading data...");

    let regions = load_regions(&config.input.regions, &config.input.region_name_property)?;
    info!("Loaded geometry for {} regions", regions.len());

    let mut points = Vec::new();
    for (brand_name, path) in &config.input.brands {
        let brand: Brand = brand_name
            .parse()
            .with_context(|| format!("Invalid brand in config: {}", brand_name))?;
        // A broken brand file leaves that brand empty; the rest still load.
        match load_brand_points(brand, path) {
            Ok(mut loaded) => {
                info!("Loaded {} {} locations", loaded.len(), brand);
                points.append(&mut loaded);
            }
            Err(e) => warn!("Skipping {} locations: {:#}", brand, e),
        }
    }

    let facts = match &config.input.facts_csv {
        Some(path) => load_facts_csv(path)?,
        None => FactsTable::uk_itl1(),
    };

    Ok(Datasets {
        regions,
        points,
        facts,
    })
}

pub fn load_regions(path: &Path, name_property: &str) -> Result<Vec<Region>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Region file has no extension"))?;

    match extension.as_str() {
        "shp" => load_shapefile_regions(path, name_property),
        "json" | "geojson" => load_geojson_regions(path, name_property),
        _ => Err(anyhow!("Unsupported geometry format: {}", extension)),
    }
}

fn read_feature_collection(path: &Path) -> Result<Vec<Feature>> {
    let file = File::open(path).with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let reader = BufReader::new(file);
    let geojson = GeoJson::from_reader(reader)
        .with_context(|| format!("Failed to parse GeoJSON: {:?}", path))?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        _ => Err(anyhow!("GeoJSON must be a FeatureCollection: {:?}", path)),
    }
}

fn feature_name(feature: &Feature, name_property: &str) -> String {
    let named = feature
        .properties
        .as_ref()
        .and_then(|props| props.get(name_property));

    match named {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => match &feature.id {
            Some(geojson::feature::Id::String(s)) => format!("Region {}", s),
            Some(geojson::feature::Id::Number(n)) => format!("Region {}", n),
            None => "Region unknown".to_string(),
        },
    }
}

fn load_geojson_regions(path: &Path, name_property: &str) -> Result<Vec<Region>> {
    info!("Loading GeoJSON regions from {:?}...", path);
    let mut regions = Vec::new();

    for feature in read_feature_collection(path)? {
        let name = feature_name(&feature, name_property);

        let Some(geometry) = feature.geometry else {
            continue;
        };
        let geometry: MultiPolygon<f64> = match geometry.value {
            Value::Polygon(_) | Value::MultiPolygon(_) => {
                let geo_geom: geo::Geometry<f64> = geometry
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geometry of {}: {:?}", name, e))?;
                match geo_geom {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue,
                }
            }
            _ => continue, // Skip points/lines
        };

        regions.push(Region { name, geometry });
    }

    Ok(regions)
}

fn load_shapefile_regions(path: &Path, name_property: &str) -> Result<Vec<Region>> {
    info!("Loading shapefile regions from {:?}...", path);
    let mut reader =
        Reader::from_path(path).with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut regions = Vec::new();

    for (i, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;

        let name = match record.get(name_property) {
            Some(shapefile::dbase::FieldValue::Character(Some(s))) if !s.trim().is_empty() => {
                s.trim().to_string()
            }
            _ => format!("Region {}", i),
        };

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            _ => continue, // Skip non-polygon shapes
        };

        regions.push(Region { name, geometry });
    }

    Ok(regions)
}

/// Reads one brand's Point features. Malformed records are skipped and
/// reported once per file.
pub fn load_brand_points(brand: Brand, path: &Path) -> Result<Vec<LocationPoint>> {
    let features = read_feature_collection(path)?;
    let mut points = Vec::with_capacity(features.len());
    let mut skipped = 0usize;

    for feature in features {
        let coords = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(coords)) if coords.len() >= 2 => coords,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let (lng, lat) = (coords[0], coords[1]);
        if !lng.is_finite() || !lat.is_finite() {
            skipped += 1;
            continue;
        }

        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown");

        points.push(LocationPoint::new(brand, lat, lng, name));
    }

    if skipped > 0 {
        warn!("Skipped {} malformed {} records in {:?}", skipped, brand, path);
    }
    Ok(points)
}

pub fn load_facts_csv(path: &Path) -> Result<FactsTable> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: RegionFacts = result.with_context(|| format!("Invalid row in {:?}", path))?;
        rows.push(row);
    }
    info!("Loaded facts for {} regions", rows.len());
    Ok(FactsTable::new(rows))
}
