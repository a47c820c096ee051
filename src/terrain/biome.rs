//! Biome catalog and nearest-match climate classification

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::climate::{MAX_RAINFALL, MAX_TEMPERATURE, MIN_RAINFALL, MIN_TEMPERATURE};
use crate::core::{Error, Result};

pub const DEFAULT_COLOR: &str = "red";
pub const DEFAULT_TEMPERATURE: f64 = 60.0;
pub const DEFAULT_RAINFALL: f64 = 100.0;

/// Biome picked before any comparison when present in the catalog.
pub const FALLBACK_BIOME: &str = "forest";

const BUILTIN_CATALOG: &str = include_str!("../../assets/biomes.json");

/// Biome entry as authored in JSON. Missing fields take catalog defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBiome {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Target temperature (fahrenheit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    /// Target rainfall (centimeters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elev: Option<f64>,
}

/// Index of a biome within the catalog it was classified against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u32);

impl BiomeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Biome {
    pub id: String,
    pub color: String,
    pub temperature: f64,
    pub rainfall: f64,
    /// Accepted but not weighted by the classifier.
    pub elevation: Option<f64>,
}

impl Biome {
    fn from_raw(raw: RawBiome) -> Self {
        Self {
            id: raw.id,
            color: raw.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            temperature: raw.temp.unwrap_or(DEFAULT_TEMPERATURE),
            rainfall: raw.rain.unwrap_or(DEFAULT_RAINFALL),
            elevation: raw.elev,
        }
    }

    pub fn to_raw(&self) -> RawBiome {
        RawBiome {
            id: self.id.clone(),
            color: Some(self.color.clone()),
            temp: Some(self.temperature),
            rain: Some(self.rainfall),
            elev: self.elevation,
        }
    }

    /// Normalized L1 distance in (rainfall, temperature) space.
    pub fn distance(&self, temperature: f64, rainfall: f64) -> f64 {
        (self.rainfall - rainfall).abs() / (MAX_RAINFALL - MIN_RAINFALL) +
        (self.temperature - temperature).abs() / (MAX_TEMPERATURE - MIN_TEMPERATURE)
    }

    /// Display color as RGB. Unparseable colors render as red.
    pub fn rgb(&self) -> [u8; 3] {
        parse_color(&self.color).unwrap_or([255, 0, 0])
    }
}

/// Parse `#rgb`, `#rrggbb` or a basic CSS color name.
pub fn parse_color(color: &str) -> Option<[u8; 3]> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some([r * 17, g * 17, b * 17]),
            [r1, r0, g1, g0, b1, b0] => Some([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0]),
            _ => None,
        };
    }

    let rgb = match color.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "brown" => [165, 42, 42],
        "tan" => [210, 180, 140],
        "olive" => [128, 128, 0],
        "teal" => [0, 128, 128],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(rgb)
}

/// Ordered, read-only set of biome definitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BiomeCatalog {
    biomes: Vec<Biome>,
}

impl BiomeCatalog {
    /// Load raw entries, filling defaults. A repeated id replaces the earlier
    /// definition but keeps its position.
    pub fn new(raws: impl IntoIterator<Item = RawBiome>) -> Self {
        let mut biomes: Vec<Biome> = Vec::new();
        for raw in raws {
            let biome = Biome::from_raw(raw);
            match biomes.iter_mut().find(|b| b.id == biome.id) {
                Some(existing) => *existing = biome,
                None => biomes.push(biome),
            }
        }
        Self { biomes }
    }

    /// Parse a JSON array of raw biome entries
    pub fn from_json(json: &str) -> Result<Self> {
        let raws: Vec<RawBiome> = serde_json::from_str(json)?;
        Ok(Self::new(raws))
    }

    /// Load from a JSON file (sync)
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::debug!("Loaded {} biomes from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Catalog bundled with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Serialize back to a JSON array with all defaults filled in.
    pub fn to_json(&self) -> Result<String> {
        let raws: Vec<RawBiome> = self.biomes.iter().map(Biome::to_raw).collect();
        Ok(serde_json::to_string_pretty(&raws)?)
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn get(&self, id: BiomeId) -> Option<&Biome> {
        self.biomes.get(id.index())
    }

    /// Look up a biome id by name
    pub fn find(&self, name: &str) -> Option<BiomeId> {
        self.biomes
            .iter()
            .position(|b| b.id == name)
            .map(|i| BiomeId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &Biome)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, b)| (BiomeId(i as u32), b))
    }

    /// Nearest biome to the given climate. Ties go to the earliest entry.
    ///
    /// `elevation` is accepted for callers that have it; the metric only uses
    /// temperature and rainfall.
    pub fn classify(&self, temperature: f64, rainfall: f64, _elevation: Option<f64>) -> Result<BiomeId> {
        if self.biomes.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut best = f64::INFINITY;
        let mut biome = self.find(FALLBACK_BIOME).unwrap_or(BiomeId(0));

        for (id, b) in self.iter() {
            let val = b.distance(temperature, rainfall);
            if val < best {
                biome = id;
                best = val;
            }
        }

        Ok(biome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, temp: f64, rain: f64) -> RawBiome {
        RawBiome {
            id: id.to_string(),
            temp: Some(temp),
            rain: Some(rain),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_filled() {
        let catalog = BiomeCatalog::from_json(r#"[{ "id": "plain" }]"#).unwrap();
        let biome = catalog.get(BiomeId(0)).unwrap();
        assert_eq!(biome.id, "plain");
        assert_eq!(biome.color, DEFAULT_COLOR);
        assert_eq!(biome.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(biome.rainfall, DEFAULT_RAINFALL);
        assert_eq!(biome.elevation, None);
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let catalog = BiomeCatalog::new(vec![
            raw("a", 0.0, 0.0),
            raw("b", 10.0, 10.0),
            raw("a", 50.0, 50.0),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("a"), Some(BiomeId(0)));
        assert_eq!(catalog.get(BiomeId(0)).unwrap().temperature, 50.0);
    }

    #[test]
    fn test_empty_catalog_errors() {
        let catalog = BiomeCatalog::default();
        assert!(matches!(catalog.classify(50.0, 100.0, None), Err(Error::EmptyCatalog)));
    }

    #[test]
    fn test_single_entry_always_matches() {
        let catalog = BiomeCatalog::new(vec![raw("only", 0.0, 0.0)]);
        for (t, r) in [(-20.0, 0.0), (100.0, 1500.0), (40.0, 700.0)] {
            assert_eq!(catalog.classify(t, r, None).unwrap(), BiomeId(0));
        }
    }

    #[test]
    fn test_nearest_match() {
        let catalog = BiomeCatalog::new(vec![
            raw("cold", -10.0, 100.0),
            raw("hot_dry", 90.0, 10.0),
            raw("hot_wet", 90.0, 1400.0),
        ]);
        assert_eq!(catalog.classify(-5.0, 150.0, None).unwrap(), BiomeId(0));
        assert_eq!(catalog.classify(95.0, 0.0, None).unwrap(), BiomeId(1));
        assert_eq!(catalog.classify(80.0, 1200.0, Some(0.5)).unwrap(), BiomeId(2));

        // brute-force agreement with the metric
        for t in [-20.0, 0.0, 35.0, 70.0, 100.0] {
            for r in [0.0, 300.0, 750.0, 1500.0] {
                let id = catalog.classify(t, r, None).unwrap();
                let d = catalog.get(id).unwrap().distance(t, r);
                for (_, b) in catalog.iter() {
                    assert!(d <= b.distance(t, r));
                }
            }
        }
    }

    #[test]
    fn test_ties_prefer_first() {
        let catalog = BiomeCatalog::new(vec![
            raw("left", 40.0, 100.0),
            raw("right", 60.0, 100.0),
        ]);
        assert_eq!(catalog.classify(50.0, 100.0, None).unwrap(), BiomeId(0));
    }

    #[test]
    fn test_elevation_not_weighted() {
        let catalog = BiomeCatalog::from_json(
            r#"[{ "id": "low", "temp": 50, "rain": 100, "elev": 0.0 },
                { "id": "high", "temp": 51, "rain": 100, "elev": 1.0 }]"#,
        ).unwrap();
        assert_eq!(catalog.classify(50.0, 100.0, Some(1.0)).unwrap(), BiomeId(0));
    }

    #[test]
    fn test_fallback_used_for_nan() {
        let catalog = BiomeCatalog::new(vec![raw("desert", 90.0, 10.0), raw("forest", 55.0, 450.0)]);
        assert_eq!(catalog.classify(f64::NAN, 100.0, None).unwrap(), BiomeId(1));

        let no_forest = BiomeCatalog::new(vec![raw("desert", 90.0, 10.0), raw("swamp", 70.0, 900.0)]);
        assert_eq!(no_forest.classify(f64::NAN, f64::NAN, None).unwrap(), BiomeId(0));
    }

    #[test]
    fn test_json_export_import() {
        let catalog = BiomeCatalog::from_json(r#"[{ "id": "a", "elev": 0.25 }, { "id": "b", "color": "blue" }]"#).unwrap();
        let json = catalog.to_json().unwrap();
        let reloaded = BiomeCatalog::from_json(&json).unwrap();
        assert_eq!(catalog, reloaded);
        assert!(json.contains("\"temp\": 60.0"));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(BiomeCatalog::from_json("{ not json"), Err(Error::Parse(_))));
        assert!(BiomeCatalog::from_json(r#"[{ "color": "red" }]"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biomes.json");
        std::fs::write(&path, r#"[{ "id": "x", "temp": 1 }, { "id": "y" }]"#).unwrap();

        let catalog = BiomeCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("y"), Some(BiomeId(1)));

        let missing = BiomeCatalog::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = BiomeCatalog::builtin().unwrap();
        assert!(catalog.len() >= 8);
        assert_eq!(catalog.find(FALLBACK_BIOME), Some(BiomeId(0)));
        for (_, b) in catalog.iter() {
            assert!(parse_color(&b.color).is_some(), "bad color for {}", b.id);
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_color("#3a7d2c"), Some([0x3a, 0x7d, 0x2c]));
        assert_eq!(parse_color("Red"), Some([255, 0, 0]));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
        assert_eq!(parse_color("chartreuse"), None);

        let biome = Biome::from_raw(RawBiome { id: "x".into(), color: Some("nope".into()), ..Default::default() });
        assert_eq!(biome.rgb(), [255, 0, 0]);
    }
}
