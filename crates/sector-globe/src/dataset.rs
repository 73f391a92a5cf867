//! The hierarchical dataset shown on the globe.
//!
//! A dataset is exactly five sectors, one per 72° longitude band. Each sector
//! lists the industries that split its latitude range; sub-items are not
//! stored but generated as a fixed three-way split of an industry.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DatasetError, Result};

/// Number of sectors on the globe.
pub const SECTOR_COUNT: usize = 5;
/// Number of sub-items an industry is split into.
pub const SUB_ITEM_COUNT: usize = 3;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    #[must_use]
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().strip_prefix('#').unwrap_or(text.trim());
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_u32)
    }

    /// Blend toward `other` by `t` in `[0, 1]`, per channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// An industry band within a sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Industry {
    pub name: String,
    pub sector_key: String,
}

/// One of the three generated subdivisions of an industry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubItem {
    pub name: String,
    pub industry: String,
}

/// A top-level sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
    pub key: String,
    pub name: String,
    pub color: Rgb,
    industries: Vec<Industry>,
}

impl Sector {
    /// Create a sector. Blank industry names are dropped.
    pub fn new<I, S>(key: impl Into<String>, name: impl Into<String>, color: Rgb, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let industries = industries
            .into_iter()
            .map(Into::into)
            .filter_map(|name: String| {
                let trimmed = name.trim();
                (!trimmed.is_empty()).then(|| Industry {
                    name: trimmed.to_owned(),
                    sector_key: key.clone(),
                })
            })
            .collect();
        Self {
            key,
            name: name.into(),
            color,
            industries,
        }
    }

    /// The sector's industries, north to south.
    #[must_use]
    pub fn industries(&self) -> &[Industry] {
        &self.industries
    }

    /// Industry by band index.
    #[must_use]
    pub fn industry(&self, index: usize) -> Option<&Industry> {
        self.industries.get(index)
    }
}

/// A validated dataset of exactly five sectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    sectors: Vec<Sector>,
}

impl Dataset {
    /// Validate and wrap a list of sectors.
    ///
    /// # Errors
    ///
    /// Returns an error unless there are exactly five sectors, each with a
    /// non-blank key and name, and no two sharing a key.
    pub fn new(sectors: Vec<Sector>) -> Result<Self> {
        if sectors.len() != SECTOR_COUNT {
            return Err(DatasetError::SectorCount {
                actual: sectors.len(),
            });
        }
        let mut seen = HashSet::new();
        for (index, sector) in sectors.iter().enumerate() {
            if sector.key.trim().is_empty() {
                return Err(DatasetError::MissingField {
                    sector: index,
                    field: "key",
                });
            }
            if sector.name.trim().is_empty() {
                return Err(DatasetError::MissingField {
                    sector: index,
                    field: "name",
                });
            }
            if !seen.insert(sector.key.as_str()) {
                return Err(DatasetError::DuplicateKey {
                    key: sector.key.clone(),
                });
            }
        }
        Ok(Self { sectors })
    }

    /// The dataset compiled into the crate.
    #[must_use]
    pub fn builtin() -> Self {
        let sectors = vec![
            Sector::new(
                "agri",
                "農業",
                Rgb::from_u32(0xdbeaf0),
                ["農作物與畜牧", "林業與木材", "漁業與水產", "食品初級加工", "農機服務"],
            ),
            Sector::new(
                "ind",
                "工業",
                Rgb::from_u32(0xdfedf3),
                ["砂石產品", "食品飲料及菸草製造業", "化學材料與製品", "金屬製品", "機械與設備"],
            ),
            Sector::new(
                "trans",
                "運輸",
                Rgb::from_u32(0xe3f0f5),
                ["公路運輸", "鐵路運輸", "海運與港務", "航空運輸", "倉儲與物流"],
            ),
            Sector::new(
                "service",
                "服務",
                Rgb::from_u32(0xe7f3f7),
                ["批發零售", "餐飲旅宿", "資訊與通訊", "金融保險", "教育與醫療"],
            ),
            Sector::new(
                "res",
                "住宅",
                Rgb::from_u32(0xebf6f9),
                ["住宅用電", "住宅燃氣", "住宅熱能", "家用再生能源"],
            ),
        ];
        Self { sectors }
    }

    /// Parse a dataset from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the expected shape or the
    /// resulting dataset fails validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDataset = serde_json::from_str(json)?;
        let mut sectors = Vec::with_capacity(raw.sectors.len());
        for (index, raw) in raw.sectors.into_iter().enumerate() {
            let key = required(raw.key, index, "key")?;
            let name = required(raw.name, index, "name")?;
            let color_text = required(raw.color, index, "color")?;
            let color = Rgb::parse_hex(&color_text).ok_or(DatasetError::InvalidColor {
                sector: index,
                value: color_text,
            })?;
            sectors.push(Sector::new(key, name, color, raw.industries));
        }
        let dataset = Self::new(sectors)?;
        tracing::debug!(
            "Parsed dataset with {} industries",
            dataset.sectors.iter().map(|s| s.industries.len()).sum::<usize>()
        );
        Ok(dataset)
    }

    /// Load a dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid dataset.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    #[must_use]
    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    /// Find a sector by key or display name.
    #[must_use]
    pub fn find_sector(&self, key_or_name: &str) -> Option<usize> {
        let needle = key_or_name.trim();
        self.sectors
            .iter()
            .position(|s| s.key == needle || s.name == needle)
    }

    /// The generated sub-items of an industry.
    #[must_use]
    pub fn sub_items(&self, sector: usize, industry: usize) -> Option<[SubItem; SUB_ITEM_COUNT]> {
        let industry = self.sector(sector)?.industry(industry)?;
        Some(std::array::from_fn(|m| SubItem {
            name: sub_item_name(&industry.name, m),
            industry: industry.name.clone(),
        }))
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Display name of the `index`th sub-item of an industry.
#[must_use]
pub fn sub_item_name(industry: &str, index: usize) -> String {
    format!("{industry} {}", index + 1)
}

#[derive(Deserialize)]
struct RawDataset {
    sectors: Vec<RawSector>,
}

#[derive(Deserialize)]
struct RawSector {
    key: Option<String>,
    name: Option<String>,
    color: Option<String>,
    #[serde(default)]
    industries: Vec<String>,
}

fn required(value: Option<String>, sector: usize, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(DatasetError::MissingField { sector, field }),
    }
}
