use derive_more::{AsRef, Deref, Display, From, Into};
use fs_err as fs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ProductId(String);

crate::impl_string_newtype!(ProductId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CategoryId(String);

crate::impl_string_newtype!(CategoryId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ProductName(String);

crate::impl_string_newtype!(ProductName);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BeadKind {
    Crystal,
    Wood,
    Gold,
    Pearl,
}

/// One gradient stop, linear-ish sRGB components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Tint {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Tint {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, a)
    }

    pub fn components(self) -> (f64, f64, f64, f64) {
        (self.r, self.g, self.b, self.a)
    }
}

impl From<[f64; 4]> for Tint {
    fn from([r, g, b, a]: [f64; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<Tint> for [f64; 4] {
    fn from(t: Tint) -> Self {
        [t.r, t.g, t.b, t.a]
    }
}

/// How a bead face is painted: a two-stop radial gradient (highlight sits at
/// roughly 30%/30% of the face) with an optional texture image laid over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeadFinish {
    pub highlight: Tint,
    pub base: Tint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_offset: Option<(f64, f64)>,
}

impl BeadFinish {
    pub const fn gradient(highlight: Tint, base: Tint) -> Self {
        Self {
            highlight,
            base,
            texture: None,
            sprite_offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub label: String,
}

impl Category {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: CategoryId::new(id),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeadProduct {
    pub id: ProductId,
    pub name: ProductName,
    pub price: f64,
    pub size_mm: f64,
    pub kind: BeadKind,
    pub category: CategoryId,
    pub finish: BeadFinish,
}

pub fn categories() -> Vec<Category> {
    vec![
        Category::new("white", "White Crystal"),
        Category::new("purple", "Amethyst"),
        Category::new("yellow", "Citrine"),
        Category::new("pink", "Rose Quartz"),
        Category::new("tea", "Smoky Quartz"),
    ]
}

const AMETHYST_URUGUAY: BeadFinish = BeadFinish::gradient(
    Tint::from_rgb8(168, 85, 247, 0.9),
    Tint::from_rgb8(88, 28, 135, 1.0),
);
const AMETHYST_BRAZIL: BeadFinish = BeadFinish::gradient(
    Tint::from_rgb8(192, 132, 252, 0.8),
    Tint::from_rgb8(107, 33, 168, 1.0),
);
const QUARTZ_CLEAR: BeadFinish = BeadFinish::gradient(
    Tint::from_rgb8(255, 255, 255, 0.9),
    Tint::from_rgb8(209, 213, 219, 1.0),
);
const QUARTZ_MILKY: BeadFinish = BeadFinish::gradient(
    Tint::from_rgb8(255, 255, 255, 1.0),
    Tint::from_rgb8(243, 244, 246, 1.0),
);

fn product(
    id: &str,
    name: &str,
    price: f64,
    size_mm: f64,
    finish: BeadFinish,
    kind: BeadKind,
    category: &str,
) -> BeadProduct {
    BeadProduct {
        id: ProductId::new(id),
        name: ProductName::new(name),
        price,
        size_mm,
        kind,
        category: CategoryId::new(category),
        finish,
    }
}

pub fn builtin_products() -> Vec<BeadProduct> {
    use BeadKind::Crystal;
    vec![
        product("p1", "Uruguay Amethyst", 12.0, 8.0, AMETHYST_URUGUAY, Crystal, "purple"),
        product("p2", "Uruguay Amethyst", 24.0, 10.0, AMETHYST_URUGUAY, Crystal, "purple"),
        product("p3", "Uruguay Amethyst", 37.0, 12.0, AMETHYST_URUGUAY, Crystal, "purple"),
        product("p4", "Brazil Amethyst", 18.0, 8.0, AMETHYST_BRAZIL, Crystal, "purple"),
        product("w1", "Clear Quartz", 3.0, 6.0, QUARTZ_CLEAR, Crystal, "white"),
        product("w2", "Clear Quartz", 5.0, 8.0, QUARTZ_CLEAR, Crystal, "white"),
        product("w3", "Clear Quartz", 10.0, 10.0, QUARTZ_CLEAR, Crystal, "white"),
        product("w4", "Milky Quartz", 4.0, 8.0, QUARTZ_MILKY, Crystal, "white"),
    ]
}

static PRODUCTS: OnceLock<RwLock<Vec<BeadProduct>>> = OnceLock::new();

/// Rescans user product files and rebuilds the cached catalog.
pub fn refresh_cache() {
    let products = assemble_products();
    let lock = PRODUCTS.get_or_init(|| RwLock::new(Vec::new()));
    *lock.write() = products;
}

fn all_products() -> Vec<BeadProduct> {
    let lock = PRODUCTS.get_or_init(|| RwLock::new(assemble_products()));
    lock.read().clone()
}

fn assemble_products() -> Vec<BeadProduct> {
    let mut products = builtin_products();
    products.extend(scan_product_files());
    products
}

fn product_dir() -> Option<PathBuf> {
    crate::data_dir().map(|d| d.join("products"))
}

fn scan_product_files() -> Vec<BeadProduct> {
    let Some(dir) = product_dir() else {
        return Vec::new();
    };
    let Ok(read_dir) = fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut products = Vec::new();
    for entry in read_dir.flatten() {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            match parse_product_file(&path) {
                Some(p) => products.push(p),
                None => log::warn!("Skipping malformed product file {}", path.display()),
            }
        }
    }
    products
}

pub fn parse_product_file(path: &Path) -> Option<BeadProduct> {
    let text = fs::read_to_string(path).ok()?;
    toml::from_str(&text).ok()
}

pub fn products_in(category: &CategoryId) -> Vec<BeadProduct> {
    all_products()
        .into_iter()
        .filter(|p| &p.category == category)
        .collect()
}

pub fn find_product(id: &ProductId) -> Option<BeadProduct> {
    all_products().into_iter().find(|p| &p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_products_reference_known_categories() {
        let ids: Vec<CategoryId> = categories().into_iter().map(|c| c.id).collect();
        for p in builtin_products() {
            assert!(ids.contains(&p.category), "{} has unknown category", p.id);
        }
    }

    #[test]
    fn builtin_product_ids_are_unique() {
        let products = builtin_products();
        for (i, a) in products.iter().enumerate() {
            for b in &products[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn bead_kind_parses_case_insensitively() {
        for (text, expected) in [
            ("crystal", BeadKind::Crystal),
            ("Crystal", BeadKind::Crystal),
            ("CRYSTAL", BeadKind::Crystal),
            ("pearl", BeadKind::Pearl),
            ("Wood", BeadKind::Wood),
        ] {
            assert_eq!(text.parse::<BeadKind>().unwrap(), expected);
        }
    }

    #[test]
    fn product_file_round_trip() {
        let original = builtin_products().remove(0);
        let text = toml::to_string(&original).unwrap();

        let dir = std::env::temp_dir().join(format!("beadstock-catalog-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("p1.toml");
        fs::write(&path, text).unwrap();

        assert_eq!(parse_product_file(&path), Some(original));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parse_rejects_malformed_file() {
        let dir = std::env::temp_dir().join(format!("beadstock-badfile-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        fs::write(&path, "name = [not toml").unwrap();

        assert_eq!(parse_product_file(&path), None);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn tint_serializes_as_component_array() {
        let json = serde_json::to_string(&Tint::new(0.5, 0.25, 1.0, 0.9)).unwrap();
        assert_eq!(json, "[0.5,0.25,1.0,0.9]");
    }
}
