// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Category tables, category sets and binary mask extraction
//!
//! A segmentation model labels each pixel with an index into its category
//! table. Several indices may share one name, so extraction resolves a set of
//! names through a reverse index and marks every pixel whose label belongs to
//! any of the resolved indices.

use crate::segmentation::LabelMap;
use image::{GrayImage, Luma};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mask value for pixels inside the requested categories
pub const MASK_ON: u8 = 255;

/// Label index -> lowercase category name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    names: FxHashMap<u32, String>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, name: impl AsRef<str>) {
        self.names.insert(id, name.as_ref().to_lowercase());
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Build the name -> indices reverse lookup
    pub fn index(&self) -> CategoryIndex {
        let mut ids_by_name: FxHashMap<String, Vec<u32>> = FxHashMap::default();
        for (id, name) in &self.names {
            ids_by_name.entry(name.clone()).or_default().push(*id);
        }
        CategoryIndex { ids_by_name }
    }

    /// Parse a JSON object of the form `{"0": "wall", "1": "floor"}`
    ///
    /// Keys that are not integers are skipped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: FxHashMap<String, String> = serde_json::from_str(json)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, name)| key.trim().parse::<u32>().ok().map(|id| (id, name)))
            .collect())
    }
}

impl<S: AsRef<str>> FromIterator<(u32, S)> for CategoryTable {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        let mut table = CategoryTable::new();
        for (id, name) in iter {
            table.insert(id, name);
        }
        table
    }
}

/// Reverse index from category name to every label index carrying it
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    ids_by_name: FxHashMap<String, Vec<u32>>,
}

impl CategoryIndex {
    /// Resolve names (case-insensitive) to label indices; unknown names are ignored
    pub fn resolve<'a, I>(&self, names: I) -> FxHashSet<u32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ids = FxHashSet::default();
        for name in names {
            if let Some(found) = self.ids_by_name.get(&name.trim().to_lowercase()) {
                ids.extend(found.iter().copied());
            }
        }
        ids
    }
}

/// Named group of category names treated as one logical region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    pub name: String,
    pub members: Vec<String>,
}

const WALL_NAMES: &[&str] = &["wall"];

const WINDOW_NAMES: &[&str] = &[
    "window",
    "windowpane",
    "glass",
    "sliding door",
    "french door",
    "patio door",
    "balcony door",
    "balcony window",
    "door",
];

const ATTACHED_NAMES: &[&str] = &[
    "curtain", "curtains", "drape", "drapery", "blinds", "shade", "roller blind",
    "venetian blind", "rod", "hanger", "sconce", "lamp", "socket", "switch", "outlet",
    "radiator", "heater", "vent", "air conditioner", "mirror", "painting", "paintings",
    "picture", "pictures", "poster", "posters", "frame", "frames", "clock", "tv", "shelf",
    "shelves", "bookcase", "bookcases", "bookshelf", "bookshelves", "plant", "plants",
    "potted plant",
];

const FLOOR_NAMES: &[&str] = &[
    "floor",
    "floor-wood",
    "floor-marble",
    "floor-tile",
    "floor-stone",
    "floor-mat",
    "floor-other",
    "rug",
    "carpet",
    "mat",
    "carpet tile",
    "floor mat",
];

const CEILING_NAMES: &[&str] = &["ceiling", "ceiling-white", "roof", "ceiling-other"];

impl CategorySet {
    pub fn new<S: AsRef<str>>(name: impl Into<String>, members: &[S]) -> Self {
        Self {
            name: name.into(),
            members: members.iter().map(|m| m.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn wall() -> Self {
        Self::new("wall", WALL_NAMES)
    }

    pub fn window() -> Self {
        Self::new("window", WINDOW_NAMES)
    }

    /// Fixtures and decor mounted on the wall
    pub fn attached() -> Self {
        Self::new("attached", ATTACHED_NAMES)
    }

    pub fn floor() -> Self {
        Self::new("floor", FLOOR_NAMES)
    }

    pub fn ceiling() -> Self {
        Self::new("ceiling", CEILING_NAMES)
    }

    /// Custom set from a comma-separated label list
    pub fn from_label_list(name: impl Into<String>, list: &str) -> Self {
        let members: Vec<&str> = parse_label_list(list);
        Self::new(name, &members)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

/// Split `"wall, window ,,door"` into trimmed, non-empty entries
pub fn parse_label_list(list: &str) -> Vec<&str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Build a binary mask marking pixels whose category is in `set`
///
/// The output always matches the label map dimensions. Names absent from the
/// table contribute nothing, so an unmatched set yields an all-zero mask.
pub fn extract_mask(label_map: &LabelMap, index: &CategoryIndex, set: &CategorySet) -> GrayImage {
    let keep = index.resolve(set.names());
    let (width, height) = label_map.dimensions();

    if keep.is_empty() {
        return GrayImage::new(width, height);
    }

    let data: Vec<u8> = label_map
        .as_raw()
        .iter()
        .map(|label| if keep.contains(label) { MASK_ON } else { 0 })
        .collect();

    // Length always matches width * height
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Extract several sets from one label map in parallel
pub fn extract_masks(label_map: &LabelMap, categories: &CategoryTable, sets: &[CategorySet]) -> Vec<GrayImage> {
    let index = categories.index();
    sets.par_iter()
        .map(|set| extract_mask(label_map, &index, set))
        .collect()
}

/// Wall, window and attached-fixture masks used by the measurement pipeline
#[derive(Debug, Clone)]
pub struct RegionMasks {
    pub wall: GrayImage,
    pub window: GrayImage,
    pub attached: GrayImage,
}

impl RegionMasks {
    pub fn extract(label_map: &LabelMap, categories: &CategoryTable) -> Self {
        let sets = [CategorySet::wall(), CategorySet::window(), CategorySet::attached()];
        let mut masks = extract_masks(label_map, categories, &sets).into_iter();
        let (width, height) = label_map.dimensions();
        let mut next = || masks.next().unwrap_or_else(|| GrayImage::new(width, height));
        Self {
            wall: next(),
            window: next(),
            attached: next(),
        }
    }
}

/// Wall, window, floor and ceiling masks from one segmentation
#[derive(Debug, Clone)]
pub struct SurfaceMasks {
    pub wall: GrayImage,
    pub window: GrayImage,
    pub floor: GrayImage,
    pub ceiling: GrayImage,
}

/// Extract every surface mask a room visualizer needs in one pass
pub fn extract_surface_masks(label_map: &LabelMap, categories: &CategoryTable) -> SurfaceMasks {
    let sets = [
        CategorySet::wall(),
        CategorySet::window(),
        CategorySet::floor(),
        CategorySet::ceiling(),
    ];
    let mut masks = extract_masks(label_map, categories, &sets).into_iter();
    let (width, height) = label_map.dimensions();
    let mut next = || masks.next().unwrap_or_else(|| GrayImage::new(width, height));
    SurfaceMasks {
        wall: next(),
        window: next(),
        floor: next(),
        ceiling: next(),
    }
}

/// Which mask a single-mask export returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskSelection {
    Wall,
    Window,
    Attached,
    #[default]
    Combined,
}

impl FromStr for MaskSelection {
    type Err = std::convert::Infallible;

    /// Unknown values select the combined mask
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "wall" => MaskSelection::Wall,
            "window" => MaskSelection::Window,
            "attached" => MaskSelection::Attached,
            _ => MaskSelection::Combined,
        })
    }
}

/// Export one mask, optionally overriding the selected set with custom labels
///
/// Custom labels only apply to a single-category selection; the combined
/// mask is always the union of the built-in wall, window and attached sets.
pub fn extract_selected_mask(
    label_map: &LabelMap,
    categories: &CategoryTable,
    selection: MaskSelection,
    custom_labels: Option<&str>,
) -> GrayImage {
    let custom = custom_labels
        .filter(|list| !parse_label_list(list).is_empty())
        .map(|list| CategorySet::from_label_list("custom", list));
    let index = categories.index();

    match selection {
        MaskSelection::Wall => extract_mask(label_map, &index, &custom.unwrap_or_else(CategorySet::wall)),
        MaskSelection::Window => {
            extract_mask(label_map, &index, &custom.unwrap_or_else(CategorySet::window))
        }
        MaskSelection::Attached => {
            extract_mask(label_map, &index, &custom.unwrap_or_else(CategorySet::attached))
        }
        MaskSelection::Combined => {
            let masks = RegionMasks::extract(label_map, categories);
            crate::region::union_masks(&[&masks.wall, &masks.window, &masks.attached])
        }
    }
}

/// Count of set pixels
pub fn mask_area(mask: &GrayImage) -> usize {
    mask.pixels().filter(|Luma([v])| *v > 0).count()
}
