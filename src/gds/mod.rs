// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! GDSII structure tree
//!
//! [StructTree] is the single accumulator every layout composer writes into:
//! an ordered, name-addressable set of [gds21::GdsStruct] cells. Encoding
//! and decoding of the stream format is left to [gds21]; cells read from a
//! file keep every element kind it models (array references, boxes, nodes
//! and text included).

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};

pub use gds21::{
    GdsArrayRef, GdsBoundary, GdsBox, GdsElement, GdsError, GdsLibrary, GdsNode, GdsPath,
    GdsPoint, GdsStrans, GdsStruct, GdsStructRef, GdsTextElem, GdsUnits,
};

use crate::error::{ChipError, ChipResult};
use crate::units::{GDS_DB_UNIT, GDS_USER_UNIT};

/// Instance of structure `name` at `(x, y)`
pub fn sref(name: impl Into<String>, x: i32, y: i32) -> GdsElement {
    GdsStructRef {
        name: name.into(),
        xy: GdsPoint::new(x, y),
        ..Default::default()
    }
    .into()
}

/// Axis-aligned rectangle spanning two corners, as a closed polygon
pub fn rect(layer: i16, x0: i32, y0: i32, x1: i32, y1: i32) -> GdsElement {
    GdsBoundary {
        layer,
        datatype: 0,
        xy: GdsPoint::vec(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        ..Default::default()
    }
    .into()
}

pub fn path(layer: i16, width: i32, xy: Vec<GdsPoint>) -> GdsElement {
    GdsPath {
        layer,
        datatype: 0,
        xy,
        width: Some(width),
        ..Default::default()
    }
    .into()
}

/// Structure references of `strukt`, in element order
pub fn struct_refs(strukt: &GdsStruct) -> impl Iterator<Item = &GdsStructRef> {
    strukt.elems.iter().filter_map(|elem| match elem {
        GdsElement::GdsStructRef(r) => Some(r),
        _ => None,
    })
}

pub fn paths(strukt: &GdsStruct) -> impl Iterator<Item = &GdsPath> {
    strukt.elems.iter().filter_map(|elem| match elem {
        GdsElement::GdsPath(p) => Some(p),
        _ => None,
    })
}

pub fn boundaries(strukt: &GdsStruct) -> impl Iterator<Item = &GdsBoundary> {
    strukt.elems.iter().filter_map(|elem| match elem {
        GdsElement::GdsBoundary(b) => Some(b),
        _ => None,
    })
}

/// Box around the structure's own boundary polygons. Referenced structures
/// are not visited. `None` when there are no boundaries.
pub fn boundary_box(strukt: &GdsStruct) -> Option<BoundBox> {
    let mut bbox = BoundBox::empty();
    for pt in boundaries(strukt).flat_map(|b| b.xy.iter()) {
        bbox.include(pt);
    }
    if bbox.is_empty() {
        None
    } else {
        Some(bbox)
    }
}

/// Axis-aligned box in database units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundBox {
    xmin: i32,
    ymin: i32,
    xmax: i32,
    ymax: i32,
}

impl BoundBox {
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin: xmin.min(xmax),
            ymin: ymin.min(ymax),
            xmax: xmin.max(xmax),
            ymax: ymin.max(ymax),
        }
    }

    /// An inverted box that any included point replaces
    fn empty() -> Self {
        Self {
            xmin: i32::MAX,
            ymin: i32::MAX,
            xmax: i32::MIN,
            ymax: i32::MIN,
        }
    }

    fn is_empty(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax
    }

    fn include(&mut self, pt: &GdsPoint) {
        self.xmin = self.xmin.min(pt.x);
        self.ymin = self.ymin.min(pt.y);
        self.xmax = self.xmax.max(pt.x);
        self.ymax = self.ymax.max(pt.y);
    }

    pub fn xmin(&self) -> i32 {
        self.xmin
    }
    pub fn ymin(&self) -> i32 {
        self.ymin
    }
    pub fn xmax(&self) -> i32 {
        self.xmax
    }
    pub fn ymax(&self) -> i32 {
        self.ymax
    }

    /// Each bound mapped through `f`
    pub fn map(&self, f: impl Fn(i32) -> i32) -> Self {
        Self::new(f(self.xmin), f(self.ymin), f(self.xmax), f(self.ymax))
    }

    /// The box moved by `(dx, dy)`
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        self.map_xy(|x| x + dx, |y| y + dy)
    }

    fn map_xy(&self, fx: impl Fn(i32) -> i32, fy: impl Fn(i32) -> i32) -> Self {
        Self::new(fx(self.xmin), fy(self.ymin), fx(self.xmax), fy(self.ymax))
    }
}

/// Ordered, name-addressable collection of structures
#[derive(Debug, Clone, PartialEq)]
pub struct StructTree {
    pub name: String,
    pub units: GdsUnits,
    structs: IndexMap<String, GdsStruct>,
}

impl Default for StructTree {
    fn default() -> Self {
        Self::new("")
    }
}

impl StructTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: GdsUnits::new(GDS_USER_UNIT, GDS_DB_UNIT),
            structs: IndexMap::new(),
        }
    }

    /// Add `strukt`. A struct with an existing name has its elements appended
    /// to the earlier entry; new names keep insertion order.
    pub fn append(&mut self, strukt: GdsStruct) {
        match self.structs.get_mut(&strukt.name) {
            Some(existing) => {
                debug!("Merging into existing structure \"{}\"", strukt.name);
                existing.elems.extend(strukt.elems);
            }
            None => {
                self.structs.insert(strukt.name.clone(), strukt);
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.structs.get_index_of(name)
    }

    pub fn get(&self, name: &str) -> Option<&GdsStruct> {
        self.structs.get(name)
    }

    /// Lookup that treats an absent name as an error
    pub fn require(&self, name: &str) -> ChipResult<&GdsStruct> {
        self.get(name)
            .ok_or_else(|| ChipError::StructureNotFound(name.to_string()))
    }

    pub fn structs(&self) -> impl Iterator<Item = &GdsStruct> {
        self.structs.values()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Bounding box over the direct boundary polygons of structure `name`.
    /// A structure without boundaries yields a zero-area box at the origin.
    pub fn bounding_box(&self, name: &str) -> ChipResult<BoundBox> {
        let strukt = self.require(name)?;
        match boundary_box(strukt) {
            Some(bbox) => Ok(bbox),
            None => {
                warn!("Structure \"{name}\" has no boundaries, using an empty box at the origin");
                Ok(BoundBox::new(0, 0, 0, 0))
            }
        }
    }

    /// Append every structure of a decoded library, in its order
    pub fn extend(&mut self, lib: GdsLibrary) {
        for strukt in lib.structs {
            self.append(strukt);
        }
    }

    /// Stream-format library holding every structure, in insertion order
    pub fn to_library(&self) -> GdsLibrary {
        let mut lib = GdsLibrary::new(self.name.as_str());
        lib.units = self.units.clone();
        lib.structs = self.structs.values().cloned().collect();
        lib
    }

    /// Read the GDS file at `path`
    pub fn load(path: impl AsRef<Path>) -> ChipResult<StructTree> {
        let path = path.as_ref();
        let lib = read_library(path)?;
        let mut tree = StructTree::new(lib.name.as_str());
        tree.units = lib.units.clone();
        tree.extend(lib);
        Ok(tree)
    }

    /// Read the GDS file at `path` and append all of its structures.
    /// Returns the number of structures read.
    pub fn import(&mut self, path: impl AsRef<Path>) -> ChipResult<usize> {
        let lib = read_library(path.as_ref())?;
        let count = lib.structs.len();
        self.extend(lib);
        Ok(count)
    }

    /// Write the tree to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> ChipResult<()> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        self.to_library().write(&mut bytes)?;
        fs::write(path, bytes).map_err(|e| ChipError::io(path, e))?;
        Ok(())
    }
}

fn read_library(path: &Path) -> ChipResult<GdsLibrary> {
    let bytes = fs::read(path).map_err(|e| ChipError::io(path, e))?;
    let lib = GdsLibrary::from_bytes(&bytes)?;
    debug!(
        "Read {} structures from \"{}\"",
        lib.structs.len(),
        path.display()
    );
    Ok(lib)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order_and_merges() {
        let mut tree = StructTree::new("lib");
        let mut a = GdsStruct::new("A");
        a.elems.push(sref("X", 0, 0));
        tree.append(a);
        tree.append(GdsStruct::new("B"));

        let mut a2 = GdsStruct::new("A");
        a2.elems.push(sref("Y", 10, 10));
        a2.elems.push(rect(1, 0, 0, 5, 5));
        tree.append(a2);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.find("A"), Some(0));
        assert_eq!(tree.find("B"), Some(1));
        assert_eq!(tree.find("C"), None);
        let a = tree.get("A").unwrap();
        let names: Vec<&str> = struct_refs(a).map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y"]);
        assert_eq!(boundaries(a).count(), 1);
    }

    #[test]
    fn test_bounding_box_is_direct_boundaries_only() {
        let mut tree = StructTree::new("lib");
        let mut cell = GdsStruct::new("CELL");
        cell.elems.push(rect(200, 0, 0, 30, 40));
        cell.elems.push(rect(10, -5, 10, 20, 60));
        cell.elems.push(sref("FAR", 10_000, 10_000));
        cell.elems.push(path(30, 5, GdsPoint::vec(&[(0, 0), (0, 900)])));
        tree.append(cell);

        let bbox = tree.bounding_box("CELL").unwrap();
        assert_eq!(bbox, BoundBox::new(-5, 0, 30, 60));
    }

    #[test]
    fn test_bounding_box_missing_structure() {
        let tree = StructTree::new("lib");
        assert!(matches!(
            tree.bounding_box("nope"),
            Err(ChipError::StructureNotFound(_))
        ));
    }

    #[test]
    fn test_box_offset_and_map() {
        let bbox = BoundBox::new(10, 20, -10, 5);
        assert_eq!((bbox.xmin(), bbox.ymin(), bbox.xmax(), bbox.ymax()), (-10, 5, 10, 20));
        assert_eq!(bbox.offset(100, -5), BoundBox::new(90, 0, 110, 15));
        assert_eq!(bbox.map(|v| v * 2), BoundBox::new(-20, 10, 20, 40));
    }
}
