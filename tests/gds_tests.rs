//! Test cases for the GDSII structure tree
//!
//! Tests cover:
//! - Saving and loading a tree through a file
//! - Importing structures into an existing tree
//! - Reference transforms, text labels, arrays, boxes and nodes
//! - Bounding boxes and missing structures

use chipsmith::error::ChipError;
use chipsmith::gds::{
    boundaries, paths, path, rect, sref, struct_refs, BoundBox, GdsArrayRef, GdsBox, GdsElement,
    GdsNode, GdsPoint, GdsStrans, GdsStruct, GdsStructRef, GdsTextElem, GdsUnits, StructTree,
};

fn via_library() -> StructTree {
    let mut lib = StructTree::new("vias");
    let mut via = GdsStruct::new("ViaM1M3");
    via.elems.push(rect(10, -2_500, -2_500, 2_500, 2_500));
    via.elems.push(rect(30, -2_000, -2_000, 2_000, 2_000));
    via.elems.push(
        GdsTextElem {
            string: "via".to_string(),
            layer: 63,
            texttype: 0,
            xy: GdsPoint::new(0, 0),
            strans: Some(GdsStrans {
                mag: Some(2.0),
                ..Default::default()
            }),
            ..Default::default()
        }
        .into(),
    );
    lib.append(via);

    let mut pair = GdsStruct::new("ViaPair");
    pair.elems.push(sref("ViaM1M3", 0, 0));
    pair.elems.push(
        GdsStructRef {
            name: "ViaM1M3".to_string(),
            xy: GdsPoint::new(10_000, 0),
            strans: Some(GdsStrans {
                reflected: true,
                angle: Some(90.0),
                ..Default::default()
            }),
            ..Default::default()
        }
        .into(),
    );
    pair.elems
        .push(path(30, 4_500, GdsPoint::vec(&[(0, 0), (10_000, 0)])));
    lib.append(pair);
    lib
}

/// A cell using the element kinds composition never produces itself
fn array_cell() -> GdsStruct {
    let mut cell = GdsStruct::new("ViaGrid");
    cell.elems.push(
        GdsArrayRef {
            name: "ViaM1M3".to_string(),
            xy: [
                GdsPoint::new(0, 0),
                GdsPoint::new(30_000, 0),
                GdsPoint::new(0, 20_000),
            ],
            cols: 3,
            rows: 2,
            ..Default::default()
        }
        .into(),
    );
    cell.elems.push(
        GdsBox {
            layer: 40,
            boxtype: 1,
            xy: [
                GdsPoint::new(0, 0),
                GdsPoint::new(30_000, 0),
                GdsPoint::new(30_000, 20_000),
                GdsPoint::new(0, 20_000),
                GdsPoint::new(0, 0),
            ],
            ..Default::default()
        }
        .into(),
    );
    cell.elems.push(
        GdsNode {
            layer: 41,
            nodetype: 2,
            xy: GdsPoint::vec(&[(0, 0), (10_000, 10_000)]),
            ..Default::default()
        }
        .into(),
    );
    cell
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vias.gds");
    let lib = via_library();

    lib.save(&path).unwrap();
    let back = StructTree::load(&path).unwrap();

    assert_eq!(back.name, "vias");
    assert_eq!(back.units, GdsUnits::new(1e-3, 1e-9));
    assert_eq!(back.len(), 2);
    for name in ["ViaM1M3", "ViaPair"] {
        assert_eq!(
            back.require(name).unwrap().elems,
            lib.require(name).unwrap().elems
        );
    }

    // Every record is an even number of bytes
    let size = std::fs::metadata(&path).unwrap().len();
    assert_eq!(size % 2, 0);
}

#[test]
fn test_import_preserves_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vias.gds");
    via_library().save(&path).unwrap();

    let mut lib = StructTree::new("chip");
    lib.append(GdsStruct::new("Components"));
    let count = lib.import(&path).unwrap();

    assert_eq!(count, 2);
    assert_eq!(lib.len(), 3);
    assert_eq!(lib.find("ViaM1M3"), Some(1));
    let pair = lib.require("ViaPair").unwrap();
    let refs: Vec<_> = struct_refs(pair).collect();
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[1].strans.as_ref().unwrap().angle, Some(90.0));
    assert_eq!(paths(pair).next().unwrap().width, Some(4_500));

    let via = lib.require("ViaM1M3").unwrap();
    let label = via.elems.iter().find_map(|elem| match elem {
        GdsElement::GdsTextElem(text) => Some(text),
        _ => None,
    });
    assert_eq!(label.map(|t| t.string.as_str()), Some("via"));
    assert_eq!(boundaries(via).count(), 2);
}

#[test]
fn test_import_keeps_arrays_boxes_and_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let cells = dir.path().join("cells.gds");
    let mut source = via_library();
    source.append(array_cell());
    source.save(&cells).unwrap();

    let mut lib = StructTree::new("chip");
    assert_eq!(lib.import(&cells).unwrap(), 3);
    let grid = lib.require("ViaGrid").unwrap();
    assert_eq!(grid.elems, array_cell().elems);

    // And again through a second write of the composed tree
    let out = dir.path().join("chip.gds");
    lib.save(&out).unwrap();
    let back = StructTree::load(&out).unwrap();
    let grid = back.require("ViaGrid").unwrap();
    assert_eq!(grid.elems, array_cell().elems);
    match &grid.elems[0] {
        GdsElement::GdsArrayRef(array) => {
            assert_eq!((array.cols, array.rows), (3, 2));
            assert_eq!(array.xy[1], GdsPoint::new(30_000, 0));
        }
        other => panic!("expected an array reference, got {other:?}"),
    }
    // Arrays, boxes and nodes carry no boundary outline
    assert_eq!(back.bounding_box("ViaGrid").unwrap(), BoundBox::new(0, 0, 0, 0));
}

#[test]
fn test_import_same_name_merges() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vias.gds");
    via_library().save(&path).unwrap();

    let mut lib = via_library();
    lib.import(&path).unwrap();
    assert_eq!(lib.len(), 2);
    assert_eq!(struct_refs(lib.require("ViaPair").unwrap()).count(), 4);
}

#[test]
fn test_bounding_box() {
    let lib = via_library();
    assert_eq!(
        lib.bounding_box("ViaM1M3").unwrap(),
        BoundBox::new(-2_500, -2_500, 2_500, 2_500)
    );
    // Only direct boundaries count; ViaPair holds references and a path
    assert_eq!(lib.bounding_box("ViaPair").unwrap(), BoundBox::new(0, 0, 0, 0));
    assert!(matches!(
        lib.bounding_box("Missing"),
        Err(ChipError::StructureNotFound(name)) if name == "Missing"
    ));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = StructTree::load(dir.path().join("absent.gds"));
    assert!(matches!(result, Err(ChipError::Io { .. })));
}

#[test]
fn test_load_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.gds");
    std::fs::write(&path, [0u8, 1, 2]).unwrap();
    assert!(matches!(StructTree::load(&path), Err(ChipError::Gds(_))));
}
