//! Test cases for the density-fill engine
//!
//! Tests cover:
//! - Grid sizing from the fill region and pitch
//! - Rectangle and line clearance per layer
//! - Clearance idempotence and layer isolation
//! - Fill structure emission order and coordinates

use chipsmith::chip::fill::{
    emit_fill, FillFrame, GridRect, GridSegment, LineOutcome, Obstructions,
};
use chipsmith::chip::{FillLayer, OccupancyGrid};
use chipsmith::config::FillRegion;
use chipsmith::gds::{struct_refs, BoundBox, GdsPath, GdsPoint, GdsStructRef};

fn region(x0: i32, y0: i32, x1: i32, y1: i32) -> FillRegion {
    FillRegion { x0, y0, x1, y1 }
}

fn route(layer: i16, pts: &[(i32, i32)]) -> GdsPath {
    GdsPath {
        layer,
        xy: GdsPoint::vec(pts),
        width: Some(4_500),
        ..Default::default()
    }
}

fn free_cells(grid: &OccupancyGrid, layer: FillLayer) -> Vec<(usize, usize)> {
    grid.free_cells(layer).collect()
}

#[test]
fn test_grid_dimensions() {
    assert_eq!(region(0, 0, 100, 100).grid_dims(10), (10, 10));
    assert_eq!(region(0, 0, 105, 59).grid_dims(10), (10, 5));
    assert_eq!(region(-50, 20, 50, 20).grid_dims(25), (4, 0));
}

#[test]
fn test_fresh_grid_is_all_free() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    assert_eq!((frame.width, frame.height), (10, 10));
    assert_eq!(frame.factor, 10_000);

    let grid = OccupancyGrid::new(frame.width, frame.height);
    for layer in FillLayer::LAYERS {
        assert_eq!(grid.free_count(layer), 100, "layer {layer:?}");
    }
}

#[test]
fn test_component_box_clearance() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let rect = frame.rect(&BoundBox::new(20_000, 20_000, 40_000, 40_000), false);
    assert_eq!(
        rect,
        GridRect {
            x0: 2,
            y0: 2,
            x1: 4,
            y1: 4
        }
    );

    let mut grid = OccupancyGrid::new(frame.width, frame.height);
    let obs = Obstructions {
        components: vec![rect],
        ..Default::default()
    };
    obs.apply(&mut grid);

    for layer in [FillLayer::M4, FillLayer::M5, FillLayer::M6] {
        assert_eq!(grid.free_count(layer), 96, "layer {layer:?}");
        for (x, y) in [(2, 2), (2, 3), (3, 2), (3, 3)] {
            assert!(!grid.is_free(layer, x, y));
        }
        assert!(grid.is_free(layer, 4, 4));
        assert!(grid.is_free(layer, 1, 2));
    }
    for layer in [FillLayer::All, FillLayer::M1, FillLayer::M2, FillLayer::M3] {
        assert_eq!(grid.free_count(layer), 100, "layer {layer:?}");
    }
}

#[test]
fn test_box_corners_truncate_or_round() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let bbox = BoundBox::new(14_999, 15_000, 26_000, 34_999);
    assert_eq!(
        frame.rect(&bbox, false),
        GridRect {
            x0: 1,
            y0: 1,
            x1: 2,
            y1: 3
        }
    );
    assert_eq!(
        frame.rect(&bbox, true),
        GridRect {
            x0: 1,
            y0: 2,
            x1: 3,
            y1: 3
        }
    );
}

#[test]
fn test_box_is_clamped_to_region() {
    let frame = FillFrame::new(&region(10, 10, 60, 60), 10);
    let rect = frame.rect(&BoundBox::new(-30_000, 40_000, 90_000, 200_000), false);
    assert_eq!(
        rect,
        GridRect {
            x0: 0,
            y0: 3,
            x1: 5,
            y1: 5
        }
    );
}

#[test]
fn test_vertical_route_clearance() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let path = route(10, &[(0, 0), (0, 50_000)]);
    let segments: Vec<_> = frame.segments(&path).collect();
    assert_eq!(
        segments,
        vec![GridSegment {
            from: (0, 0),
            to: (0, 5)
        }]
    );

    let mut grid = OccupancyGrid::new(frame.width, frame.height);
    let layer = FillLayer::from_route_layer(path.layer).unwrap();
    assert_eq!(layer, FillLayer::M1);
    assert_eq!(grid.clear_segment(layer, segments[0]), LineOutcome::Cleared);

    for y in 0..=5 {
        assert!(!grid.is_free(FillLayer::M1, 0, y));
    }
    assert!(grid.is_free(FillLayer::M1, 0, 6));
    assert!(grid.is_free(FillLayer::M1, 1, 0));
    assert_eq!(grid.free_count(FillLayer::M1), 94);
    assert_eq!(grid.free_count(FillLayer::M3), 100);
}

#[test]
fn test_diagonal_route_is_skipped() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let path = route(10, &[(0, 0), (10_000, 10_000)]);
    let mut grid = OccupancyGrid::new(frame.width, frame.height);

    let obs = Obstructions {
        nets: frame
            .segments(&path)
            .map(|seg| (FillLayer::M1, seg))
            .collect(),
        ..Default::default()
    };
    obs.apply(&mut grid);
    assert_eq!(grid.free_count(FillLayer::M1), 100);

    let seg = GridSegment {
        from: (0, 0),
        to: (1, 1),
    };
    assert_eq!(
        grid.clear_segment(FillLayer::M1, seg),
        LineOutcome::NonManhattan
    );
}

#[test]
fn test_manhattan_on_grid_indices() {
    // Two points that differ in x by less than a pitch share a column
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let path = route(30, &[(31_000, 0), (39_000, 20_000)]);
    let mut grid = OccupancyGrid::new(frame.width, frame.height);
    let seg = frame.segments(&path).next().unwrap();
    assert_eq!(grid.clear_segment(FillLayer::M3, seg), LineOutcome::Cleared);
    assert_eq!(free_cells(&grid, FillLayer::M3).len(), 97);
    assert!(!grid.is_free(FillLayer::M3, 3, 2));
}

#[test]
fn test_route_layers_stay_apart() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let m1 = route(10, &[(0, 0), (90_000, 0)]);
    let m3 = route(30, &[(50_000, 0), (50_000, 90_000)]);

    let mut obs = Obstructions::default();
    for path in [&m1, &m3] {
        let layer = FillLayer::from_route_layer(path.layer).unwrap();
        obs.nets.extend(frame.segments(path).map(|seg| (layer, seg)));
    }
    let mut grid = OccupancyGrid::new(frame.width, frame.height);
    obs.apply(&mut grid);

    assert_eq!(grid.free_count(FillLayer::M1), 90);
    assert_eq!(grid.free_count(FillLayer::M3), 90);
    assert!(grid.is_free(FillLayer::M1, 5, 5));
    assert!(!grid.is_free(FillLayer::M3, 5, 5));
    assert!(grid.is_free(FillLayer::M3, 6, 0));
    assert!(!grid.is_free(FillLayer::M1, 6, 0));
}

#[test]
fn test_bias_paths_clear_layer_five_only() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let rail = route(50, &[(0, 45_000), (99_000, 45_000)]);
    let obs = Obstructions {
        biases: frame.segments(&rail).collect(),
        ..Default::default()
    };
    let mut grid = OccupancyGrid::new(frame.width, frame.height);
    obs.apply(&mut grid);

    assert_eq!(grid.free_count(FillLayer::M5), 90);
    for layer in [FillLayer::All, FillLayer::M1, FillLayer::M3, FillLayer::M4] {
        assert_eq!(grid.free_count(layer), 100, "layer {layer:?}");
    }
}

#[test]
fn test_segment_off_grid_not_clamped() {
    let frame = FillFrame::new(&region(10, 10, 60, 60), 10);
    let below = route(10, &[(0, 0), (90_000, 0)]);
    let mut grid = OccupancyGrid::new(frame.width, frame.height);
    let seg = frame.segments(&below).next().unwrap();
    assert_eq!(seg.from, (-1, -1));
    assert_eq!(grid.clear_segment(FillLayer::M1, seg), LineOutcome::OffGrid);
    assert_eq!(grid.free_count(FillLayer::M1), 25);
}

#[test]
fn test_clearance_is_idempotent() {
    let frame = FillFrame::new(&region(0, 0, 100, 100), 10);
    let obs = Obstructions {
        components: vec![frame.rect(&BoundBox::new(0, 0, 35_000, 20_000), false)],
        vias: vec![frame.rect(&BoundBox::new(45_000, 45_000, 55_000, 55_000), true)],
        nets: vec![(
            FillLayer::M1,
            GridSegment {
                from: (1, 9),
                to: (8, 9),
            },
        )],
        biases: vec![GridSegment {
            from: (7, 0),
            to: (7, 9),
        }],
    };

    let mut once = OccupancyGrid::new(frame.width, frame.height);
    obs.apply(&mut once);
    let mut twice = once.clone();
    obs.apply(&mut twice);

    for layer in FillLayer::LAYERS {
        assert_eq!(free_cells(&once, layer), free_cells(&twice, layer));
    }
    assert_eq!(once.free_count(FillLayer::M2), 99);
}

#[test]
fn test_clear_rect_touches_one_layer() {
    let mut grid = OccupancyGrid::new(6, 6);
    let rect = GridRect {
        x0: 1,
        y0: 1,
        x1: 5,
        y1: 3,
    };
    grid.clear_rect(FillLayer::M4, rect);
    grid.clear_rect(FillLayer::M4, rect);

    assert_eq!(grid.free_count(FillLayer::M4), 28);
    for layer in FillLayer::LAYERS.into_iter().filter(|l| *l != FillLayer::M4) {
        assert_eq!(grid.free_count(layer), 36, "layer {layer:?}");
    }
}

#[test]
fn test_emission() {
    let frame = FillFrame::new(&region(10, 20, 50, 60), 10);
    let mut grid = OccupancyGrid::new(frame.width, frame.height);
    grid.clear_rect(
        FillLayer::M2,
        GridRect {
            x0: 0,
            y0: 0,
            x1: 4,
            y1: 4,
        },
    );
    let structs = emit_fill(&grid, &frame);

    let names: Vec<&str> = structs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Fill", "FillAll", "FillM1", "FillM2", "FillM3", "FillM4", "FillM5", "FillM6"]
    );

    let refs = |i: usize| -> Vec<&GdsStructRef> { struct_refs(&structs[i]).collect() };
    let master: Vec<&str> = refs(0).into_iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        master,
        vec!["FillAll", "FillM4", "FillM6", "FillM2", "FillM1", "FillM3", "FillM5"]
    );
    assert!(refs(0).iter().all(|r| r.xy == GdsPoint::new(0, 0)));

    let all = refs(1);
    assert_eq!(all.len(), 16);
    assert_eq!(all[0].name, "fillAll");
    assert_eq!(all[0].xy, GdsPoint::new(10_000, 20_000));
    assert_eq!(all[1].xy, GdsPoint::new(10_000, 30_000));
    assert_eq!(all[4].xy, GdsPoint::new(20_000, 20_000));

    assert!(structs[3].elems.is_empty());
    assert_eq!(refs(6)[0].name, "fillM5via");
}
