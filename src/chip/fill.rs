// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Density fill
//!
//! The fill region is cut into square cells of one grid pitch. Every fill
//! layer starts fully fillable; each layer then clears the cells covered by
//! the obstructions its [Clearance] rules name. A shape touching part of a
//! cell voids the whole cell. What survives becomes one fill instance per
//! cell in that layer's sub-structure.

use fixedbitset::FixedBitSet;
use log::{debug, info, warn};

use super::{ChipSmith, BIASES, COMPONENTS, FILL, NETS, VIAS};
use crate::config::FillRegion;
use crate::error::ChipResult;
use crate::gds::{paths, sref, struct_refs, BoundBox, GdsPath, GdsStruct};
use crate::units::{config_to_db, constrain, grid_factor, to_grid, to_grid_rounded};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillLayer {
    All,
    M1,
    M2,
    M3,
    M4,
    M5,
    M6,
}

/// Obstruction classes a fill layer keeps clear of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    /// Grid-snapped boxes of placed gates
    ComponentBoxes,
    /// Via structure box at every via instance
    ViaBoxes,
    /// `Nets` paths routed on the matching metal layer
    NetPaths,
    /// Every `Biases` path
    BiasPaths,
}

impl FillLayer {
    pub const COUNT: usize = 7;

    pub const LAYERS: [FillLayer; FillLayer::COUNT] = [
        FillLayer::All,
        FillLayer::M1,
        FillLayer::M2,
        FillLayer::M3,
        FillLayer::M4,
        FillLayer::M5,
        FillLayer::M6,
    ];

    /// Reference order inside the master `Fill` structure
    pub const MASTER_ORDER: [FillLayer; FillLayer::COUNT] = [
        FillLayer::All,
        FillLayer::M4,
        FillLayer::M6,
        FillLayer::M2,
        FillLayer::M1,
        FillLayer::M3,
        FillLayer::M5,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Fill layer cleared by a route on output layer `code`
    pub fn from_route_layer(code: i16) -> Option<FillLayer> {
        usize::try_from(code / 10)
            .ok()
            .and_then(|i| Self::LAYERS.get(i).copied())
    }

    /// Fill cell instanced on every free grid cell
    pub fn cell_name(self) -> &'static str {
        match self {
            FillLayer::All => "fillAll",
            FillLayer::M1 => "fillM1",
            FillLayer::M2 => "fillM2",
            FillLayer::M3 => "fillM3",
            FillLayer::M4 => "fillM4",
            FillLayer::M5 => "fillM5via",
            FillLayer::M6 => "fillM6",
        }
    }

    /// Sub-structure collecting this layer's fill instances
    pub fn struct_name(self) -> &'static str {
        match self {
            FillLayer::All => "FillAll",
            FillLayer::M1 => "FillM1",
            FillLayer::M2 => "FillM2",
            FillLayer::M3 => "FillM3",
            FillLayer::M4 => "FillM4",
            FillLayer::M5 => "FillM5",
            FillLayer::M6 => "FillM6",
        }
    }

    pub fn clearances(self) -> &'static [Clearance] {
        use Clearance::*;
        match self {
            FillLayer::All => &[],
            FillLayer::M1 | FillLayer::M3 => &[NetPaths],
            FillLayer::M2 => &[ViaBoxes],
            FillLayer::M4 | FillLayer::M6 => &[ComponentBoxes],
            FillLayer::M5 => &[ComponentBoxes, BiasPaths],
        }
    }
}

/// Half-open rectangle of grid cells, already clamped to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

/// Segment between two grid indices, possibly off the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSegment {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Cleared,
    /// Entirely outside the grid on the perpendicular axis
    OffGrid,
    NonManhattan,
}

/// One occupancy bitset per fill layer. Cell `(x, y)` lives at bit
/// `x * height + y`, so set bits come out column by column.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    layers: Vec<FixedBitSet>,
}

impl OccupancyGrid {
    /// Grid with every cell of every layer fillable
    pub fn new(width: usize, height: usize) -> Self {
        let mut bits = FixedBitSet::with_capacity(width * height);
        bits.insert_range(..);
        Self {
            width,
            height,
            layers: vec![bits; FillLayer::COUNT],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    pub fn is_free(&self, layer: FillLayer, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.layers[layer.index()][self.offset(x, y)]
    }

    pub fn free_count(&self, layer: FillLayer) -> usize {
        self.layers[layer.index()].count_ones(..)
    }

    pub fn clear_rect(&mut self, layer: FillLayer, rect: GridRect) {
        let x1 = rect.x1.min(self.width);
        let y1 = rect.y1.min(self.height);
        if rect.y0 >= y1 {
            return;
        }
        for x in rect.x0..x1 {
            let base = self.offset(x, 0);
            self.layers[layer.index()].set_range(base + rect.y0..base + y1, false);
        }
    }

    /// Clear the cells on an axis-aligned segment, both ends included. The
    /// run along the segment is clamped to the grid; a segment whose fixed
    /// coordinate is off the grid, or that lies wholly past one edge, clears
    /// nothing.
    pub fn clear_segment(&mut self, layer: FillLayer, seg: GridSegment) -> LineOutcome {
        let (w, h) = (self.width as i32, self.height as i32);
        let ((x0, y0), (x1, y1)) = (seg.from, seg.to);
        if w == 0 || h == 0 {
            return LineOutcome::OffGrid;
        }

        if x0 == x1 {
            if x0 < 0 || x0 >= w || (y0 < 0 && y1 < 0) || (y0 >= h && y1 >= h) {
                return LineOutcome::OffGrid;
            }
            let (a, b) = (constrain(y0, 0, h - 1), constrain(y1, 0, h - 1));
            let base = self.offset(x0 as usize, 0);
            let (lo, hi) = (a.min(b) as usize, a.max(b) as usize);
            self.layers[layer.index()].set_range(base + lo..base + hi + 1, false);
            LineOutcome::Cleared
        } else if y0 == y1 {
            if y0 < 0 || y0 >= h || (x0 < 0 && x1 < 0) || (x0 >= w && x1 >= w) {
                return LineOutcome::OffGrid;
            }
            let (a, b) = (constrain(x0, 0, w - 1), constrain(x1, 0, w - 1));
            for x in a.min(b)..=a.max(b) {
                let bit = self.offset(x as usize, y0 as usize);
                self.layers[layer.index()].set(bit, false);
            }
            LineOutcome::Cleared
        } else {
            LineOutcome::NonManhattan
        }
    }

    /// Free cells of `layer`, column by column
    pub fn free_cells(&self, layer: FillLayer) -> impl Iterator<Item = (usize, usize)> + '_ {
        let h = self.height;
        self.layers[layer.index()]
            .ones()
            .map(move |bit| (bit / h, bit % h))
    }
}

/// Mapping from database coordinates to grid indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillFrame {
    /// Region origin in database units
    pub origin: (i32, i32),
    pub factor: i32,
    pub width: usize,
    pub height: usize,
}

impl FillFrame {
    pub fn new(region: &FillRegion, pitch: u32) -> Self {
        let (width, height) = region.grid_dims(pitch);
        Self {
            origin: (config_to_db(region.x0), config_to_db(region.y0)),
            factor: grid_factor(pitch),
            width,
            height,
        }
    }

    /// Grid index of a database point, truncating toward zero
    pub fn index(&self, x: i32, y: i32) -> (i32, i32) {
        (
            to_grid(x - self.origin.0, self.factor),
            to_grid(y - self.origin.1, self.factor),
        )
    }

    /// Cells under `bbox`, corners truncated or rounded, then clamped
    pub fn rect(&self, bbox: &BoundBox, rounded: bool) -> GridRect {
        let grid = |v: i32, o: i32| {
            if rounded {
                to_grid_rounded(v - o, self.factor)
            } else {
                to_grid(v - o, self.factor)
            }
        };
        let (w, h) = (self.width as i32, self.height as i32);
        let fit = |v: i32, hi: i32| constrain(v, 0, hi) as usize;
        GridRect {
            x0: fit(grid(bbox.xmin(), self.origin.0), w),
            y0: fit(grid(bbox.ymin(), self.origin.1), h),
            x1: fit(grid(bbox.xmax(), self.origin.0), w),
            y1: fit(grid(bbox.ymax(), self.origin.1), h),
        }
    }

    /// Consecutive vertex pairs of `path` as grid segments
    pub fn segments<'a>(&'a self, path: &'a GdsPath) -> impl Iterator<Item = GridSegment> + 'a {
        path.xy.windows(2).map(move |pair| GridSegment {
            from: self.index(pair[0].x, pair[0].y),
            to: self.index(pair[1].x, pair[1].y),
        })
    }
}

/// Everything the fill must keep clear of, in grid terms
#[derive(Debug, Clone, Default)]
pub struct Obstructions {
    pub components: Vec<GridRect>,
    pub vias: Vec<GridRect>,
    /// Net segments with the fill layer their route layer maps to
    pub nets: Vec<(FillLayer, GridSegment)>,
    pub biases: Vec<GridSegment>,
}

impl Obstructions {
    /// Apply each layer's clearance rules to `grid`
    pub fn apply(&self, grid: &mut OccupancyGrid) {
        for layer in FillLayer::LAYERS {
            for rule in layer.clearances() {
                match rule {
                    Clearance::ComponentBoxes => {
                        for &rect in &self.components {
                            grid.clear_rect(layer, rect);
                        }
                    }
                    Clearance::ViaBoxes => {
                        for &rect in &self.vias {
                            grid.clear_rect(layer, rect);
                        }
                    }
                    Clearance::NetPaths => {
                        for &(_, seg) in self.nets.iter().filter(|(l, _)| *l == layer) {
                            clear_line(grid, layer, seg);
                        }
                    }
                    Clearance::BiasPaths => {
                        for &seg in &self.biases {
                            clear_line(grid, layer, seg);
                        }
                    }
                }
            }
            debug!(
                "Fill layer {:?}: {} of {} cells free",
                layer,
                grid.free_count(layer),
                grid.width() * grid.height()
            );
        }
    }
}

fn clear_line(grid: &mut OccupancyGrid, layer: FillLayer, seg: GridSegment) {
    match grid.clear_segment(layer, seg) {
        LineOutcome::NonManhattan => warn!(
            "Non-Manhattan route from {:?} to {:?} on fill layer {:?}, skipped",
            seg.from, seg.to, layer
        ),
        LineOutcome::OffGrid => debug!("Segment {:?} -> {:?} is off the fill grid", seg.from, seg.to),
        LineOutcome::Cleared => (),
    }
}

/// Fill structures for every free cell: the master `Fill` first, then the
/// per-layer sub-structures in layer order
pub fn emit_fill(grid: &OccupancyGrid, frame: &FillFrame) -> Vec<GdsStruct> {
    let mut master = GdsStruct::new(FILL);
    master.elems.extend(
        FillLayer::MASTER_ORDER
            .iter()
            .map(|layer| sref(layer.struct_name(), 0, 0)),
    );

    let mut out = vec![master];
    for layer in FillLayer::LAYERS {
        let mut strukt = GdsStruct::new(layer.struct_name());
        strukt.elems = grid
            .free_cells(layer)
            .map(|(x, y)| {
                sref(
                    layer.cell_name(),
                    frame.origin.0 + x as i32 * frame.factor,
                    frame.origin.1 + y as i32 * frame.factor,
                )
            })
            .collect();
        out.push(strukt);
    }
    out
}

impl ChipSmith {
    /// Grid obstructions from the composed `Components`, `Vias`, `Nets` and
    /// `Biases` structures
    pub fn collect_obstructions(&self, frame: &FillFrame) -> ChipResult<Obstructions> {
        let mut obs = Obstructions::default();
        let empty = GdsStruct::default();
        let part = |name: &str| self.lib.get(name).unwrap_or(&empty);

        for inst in struct_refs(part(COMPONENTS)) {
            match self.cell_boxes.get(&inst.name) {
                Some(bbox) => obs
                    .components
                    .push(frame.rect(&bbox.offset(inst.xy.x, inst.xy.y), false)),
                None => warn!("No cached box for \"{}\", fill not cleared under it", inst.name),
            }
        }

        let vias: Vec<_> = struct_refs(part(VIAS)).collect();
        let via_cell = &self.config.params.via_cell;
        if !vias.is_empty() {
            if self.lib.find(via_cell).is_some() {
                let via_box = self.lib.bounding_box(via_cell)?;
                obs.vias.extend(
                    vias.iter()
                        .map(|inst| frame.rect(&via_box.offset(inst.xy.x, inst.xy.y), true)),
                );
            } else {
                warn!(
                    "Via structure \"{via_cell}\" is not defined, fill not cleared under {} vias",
                    vias.len()
                );
            }
        }

        for path in paths(part(NETS)) {
            match FillLayer::from_route_layer(path.layer) {
                Some(layer) => obs
                    .nets
                    .extend(frame.segments(path).map(|seg| (layer, seg))),
                None => warn!("Route layer {} has no fill layer", path.layer),
            }
        }

        for path in paths(part(BIASES)) {
            obs.biases.extend(frame.segments(path));
        }

        Ok(obs)
    }

    /// Run the density fill over the configured region
    pub fn place_fill(&mut self) -> ChipResult<()> {
        info!("Placing fill.");
        let frame = FillFrame::new(&self.config.fill_region(), self.config.params.grid_size);
        info!("Fill grid is {} x {} cells.", frame.width, frame.height);

        let obs = self.collect_obstructions(&frame)?;
        let mut grid = OccupancyGrid::new(frame.width, frame.height);
        obs.apply(&mut grid);

        for strukt in emit_fill(&grid, &frame) {
            self.lib.append(strukt);
        }
        info!("Placing fill, done.");
        Ok(())
    }
}
