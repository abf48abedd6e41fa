// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use log::{info, warn};

use super::{ChipSmith, LAYER_METAL1, LAYER_METAL2, NETS, VIAS};
use crate::gds::{path, sref, GdsPoint, GdsStruct};
use crate::units::{def_to_db, width_to_db};

/// Output layer for a DEF routing layer name
pub fn route_layer(name: &str) -> Option<i16> {
    match name {
        "metal1" => Some(LAYER_METAL1),
        "metal2" => Some(LAYER_METAL2),
        _ => None,
    }
}

impl ChipSmith {
    /// Net segments into `Nets`, plus a via at the tail of every segment
    /// but the last of each net into `Vias`
    pub fn place_nets(&mut self) {
        info!("Routing nets.");
        let width = width_to_db(self.config.params.ptl_width);
        let via_cell = self.config.params.via_cell.clone();

        let mut nets = GdsStruct::new(NETS);
        let mut vias = GdsStruct::new(VIAS);

        for net in &self.def.nets {
            for route in net.routes.iter().filter(|r| r.points.len() > 1) {
                let Some(layer) = route_layer(&route.layer) else {
                    warn!(
                        "Net \"{}\": layer \"{}\" has no output layer, segment skipped",
                        net.name, route.layer
                    );
                    continue;
                };
                let xy = route
                    .points
                    .iter()
                    .map(|&(x, y)| GdsPoint::new(def_to_db(x), def_to_db(y)))
                    .collect();
                nets.elems.push(path(layer, width, xy));
            }

            let inner = net.routes.len().saturating_sub(1);
            for route in &net.routes[..inner] {
                if let Some(&(x, y)) = route.points.last() {
                    vias.elems
                        .push(sref(via_cell.as_str(), def_to_db(x), def_to_db(y)));
                }
            }
        }

        info!(
            "Routed {} segments with {} vias.",
            nets.elems.len(),
            vias.elems.len()
        );
        self.lib.append(nets);
        self.lib.append(vias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_layer() {
        assert_eq!(route_layer("metal1"), Some(10));
        assert_eq!(route_layer("metal2"), Some(30));
        assert_eq!(route_layer("metal3"), None);
        assert_eq!(route_layer("METAL1"), None);
    }
}
