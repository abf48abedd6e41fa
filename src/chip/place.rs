// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use log::info;

use super::{ChipSmith, COMPONENTS};
use crate::gds::{sref, GdsStruct};
use crate::units::def_to_db;

impl ChipSmith {
    /// One `Components` instance per DEF component, in input order
    pub fn place_gates(&mut self) {
        info!("Placing gates.");
        let mut strukt = GdsStruct::new(COMPONENTS);
        for comp in &self.def.components {
            let (x, y) = comp.location();
            strukt.elems.push(sref(
                self.struct_name(&comp.macro_name),
                def_to_db(x),
                def_to_db(y),
            ));
        }
        info!("Placed {} gates.", strukt.elems.len());
        self.lib.append(strukt);
    }
}
