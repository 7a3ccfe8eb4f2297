use crate::db::indices::*;
use crate::geom::cell::GCell;
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct CellData {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub pins: Vec<PinId>,
}

/// One rectilinear piece of built wire, directed from the uphill end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteSegment {
    pub p1: GCell,
    pub p2: GCell,
}

#[derive(Clone, Debug)]
pub struct NetData {
    pub name: String,
    pub driver: Option<PinId>,
    pub sinks: Vec<PinId>,
    pub route_segments: Vec<RouteSegment>,
}

pub struct NetlistDB {
    pub cells: Vec<CellData>,
    pub nets: Vec<NetData>,

    pub pin_offsets: Vec<Point<f64>>,
    pub pin_to_cell: Vec<CellId>,
    pub pin_to_net: Vec<NetId>,

    pub positions: Vec<Point<f64>>,
    pub die_area: Rect,

    pub cell_name_map: HashMap<String, CellId>,
    pub net_name_map: HashMap<String, NetId>,
}

impl NetlistDB {
    pub fn new() -> Self {
        Self {
            cells: Vec::with_capacity(1000),
            nets: Vec::with_capacity(1000),
            pin_offsets: Vec::with_capacity(5000),
            pin_to_cell: Vec::with_capacity(5000),
            pin_to_net: Vec::with_capacity(5000),
            positions: Vec::with_capacity(1000),
            die_area: Rect::default(),
            cell_name_map: HashMap::new(),
            net_name_map: HashMap::new(),
        }
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }
    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }
    pub fn num_pins(&self) -> usize {
        self.pin_offsets.len()
    }

    #[inline]
    pub fn get_pin_position(&self, pin: PinId) -> Point<f64> {
        let cell = self.pin_to_cell[pin.index()];
        self.positions[cell.index()] + self.pin_offsets[pin.index()]
    }

    pub fn add_cell(&mut self, name: String, width: f64, height: f64) -> CellId {
        let id = CellId::new(self.cells.len());
        self.cells.push(CellData {
            name: name.clone(),
            width,
            height,
            pins: Vec::new(),
        });
        self.positions.push(Point::new(0.0, 0.0));
        self.cell_name_map.insert(name, id);
        id
    }

    pub fn add_net(&mut self, name: String) -> NetId {
        if let Some(&id) = self.net_name_map.get(&name) {
            return id;
        }
        let id = NetId::new(self.nets.len());
        self.nets.push(NetData {
            name: name.clone(),
            driver: None,
            sinks: Vec::new(),
            route_segments: Vec::new(),
        });
        self.net_name_map.insert(name, id);
        id
    }

    pub fn add_pin(&mut self, cell: CellId, net: NetId, offset: Point<f64>, is_driver: bool) -> PinId {
        let pid = PinId::new(self.pin_offsets.len());
        self.pin_offsets.push(offset);
        self.pin_to_cell.push(cell);
        self.pin_to_net.push(net);

        self.cells[cell.index()].pins.push(pid);
        let net_data = &mut self.nets[net.index()];
        if is_driver && net_data.driver.is_none() {
            net_data.driver = Some(pid);
        } else {
            net_data.sinks.push(pid);
        }
        pid
    }
}
