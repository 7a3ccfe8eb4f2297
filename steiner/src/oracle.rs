use rst_common::db::core::NetlistDB;
use rst_common::db::indices::{NetId, PinId};
use rst_common::geom::cell::GCell;
use rst_common::geom::convert::GridConverter;

/// The capabilities tree construction needs from the surrounding netlist
/// and geometry model. `Sync` so nets can be built in parallel against a
/// shared oracle.
pub trait NetOracle: Sync {
    fn driver(&self, net: NetId) -> Option<PinId>;
    fn sinks(&self, net: NetId) -> Vec<PinId>;
    fn pin_gcell(&self, pin: PinId) -> GCell;
    /// Endpoints the caller wants left out of tree construction.
    fn skip_pin(&self, net: NetId, pin: PinId) -> bool;
}

/// Oracle backed by the netlist database and a world-to-grid mapping.
pub struct DbOracle<'a> {
    db: &'a NetlistDB,
    converter: GridConverter,
}

impl<'a> DbOracle<'a> {
    pub fn new(db: &'a NetlistDB, converter: GridConverter) -> Self {
        Self { db, converter }
    }
}

impl NetOracle for DbOracle<'_> {
    fn driver(&self, net: NetId) -> Option<PinId> {
        self.db.nets[net.index()].driver
    }

    fn sinks(&self, net: NetId) -> Vec<PinId> {
        self.db.nets[net.index()].sinks.clone()
    }

    fn pin_gcell(&self, pin: PinId) -> GCell {
        self.converter.to_gcell(self.db.get_pin_position(pin))
    }

    fn skip_pin(&self, _net: NetId, _pin: PinId) -> bool {
        false
    }
}

/// Oracle over literal gcells, for callers without a netlist database.
/// Pin 0 is the driver; pins 1..=sinks.len() are the sinks.
pub struct PinSetOracle {
    driver: GCell,
    sinks: Vec<GCell>,
}

impl PinSetOracle {
    pub fn new(driver: GCell, sinks: Vec<GCell>) -> Self {
        Self { driver, sinks }
    }
}

impl NetOracle for PinSetOracle {
    fn driver(&self, _net: NetId) -> Option<PinId> {
        Some(PinId::new(0))
    }

    fn sinks(&self, _net: NetId) -> Vec<PinId> {
        (1..=self.sinks.len()).map(PinId::new).collect()
    }

    fn pin_gcell(&self, pin: PinId) -> GCell {
        if pin.index() == 0 {
            self.driver
        } else {
            self.sinks[pin.index() - 1]
        }
    }

    fn skip_pin(&self, _net: NetId, _pin: PinId) -> bool {
        false
    }
}
