// Domain layer: fleet models, the inventory seam, and the capacity rules.

pub mod capacity;
pub mod model;
pub mod ports;
