// Domain layer: dataset models and the ports (traits) external collaborators implement.

pub mod model;
pub mod ports;
