// Domain layer: core models and ports (interfaces). No knowledge of HTTP,
// plotters or the CLI; those live in adapters and core.

pub mod model;
pub mod ports;
