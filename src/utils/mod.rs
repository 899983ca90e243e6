//! Shared utilities: filesystem primitives, HTML escaping, path helpers.

pub mod fs;
pub mod html;
pub mod path;
