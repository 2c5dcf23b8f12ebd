pub mod enum_map;

pub use enum_map::{EnumKey, EnumMap};
