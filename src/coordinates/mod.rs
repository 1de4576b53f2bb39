pub mod groundtrack;

pub use groundtrack::GeodeticPoint;
