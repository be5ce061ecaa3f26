pub mod entities;

pub use entities::{Material, MaterialSummary, MaterialType, NewMaterial, UploadedMaterial};
