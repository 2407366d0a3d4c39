mod json;
mod text;

pub use json::{JsonOutput, UnitOutput};
pub use text::{render_flat, render_stages};
