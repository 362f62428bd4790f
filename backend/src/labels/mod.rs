//! Mailing labels: logical pagination (`layout`) and PDF output (`render`).

pub mod layout;
pub mod render;

pub use layout::{paginate, LabelDocument};
pub use render::{render, FontSource, RenderError};
