pub mod extract;
pub mod fieldspec;
pub mod imports;
pub mod orchestrate;
pub mod planner;
pub mod registry;
pub mod scaffold;
pub mod templates;
pub mod types;
pub mod views;

pub use fieldspec::{parse_field, parse_fields, serialize_field, serialize_fields};
pub use imports::{append_if_missing, merge_imports};
pub use orchestrate::{
    generate_model, run_view_generation, GenRun, ModelOptions, ProjectFiles, ViewOptions,
};
pub use registry::{TypeEntry, TypeRegistry};
pub use types::*;
pub use views::ViewKind;
