pub mod create_project;
pub mod fixup;
pub mod reconcile;
pub mod usermap;
