pub mod apply;
pub mod get;
