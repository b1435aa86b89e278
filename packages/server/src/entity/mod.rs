pub mod batch_spec;
pub mod batch_spec_mount;
