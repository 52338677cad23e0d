pub mod csv_models;
pub mod envelope;
pub mod host_command;
pub mod identifiers;
