pub mod commands;
pub mod csv_service;
pub mod host_service;
pub mod params;
