pub mod balanced;
pub mod cluster;
pub mod composite;
