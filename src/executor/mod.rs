pub mod error;
pub mod runner;
pub mod terraform;

pub use terraform::TerraformCli;
