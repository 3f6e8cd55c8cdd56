pub mod provision;

pub use provision::ProvisionConfig;
