pub mod provision_service;

pub use provision_service::{PreparedAccount, ProvisionOutcome, ProvisionService};
