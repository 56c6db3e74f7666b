//! Metal3 CRD Definitions
//!
//! Kubernetes Custom Resource Definitions read and written by the Metal3Data
//! controller.

pub mod references;
pub mod selector;
pub mod data_template;
pub mod data;
pub mod machine;
pub mod host;
pub mod ip_claim;
pub mod ip_address;

pub use references::*;
pub use selector::*;
pub use data_template::*;
pub use data::*;
pub use machine::*;
pub use host::*;
pub use ip_claim::*;
pub use ip_address::*;
