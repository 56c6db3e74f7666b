//! Object store client for the Metal3Data controller
//!
//! Typed access to the objects the controller reads and writes:
//! Metal3Data and its inputs, IPClaim/IPAddress and output Secrets.
//!
//! # Features
//!
//! - **`KubeStoreClient`**: `kube::Api` backed implementation
//! - **`MockStoreClient`** (`test-util`): in-memory implementation with
//!   resource-version conflicts and finalizer-aware deletion

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeStoreClient;
pub use error::{OptionalExt, StoreError};
pub use store_trait::StoreClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockStoreClient;
