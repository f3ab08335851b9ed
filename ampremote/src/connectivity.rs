//! Network reachability policy
//!
//! The host platform knows whether a network is available; the adapter
//! only needs a yes/no answer before spending a request on it. The
//! policy is consulted before every HTTP call and a negative answer
//! surfaces as [`RemoteError::Unreachable`] — indistinguishable, from
//! the caching layer's perspective, from any other transport failure.

use crate::error::{RemoteError, Result};

/// Reachability policy consulted before each remote request
pub trait Connectivity: Send + Sync {
    /// Is a network currently available?
    fn has_connection(&self) -> bool;

    /// Fails with [`RemoteError::Unreachable`] when no network is available
    fn check_connection(&self) -> Result<()> {
        if self.has_connection() {
            Ok(())
        } else {
            Err(RemoteError::Unreachable)
        }
    }
}

/// Permissive policy: always reports the network as available
///
/// Suitable for tests and for hosts without a reachability service;
/// an actual outage then surfaces as an ordinary transport error.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConnected;

impl Connectivity for AlwaysConnected {
    fn has_connection(&self) -> bool {
        true
    }
}
