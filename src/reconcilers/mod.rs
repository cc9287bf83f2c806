// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation logic for gwdns.
//!
//! gwdns follows the standard controller pattern:
//!
//! 1. **Watch** - Monitor `HTTPRoute` changes via the Kubernetes API
//! 2. **Reconcile** - Compare the declared hostnames with the DNS backend
//! 3. **Update** - Create, update, or delete backend records to match
//! 4. **Persist** - Record the synchronized hostname set on the route
//!
//! # Modules
//!
//! - [`httproute`] - the `HTTPRoute` state machine (active / unmanaged / deleting)
//! - [`retry`] - conflict-retry policy for writes to the watched resource

pub mod httproute;
pub mod retry;

pub use httproute::{reconcile_httproute, sync_hostnames};
