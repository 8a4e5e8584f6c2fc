//! Tests for access resolution.
//!
//! Organized by functionality:
//! - Owner and admin bypasses
//! - Root / folder / element level checks
//! - Wildcard and specific grant composition (union semantics)
//! - Quiet (non-throwing) checks
//! - Sharing identifier building
//! - Topology rebuild
