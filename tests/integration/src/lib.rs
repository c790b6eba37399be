//! Integration tests for the session/identity core
//!
//! This test suite validates:
//! - The resolver's bootstrap, sign-in, sign-out, and supersession flows
//!   end to end against stubbed service boundaries
//! - The snapshot invariants (no premature authentication, atomic clear,
//!   role-derived access, bootstrap monotonicity, listener-before-query)
//! - The route gates over live resolver state

pub mod test_utils;
