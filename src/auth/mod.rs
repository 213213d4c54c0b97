//! Authentication module for the Fridgy server
//!
//! Bearer tokens are issued by the managed auth service; this module only
//! validates them and resolves the calling user.

mod service;

pub use service::{AuthService, AuthenticatedUser, Claims};
