//! Errors produced by the supervisor actor itself.
//!
//! `SupervisorActor::handle_message` never fails: a missing respawn
//! recipe or an unknown child id is a no-op, recorded through
//! monitoring rather than surfaced as an error, the same way a production
//! supervisor should not crash supervising.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {}
