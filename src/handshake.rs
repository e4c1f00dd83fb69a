//! Per-lane handshake between an approach machine and its light machine.
//!
//! Two boolean flags are the only coupling between the pair:
//!
//! ```text
//!   Approach FSM ──[approach_ready]──▶ Light FSM
//!   Approach FSM ◀──[go_granted]────── Light FSM
//! ```
//!
//! Each flag has exactly one writer.  The writer discipline is enforced by
//! the endpoint views: [`ApproachEnd`] can only raise or withdraw the
//! request and read the grant; [`LightEnd`] can only grant or revoke and
//! read the request.  The pair lives in the shared `FsmContext`; the
//! approach machine touches it only through [`Handshake::approach`] and
//! the light machine only through [`Handshake::light`].

use log::debug;

/// The flag pair for one lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Handshake {
    approach_ready: bool,
    go_granted: bool,
}

impl Handshake {
    pub const fn new() -> Self {
        Self {
            approach_ready: false,
            go_granted: false,
        }
    }

    /// Endpoint owned by the approach machine.
    pub fn approach(&mut self) -> ApproachEnd<'_> {
        ApproachEnd(self)
    }

    /// Endpoint owned by the light machine.
    pub fn light(&mut self) -> LightEnd<'_> {
        LightEnd(self)
    }

    /// Read-only view of the request flag.
    pub fn approach_ready(&self) -> bool {
        self.approach_ready
    }

    /// Read-only view of the grant flag.
    pub fn go_granted(&self) -> bool {
        self.go_granted
    }
}

/// Producer of `approach_ready`, consumer of `go_granted`.
pub struct ApproachEnd<'a>(&'a mut Handshake);

impl ApproachEnd<'_> {
    /// Assert that a vehicle is holding at the line.
    pub fn request(&mut self) {
        if !self.0.approach_ready {
            debug!("Handshake: approach_ready raised");
        }
        self.0.approach_ready = true;
    }

    /// Withdraw the request once passage was granted.
    pub fn withdraw(&mut self) {
        if self.0.approach_ready {
            debug!("Handshake: approach_ready withdrawn");
        }
        self.0.approach_ready = false;
    }

    /// Whether the paired light has authorised passage.
    pub fn is_granted(&self) -> bool {
        self.0.go_granted
    }
}

/// Producer of `go_granted`, consumer of `approach_ready`.
pub struct LightEnd<'a>(&'a mut Handshake);

impl LightEnd<'_> {
    /// Whether a vehicle is requesting passage.
    pub fn is_requested(&self) -> bool {
        self.0.approach_ready
    }

    /// Authorise passage.
    pub fn grant(&mut self) {
        if !self.0.go_granted {
            debug!("Handshake: go_granted raised");
        }
        self.0.go_granted = true;
    }

    /// Revoke the authorisation when the yellow phase ends.
    pub fn revoke(&mut self) {
        if self.0.go_granted {
            debug!("Handshake: go_granted revoked");
        }
        self.0.go_granted = false;
    }
}
