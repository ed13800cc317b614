//! Per-peer negotiation state tracking.
//!
//! A peer link is one negotiation state machine towards one remote
//! connection. Two links per remote are possible: the camera/mic link and
//! the screen-share link. They are distinguished by an explicit `LinkKind`
//! tag in the link key and are fully independent: closing one never affects
//! the other.
//!
//! The registry tracks signaling state only; the actual media stack is the
//! embedding application's concern. SDP and ICE payloads stay opaque.
//!
//! State machine per link:
//!
//! ```text
//! offerer:   Idle -> HaveLocalOffer -> Stable
//! answerer:  Idle -> (remote offer) -> Stable
//! teardown:  any state -> Closed
//! ```
//!
//! An offer received while the link is in neither `Idle` nor `Stable` is a
//! conflict: the link is torn down and recreated fresh before the offer is
//! applied (last-offer-wins, no glare resolution). ICE candidates arriving
//! before the remote description are queued per link and flushed once the
//! remote description is applied; a candidate that fails to apply may be
//! re-queued, at most `MAX_CANDIDATE_ATTEMPTS` times in total, after which
//! it is dropped.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use thiserror::Error;

/// Maximum number of application attempts per queued ICE candidate
pub const MAX_CANDIDATE_ATTEMPTS: u8 = 3;

/// Which of the two possible links towards a remote peer this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Camera,
    Screen,
}

impl LinkKind {
    /// Convert the wire-level screen-share flag into the tagged variant
    pub fn from_flag(is_screen_share: bool) -> Self {
        if is_screen_share {
            LinkKind::Screen
        } else {
            LinkKind::Camera
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Camera => "camera",
            LinkKind::Screen => "screen",
        }
    }
}

/// Key identifying one peer link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub remote: String,
    pub kind: LinkKind,
}

impl LinkKey {
    pub fn new(remote: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            remote: remote.into(),
            kind,
        }
    }

    pub fn camera(remote: impl Into<String>) -> Self {
        Self::new(remote, LinkKind::Camera)
    }

    pub fn screen(remote: impl Into<String>) -> Self {
        Self::new(remote, LinkKind::Screen)
    }
}

/// Negotiation state of one peer link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    HaveLocalOffer,
    Stable,
    Closed,
}

/// Errors surfaced by the link registry
///
/// None of these are fatal: a conflict is recovered by resetting the link,
/// an out-of-order answer is ignored.
#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    /// Answer received for a link that does not exist
    #[error("no link exists towards '{0}'")]
    UnknownLink(String),

    /// Answer received while the link was not awaiting one
    #[error("answer received in state {state:?}, ignoring")]
    AnswerOutOfOrder { state: LinkState },
}

/// A queued ICE candidate with its application-attempt count
#[derive(Debug, Clone, PartialEq)]
pub struct IceCandidate {
    payload: Value,
    attempts: u8,
}

impl IceCandidate {
    fn new(payload: Value) -> Self {
        Self {
            payload,
            attempts: 0,
        }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// What happened to an inbound ICE candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Remote description is set; the candidate can be applied immediately
    Applied,
    /// Remote description not yet set; queued for the flush
    Queued,
    /// The link is closed; the candidate was discarded
    Discarded,
}

/// What happened to a re-queued ICE candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeueOutcome {
    /// Queued again for another attempt
    Requeued,
    /// No attempts left (or link gone); dropped for good
    Dropped,
}

/// Result of applying a remote offer
#[derive(Debug)]
pub struct OfferOutcome {
    /// The link was in a conflicting state and was recreated fresh
    pub reset: bool,
    /// Candidates queued before the remote description, now ready to apply
    pub flushed: Vec<IceCandidate>,
}

#[derive(Debug)]
struct PeerLink {
    state: LinkState,
    remote_description_set: bool,
    pending_candidates: VecDeque<IceCandidate>,
}

impl PeerLink {
    fn fresh() -> Self {
        Self {
            state: LinkState::Idle,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
        }
    }

    /// Drain the pending queue, counting one application attempt each
    fn flush(&mut self) -> Vec<IceCandidate> {
        self.pending_candidates
            .drain(..)
            .map(|mut candidate| {
                candidate.attempts += 1;
                candidate
            })
            .collect()
    }
}

/// Registry of all peer links held by this client
#[derive(Debug, Default)]
pub struct PeerLinkRegistry {
    links: HashMap<LinkKey, PeerLink>,
}

impl PeerLinkRegistry {
    pub fn new() -> Self {
        Self {
            links: HashMap::new(),
        }
    }

    /// Current state of a link, if it exists
    pub fn state(&self, key: &LinkKey) -> Option<LinkState> {
        self.links.get(key).map(|link| link.state)
    }

    /// Number of candidates queued on a link
    pub fn pending_count(&self, key: &LinkKey) -> usize {
        self.links
            .get(key)
            .map(|link| link.pending_candidates.len())
            .unwrap_or(0)
    }

    fn ensure_link(&mut self, key: &LinkKey) -> &mut PeerLink {
        self.links
            .entry(key.clone())
            .or_insert_with(PeerLink::fresh)
    }

    /// Record that a local offer was created for this link
    ///
    /// Creates the link if absent; a closed link is recreated fresh
    /// (re-offering after teardown starts a new negotiation).
    pub fn mark_local_offer(&mut self, key: &LinkKey) {
        let link = self.ensure_link(key);
        if link.state == LinkState::Closed {
            *link = PeerLink::fresh();
        }
        link.state = LinkState::HaveLocalOffer;
    }

    /// Apply a remote offer to this link
    ///
    /// A link in neither `Idle` nor `Stable` is torn down and recreated
    /// fresh before the offer is applied; queued candidates of the old link
    /// are dropped with it. Candidates queued on a surviving link are
    /// flushed and returned.
    pub fn apply_remote_offer(&mut self, key: &LinkKey) -> OfferOutcome {
        let link = self.ensure_link(key);
        let reset = !matches!(link.state, LinkState::Idle | LinkState::Stable);
        if reset {
            *link = PeerLink::fresh();
        }
        link.remote_description_set = true;
        link.state = LinkState::Stable;
        OfferOutcome {
            reset,
            flushed: link.flush(),
        }
    }

    /// Apply a remote answer to this link
    ///
    /// Only valid while a local offer is outstanding; anything else is
    /// reported (and ignored by the caller, never fatal).
    pub fn apply_remote_answer(&mut self, key: &LinkKey) -> Result<Vec<IceCandidate>, LinkError> {
        let link = self
            .links
            .get_mut(key)
            .ok_or_else(|| LinkError::UnknownLink(key.remote.clone()))?;
        match link.state {
            LinkState::HaveLocalOffer => {
                link.remote_description_set = true;
                link.state = LinkState::Stable;
                Ok(link.flush())
            }
            state => Err(LinkError::AnswerOutOfOrder { state }),
        }
    }

    /// Accept an inbound ICE candidate for this link
    ///
    /// Creates the link if absent (candidates can race ahead of the offer).
    pub fn accept_candidate(&mut self, key: &LinkKey, payload: Value) -> CandidateOutcome {
        let link = self.ensure_link(key);
        match link.state {
            LinkState::Closed => CandidateOutcome::Discarded,
            _ if link.remote_description_set => CandidateOutcome::Applied,
            _ => {
                link.pending_candidates.push_back(IceCandidate::new(payload));
                CandidateOutcome::Queued
            }
        }
    }

    /// Re-queue a candidate whose application failed
    ///
    /// Each candidate is attempted at most `MAX_CANDIDATE_ATTEMPTS` times in
    /// total; beyond that it is dropped.
    pub fn requeue_candidate(&mut self, key: &LinkKey, candidate: IceCandidate) -> RequeueOutcome {
        if candidate.attempts >= MAX_CANDIDATE_ATTEMPTS {
            return RequeueOutcome::Dropped;
        }
        match self.links.get_mut(key) {
            Some(link) if link.state != LinkState::Closed => {
                link.pending_candidates.push_back(candidate);
                RequeueOutcome::Requeued
            }
            _ => RequeueOutcome::Dropped,
        }
    }

    /// Take the queued candidates of a link whose remote description is set
    ///
    /// Counts one application attempt per returned candidate.
    pub fn take_ready_candidates(&mut self, key: &LinkKey) -> Vec<IceCandidate> {
        match self.links.get_mut(key) {
            Some(link) if link.remote_description_set && link.state != LinkState::Closed => {
                link.flush()
            }
            _ => Vec::new(),
        }
    }

    /// Close one link (terminal); its queued candidates are dropped
    ///
    /// # Returns
    ///
    /// `true` if the link existed and was open
    pub fn close_link(&mut self, key: &LinkKey) -> bool {
        match self.links.get_mut(key) {
            Some(link) if link.state != LinkState::Closed => {
                link.state = LinkState::Closed;
                link.remote_description_set = false;
                link.pending_candidates.clear();
                true
            }
            _ => false,
        }
    }

    /// Close both links towards a remote peer (it left the room)
    ///
    /// # Returns
    ///
    /// Number of links that were open
    pub fn close_remote(&mut self, remote: &str) -> usize {
        let camera = self.close_link(&LinkKey::camera(remote));
        let screen = self.close_link(&LinkKey::screen(remote));
        usize::from(camera) + usize::from(screen)
    }
}
