//! Compile-time Context
//!
//! Capabilities the compilers resolve macros against: a clock for date
//! macros and the caller's effective ACL identity set for identity macros.
//! Both are injected explicitly; nothing in this layer reaches for process
//! globals.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

/// Time source for date macro resolution and audit stamping.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date (no time component).
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant. Deterministic compilation in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The caller's effective ACL identity.
///
/// A caller may act under several ids at once (their user id plus the ids of
/// roles or teams they belong to); the `$userId` macro matches against the
/// whole set.
pub trait AclContext: Send + Sync {
    /// All ids the caller is entitled to act as.
    fn effective_identity_set(&self) -> Vec<String>;
}

/// Fixed identity set resolved ahead of compilation.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    ids: Vec<String>,
}

impl StaticIdentity {
    /// Create an identity set from the caller's resolved ids.
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    /// Single-id convenience constructor.
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
        }
    }
}

impl AclContext for StaticIdentity {
    fn effective_identity_set(&self) -> Vec<String> {
        self.ids.clone()
    }
}

/// Context carried into filter compilation.
#[derive(Clone)]
pub struct CompileContext {
    /// Clock for `$today` and date-offset macros
    pub clock: Arc<dyn Clock>,

    /// ACL identity for the `$userId` macro (None if the caller is not
    /// authenticated; identity macros then fail to resolve)
    pub acl: Option<Arc<dyn AclContext>>,
}

impl CompileContext {
    /// Context with a clock and no identity.
    pub fn anonymous(clock: Arc<dyn Clock>) -> Self {
        Self { clock, acl: None }
    }

    /// Context for an authenticated caller.
    pub fn authenticated(clock: Arc<dyn Clock>, acl: Arc<dyn AclContext>) -> Self {
        Self {
            clock,
            acl: Some(acl),
        }
    }

    /// Current calendar date.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

impl std::fmt::Debug for CompileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileContext")
            .field("today", &self.clock.today())
            .field("has_identity", &self.acl.is_some())
            .finish()
    }
}
