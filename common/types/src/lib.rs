pub mod balancer;
pub mod content;
pub mod draft;
pub mod error;
pub mod flag;
pub mod payload;
pub mod session;
pub mod strategy;

pub use balancer::{BalancerStrategy, WeightedVariant, MAX_CALLS};
pub use content::ContentEntity;
pub use draft::{ContentDraft, FlagDraft, StrategyDraft};
pub use error::ValidationError;
pub use flag::Flag;
pub use payload::Payload;
pub use session::{SessionStrategyEntry, SessionStrategyList, DEFAULT_SESSION_ID};
pub use strategy::{RolloutStrategy, CYCLE_LEN};
