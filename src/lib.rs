//! FPS Feedback Core
//!
//! Per-frame player feedback for a first-person shooter:
//! - Damage state machine (health, armor, death, respawn invulnerability)
//! - Feedback signal model (screen shake, vignettes, chromatic aberration, knockback)
//! - Player session composing both, with parallel batch ticking
//! - Bevy plugins for ECS hosts, hot-reloadable tuning
//! - FFI bridge for native engine hosts

pub mod bridge;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod feedback;
pub mod hotreload;
pub mod logging;
pub mod math;
pub mod player;
pub mod vitals;

pub use collaborators::{FrameMovement, MovementCollaborator, PresentationCollaborator};
pub use config::{ConfigError, FeedbackConfig, FeedbackCoreConfig, VitalsConfig};
pub use feedback::{FeedbackFrame, FeedbackSignalModel, VignetteSample};
pub use player::{tick_batch, PlayerFeedback, PlayerPlugin};
pub use vitals::{
    DamageEvent, DamageOutcome, DamageStateMachine, DamageType, LifeState, Vitals, VitalsEvent,
    VitalsEventSink,
};
