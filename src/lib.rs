//! Frame-by-frame horizon annotation: display geometry, horizon fitting, the
//! stroke drawing state machine and the ground-truth store.

pub mod config;
pub mod display;
pub mod drawing;
pub mod geometry;
pub mod horizon;
pub mod script;
pub mod session;
pub mod source;
pub mod store;

pub use config::SessionConfig;
pub use horizon::{fit_horizon, HorizonLine, Segment};
pub use session::{KeyCommand, Session, SessionError};
pub use store::{AnnotationRecord, GroundTruthStore, SavePolicy, StoreError};
