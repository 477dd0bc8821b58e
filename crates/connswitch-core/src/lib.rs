//! connswitch core - switch the active connection string in config files
//!
//! Two strategies:
//! - **Default mode**: copy `ConnectionStrings.<Env>Connection` into a
//!   destination key (`DefaultConnection` unless told otherwise)
//! - **Comment mode** (JSON only): toggle `//` markers so that only the
//!   block whose header comment names the target environment is active
//!
//! # Example
//!
//! ```rust,ignore
//! use connswitch_core::{ConnectionStringEngine, EnvironmentType, SwitchRequest, SwitchMode};
//!
//! # async fn example() -> Result<(), connswitch_core::SwitchError> {
//! let engine = ConnectionStringEngine::default();
//! let request = SwitchRequest::new("appsettings.json", EnvironmentType::Production)
//!     .with_mode(SwitchMode::Comment);
//! let outcome = engine.switch(&request).await?;
//! println!("changed: {}", outcome.changed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod backup;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod handlers;
pub mod line;
pub mod mask;
pub mod request;
pub mod scanner;
pub mod switch;

pub use backup::create_backup;
pub use config::EngineConfig;
pub use engine::{ConnectionStringEngine, SwitchOutcome};
pub use environment::{EnvironmentType, ParseEnvironmentError};
pub use error::{SwitchError, SwitchResult};
pub use handlers::{ConfigFileHandler, ConfigFormat, HandlerRegistry};
pub use line::LineClassifier;
pub use mask::mask_sensitive;
pub use request::SwitchRequest;
pub use scanner::{BlockScanner, ConnectionEntry};
pub use switch::{CommentSwitchReport, ParseModeError, SwitchMode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for callers of the engine
    pub use crate::{
        ConnectionEntry, ConnectionStringEngine, EngineConfig, EnvironmentType, SwitchError,
        SwitchMode, SwitchOutcome, SwitchRequest,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
