//! IAMF Verification Log Core Library
//!
//! Produces the verification log of an IAMF decoder run: a text trace of
//! every parsed OBU, diffable against a reference trace.
//!
//! ## Overview
//!
//! The decoder hands each decoded OBU to a [`VlogSession`]. The session
//! renders it into a marker-delimited block of YAML-like lines, buffers it
//! under an emission key, and writes everything when the session closes:
//! container blocks first, then OBU records, then decoder operations, each
//! category in ascending key order regardless of emission order.
//!
//! ## Quick Start
//!
//! ```ignore
//! use iamf_vlog_core::{Obu, SampleTrim, VlogSession};
//!
//! let mut session = VlogSession::default();
//! session.open("decoder.vlog")?;
//!
//! session.emit(&Obu::TemporalDelimiter, SampleTrim::default())?;
//! session.emit(&codec_config, SampleTrim::default())?;
//!
//! session.close()?;
//! ```
//!
//! ## Output
//!
//! ```text
//! #0
//! TemporalDelimiterOBU_0:
//! ##
//! #0
//! CodecConfigOBU_1:
//! - codec_config_id: 0
//!   codec_config:
//!     codec_id: 1332770163
//!     num_samples_per_frame: 960
//!     roll_distance: -4
//! ##
//! ```

pub mod category;
pub mod config;
pub mod diff;
pub mod error;
pub mod line;
pub mod obu;
pub mod record;
pub mod serializer;
pub mod session;
pub mod store;

// Re-exports
pub use category::{Category, DRAIN_ORDER};
pub use config::SessionConfig;
pub use diff::{diff_logs, split_blocks, BlockMismatch, DiffReport};
pub use error::{VlogError, VlogResult};
pub use line::{format_line, TraceBlock};
pub use obu::{FourCc, Obu, ObuKind, SampleTrim};
pub use record::{LogRecord, Payload};
pub use serializer::render_obu;
pub use session::{SharedSession, VlogSession};
pub use store::OrderedLogStore;
