//! ScriptScan local app.
//!
//! A single-user HTTP front end: upload, analyze, and paint results while
//! drug images resolve in the background.

pub mod analysis;
pub mod api;
pub mod health_api;
pub mod server;
pub mod session;
pub mod ui;

pub use analysis::{analyze, complete_analysis};
pub use server::{GatewayState, build_router, start_server};
pub use session::{AnalysisTicket, Session, SessionError, SessionSnapshot};
