//! # Polpa Terminal
//!
//! The embeddable terminal layer for Polpa POS: one [`Terminal`] per operator
//! login, owning the live cart and the sale finalizer, with the catalog,
//! register, and sale-store collaborators injected behind traits.
//!
//! ## Module Organization
//! ```text
//! polpa_terminal/
//! ├── lib.rs          ◄─── You are here (crate surface)
//! ├── session.rs      ◄─── Terminal: cart operations, catalog, finalize
//! ├── state.rs        ◄─── CartState: mutex-wrapped live cart
//! ├── context.rs      ◄─── StoreContext: provider handles for one store
//! ├── config.rs       ◄─── TerminalConfig: store identity, currency format
//! ├── error.rs        ◄─── TerminalError { code, message } for UI payloads
//! └── telemetry.rs    ◄─── tracing subscriber setup
//! ```
//!
//! ## Host Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Host Startup                                    │
//! │                                                                         │
//! │  1. telemetry::init_tracing()                                           │
//! │  2. TerminalConfig::from_env()                                          │
//! │  3. Database::new(DbConfig::new(default_database_path()?)).await        │
//! │  4. StoreContext::sqlite(&db, &config.store_id)                         │
//! │  5. Terminal::new(config, store, operator)    ─── one per login         │
//! │  6. hand the Terminal to the UI event loop                              │
//! │                                                                         │
//! │  Every cart operation returns a CartView snapshot the UI re-renders     │
//! │  from; finalize_sale() returns the persisted Sale for the receipt.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::{default_database_path, TerminalConfig};
pub use context::StoreContext;
pub use error::{ErrorCode, TerminalError, TerminalResult};
pub use session::{CartView, Terminal};
pub use state::CartState;
pub use telemetry::init_tracing;
