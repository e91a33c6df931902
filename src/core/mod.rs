//! # Core Selection Logic
//!
//! Nothing here touches the terminal, stdin, or stdout.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          CORE           │
//!                    │      (this module)      │
//!                    │                         │
//!                    │  • key       bytes→key  │
//!                    │  • selection  index     │
//!                    │  • table     rows/cells │
//!                    │  • messages  strings    │
//!                    │  • config    settings   │
//!                    └───────────┬─────────────┘
//!                                │
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (crossterm)│
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`key`]: decode raw input chunks into `KeyEvent`s
//! - [`selection`]: `SelectionState`, rows plus the bounded index
//! - [`table`]: `Row`, `Cell`, `StylePair`
//! - [`messages`]: `TextProvider` for on-screen strings
//! - [`config`]: `~/.tablepick/config.toml` and override resolution

pub mod config;
pub mod key;
pub mod messages;
pub mod selection;
pub mod table;
