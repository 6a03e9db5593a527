//! # TESSERA
//!
//! The simulation kernel, wired together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              GameLoop                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐  observers  ┌─────────────────┐                    │
//! │  │ tessera_core    │────────────>│ tessera_spatial │                    │
//! │  │                 │             │                 │                    │
//! │  │  • Entities     │             │  • AABB tree    │                    │
//! │  │  • Components   │             │  • ProxySync    │                    │
//! │  │  • Systems      │             └─────────────────┘                    │
//! │  │  • Events       │                                                    │
//! │  └───────┬─────────┘  systems    ┌─────────────────┐                    │
//! │          └──────────────────────>│ tessera_nav     │                    │
//! │          │                       │                 │                    │
//! │          │                       │  • Grid + A*    │                    │
//! │          │                       │  • Following    │                    │
//! │          │                       └─────────────────┘                    │
//! │          │  EventBus (bounded)                                          │
//! │          └──────────────────────> out-of-kernel consumers               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration loaded once at startup
//! - `events`: Outbound world event channel
//! - `game_loop`: Fixed-step driver

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod events;
pub mod game_loop;

// Re-export the kernel units
pub use tessera_core as core;
pub use tessera_nav as nav;
pub use tessera_shared as shared;
pub use tessera_spatial as spatial;

pub use config::{
    ConfigError, ConfigResult, GameLoopConfig, KernelConfig, NavigationConfig, WorldConfig,
};
pub use events::{ChannelObserver, EventBus, EventReceiver, EventSender};
pub use game_loop::{FrameStats, GameLoop, LoopStats, MAX_FRAME_SECONDS};
