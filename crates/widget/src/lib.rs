//! Saved cart checkout widget.
//!
//! Lets a signed-in buyer pick lines from the live checkout cart and from a
//! previously saved cart, and store the combined selection for later.
//!
//! The widget is split into a pure state machine ([`WidgetState`]) that turns
//! messages into effects, and a runtime ([`CheckoutWidget`]) that executes
//! those effects against two injected seams: a [`SessionTokenProvider`] and a
//! [`CartStoreClient`].
//!
//! ```text
//! Unresolved --customer--> Loading --fetched--> Ready --save--> Saved | Failed
//!                                                 ^                    |
//!                                                 +------ 4s reset ----+
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod banner;
pub mod client;
pub mod config;
pub mod reconcile;
pub mod runtime;
pub mod state;
pub mod timer;

pub use banner::{Banner, BannerStatus, BannerTitle};
pub use client::{
    CartStoreClient, ClientError, HttpCartStoreClient, SessionToken, SessionTokenProvider,
};
pub use config::{ConfigError, WidgetConfig};
pub use reconcile::merge_selection;
pub use runtime::CheckoutWidget;
pub use state::{ChecklistItem, Effect, FormView, Msg, Phase, SaveButton, WidgetState, WidgetView};
pub use timer::ResetTimer;
