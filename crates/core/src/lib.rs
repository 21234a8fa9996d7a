//! snapcmd: element and region selection for the SnapCommand screenshot extension
//!
//! This crate is the host-agnostic engine behind the extension's interactive
//! capture modes. It never touches a real DOM: the content script implements
//! the [`Dom`], [`Overlay`] and [`DrawSurface`] seams over `web-sys`, and the
//! tests in this crate use the in-memory doubles from [`testing`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐    raw DOM events     ┌──────────────────────┐
//! │  content script    │ ────────────────────▶ │  SelectionSession    │
//! │  (wasm, web-sys)   │ ◀──────────────────── │  RegionSession       │
//! └────────────────────┘  Disposition +        └──────────┬───────────┘
//!                         Reaction / Outcome              │ Dom / Overlay
//!                                                         ▼
//!                                              classify · highlight ·
//!                                              navigation · popover
//! ```
//!
//! # Example
//!
//! ```ignore
//! use snapcmd::{Config, Point, Reaction, SelectionSession};
//!
//! let mut session = SelectionSession::start(host, &Config::default());
//! session.handle_mouse_move(target.as_ref(), Point::new(120.0, 80.0));
//! let response = session.handle_click(target.as_ref(), Point::new(120.0, 80.0));
//! if let Reaction::ShowPopover(popover) = response.reaction {
//!     render_popover(&popover);
//! }
//! ```

pub mod arbitration;
pub mod config;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod highlight;
pub mod host;
pub mod input;
pub mod navigation;
pub mod popover;
pub mod selector;
pub mod session;
pub mod testing;

pub use arbitration::{Disposition, EventKind, EventOrigin, classify, disposition_for};
pub use config::{Config, DrawConfig, HighlightStyle, PopoverConfig, SelectorConfig};
pub use draw::{DrawFrame, DrawResponse, DrawSurface, RegionOutcome, RegionSession, constrain_square};
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size, Viewport};
pub use highlight::{HighlightEngine, TooltipLabel};
pub use host::{Cursor, Dom, ElementInfo, Overlay};
pub use input::{Key, KeyEvent, MouseButton};
pub use navigation::NavigationHistory;
pub use popover::{AnchorRect, PopoverIntent, anchor_rect};
pub use selector::{COMMON_SELECTORS, SelectorMatch, SelectorPreset};
pub use session::{Mode, Outcome, PopoverState, Reaction, Response, SelectionSession};
