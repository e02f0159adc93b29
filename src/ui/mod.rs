//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`map`]: Canvas of sensor markers colored by status, with a popup panel
//! - [`sensors`]: Table of all sensors with latest values and trend sparklines
//! - [`detail`]: Metric cards, history chart and statistics of the selected sensor
//! - [`chart`]: Line chart rendering and the parameter toggle legend
//! - [`common`]: Shared components (header, tabs, status bar, help, confirmation)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (map/sensors/detail::render)         │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - common::render_confirm
//!    - common::render_help
//! ```

pub mod chart;
pub mod common;
pub mod detail;
pub mod map;
pub mod sensors;
pub mod theme;

pub use theme::Theme;
