//! Force-directed coupling graph on an HTML canvas.
//!
//! A [`Stage`] holds the loaded [`GraphSession`] (graph, interaction state,
//! layout) and the [`Viewport`] camera. [`CouplingGraphCanvas`] draws it and
//! feeds pointer events back through the interaction handlers; page controls
//! reach the same stage through [`Stage::with_handlers`].
//!
//! ```ignore
//! let stage = Stage::shared();
//! let load = stage.borrow_mut().load(GraphSession::new(graph, PageOptions::graph_view(), colors));
//! run_layout(&stage, load);
//!
//! view! { <CouplingGraphCanvas stage=stage tooltip=tooltip_ref /> }
//! ```

mod component;
pub mod layout;
mod render;
pub mod scale;
pub mod state;
pub mod theme;
mod tooltip;

pub use component::{CouplingGraphCanvas, SharedStage, Stage, run_layout};
pub use state::{GraphSession, Viewport};
pub use theme::Theme;
