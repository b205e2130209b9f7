//! Interaction core: transient hover/drag/search state, the reducers that turn
//! it into per-frame appearance, and the handlers that update it.
//!
//! Nothing here touches the DOM. The canvas component feeds
//! [`renderer::RendererEvent`]s in and draws the resulting [`frame::Frame`].

pub mod frame;
pub mod handlers;
pub mod options;
pub mod reducers;
pub mod renderer;
pub mod state;

pub use frame::Frame;
pub use handlers::Handlers;
pub use options::PageOptions;
pub use renderer::{EventOutcome, Renderer, RendererEvent, Tooltip};
pub use state::InteractionState;
