//! Interactive rendering for real-time exploration.
//!
//! The controller follows the ports & adapters pattern:
//! - **Input**: [`Explorer`] turns user input into `RenderRequest` snapshots
//! - **Output**: [`PresenterPort`] receives completed frames and render errors
//! - **Core**: domain actions from `core/` do the actual computation

pub mod animation;
pub mod controller;
pub mod data;
pub mod errors;
pub mod events;
pub mod explorer;
pub mod frame_store;
pub mod ports;

pub use controller::{ControllerSettings, InteractiveController, RenderState};
pub use data::frame_data::FrameData;
pub use data::render_request::RenderRequest;
pub use events::render_event::RenderEvent;
pub use explorer::{Explorer, ExplorerError, ExplorerInfo};
pub use frame_store::FrameStore;
pub use ports::presenter_port::PresenterPort;
