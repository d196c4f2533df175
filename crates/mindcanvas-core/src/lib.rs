#![forbid(unsafe_code)]

//! Mind-map canvas model and interaction (headless).
//!
//! Design goals:
//! - the node tree is an id-keyed arena whose invariants are checked on load and kept by every edit
//! - layouts are pure functions of the tree, so frames and exports are reproducible
//! - no UI toolkit assumptions: pointer input arrives as plain events with logical coordinates

pub mod command;
pub mod config;
pub mod edit;
pub mod error;
pub mod geom;
pub mod history;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod palette;
pub mod seed;
pub mod view;

pub use command::{Command, CommandBus, CommandReceiver, ExportFormat};
pub use config::CanvasConfig;
pub use edit::{Clock, DEFAULT_NODE_TEXT, Deletion, IdGenerator};
pub use error::{EditError, Error, Result, TreeError};
pub use history::History;
pub use interaction::{Interaction, InteractionState, MenuAction, PointerEvent, Reaction, Tool};
pub use layout::{LayoutMode, Positions, compute_positions};
pub use model::{MindMap, Node, NodeStyle, Priority, Shape};
pub use seed::demo_strategy_map;
pub use view::{ViewState, Viewport, hit_test};
