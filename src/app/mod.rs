//! Merge UI presentation controller
//!
//! The controller keeps the visible PR list and a merge state per PR number,
//! talking to the gateway only through the host's tool calls. State rules
//! live in [`state`] (pure), host effects in [`controller`], and [`view`]
//! turns both into a render model.

pub mod controller;
pub mod host;
pub mod input;
pub mod state;
pub mod view;

pub use controller::PrListController;
pub use host::{AppHost, HostContext, LogLevel, SafeAreaInsets};
pub use input::{InputPhase, ToolInput, ToolInputs};
pub use state::{FetchTicket, MERGED_REMOVAL_DELAY, MergeRejection, PrListState};
pub use view::{
    Button, ContainerStyle, ListBody, ListView, PrRow, View, format_relative_time, render,
};
