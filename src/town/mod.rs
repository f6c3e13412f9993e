//! The town subsystem: one [`TownController`] per live town, registered in a
//! single [`TownsStore`].

pub mod controller;
pub mod store;

pub use controller::TownController;
pub use store::{TownCreateResponse, TownListing, TownsStore};
