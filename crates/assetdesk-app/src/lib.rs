// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod edit;
pub mod error;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod notify;
pub mod paging;
pub mod session;
pub mod state;
pub mod store;
pub mod table;
pub mod validation;

pub use edit::*;
pub use error::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use notify::*;
pub use paging::*;
pub use session::*;
pub use state::*;
pub use store::*;
pub use table::*;
