// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod generator;
pub mod ids;
pub mod model;
pub mod ordering;
pub mod protocol;
pub mod state;
pub mod window;

pub use generator::*;
pub use ids::*;
pub use model::*;
pub use ordering::*;
pub use protocol::*;
pub use state::*;
pub use window::*;
