pub mod config;
pub mod contract;
pub mod debounce;
pub mod executor;
pub mod input;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod presentation;
pub mod runtime;
pub mod search;
pub mod selection;
