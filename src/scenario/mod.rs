pub mod application;
pub mod composer;
pub mod household;
pub mod progress;
pub mod step_model;
