//! Dashboard aggregation engine.
//!
//! Combines the independently-updating budget and expense streams of one
//! user session into a single consistent derived view.

pub mod dashboard_engine;
pub mod dashboard_model;

pub use dashboard_engine::BudgetViewEngine;
pub use dashboard_model::{
    progress_percentage, BudgetView, EnginePhase, EngineSources, GoalBarPosition,
};
