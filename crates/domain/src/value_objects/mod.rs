//! Value objects for the response cache domain

mod prompt_type;
mod request_context;
mod season;
mod strategy;
mod user_context;
mod user_id;

pub use prompt_type::PromptType;
pub use request_context::RequestContext;
pub use season::{Season, week_bucket};
pub use strategy::{CacheStrategy, ItemGranularity};
pub use user_context::{SeasonalContext, StylePreferences, UserContext, WardrobeEvolution};
pub use user_id::UserId;
