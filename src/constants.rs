/// Settings key holding the active user id across restarts
pub const SESSION_USER_KEY: &str = "current_user_id";

/// Capacity of the domain event broadcast bus
pub const EVENT_BUS_CAPACITY: usize = 64;

/// Number of rows returned by the recent-expenses query
pub const RECENT_EXPENSES_LIMIT: i64 = 5;

/// Upper bound of the spending progress scale
pub const PROGRESS_MAX: i32 = 100;
