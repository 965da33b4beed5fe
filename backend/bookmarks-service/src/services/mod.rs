pub mod activity;
pub mod clock;
pub mod counters;
pub mod feed;
pub mod follow;
pub mod images;
pub mod ranking;
pub mod targets;
pub mod users;

pub use activity::ActivityLogger;
pub use clock::{Clock, ManualClock, SystemClock};
pub use counters::{CounterStore, RedisCounterStore};
pub use feed::ActivityFeed;
pub use follow::FollowService;
pub use images::ImageService;
pub use ranking::{Ranking, ViewCounter};
pub use targets::{TargetRegistry, TargetResolver};
pub use users::UserService;
