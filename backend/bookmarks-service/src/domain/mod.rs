pub mod models;

pub use models::{
    Action, EntityType, FeedEntry, Image, ImageDetail, LikeChange, NewImage,
    TargetRef, TargetSummary, User, UserProfile, UsernameUpdate, MAX_USERNAME_LEN,
    VERB_BOOKMARKED, VERB_FOLLOWING, VERB_LIKES,
};
