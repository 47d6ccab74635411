pub mod comments;
pub mod feed;
pub mod friends;
pub mod identity;
pub mod media;
pub mod posts;
pub mod users;
pub mod visibility;
