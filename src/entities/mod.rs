//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Table and column names follow the existing Artiverse schema; Rust names are English.

pub mod follow;
pub mod friend_request;
pub mod friendship;
pub mod notification;
pub mod password_reset_token;
pub mod post;
pub mod profile;
pub mod report;
pub mod request_status;
pub mod user;

// Re-export specific types to avoid conflicts
pub use follow::{Column as FollowColumn, Entity as Follow, Model as FollowModel};
pub use friend_request::{
    Column as FriendRequestColumn, Entity as FriendRequest, Model as FriendRequestModel,
};
pub use friendship::{Column as FriendshipColumn, Entity as Friendship, Model as FriendshipModel};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
    NotificationKind,
};
pub use password_reset_token::{
    Column as PasswordResetTokenColumn, Entity as PasswordResetToken,
    Model as PasswordResetTokenModel,
};
pub use post::{Column as PostColumn, Entity as Post, Model as PostModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use report::{Column as ReportColumn, Entity as Report, Model as ReportModel};
pub use request_status::RequestStatus;
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
