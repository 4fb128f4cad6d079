//! Typed entities stored in Supabase.

pub mod user;

pub use user::{CreateUserRequest, ListUsersQuery, UpdateUserRequest, User, USERS_TABLE};
