pub mod session;
pub mod task;
pub mod user;

pub use session::Session;
pub use task::{Task, TaskInput, TaskPatch, TaskQuery};
pub use user::{UpdateUser, User, UserView};
