pub mod habit;
pub mod todo;
pub mod user;

pub use habit::{GroupDetail, Habit, HabitGroup, NewGroupRequest, NewHabitRequest};
pub use todo::{NewTodoRequest, Todo, TodoStatus, UpdateTodoRequest};
pub use user::{
    LoginRequest, LoginResponse, PasswordReset, PublicUser, RegisterRequest, ResetConfirmRequest,
    ResetRequest, ResetRequestResponse, UpdateUserRequest, User,
};
