pub mod auth_steps;
pub mod board_steps;
pub mod common_steps;
pub mod task_steps;
