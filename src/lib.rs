/// Database layer: open, migrate, users, tasks, items, wanted requests.
pub mod db;
/// Data types: User, Task, Item, WantedRequest and their states.
pub mod models;
/// Signed session and flash cookies.
pub mod session;
/// Axum-based web server and router.
pub mod web;
