pub(crate) mod board_controller;
pub(crate) mod health_check_controller;
pub(crate) mod task_controller;
pub(crate) mod webhook_controller;
