mod notification;
mod task;

pub use notification::NotificationCommands;
pub use task::TaskCommands;
