pub mod twse;
