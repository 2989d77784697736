pub mod daily;
pub mod realtime;
pub mod report;
pub mod series;
