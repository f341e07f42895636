pub mod surprise_day;
