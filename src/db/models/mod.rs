mod surprise_day;

pub use surprise_day::SurpriseDay;
