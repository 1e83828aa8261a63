pub mod extract_service;
pub mod notify_service;
pub mod chart_service;
pub mod check_service;
