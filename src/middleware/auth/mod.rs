pub mod area_guard;
pub mod session;
