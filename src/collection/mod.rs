pub mod proxy;
pub mod retry;
