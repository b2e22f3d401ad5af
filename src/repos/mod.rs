/*
 * Responsibility
 * - Read/write access to the content database (orders, products, audit log)
 * - Traits at the seam so services can be exercised with in-memory fakes
 */
pub mod audit_repo;
pub mod error;
pub mod purchase_repo;
