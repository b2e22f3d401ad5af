/*
 * Responsibility
 * - Domain logic behind the handlers
 *   - access: roles, protected areas, route guard
 *   - identity: who is calling (session token -> principal)
 *   - download: purchase-gated download authorization
 *   - storage: signed URL minting
 */
pub mod access;
pub mod download;
pub mod identity;
pub mod storage;
