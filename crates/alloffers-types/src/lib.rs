/// AllOffers shared types.
///
/// Wire DTOs for the directory's JSON endpoints, the fixed DOM contract the
/// server-rendered pages expose, and the patch commands components emit
/// against that contract.

pub mod api;
pub mod dom;
pub mod patch;
