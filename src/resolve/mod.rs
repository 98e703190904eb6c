//! Resolve Module
//!
//! Request-to-target resolution: parses a request path, resolves the final
//! size and quality against the policy, and derives the cache location.
//! Everything here is synchronous and side-effect free apart from
//! [`locator::prepare`].

pub mod locator;
pub mod policy;
pub mod quality;
pub mod request;
pub mod size;
mod target;


// Re-export public types
pub use policy::Policy;
pub use request::ParsedRequest;
pub use size::Dimensions;
pub use target::ResolvedTarget;

use crate::error::Result;

/// Resolves a parsed request against the source's native size.
///
/// Size is resolved before quality, so a request failing both checks reports
/// `InvalidSize`.
pub fn resolve_target(
    request: &ParsedRequest,
    native: Dimensions,
    policy: &Policy,
) -> Result<ResolvedTarget> {
    let requested = request.requested_size();
    let size = size::resolve(requested, native, policy)?;
    let quality = quality::resolve(request.requested_quality, policy)?;
    ResolvedTarget::new(size, quality)
}
