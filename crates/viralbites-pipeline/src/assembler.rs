//! Final assembly of verified places.

use viralbites_core::{Source, VenuePlace};

/// Attaches the discovery citations to every place and moves verified
/// places ahead of unverified ones. The sort is stable, so relative order
/// within each group is unchanged.
#[must_use]
pub fn assemble(mut places: Vec<VenuePlace>, sources: &[Source]) -> Vec<VenuePlace> {
    for place in &mut places {
        place.sources = sources.to_vec();
    }
    places.sort_by_key(|place| !place.verified);
    places
}
