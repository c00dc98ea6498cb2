//! Greedy split of an oversold listing's deficit across sibling listings.
//!
//! Only the two nearest siblings are ever consulted. A deficit larger than
//! their combined stock stays uncovered even when a farther sibling could
//! have supplied it.

/// Upper bound on sibling listings consulted per oversold listing.
pub const MAX_ALTERNATIVES: usize = 2;

/// A sibling listing able to supply stock, ranked by distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub listing_id: i64,
    pub pharmacy_id: i64,
    pub stock: i32,
    pub distance_km: f64,
}

/// A transfer of `amount` units from a sibling listing to the oversold one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub source_listing_id: i64,
    pub source_pharmacy_id: i64,
    pub amount: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub mutations: Vec<Mutation>,
    pub residual_deficit: i32,
}

impl Allocation {
    pub fn is_sufficient(&self) -> bool {
        self.residual_deficit == 0
    }

    pub fn covered(&self) -> i32 {
        self.mutations.iter().map(|m| m.amount).sum()
    }
}

/// Takes from `candidates` in order until `deficit` is covered, reducing each
/// candidate's stock in place.
///
/// Allocations are produced even when the deficit cannot be fully covered;
/// the caller decides whether they are kept.
pub fn allocate(deficit: i32, candidates: &mut [Candidate]) -> Allocation {
    let mut remaining = deficit.max(0);
    let mut mutations = Vec::new();

    for candidate in candidates.iter_mut().take(MAX_ALTERNATIVES) {
        if remaining == 0 {
            break;
        }
        if candidate.stock <= 0 {
            continue;
        }
        let amount = remaining.min(candidate.stock);
        candidate.stock -= amount;
        remaining -= amount;
        mutations.push(Mutation {
            source_listing_id: candidate.listing_id,
            source_pharmacy_id: candidate.pharmacy_id,
            amount,
        });
    }

    Allocation {
        mutations,
        residual_deficit: remaining,
    }
}
