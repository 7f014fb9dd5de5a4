//! Derangement generation for the draw.

use crate::error::AppError;
use crate::protocol::{AssignmentPair, Participant};
use rand::seq::SliceRandom;

/// Retry cap for rejection sampling. A uniform permutation is a derangement
/// with probability ~1/e, so the expected attempt count is ~2.7 regardless
/// of group size; the cap only matters if the RNG misbehaves.
const MAX_ATTEMPTS: usize = 2000;

/// Produce a no-fixed-point bijection over the participants' ids.
///
/// Samples uniform permutations (Fisher-Yates) and rejects any with a
/// self-match, which keeps the accepted mapping unbiased over all
/// derangements. Fails for fewer than two participants: the single
/// permutation of one element is always a fixed point.
pub fn generate_mapping(participants: &[Participant]) -> Result<Vec<AssignmentPair>, AppError> {
    if participants.len() < 2 {
        return Err(AppError::CouldNotGenerateMapping);
    }

    let mut rng = rand::thread_rng();
    let mut shuffled: Vec<&Participant> = participants.iter().collect();

    for _ in 0..MAX_ATTEMPTS {
        shuffled.shuffle(&mut rng);

        let deranged = participants
            .iter()
            .zip(shuffled.iter())
            .all(|(from, to)| from.id != to.id);

        if deranged {
            return Ok(participants
                .iter()
                .zip(shuffled.iter())
                .map(|(from, to)| AssignmentPair {
                    from: from.id.clone(),
                    to: to.id.clone(),
                })
                .collect());
        }
    }

    Err(AppError::CouldNotGenerateMapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn participants(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant {
                id: format!("p{i}"),
                name: format!("Person {i}"),
                is_admin: i == 0,
                conn: None,
            })
            .collect()
    }

    #[test]
    fn mapping_is_a_derangement_for_all_small_sizes() {
        for n in 2..=10 {
            let group = participants(n);
            for _ in 0..200 {
                let mapping = generate_mapping(&group).unwrap();
                assert_eq!(mapping.len(), n);

                let froms: BTreeSet<_> = mapping.iter().map(|p| p.from.as_str()).collect();
                let tos: BTreeSet<_> = mapping.iter().map(|p| p.to.as_str()).collect();
                let ids: BTreeSet<_> = group.iter().map(|p| p.id.as_str()).collect();
                assert_eq!(froms, ids, "every participant gives exactly once");
                assert_eq!(tos, ids, "every participant receives exactly once");

                for pair in &mapping {
                    assert_ne!(pair.from, pair.to, "no self-match allowed");
                }
            }
        }
    }

    #[test]
    fn rejects_fewer_than_two_participants() {
        assert!(matches!(
            generate_mapping(&participants(0)),
            Err(AppError::CouldNotGenerateMapping)
        ));
        assert!(matches!(
            generate_mapping(&participants(1)),
            Err(AppError::CouldNotGenerateMapping)
        ));
    }

    #[test]
    fn two_participants_always_swap() {
        let group = participants(2);
        let mapping = generate_mapping(&group).unwrap();
        assert_eq!(mapping[0].from, "p0");
        assert_eq!(mapping[0].to, "p1");
        assert_eq!(mapping[1].from, "p1");
        assert_eq!(mapping[1].to, "p0");
    }

    #[test]
    fn output_varies_across_runs() {
        // n=5 has 44 derangements; 100 draws landing on one of them would
        // indicate a broken shuffle.
        let group = participants(5);
        let distinct: BTreeSet<Vec<String>> = (0..100)
            .map(|_| {
                generate_mapping(&group)
                    .unwrap()
                    .into_iter()
                    .map(|pair| pair.to)
                    .collect()
            })
            .collect();
        assert!(distinct.len() > 1);
    }
}
