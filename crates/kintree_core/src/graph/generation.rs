//! Generation resolver.
//!
//! # Responsibility
//! - Derive every member's generation number from the relationship
//!   graph by breadth-first propagation from root members.
//!
//! # Invariants
//! - A member is visited at most once; the first-reached depth wins.
//! - Roots are traversed in ascending id order, which makes multi-root
//!   forests deterministic.
//! - Members unreachable from any root (dangling parent references,
//!   disconnected components) fall back to generation 0 instead of
//!   being left undefined.
//! - Never panics on dangling ids; they are treated as absent.

use crate::model::member::{Member, MemberId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Recomputes `generation` for every member in place.
///
/// Returns the ids whose generation actually changed, so callers can
/// limit downstream persistence writes to touched records.
///
/// Idempotent: resolving an already-resolved graph returns an empty
/// change set.
pub fn resolve_generations(members: &mut [Member]) -> Vec<MemberId> {
    let index_by_id: HashMap<MemberId, usize> = members
        .iter()
        .enumerate()
        .map(|(index, member)| (member.id, index))
        .collect();

    let mut roots: Vec<MemberId> = members
        .iter()
        .filter(|member| member.is_root())
        .map(|member| member.id)
        .collect();
    roots.sort_unstable();

    let mut visited: HashSet<MemberId> = HashSet::new();
    let mut changed = Vec::new();

    for root in roots {
        let mut queue: VecDeque<(MemberId, u32)> = VecDeque::new();
        queue.push_back((root, 0));

        while let Some((id, depth)) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let Some(&index) = index_by_id.get(&id) else {
                continue;
            };
            if members[index].generation != depth {
                members[index].generation = depth;
                changed.push(id);
            }

            let child_ids = members[index].children.clone();
            for child_id in child_ids {
                if !visited.contains(&child_id) {
                    queue.push_back((child_id, depth + 1));
                }
            }
            if let Some(spouse_id) = members[index].spouse_id {
                if !visited.contains(&spouse_id) {
                    queue.push_back((spouse_id, depth));
                }
            }
        }
    }

    // Unreachable members still need a defined generation for rendering.
    for member in members.iter_mut() {
        if !visited.contains(&member.id) && member.generation != 0 {
            member.generation = 0;
            changed.push(member.id);
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::resolve_generations;
    use crate::model::member::Member;

    fn member(id: i64, parents: &[i64], children: &[i64], spouse: Option<i64>) -> Member {
        let mut m = Member::new(id, format!("Member {id}"));
        m.parent_ids = parents.to_vec();
        m.children = children.to_vec();
        m.spouse_id = spouse;
        m
    }

    #[test]
    fn chain_gets_increasing_generations() {
        let mut members = vec![
            member(1, &[], &[2], None),
            member(2, &[1], &[3], None),
            member(3, &[2], &[], None),
        ];
        let changed = resolve_generations(&mut members);
        assert_eq!(members[0].generation, 0);
        assert_eq!(members[1].generation, 1);
        assert_eq!(members[2].generation, 2);
        assert_eq!(changed, vec![2, 3]);
    }

    #[test]
    fn spouses_share_the_same_generation() {
        let mut members = vec![
            member(1, &[], &[3], Some(2)),
            member(2, &[], &[3], Some(1)),
            member(3, &[1, 2], &[], None),
        ];
        resolve_generations(&mut members);
        assert_eq!(members[0].generation, 0);
        assert_eq!(members[1].generation, 0);
        assert_eq!(members[2].generation, 1);
    }

    #[test]
    fn resolver_is_idempotent() {
        let mut members = vec![
            member(1, &[], &[2, 3], None),
            member(2, &[1], &[], Some(4)),
            member(3, &[1], &[], None),
            member(4, &[], &[], Some(2)),
        ];
        let first = resolve_generations(&mut members);
        assert!(!first.is_empty() || members.iter().all(|m| m.generation == 0));
        let second = resolve_generations(&mut members);
        assert!(second.is_empty());
    }

    #[test]
    fn dangling_child_reference_does_not_panic() {
        let mut members = vec![member(1, &[], &[42], None)];
        let changed = resolve_generations(&mut members);
        assert!(changed.is_empty());
        assert_eq!(members[0].generation, 0);
    }

    #[test]
    fn unreachable_member_falls_back_to_generation_zero() {
        // Member 2 references a nonexistent parent, so no root reaches it.
        let mut members = vec![member(1, &[], &[], None), member(2, &[99], &[], None)];
        members[1].generation = 5;
        resolve_generations(&mut members);
        assert_eq!(members[1].generation, 0);
    }

    #[test]
    fn first_arrival_wins_for_multi_path_members() {
        // Child of two parents at different depths keeps the depth of
        // the first BFS arrival (root iteration in ascending id order).
        let mut members = vec![
            member(1, &[], &[2], None),
            member(2, &[1], &[4], None),
            member(3, &[], &[4], None),
            member(4, &[2, 3], &[], None),
        ];
        resolve_generations(&mut members);
        // Root 1 reaches 4 at depth 2 before root 3 reaches it at depth 1.
        assert_eq!(members[3].generation, 2);
    }
}
