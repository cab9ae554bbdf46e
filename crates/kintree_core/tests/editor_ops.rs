use kintree_core::{
    EditorError, LayoutMode, Member, NoPersistence, TreeEditor, MAX_PARENTS,
};

fn editor() -> TreeEditor<NoPersistence> {
    TreeEditor::new(NoPersistence, LayoutMode::AutoArrange)
}

/// Checks invariants 1-5: bidirectional parent/child links, spouse
/// symmetry, parent cap, single spouse, shared spouse generations.
fn assert_invariants(members: &[Member]) {
    let get = |id: i64| members.iter().find(|m| m.id == id);
    for member in members {
        assert!(member.parent_ids.len() <= MAX_PARENTS);
        assert!(!member.parent_ids.contains(&member.id));
        for parent_id in &member.parent_ids {
            let parent = get(*parent_id).expect("parent must exist");
            assert!(
                parent.children.contains(&member.id),
                "member {} missing from children of parent {}",
                member.id,
                parent_id
            );
        }
        if let Some(spouse_id) = member.spouse_id {
            let spouse = get(spouse_id).expect("spouse must exist");
            assert_eq!(spouse.spouse_id, Some(member.id), "spouse link asymmetric");
            assert_eq!(
                spouse.generation, member.generation,
                "spouses must share a generation"
            );
        }
    }
}

#[test]
fn new_editor_seeds_one_root_member() {
    let editor = editor();
    let members = editor.members();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "Root Person");
    assert_eq!(members[0].generation, 0);
    assert!(members[0].is_root());
}

#[test]
fn root_child_spouse_scenario() {
    // Single root A; addChild(A) yields B; addSpouse(A) yields C.
    let mut editor = editor();
    let a = editor.members()[0].id;

    let b = editor.add_child(a).unwrap();
    assert_eq!(editor.get(b).unwrap().parent_ids, vec![a]);
    assert_eq!(editor.get(b).unwrap().generation, 1);

    let c = editor.add_spouse(a).unwrap();
    assert_eq!(editor.get(c).unwrap().spouse_id, Some(a));
    assert_eq!(editor.get(a).unwrap().spouse_id, Some(c));
    assert_eq!(editor.get(c).unwrap().generation, 0);
    assert_eq!(editor.get(b).unwrap().parent_ids, vec![a, c]);
    assert!(editor.get(c).unwrap().children.contains(&b));

    assert_invariants(editor.members());
}

#[test]
fn add_child_attaches_to_both_spouses() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let c = editor.add_spouse(a).unwrap();

    let b = editor.add_child(a).unwrap();
    let child = editor.get(b).unwrap();
    assert_eq!(child.parent_ids, vec![a, c]);
    assert!(editor.get(a).unwrap().children.contains(&b));
    assert!(editor.get(c).unwrap().children.contains(&b));
    assert_invariants(editor.members());
}

#[test]
fn add_child_to_missing_parent_fails_not_found() {
    let mut editor = editor();
    assert!(matches!(
        editor.add_child(99).unwrap_err(),
        EditorError::NotFound(99)
    ));
    assert_eq!(editor.members().len(), 1);
}

#[test]
fn add_child_surfaces_a_dangling_spouse_reference() {
    // A hand-edited document can carry a spouse id with no record.
    let mut root = Member::new(1, "A");
    root.spouse_id = Some(99);
    let mut editor =
        TreeEditor::from_members(vec![root], NoPersistence, LayoutMode::AutoArrange);

    assert!(matches!(
        editor.add_child(1).unwrap_err(),
        EditorError::NotFound(99)
    ));
    // Atomic failure: no child created, no links rewritten.
    assert_eq!(editor.members().len(), 1);
    assert!(editor.get(1).unwrap().children.is_empty());
}

#[test]
fn each_added_root_gets_a_distinct_default_name() {
    let mut editor = editor();
    let e = editor.add_root().unwrap();
    let f = editor.add_root().unwrap();

    assert_eq!(editor.members()[0].name, "Root Person");
    assert_eq!(editor.get(e).unwrap().name, "Root 2");
    assert_eq!(editor.get(f).unwrap().name, "Root 3");
}

#[test]
fn add_parent_caps_at_two_parents() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let b = editor.add_child(a).unwrap();

    let p = editor.add_parent(b).unwrap();
    assert_eq!(editor.get(b).unwrap().parent_ids, vec![a, p]);
    assert_invariants(editor.members());

    assert!(matches!(
        editor.add_parent(b).unwrap_err(),
        EditorError::TooManyParents(id) if id == b
    ));
    // The failed call must not have changed anything.
    assert_eq!(editor.get(b).unwrap().parent_ids, vec![a, p]);
}

#[test]
fn add_spouse_rejects_second_marriage() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    editor.add_spouse(a).unwrap();
    assert!(matches!(
        editor.add_spouse(a).unwrap_err(),
        EditorError::AlreadyMarried(id) if id == a
    ));
}

#[test]
fn add_spouse_fails_when_a_shared_child_is_at_parent_cap() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let b = editor.add_child(a).unwrap();
    editor.add_parent(b).unwrap();

    let count_before = editor.members().len();
    assert!(matches!(
        editor.add_spouse(a).unwrap_err(),
        EditorError::TooManyParents(id) if id == b
    ));
    // Atomic failure: no spouse created, no links rewritten.
    assert_eq!(editor.members().len(), count_before);
    assert_eq!(editor.get(a).unwrap().spouse_id, None);
    assert_eq!(editor.get(b).unwrap().parent_ids.len(), 2);
    assert_invariants(editor.members());
}

#[test]
fn delete_child_restores_parent_children() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let before = editor.get(a).unwrap().children.clone();

    let b = editor.add_child(a).unwrap();
    editor.delete_member(b).unwrap();
    assert_eq!(editor.get(a).unwrap().children, before);
    assert_invariants(editor.members());
}

#[test]
fn delete_parent_orphans_children_without_touching_other_parent() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let b = editor.add_child(a).unwrap();
    let p = editor.add_parent(b).unwrap();

    editor.delete_member(p).unwrap();
    assert_eq!(editor.get(b).unwrap().parent_ids, vec![a]);
    assert_invariants(editor.members());
}

#[test]
fn delete_spouse_clears_symmetric_link() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let c = editor.add_spouse(a).unwrap();

    editor.delete_member(c).unwrap();
    assert_eq!(editor.get(a).unwrap().spouse_id, None);
    assert_invariants(editor.members());
}

#[test]
fn last_member_cannot_be_deleted() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    assert!(matches!(
        editor.delete_member(a).unwrap_err(),
        EditorError::LastMember
    ));
    assert_eq!(editor.members().len(), 1);
}

#[test]
fn delete_missing_member_fails_not_found() {
    let mut editor = editor();
    editor.add_root().unwrap();
    assert!(matches!(
        editor.delete_member(77).unwrap_err(),
        EditorError::NotFound(77)
    ));
}

#[test]
fn generations_follow_a_three_level_chain() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let b = editor.add_child(a).unwrap();
    let c = editor.add_child(b).unwrap();
    let d = editor.add_child(c).unwrap();

    assert_eq!(editor.get(a).unwrap().generation, 0);
    assert_eq!(editor.get(b).unwrap().generation, 1);
    assert_eq!(editor.get(c).unwrap().generation, 2);
    assert_eq!(editor.get(d).unwrap().generation, 3);
}

#[test]
fn adding_a_parent_above_the_root_shifts_generations_down() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let b = editor.add_child(a).unwrap();
    let p = editor.add_parent(a).unwrap();

    assert_eq!(editor.get(p).unwrap().generation, 0);
    assert_eq!(editor.get(a).unwrap().generation, 1);
    assert_eq!(editor.get(b).unwrap().generation, 2);
    assert_invariants(editor.members());
}

#[test]
fn rename_trims_and_rejects_blank_names() {
    let mut editor = editor();
    let a = editor.members()[0].id;

    editor.rename_member(a, "  Ada Lovelace  ").unwrap();
    assert_eq!(editor.get(a).unwrap().name, "Ada Lovelace");

    assert!(matches!(
        editor.rename_member(a, "   ").unwrap_err(),
        EditorError::InvalidName
    ));
    assert!(matches!(
        editor.rename_member(99, "Ghost").unwrap_err(),
        EditorError::NotFound(99)
    ));
}

#[test]
fn pinned_position_survives_later_structural_edits() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let b = editor.add_child(a).unwrap();

    editor.reposition_member(b, 640.0, 500.0).unwrap();
    let pinned = editor.get(b).unwrap();
    assert!(pinned.position_pinned);
    assert_eq!((pinned.x, pinned.y), (640.0, 500.0));

    // A structural edit re-runs auto-arrange; the pinned member stays.
    editor.add_child(a).unwrap();
    let pinned = editor.get(b).unwrap();
    assert_eq!((pinned.x, pinned.y), (640.0, 500.0));
}

#[test]
fn incremental_mode_keeps_creation_offsets() {
    let mut editor = TreeEditor::new(NoPersistence, LayoutMode::Incremental);
    let a = editor.members()[0].id;
    let root = editor.get(a).unwrap().clone();

    let b = editor.add_child(a).unwrap();
    let child = editor.get(b).unwrap();
    assert_eq!((child.x, child.y), (root.x, root.y + 150.0));

    let c = editor.add_spouse(a).unwrap();
    let spouse = editor.get(c).unwrap();
    assert_eq!((spouse.x, spouse.y), (root.x + 100.0, root.y));
}

#[test]
fn invariants_hold_after_a_mixed_operation_sequence() {
    let mut editor = editor();
    let a = editor.members()[0].id;
    let b = editor.add_child(a).unwrap();
    let c = editor.add_spouse(a).unwrap();
    let d = editor.add_child(c).unwrap();
    let e = editor.add_root().unwrap();
    editor.add_child(e).unwrap();
    editor.add_parent(e).unwrap();
    editor.rename_member(b, "Heir").unwrap();
    editor.reposition_member(d, 12.0, 34.0).unwrap();
    editor.delete_member(b).unwrap();

    assert_invariants(editor.members());
}
