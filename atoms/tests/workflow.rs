use fiscal_atoms::assignments::{self, Status};
use fiscal_atoms::performance::compute_stats;
use fiscal_atoms::reference::load_seed_users;
use fiscal_atoms::{LedgerError, LedgerStore, MemoryStore, ReferenceData};

// Seed users: 1, 2 managers; 3, 4 collaborators; 5, 6 assistants.
// D001 (TVA) and D002 (BIC) belong to manager 1, D003 (HTA) to manager 2.
const MANAGER: u32 = 1;
const OTHER_MANAGER: u32 = 2;
const COLLAB: u32 = 3;
const COLLAB_2: u32 = 4;
const ASSISTANT: u32 = 5;
const ASSISTANT_2: u32 = 6;

fn setup() -> (MemoryStore, ReferenceData) {
    let store = MemoryStore::with_users(load_seed_users(None).unwrap());
    let refs = ReferenceData::embedded().unwrap();
    (store, refs)
}

#[tokio::test]
async fn full_assignment_lifecycle() {
    let (store, refs) = setup();

    let a = assignments::assign(&store, &refs, 1, "D001", COLLAB, MANAGER).await.unwrap();
    assert_eq!((a.task_id, a.dossier_id.as_str(), a.assignee_id, a.status), (1, "D001", COLLAB, Status::Todo));

    let a = assignments::update_status(&store, 1, "D001", "in_progress", COLLAB).await.unwrap();
    assert_eq!(a.status, Status::InProgress);

    let a = assignments::reassign(&store, 1, "D001", ASSISTANT, COLLAB).await.unwrap();
    assert_eq!(a.assignee_id, ASSISTANT);
    assert_eq!(a.status, Status::Todo);

    let a = assignments::update_status(&store, 1, "D001", "done", ASSISTANT).await.unwrap();
    assert_eq!(a.status, Status::Done);

    let stats = compute_stats(&store).await.unwrap();
    let assistant = stats.iter().find(|s| s.user_id == ASSISTANT).unwrap();
    assert_eq!(assistant.total_assigned, 1);
    assert_eq!(assistant.total_done, 1);
    assert_eq!(assistant.completion_rate, 100.0);

    let collab = stats.iter().find(|s| s.user_id == COLLAB).unwrap();
    assert_eq!(collab.total_assigned, 0);
    assert_eq!(collab.completion_rate, 0.0);
}

#[tokio::test]
async fn second_assign_updates_in_place() {
    let (store, refs) = setup();

    let first = assignments::assign(&store, &refs, 1, "D001", COLLAB, MANAGER).await.unwrap();
    assignments::update_status(&store, 1, "D001", "in_progress", COLLAB).await.unwrap();

    let second = assignments::assign(&store, &refs, 1, "D001", COLLAB_2, MANAGER).await.unwrap();

    assert_eq!(store.assignment_count().await, 1);
    assert_eq!(second.assignment_id, first.assignment_id);
    assert_eq!(second.assignee_id, COLLAB_2);
    assert_eq!(second.status, Status::Todo);
}

#[tokio::test]
async fn repeated_assign_never_duplicates() {
    let (store, refs) = setup();

    for round in 0..5 {
        for task_id in [1, 2, 3, 4] {
            let assignee = if round % 2 == 0 { COLLAB } else { ASSISTANT };
            assignments::assign(&store, &refs, task_id, "D001", assignee, MANAGER).await.unwrap();
        }
    }

    assert_eq!(store.assignment_count().await, 4);
    for task_id in [1, 2, 3, 4] {
        let rows: Vec<_> = store
            .list_assignments()
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.task_id == task_id && a.dossier_id == "D001")
            .collect();
        assert_eq!(rows.len(), 1);
    }
}

#[tokio::test]
async fn identical_assign_is_idempotent() {
    let (store, refs) = setup();

    let first = assignments::assign(&store, &refs, 6, "D001", COLLAB, MANAGER).await.unwrap();
    let again = assignments::assign(&store, &refs, 6, "D001", COLLAB, MANAGER).await.unwrap();

    assert_eq!(first, again);
}

#[tokio::test]
async fn non_owning_manager_cannot_assign() {
    let (store, refs) = setup();
    assignments::assign(&store, &refs, 1, "D001", COLLAB, MANAGER).await.unwrap();
    let before = store.list_assignments().await.unwrap();

    let err = assignments::assign(&store, &refs, 1, "D001", COLLAB_2, OTHER_MANAGER)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { user_id: OTHER_MANAGER, .. }));

    let err = assignments::assign(&store, &refs, 2, "D001", COLLAB_2, OTHER_MANAGER)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized { .. }));

    assert_eq!(store.list_assignments().await.unwrap(), before);
}

#[tokio::test]
async fn reassign_by_non_holder_is_not_assigned() {
    let (store, refs) = setup();
    assignments::assign(&store, &refs, 1, "D001", COLLAB, MANAGER).await.unwrap();
    assignments::update_status(&store, 1, "D001", "in_progress", COLLAB).await.unwrap();
    let before = store.list_assignments().await.unwrap();

    for actor in [COLLAB_2, ASSISTANT, MANAGER] {
        let err = assignments::reassign(&store, 1, "D001", ASSISTANT_2, actor).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotAssigned { user_id, .. } if user_id == actor));
    }

    // no row at all for this pair
    let err = assignments::reassign(&store, 2, "D001", ASSISTANT, COLLAB).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotAssigned { task_id: 2, .. }));

    assert_eq!(store.list_assignments().await.unwrap(), before);
}

#[tokio::test]
async fn reassign_always_resets_to_todo() {
    let (store, refs) = setup();

    for (task_id, status) in [(1, "todo"), (2, "in_progress"), (3, "done")] {
        assignments::assign(&store, &refs, task_id, "D001", COLLAB, MANAGER).await.unwrap();
        assignments::update_status(&store, task_id, "D001", status, COLLAB).await.unwrap();

        let a = assignments::reassign(&store, task_id, "D001", ASSISTANT, COLLAB).await.unwrap();
        assert_eq!(a.status, Status::Todo);
    }
}

#[tokio::test]
async fn only_holder_updates_status() {
    let (store, refs) = setup();
    assignments::assign(&store, &refs, 1, "D001", COLLAB, MANAGER).await.unwrap();

    for actor in [MANAGER, COLLAB_2, ASSISTANT] {
        let err = assignments::update_status(&store, 1, "D001", "done", actor).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotAssigned { .. }));
    }

    // after handing over, the previous holder is out too
    assignments::reassign(&store, 1, "D001", ASSISTANT, COLLAB).await.unwrap();
    let err = assignments::update_status(&store, 1, "D001", "done", COLLAB).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotAssigned { .. }));

    let row = store.find_assignment(1, "D001").await.unwrap().unwrap();
    assert_eq!(row.status, Status::Todo);
}

#[tokio::test]
async fn stats_report_zero_for_idle_users() {
    let (store, _refs) = setup();

    let stats = compute_stats(&store).await.unwrap();
    let ids: Vec<u32> = stats.iter().map(|s| s.user_id).collect();
    assert_eq!(ids, vec![COLLAB, COLLAB_2, ASSISTANT, ASSISTANT_2]);
    assert!(stats.iter().all(|s| s.total_assigned == 0 && s.completion_rate == 0.0));
}

#[tokio::test]
async fn work_list_follows_reassignment() {
    let (store, refs) = setup();
    assignments::assign(&store, &refs, 1, "D001", COLLAB, MANAGER).await.unwrap();
    assignments::assign(&store, &refs, 9, "D002", COLLAB, MANAGER).await.unwrap();
    assignments::reassign(&store, 9, "D002", ASSISTANT, COLLAB).await.unwrap();

    let collab = assignments::list_for_user(&store, &refs, COLLAB).await.unwrap();
    assert_eq!(collab.len(), 1);
    assert_eq!(collab[0].dossier_id, "D001");

    let assistant = assignments::list_for_user(&store, &refs, ASSISTANT).await.unwrap();
    assert_eq!(assistant.len(), 1);
    assert_eq!(assistant[0].dossier_title, "Garage Dupont");
    assert_eq!(assistant[0].steps[0].tasks[0].task_id, 9);
}
