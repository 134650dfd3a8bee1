use rstest::rstest;
use std::sync::Mutex;
use todo_client::{ApiResult, ClientError, NoticeKind, SyncState, TaskClient, TodoApi};
use todo_core::{Task, TaskId, TaskPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    List,
    Create(String),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
}

/// In-memory stand-in for the server. While `offline`, every call fails
/// with a 500 after being recorded.
#[derive(Default)]
struct FakeServer {
    tasks: Mutex<Vec<Task>>,
    offline: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl FakeServer {
    fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn stored(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        if *self.offline.lock().unwrap() {
            return Err(ClientError::Api {
                status: 500,
                message: "Error updating todo".to_string(),
            });
        }
        Ok(())
    }

    fn not_found() -> ClientError {
        ClientError::Api {
            status: 404,
            message: "Todo not found".to_string(),
        }
    }
}

impl TodoApi for &FakeServer {
    async fn list(&self) -> ApiResult<Vec<Task>> {
        self.record(Call::List)?;
        Ok(self.stored())
    }

    async fn create(&self, text: &str) -> ApiResult<Task> {
        self.record(Call::Create(text.to_string()))?;
        let task = Task::new(text);
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiResult<Task> {
        self.record(Call::Update(id, patch.clone()))?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(FakeServer::not_found)?;
        task.apply(patch);
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> ApiResult<Task> {
        self.record(Call::Delete(id))?;
        let mut tasks = self.tasks.lock().unwrap();
        let position = tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(FakeServer::not_found)?;
        Ok(tasks.remove(position))
    }
}

fn task(text: &str, completed: bool) -> Task {
    let mut task = Task::new(text);
    task.completed = completed;
    task
}

async fn loaded(server: &FakeServer) -> TaskClient<&FakeServer> {
    let mut client = TaskClient::new(server);
    assert!(client.load().await);
    client
}

#[tokio::test]
async fn load_empty_then_add_appends_server_record() {
    let server = FakeServer::default();
    let mut client = loaded(&server).await;
    assert!(client.tasks().is_empty());

    assert!(client.add("Buy milk").await);

    let tasks = client.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task.task, "Buy milk");
    assert!(!tasks[0].task.completed);
    assert_eq!(tasks[0].task.id, server.stored()[0].id);
    assert_eq!(tasks[0].sync_state(), SyncState::Synced);
}

#[tokio::test]
async fn load_replaces_local_list_wholesale() {
    let server = FakeServer::with_tasks(vec![task("a", false), task("b", true)]);
    let mut client = loaded(&server).await;
    server.tasks.lock().unwrap().remove(0);

    assert!(client.load().await);

    let texts: Vec<&str> = client.tasks().iter().map(|l| l.task.task.as_str()).collect();
    assert_eq!(texts, vec!["b"]);
}

#[tokio::test]
async fn load_failure_leaves_list_empty_and_notifies() {
    let server = FakeServer::with_tasks(vec![task("a", false)]);
    let mut client = loaded(&server).await;
    server.set_offline(true);

    assert!(!client.load().await);

    assert!(client.tasks().is_empty());
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::LoadFailed);
    assert!(client.notices().is_empty());
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
#[tokio::test]
async fn add_blank_text_issues_no_request(#[case] text: &str) {
    let server = FakeServer::default();
    let mut client = loaded(&server).await;

    assert!(!client.add(text).await);

    assert_eq!(server.calls(), vec![Call::List]);
    assert!(client.tasks().is_empty());
}

#[tokio::test]
async fn add_sends_trimmed_text() {
    let server = FakeServer::default();
    let mut client = loaded(&server).await;

    client.add("  walk dog ").await;

    assert_eq!(server.calls()[1], Call::Create("walk dog".to_string()));
}

#[tokio::test]
async fn add_failure_adds_nothing_and_notifies() {
    let server = FakeServer::default();
    let mut client = loaded(&server).await;
    server.set_offline(true);

    assert!(!client.add("Buy milk").await);

    assert!(client.tasks().is_empty());
    assert_eq!(client.notices()[0].kind, NoticeKind::AddFailed);
}

#[tokio::test]
async fn toggle_success_keeps_negated_value_and_sends_only_completed() {
    let original = task("laundry", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    assert!(client.toggle_complete(id).await);

    assert!(client.get(id).unwrap().task.completed);
    assert_eq!(client.get(id).unwrap().sync_state(), SyncState::Synced);
    assert_eq!(server.calls()[1], Call::Update(id, TaskPatch::completed(true)));
    assert!(server.stored()[0].completed);
}

#[tokio::test]
async fn toggle_failure_restores_prior_value() {
    let original = task("laundry", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;
    server.set_offline(true);

    assert!(!client.toggle_complete(id).await);

    let local = client.get(id).unwrap();
    assert!(!local.task.completed);
    assert_eq!(local.sync_state(), SyncState::Synced);
    assert_eq!(client.notices()[0].kind, NoticeKind::ToggleFailed);
}

#[tokio::test]
async fn toggle_on_completed_task_sends_false() {
    let original = task("done already", true);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    client.toggle_complete(id).await;

    assert_eq!(server.calls()[1], Call::Update(id, TaskPatch::completed(false)));
    assert!(!client.get(id).unwrap().task.completed);
}

#[tokio::test]
async fn toggle_unknown_task_is_reported_without_request() {
    let server = FakeServer::default();
    let mut client = loaded(&server).await;

    assert!(!client.toggle_complete(TaskId::new_v4()).await);

    assert_eq!(server.calls(), vec![Call::List]);
    assert_eq!(client.notices()[0].kind, NoticeKind::UnknownTask);
}

#[tokio::test]
async fn mutation_is_pending_until_settled() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original.clone()]);
    let mut client = loaded(&server).await;

    let mutation = client.begin_toggle(id).unwrap();
    assert_eq!(client.get(id).unwrap().sync_state(), SyncState::Pending);
    assert!(client.get(id).unwrap().task.completed);

    let mut confirmed = original;
    confirmed.completed = true;
    client.settle(mutation, Ok(confirmed));
    assert_eq!(client.get(id).unwrap().sync_state(), SyncState::Synced);
}

#[tokio::test]
async fn edit_success_writes_text_and_exits_edit_mode() {
    let original = task("A", true);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    assert!(client.begin_editing(id));
    assert_eq!(client.editing().unwrap().draft, "A");
    client.set_draft("B");
    assert!(client.commit_edit().await);

    let local = client.get(id).unwrap();
    assert_eq!(local.task.task, "B");
    assert!(local.task.completed);
    assert!(client.editing().is_none());
    assert_eq!(server.calls()[1], Call::Update(id, TaskPatch::text("B")));
}

#[tokio::test]
async fn edit_failure_restores_prior_text_and_keeps_attempt_in_edit_mode() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;
    server.set_offline(true);

    assert!(!client.edit_task(id, "B").await);

    assert_eq!(client.get(id).unwrap().task.task, "A");
    let edit = client.editing().unwrap();
    assert_eq!(edit.id, id);
    assert_eq!(edit.draft, "B");
    assert_eq!(client.notices()[0].kind, NoticeKind::EditFailed);
}

#[rstest]
#[case("")]
#[case("    ")]
#[tokio::test]
async fn edit_blank_text_notifies_and_issues_no_request(#[case] text: &str) {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;
    client.begin_editing(id);
    client.set_draft(text);

    assert!(!client.commit_edit().await);

    assert_eq!(server.calls(), vec![Call::List]);
    assert_eq!(client.get(id).unwrap().task.task, "A");
    assert_eq!(client.notices()[0].kind, NoticeKind::InvalidInput);
    assert_eq!(client.editing().unwrap().draft, text);
}

#[tokio::test]
async fn cancel_editing_discards_draft() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    client.begin_editing(id);
    client.set_draft("B");
    client.cancel_editing();

    assert!(client.editing().is_none());
    assert!(!client.commit_edit().await);
    assert_eq!(client.get(id).unwrap().task.task, "A");
}

#[tokio::test]
async fn delete_removes_locally_and_on_server() {
    let keep = task("keep", false);
    let doomed = task("drop", false);
    let drop_id = doomed.id;
    let server = FakeServer::with_tasks(vec![keep.clone(), doomed]);
    let mut client = loaded(&server).await;

    assert!(client.delete(drop_id).await);

    assert!(client.get(drop_id).is_none());
    assert_eq!(server.stored(), vec![keep]);
}

// Deletes are fire-and-forget: unlike toggle and edit, a rejected delete
// leaves the task removed from the local list.
#[tokio::test]
async fn delete_failure_is_reported_but_not_rolled_back() {
    let original = task("stubborn", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;
    server.set_offline(true);

    assert!(!client.delete(id).await);

    assert!(client.get(id).is_none());
    assert_eq!(client.notices()[0].kind, NoticeKind::DeleteFailed);
    assert_eq!(server.stored().len(), 1);
}

#[tokio::test]
async fn delete_closes_edit_mode_for_that_task() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;
    client.begin_editing(id);

    client.delete(id).await;

    assert!(client.editing().is_none());
}

// Rollback restores the snapshot taken when the first edit began, so it
// overwrites a later edit that the server already accepted.
#[tokio::test]
async fn overlapping_edits_rollback_clobbers_later_value() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original.clone()]);
    let mut client = loaded(&server).await;

    let first = client.begin_edit(id, "B").unwrap();
    let second = client.begin_edit(id, "C").unwrap();
    assert_eq!(client.get(id).unwrap().task.task, "C");

    let mut confirmed = original;
    confirmed.task = "C".to_string();
    client.settle(second, Ok(confirmed));
    assert_eq!(client.get(id).unwrap().sync_state(), SyncState::Pending);

    client.settle(
        first,
        Err(ClientError::Api {
            status: 500,
            message: "Error updating todo".to_string(),
        }),
    );

    let local = client.get(id).unwrap();
    assert_eq!(local.task.task, "A");
    assert_eq!(local.sync_state(), SyncState::Synced);
}

#[tokio::test]
async fn overlapping_toggles_rollback_uses_each_snapshot() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    let first = client.begin_toggle(id).unwrap();
    let second = client.begin_toggle(id).unwrap();
    assert!(!client.get(id).unwrap().task.completed);

    let failure = || ClientError::Api {
        status: 503,
        message: "unavailable".to_string(),
    };
    client.settle(first, Err(failure()));
    assert!(!client.get(id).unwrap().task.completed);
    client.settle(second, Err(failure()));
    assert!(client.get(id).unwrap().task.completed);
}

#[tokio::test]
async fn settle_after_delete_is_ignored() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    let mutation = client.begin_toggle(id).unwrap();
    client.delete(id).await;
    client.settle(
        mutation,
        Err(ClientError::MalformedResponse("late".to_string())),
    );

    assert!(client.tasks().is_empty());
    assert!(client.notices().is_empty());
}

#[tokio::test]
async fn edit_failure_keeps_exact_typed_text_in_edit_mode() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;
    server.set_offline(true);

    assert!(!client.edit_task(id, "  B  ").await);

    assert_eq!(server.calls()[1], Call::Update(id, TaskPatch::text("B")));
    assert_eq!(client.editing().unwrap().draft, "  B  ");
}

#[tokio::test]
async fn late_edit_failure_leaves_draft_of_other_task_alone() {
    let first = task("X", false);
    let second = task("Y", false);
    let (x, y) = (first.id, second.id);
    let server = FakeServer::with_tasks(vec![first, second]);
    let mut client = loaded(&server).await;

    let pending = client.begin_edit(y, "Y2").unwrap();
    assert!(client.begin_editing(x));
    client.set_draft("typed for X");
    client.settle(
        pending,
        Err(ClientError::Api {
            status: 500,
            message: "Error updating todo".to_string(),
        }),
    );

    assert_eq!(client.get(y).unwrap().task.task, "Y");
    let edit = client.editing().unwrap();
    assert_eq!(edit.id, x);
    assert_eq!(edit.draft, "typed for X");
    assert_eq!(client.notices()[0].kind, NoticeKind::EditFailed);
}

#[tokio::test]
async fn late_edit_failure_keeps_newer_draft_of_same_task() {
    let original = task("X", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    let pending = client.begin_edit(id, "X2").unwrap();
    assert!(client.begin_editing(id));
    client.set_draft("X3 still typing");
    client.settle(
        pending,
        Err(ClientError::MalformedResponse("late".to_string())),
    );

    assert_eq!(client.get(id).unwrap().task.task, "X");
    assert_eq!(client.editing().unwrap().draft, "X3 still typing");
}

#[tokio::test]
async fn late_edit_success_keeps_newer_draft_of_same_task() {
    let original = task("X", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original.clone()]);
    let mut client = loaded(&server).await;

    let pending = client.begin_edit(id, "X2").unwrap();
    assert!(client.begin_editing(id));
    client.set_draft("X3 still typing");

    let mut confirmed = original;
    confirmed.task = "X2".to_string();
    client.settle(pending, Ok(confirmed));

    assert_eq!(client.get(id).unwrap().task.task, "X2");
    let edit = client.editing().unwrap();
    assert_eq!(edit.id, id);
    assert_eq!(edit.draft, "X3 still typing");
}

#[tokio::test]
async fn committed_draft_with_padding_closes_edit_mode_on_success() {
    let original = task("A", false);
    let id = original.id;
    let server = FakeServer::with_tasks(vec![original]);
    let mut client = loaded(&server).await;

    client.begin_editing(id);
    client.set_draft(" B ");
    assert!(client.commit_edit().await);

    assert_eq!(client.get(id).unwrap().task.task, "B");
    assert!(client.editing().is_none());
}
