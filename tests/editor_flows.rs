//! End-to-end editor flows over a temp storage root and an in-memory remote.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;

use versepad::{AutosaveLoop, Editor, EditorError, Prompt, SongRecord, StorageMode, TabRef};
use versepad_songs::remote::memory::MemoryRemote;

/// Prompt double that records every dialog and answers with a preset choice.
struct RecordingPrompt {
    answer: AtomicBool,
    confirms: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            answer: AtomicBool::new(true),
            confirms: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        })
    }

    fn set_answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl Prompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().push(message.to_string());
        self.answer.load(Ordering::SeqCst)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

struct Fixture {
    _temp: TempDir,
    editor: Arc<Editor>,
    remote: Arc<MemoryRemote>,
    prompt: Arc<RecordingPrompt>,
}

fn fixture() -> Fixture {
    fixture_with_remote(Arc::new(MemoryRemote::new()))
}

fn fixture_with_remote(remote: Arc<MemoryRemote>) -> Fixture {
    let temp = TempDir::new().unwrap();
    let prompt = RecordingPrompt::new();
    let editor = Editor::open_at(temp.path(), "test", remote.clone(), prompt.clone()).unwrap();
    Fixture {
        _temp: temp,
        editor: Arc::new(editor),
        remote,
        prompt,
    }
}

/// Creates a song through the scratch-buffer flow and returns its id.
fn write_song(editor: &Editor, title: &str, content: &str) -> String {
    editor.start_new_content().unwrap();
    editor.notepad().update_title(title);
    editor.notepad().update_content(content);
    editor.upload_to_songs().unwrap().id
}

#[test]
fn upload_rebinds_the_scratch_tab_in_place() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");

    assert_eq!(f.editor.tabs().len(), 1);
    assert_eq!(f.editor.tabs().active_tab().unwrap(), TabRef::song(&id));
    assert!(f.editor.library().get(&id).is_some());
    // The scratch holding slot was cleared.
    f.editor.start_new_content().unwrap();
    assert_eq!(f.editor.notepad().content(), "");
}

#[test]
fn upload_while_a_saved_song_is_active_is_a_caller_bug() {
    let f = fixture();
    write_song(&f.editor, "Tide", "verse one");
    let err = f.editor.upload_to_songs().unwrap_err();
    assert!(matches!(err, EditorError::UploadWhileEditing));
    // No user-facing message for invariant violations.
    assert!(f.prompt.alerts().is_empty());
}

#[test]
fn draft_edits_do_not_bleed_into_the_main_content() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");

    let draft = f.editor.create_draft_from_current().unwrap();
    f.editor.open_draft(&id, &draft.id).unwrap();
    f.editor.notepad().update_content("verse one remix");
    f.editor.save_current_tab().unwrap();

    f.editor.edit_song(&id).unwrap();
    assert_eq!(f.editor.notepad().content(), "verse one");

    let song = f.editor.library().get(&id).unwrap();
    assert_eq!(song.content, "verse one");
    assert_eq!(song.drafts[0].content, "verse one remix");
}

#[test]
fn sixth_draft_is_rejected_with_an_alert() {
    let f = fixture();
    write_song(&f.editor, "Tide", "verse one");

    for _ in 0..5 {
        f.editor.create_draft_from_current().unwrap();
    }
    let err = f.editor.create_draft_from_current().unwrap_err();
    assert!(matches!(err, EditorError::DraftLimit));
    assert_eq!(f.editor.library().songs()[1].drafts.len(), 5);
    assert_eq!(f.prompt.alerts().len(), 1);
}

#[test]
fn deleting_a_draft_closes_its_tab() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");
    let draft = f.editor.create_draft_from_current().unwrap();
    f.editor.open_draft(&id, &draft.id).unwrap();
    assert_eq!(f.editor.tabs().len(), 2);

    f.editor.delete_draft(&id, &draft.id).unwrap();
    assert_eq!(f.editor.tabs().len(), 1);
    // The notepad fell back to the remaining tab's content.
    assert_eq!(f.editor.notepad().content(), "verse one");
}

#[test]
fn save_current_tab_round_trips_through_a_tab_switch() {
    let f = fixture();
    let a = write_song(&f.editor, "A", "alpha");
    let b = write_song(&f.editor, "B", "beta");

    f.editor.edit_song(&a).unwrap();
    f.editor.notepad().update_content("alpha rewritten");
    // Switching saves the outgoing tab before loading the incoming one.
    f.editor.edit_song(&b).unwrap();
    assert_eq!(f.editor.notepad().content(), "beta");

    f.editor.edit_song(&a).unwrap();
    assert_eq!(f.editor.notepad().content(), "alpha rewritten");
}

#[test]
fn has_unsaved_changes_tracks_the_baseline() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");

    f.editor.edit_song(&id).unwrap();
    assert!(!f.editor.has_unsaved_changes());

    f.editor.notepad().update_content("verse one plus");
    assert!(f.editor.has_unsaved_changes());

    f.editor.save_changes().unwrap();
    assert!(!f.editor.has_unsaved_changes());
}

#[test]
fn revert_restores_the_last_saved_snapshot() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");
    f.editor.edit_song(&id).unwrap();
    f.editor.notepad().update_content("scribbles");

    f.editor.revert_changes().unwrap();
    assert_eq!(f.editor.notepad().content(), "verse one");
    assert!(!f.editor.has_unsaved_changes());
}

#[test]
fn declined_revert_keeps_the_live_buffer() {
    let f = fixture();
    write_song(&f.editor, "Tide", "verse one");
    f.editor.notepad().update_content("scribbles");

    f.prompt.set_answer(false);
    f.editor.revert_changes().unwrap();
    assert_eq!(f.editor.notepad().content(), "scribbles");
}

#[test]
fn start_new_content_twice_keeps_a_single_scratch_tab() {
    let f = fixture();
    let id = write_song(&f.editor, "B", "beta");
    f.editor.edit_song(&id).unwrap();

    f.editor.start_new_content().unwrap();
    f.editor.notepad().update_content("half an idea");
    f.editor.start_new_content().unwrap();

    let scratch_tabs = f
        .editor
        .tabs()
        .tabs()
        .iter()
        .filter(|t| t.is_scratch())
        .count();
    assert_eq!(scratch_tabs, 1);
    // The scratch text survived the second call.
    assert_eq!(f.editor.notepad().content(), "half an idea");
}

#[test]
fn scratch_text_is_stashed_across_tab_switches() {
    let f = fixture();
    let id = write_song(&f.editor, "B", "beta");

    f.editor.start_new_content().unwrap();
    f.editor.notepad().update_content("half an idea");
    f.editor.edit_song(&id).unwrap();
    assert_eq!(f.editor.notepad().content(), "beta");

    f.editor.start_new_content().unwrap();
    assert_eq!(f.editor.notepad().content(), "half an idea");
}

#[test]
fn closing_the_last_tab_resets_the_notepad() {
    let f = fixture();
    write_song(&f.editor, "Tide", "verse one");
    f.editor.close_tab(0).unwrap();

    assert!(f.editor.tabs().is_empty());
    assert_eq!(f.editor.notepad().content(), "");
    assert_eq!(f.editor.notepad().title(), "Untitled");
    assert!(!f.editor.has_unsaved_changes());
}

#[test]
fn remote_mode_never_writes_on_autosave_only_on_manual_save() {
    let remote = Arc::new(MemoryRemote::new());
    remote.seed(SongRecord::new("Cloud Song", "cloud verse"));
    let f = fixture_with_remote(remote);

    f.editor.switch_storage(StorageMode::Remote).unwrap();
    let id = f.editor.library().songs()[0].id.clone();
    f.editor.edit_song(&id).unwrap();
    f.editor.notepad().update_content("cloud verse edited");

    // Two auto-save ticks (ten seconds of editing) in remote mode. The loop
    // is disabled entirely: no remote write, and the collection record is
    // untouched until a manual save.
    f.editor.autosave_tick();
    f.editor.autosave_tick();
    assert_eq!(f.remote.write_count(), 0);
    assert_eq!(f.editor.library().get(&id).unwrap().content, "cloud verse");

    f.editor.save_changes().unwrap();
    assert_eq!(f.remote.write_count(), 1);
    assert_eq!(f.remote.songs()[0].content, "cloud verse edited");
}

#[test]
fn switching_to_remote_without_a_session_is_rejected() {
    let f = fixture_with_remote(Arc::new(MemoryRemote::signed_out()));
    let err = f.editor.switch_storage(StorageMode::Remote).unwrap_err();
    assert!(matches!(err, EditorError::Song(_)));
    assert_eq!(f.editor.library().mode(), StorageMode::Local);
    assert_eq!(f.prompt.alerts().len(), 1);
}

#[test]
fn local_edits_survive_a_round_trip_through_remote_mode() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");
    f.editor.edit_song(&id).unwrap();
    f.editor.notepad().update_content("verse one edited");

    // The outgoing save is debounced; leaving local mode must land it on
    // disk before the write gate starts discarding pending snapshots.
    f.editor.switch_storage(StorageMode::Remote).unwrap();
    f.editor.switch_storage(StorageMode::Local).unwrap();
    assert_eq!(
        f.editor.library().get(&id).unwrap().content,
        "verse one edited"
    );
}

#[test]
fn switching_storage_closes_dangling_tabs() {
    let remote = Arc::new(MemoryRemote::new());
    let f = fixture_with_remote(remote);
    write_song(&f.editor, "Tide", "verse one");
    assert_eq!(f.editor.tabs().len(), 1);

    f.editor.switch_storage(StorageMode::Remote).unwrap();
    // The local song does not exist remotely; its tab was closed.
    assert!(f.editor.tabs().is_empty());
    assert_eq!(f.editor.notepad().content(), "");
}

#[test]
fn failed_remote_delete_rolls_back_and_alerts() {
    let remote = Arc::new(MemoryRemote::new());
    remote.seed(SongRecord::new("Cloud Song", "cloud verse"));
    let f = fixture_with_remote(remote);
    f.editor.switch_storage(StorageMode::Remote).unwrap();
    let id = f.editor.library().songs()[0].id.clone();

    f.remote.fail_deletes(true);
    assert!(f.editor.delete_song(&id).is_err());
    // The song reappeared after rollback + reload.
    assert!(f.editor.library().get(&id).is_some());
    assert_eq!(f.prompt.alerts().len(), 1);
}

#[test]
fn declined_transfer_confirmation_is_a_noop() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");

    f.prompt.set_answer(false);
    f.editor.transfer_song(&id).unwrap();
    assert!(f.remote.songs().is_empty());
}

#[test]
fn transfer_copies_and_leaves_the_source() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");

    f.editor.transfer_song(&id).unwrap();
    assert!(f.editor.library().get(&id).is_some());
    assert_eq!(f.remote.songs().len(), 1);
    assert_eq!(f.remote.songs()[0].content, "verse one");
}

#[test]
fn autosave_loop_saves_the_active_tab_in_local_mode() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");
    f.editor.edit_song(&id).unwrap();
    f.editor.notepad().update_content("verse one, take two");

    let autosave = AutosaveLoop::start_with_interval(f.editor.clone(), Duration::from_millis(30));
    std::thread::sleep(Duration::from_millis(200));
    drop(autosave);

    assert_eq!(
        f.editor.library().get(&id).unwrap().content,
        "verse one, take two"
    );
    assert!(!f.editor.has_unsaved_changes());
}

#[test]
fn empty_scratch_upload_is_rejected_with_a_message() {
    let f = fixture();
    f.editor.start_new_content().unwrap();
    f.editor.notepad().update_content("   \n  ");
    assert!(f.editor.upload_to_songs().is_err());
    assert!(f.editor.tabs().active_tab().unwrap().is_scratch());
    // Validation rejections carry a user-facing message.
    assert_eq!(f.prompt.alerts().len(), 1);
}

#[test]
fn reopen_keeps_unsaved_buffer_edits() {
    let temp = TempDir::new().unwrap();
    let remote = Arc::new(MemoryRemote::new());
    let id;
    {
        let editor = Editor::open_at(
            temp.path(),
            "test",
            remote.clone(),
            RecordingPrompt::new(),
        )
        .unwrap();
        id = write_song(&editor, "Tide", "verse one");
        editor.notepad().update_content("verse one plus an unsaved line");
        editor.flush().unwrap();
    }

    let editor =
        Editor::open_at(temp.path(), "test", remote, RecordingPrompt::new()).unwrap();
    // The buffer carried the edit across the restart; the song itself holds
    // the last-saved content until the user saves or reverts.
    assert_eq!(editor.notepad().content(), "verse one plus an unsaved line");
    assert_eq!(editor.library().get(&id).unwrap().content, "verse one");
    assert!(editor.has_unsaved_changes());

    editor.revert_changes().unwrap();
    assert_eq!(editor.notepad().content(), "verse one");
}

#[test]
fn manual_save_sanitizes_title_and_content() {
    let f = fixture();
    let id = write_song(&f.editor, "Tide", "verse one");
    f.editor.edit_song(&id).unwrap();
    f.editor.notepad().update_title("   ");
    f.editor.notepad().update_content("verse one\r\nverse two");
    f.editor.save_changes().unwrap();

    let song = f.editor.library().get(&id).unwrap();
    assert_eq!(song.title, "Untitled");
    assert_eq!(song.content, "verse one\nverse two");
    assert_eq!(song.line_count, 2);
    assert_eq!(song.word_count, 4);
}
