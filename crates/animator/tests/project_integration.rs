use animator::{Action, AnchorPolicy, Animator, ContentAction, Project};
use std::fs;
use tempfile::TempDir;

fn project_dir(config: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.json"), config).unwrap();
    dir
}

const CONFIG: &str = r#"{
    "drawing_size": [320, 240],
    "framerate": 12,
    "attribution": {"title": "Walk cycle", "author": "someone"},
    "audio": "audio/track.ogg"
}"#;

#[test]
fn test_open_project() {
    let dir = project_dir(CONFIG);
    let project = Project::open(dir.path()).unwrap();

    assert_eq!(project.config().drawing_size, [320.0, 240.0]);
    assert_eq!(project.config().attribution.title.as_deref(), Some("Walk cycle"));
    assert_eq!(project.audio_path(), Some(dir.path().join("audio/track.ogg")));
    assert_eq!(project.config().max_frame(10.0), 120);

    let journal = project.load_journal(AnchorPolicy::default()).unwrap();
    assert!(journal.is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = project_dir(r#"{"drawing_size": [320, 240], "framerate": -1}"#);
    assert!(Project::open(dir.path()).is_err());

    let dir = project_dir("not json");
    assert!(Project::open(dir.path()).is_err());
}

#[test]
fn test_journal_round_trips_through_actions_file() {
    let dir = project_dir(CONFIG);
    let project = Project::open(dir.path()).unwrap();

    let mut animator = Animator::new(project.load_journal(AnchorPolicy::default()).unwrap(), 120);
    animator
        .apply_all([
            Action::AddPolygon {
                polygon: vec![[0.0, 0.0], [50.0, 0.0], [50.0, 50.0], [0.0, 50.0]],
                frame: 0,
            },
            Action::ErasePolygon {
                polygon: vec![[10.0, 10.0], [20.0, 10.0], [20.0, 20.0], [10.0, 20.0]],
                frame: 0,
            },
            Action::SetFrame { frame: 30 },
        ])
        .unwrap();
    project.save_journal(animator.journal()).unwrap();

    let raw = fs::read_to_string(project.actions_path()).unwrap();
    let saved: Vec<ContentAction> = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved.len(), 2);

    let reloaded = project.load_journal(AnchorPolicy::default()).unwrap();
    assert_eq!(reloaded.actions(), animator.journal().actions());
    assert_eq!(reloaded.state(), animator.state());
    assert!((reloaded.state().frames[&0].area() - 2400.0).abs() < 1e-9);
}
