use animator::geometry::{self, Ring};
use animator::{
    apply_actions_to_state, initial_state, ActionJournal, AnchorPolicy, CachedFrame, ContentAction,
    ReducerConfig,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CONFIG: ReducerConfig = ReducerConfig {
    drawing_size: [200.0, 100.0],
};

fn square(x: f64, y: f64, size: f64) -> Ring {
    vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size]]
}

fn random_action(rng: &mut ChaCha8Rng) -> ContentAction {
    let polygon = square(
        rng.gen_range(0.0..160.0),
        rng.gen_range(0.0..80.0),
        rng.gen_range(4.0..20.0),
    );
    let frame = rng.gen_range(0..6);
    if rng.gen_bool(0.25) {
        ContentAction::ErasePolygon { polygon, frame }
    } else {
        ContentAction::AddPolygon { polygon, frame }
    }
}

#[test]
fn test_square_on_frame_zero() {
    let actions = [ContentAction::AddPolygon {
        polygon: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
        frame: 0,
    }];
    let state = apply_actions_to_state(&actions, &initial_state(), &CONFIG);

    let frame = &state.frames[&0];
    assert!((frame.area() - 100.0).abs() < 1e-9);
    assert_eq!(frame.merged_polygons.0.len(), 1);
    assert!((geometry::area(&frame.thumbnail) - 100.0).abs() < 2.0);
}

#[test]
fn test_add_then_erase_same_polygon_is_empty() {
    let polygon = vec![[1.0, 1.0], [7.0, 2.0], [6.0, 9.0], [2.0, 6.0]];
    let actions = [
        ContentAction::AddPolygon {
            polygon: polygon.clone(),
            frame: 4,
        },
        ContentAction::ErasePolygon { polygon, frame: 4 },
    ];
    let state = apply_actions_to_state(&actions, &initial_state(), &CONFIG);
    assert!(state.frames[&4].area() < 1e-9);
    assert!(geometry::area(&state.frames[&4].thumbnail) < 1e-9);
}

#[test]
fn test_thumbnail_never_changes_merged_polygons() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let actions: Vec<ContentAction> = (0..30).map(|_| random_action(&mut rng)).collect();
    let state = apply_actions_to_state(&actions, &initial_state(), &CONFIG);

    // Merged polygons equal a fold that never simplifies
    let mut expected = initial_state();
    for action in &actions {
        let (ring, frame, erase) = match action {
            ContentAction::AddPolygon { polygon, frame } => (polygon, *frame, false),
            ContentAction::ErasePolygon { polygon, frame } => (polygon, *frame, true),
        };
        let polygon = geometry::polygon(ring).unwrap();
        let cached = expected.frames.entry(frame).or_insert_with(CachedFrame::empty);
        cached.merged_polygons = if erase {
            geometry::difference(&cached.merged_polygons, polygon)
        } else {
            geometry::union(&cached.merged_polygons, polygon)
        };
    }
    for (index, frame) in &state.frames {
        assert_eq!(frame.merged_polygons, expected.frames[index].merged_polygons);
    }
}

#[test]
fn test_undo_equals_replay_of_truncated_log() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let policy = AnchorPolicy {
        anchor_interval: 4,
        max_anchors: 6,
    };
    let mut journal = ActionJournal::new(CONFIG, policy);
    let mut log = Vec::new();

    for _ in 0..60 {
        // Mostly draw, sometimes undo
        if !log.is_empty() && rng.gen_bool(0.2) {
            journal.pop().unwrap();
            log.pop();
            let replayed = apply_actions_to_state(&log, &initial_state(), &CONFIG);
            assert_eq!(journal.state(), &replayed);
        } else {
            let action = random_action(&mut rng);
            journal.append(action.clone());
            log.push(action);
        }
    }
    assert_eq!(journal.actions(), log.as_slice());
}

#[test]
fn test_frame_fallback_is_constant_between_drawn_frames() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut state = initial_state();
    for _ in 0..12 {
        state.frames.insert(rng.gen_range(1..200), CachedFrame::empty());
    }

    let drawn: Vec<u32> = state.frames.keys().copied().collect();
    for pair in drawn.windows(2) {
        let (f1, f2) = (pair[0], pair[1]);
        for f in f1..f2 {
            assert_eq!(state.find_frame_index(f).unwrap(), f1);
        }
    }
    let last = *drawn.last().unwrap();
    assert_eq!(state.find_frame_index(last + 1000).unwrap(), last);
}
