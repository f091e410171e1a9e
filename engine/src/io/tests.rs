//! End-to-end export tests against a real filesystem

use super::*;
use crate::config::{ConfigError, ExportConfig};
use crate::core::scene::{PanoramaSource, SceneConnection, SceneState, TourScene};
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const EPS: f32 = 1e-4;

type CallbackResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Write a fake panorama and return a file source pointing at it
fn panorama(dir: &TempDir, name: &str, contents: &[u8]) -> PanoramaSource {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    PanoramaSource::File(path)
}

fn lobby_and_hall(assets: &TempDir) -> Vec<SceneState> {
    vec![
        SceneState::new("Lobby", panorama(assets, "lobby.png", b"lobby pixels"))
            .with_link("Hall", Vec3::X),
        SceneState::new("Hall", panorama(assets, "hall.png", b"hall pixels"))
            .with_euler_degrees(Vec3::new(0.0, 90.0, 0.0)),
    ]
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_export_lobby_and_hall() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();

    assert_eq!(tour.first_state_id, "state_0");
    assert_eq!(tour.states.len(), 2);

    let lobby = &tour.states[0];
    assert_eq!(lobby.id, "state_0");
    assert_eq!(lobby.title, "Lobby");
    assert_eq!(lobby.url, "state_0.png");
    assert_eq!(lobby.kind, StateKind::Image);
    assert_eq!(lobby.links.len(), 1);
    assert_eq!(lobby.links[0].id, "state_1");
    assert!(lobby.links[0].f.abs() < EPS);
    assert!((lobby.links[0].o - FRAC_PI_2).abs() < EPS);

    let hall = &tour.states[1];
    assert_eq!(hall.id, "state_1");
    assert_eq!(hall.url, "state_1.png");
    assert!(hall.links.is_empty());
    assert!(hall.rotation.x.abs() < 0.01);
    assert!((hall.rotation.y - 90.0).abs() < 0.01);
    assert!(hall.rotation.z.abs() < 0.01);

    assert_eq!(
        fs::read(destination.path().join("state_0.png")).unwrap(),
        b"lobby pixels"
    );
    assert_eq!(
        fs::read(destination.path().join("state_1.png")).unwrap(),
        b"hall pixels"
    );
}

#[test]
fn test_written_descriptor_matches_result() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();
    let loaded = Tour::load_from_file(destination.path().join("tour.json")).unwrap();

    assert_eq!(loaded, tour);
    assert_eq!(loaded.states.len(), states.len());
    assert_eq!(loaded.first_state_id, "state_0");
    assert_eq!(loaded.states[0].links.len(), 1);
    assert_eq!(loaded.states[1].links.len(), 0);

    let text = fs::read_to_string(destination.path().join("tour.json")).unwrap();
    assert!(!text.contains('\n'));
}

#[test]
fn test_no_temp_files_left_behind() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    export_tour(&states, &states[0], destination.path()).unwrap();

    assert_eq!(
        file_names(destination.path()),
        vec!["state_0.png", "state_1.png", "tour.json"]
    );
}

#[test]
fn test_ids_follow_input_order() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states: Vec<SceneState> = (0..5)
        .map(|i| {
            SceneState::new(
                format!("Room {i}"),
                panorama(&assets, &format!("room{i}.jpg"), b"room"),
            )
        })
        .collect();

    let tour = export_tour(&states, &states[3], destination.path()).unwrap();

    let ids: Vec<&str> = tour.states.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["state_0", "state_1", "state_2", "state_3", "state_4"]);
    assert_eq!(tour.first_state_id, "state_3");
}

#[test]
fn test_empty_states_write_nothing() {
    let destination = TempDir::new().unwrap();
    let initial = SceneState::new("Lobby", PanoramaSource::file("lobby.png"));

    let result = export_tour(&[], &initial, destination.path());

    assert!(matches!(result, Err(ExportError::NoStates)));
    assert!(file_names(destination.path()).is_empty());
}

#[test]
fn test_dangling_connections_are_dropped() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = vec![
        SceneState::new("Lobby", panorama(&assets, "lobby.png", b"lobby"))
            .with_link("Basement", Vec3::NEG_Y)
            .with_connection(SceneConnection {
                destination: None,
                orientation: Quat::IDENTITY,
            })
            .with_link("Hall", Vec3::X),
        SceneState::new("Hall", panorama(&assets, "hall.png", b"hall")),
    ];

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();

    assert_eq!(tour.states[0].links.len(), 1);
    assert_eq!(tour.states[0].links[0].id, "state_1");
}

#[test]
fn test_links_keep_connection_order() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = vec![
        SceneState::new("Hub", panorama(&assets, "hub.jpg", b"hub"))
            .with_link("C", Vec3::NEG_X)
            .with_link("A", Vec3::Y)
            .with_link("B", Vec3::Z),
        SceneState::new("A", panorama(&assets, "a.jpg", b"a")),
        SceneState::new("B", panorama(&assets, "b.jpg", b"b")),
        SceneState::new("C", panorama(&assets, "c.jpg", b"c")),
    ];

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();

    let links = &tour.states[0].links;
    let ids: Vec<&str> = links.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["state_3", "state_1", "state_2"]);

    // +Y: f = pi/2, o = pi/2
    assert!((links[1].f - FRAC_PI_2).abs() < EPS);
    assert!((links[1].o - FRAC_PI_2).abs() < EPS);
    // +Z: o = 0
    assert!(links[2].o.abs() < EPS);
}

#[test]
fn test_link_angles_match_direction() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let direction = Vec3::new(1.0, 2.0, -2.0).normalize();
    let states = vec![
        SceneState::new("A", panorama(&assets, "a.jpg", b"a")).with_link("B", direction),
        SceneState::new("B", panorama(&assets, "b.jpg", b"b")),
    ];

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();

    let link = &tour.states[0].links[0];
    assert!((link.f - direction.y.atan2(direction.x)).abs() < EPS);
    assert!((link.o - direction.z.acos()).abs() < EPS);
}

#[test]
fn test_duplicate_titles_resolve_to_later_state() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = vec![
        SceneState::new("A", panorama(&assets, "a0.jpg", b"first")),
        SceneState::new("A", panorama(&assets, "a1.jpg", b"second")),
        SceneState::new("B", panorama(&assets, "b.jpg", b"b")).with_link("A", Vec3::X),
    ];

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();

    assert_eq!(tour.states.len(), 3);
    assert_eq!(tour.first_state_id, "state_1");
    assert_eq!(tour.states[2].links[0].id, "state_1");
}

#[test]
fn test_missing_initial_state_leaves_first_id_empty() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);
    let elsewhere = SceneState::new("Garden", PanoramaSource::file("garden.png"));

    let tour = export_tour(&states, &elsewhere, destination.path()).unwrap();

    assert_eq!(tour.first_state_id, "");
    assert_eq!(tour.states.len(), 2);
}

#[test]
fn test_missing_asset_aborts_export() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let missing = assets.path().join("missing.png");
    let states = vec![
        SceneState::new("Lobby", panorama(&assets, "lobby.png", b"lobby")),
        SceneState::new("Hall", PanoramaSource::File(missing.clone())),
        SceneState::new("Roof", panorama(&assets, "roof.png", b"roof")),
    ];

    let result = export_tour(&states, &states[0], destination.path());

    match result {
        Err(ExportError::AssetCopy { index, path, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(path, missing);
        }
        other => panic!("expected AssetCopy error, got {other:?}"),
    }
    // Earlier copies stay, nothing after the failure is written
    assert_eq!(file_names(destination.path()), vec!["state_0.png"]);
}

#[test]
fn test_missing_destination_fails_on_first_copy() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let result = export_tour(&states, &states[0], &destination.path().join("not-there"));

    assert!(matches!(result, Err(ExportError::AssetCopy { index: 0, .. })));
}

#[test]
fn test_descriptor_write_failure() {
    let destination = TempDir::new().unwrap();
    fs::create_dir(destination.path().join("tour.json")).unwrap();
    let states = vec![SceneState::new(
        "Lobby",
        PanoramaSource::remote("https://example.com/lobby.jpg"),
    )];

    let result = export_tour(&states, &states[0], destination.path());

    match result {
        Err(ExportError::SerializationWrite { path, .. }) => {
            assert_eq!(path, destination.path().join("tour.json"));
        }
        other => panic!("expected SerializationWrite error, got {other:?}"),
    }
    // Only the pre-existing directory remains, no stray temp file
    assert_eq!(file_names(destination.path()), vec!["tour.json"]);
}

#[test]
fn test_remote_panorama_is_not_copied() {
    let destination = TempDir::new().unwrap();
    let states = vec![SceneState::new(
        "Lobby",
        PanoramaSource::remote("https://example.com/lobby.jpg"),
    )];

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();

    assert_eq!(tour.states[0].url, "https://example.com/lobby.jpg");
    assert_eq!(file_names(destination.path()), vec!["tour.json"]);
}

#[test]
fn test_progress_reports_every_state() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let events = Arc::new(Mutex::new(Vec::<ExportProgress>::new()));
    let sink = events.clone();
    let mut exporter = TourExporter::default().with_progress(Box::new(
        move |progress: ExportProgress| -> CallbackResult {
            sink.lock().unwrap().push(progress);
            Ok(())
        },
    ));

    exporter
        .export(&states, &states[0], destination.path())
        .unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            ExportProgress::Started { total: 2 },
            ExportProgress::Copied {
                completed: 1,
                total: 2
            },
            ExportProgress::Copied {
                completed: 2,
                total: 2
            },
            ExportProgress::Finished,
        ]
    );
}

#[test]
fn test_failing_progress_callback_is_ignored() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let mut exporter = TourExporter::default().with_progress(Box::new(
        |_: ExportProgress| -> CallbackResult {
            Err("progress bar went away".into())
        },
    ));

    let tour = exporter
        .export(&states, &states[0], destination.path())
        .unwrap();
    assert_eq!(tour.states.len(), 2);
}

#[test]
fn test_cancelled_export_stops_before_next_copy() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    let mut exporter = TourExporter::default()
        .with_cancel_flag(cancel)
        .with_progress(Box::new(move |progress: ExportProgress| -> CallbackResult {
            if let ExportProgress::Copied { completed: 1, .. } = progress {
                flag.store(true, std::sync::atomic::Ordering::Relaxed);
            }
            Ok(())
        }));

    let result = exporter.export(&states, &states[0], destination.path());

    assert!(matches!(result, Err(ExportError::Cancelled { completed: 1 })));
    assert_eq!(file_names(destination.path()), vec!["state_0.png"]);
}

#[test]
fn test_overwrite_disabled_rejects_existing_media() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    fs::write(destination.path().join("state_0.png"), b"old").unwrap();
    let states = lobby_and_hall(&assets);

    let config = ExportConfig {
        overwrite_assets: false,
        ..Default::default()
    };
    let result = TourExporter::new(config).export(&states, &states[0], destination.path());

    assert!(matches!(result, Err(ExportError::AssetCopy { index: 0, .. })));
    assert_eq!(
        fs::read(destination.path().join("state_0.png")).unwrap(),
        b"old"
    );
}

#[test]
fn test_reexport_overwrites_by_default() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    fs::write(destination.path().join("state_0.png"), b"old").unwrap();
    let states = lobby_and_hall(&assets);

    export_tour(&states, &states[0], destination.path()).unwrap();
    export_tour(&states, &states[0], destination.path()).unwrap();

    assert_eq!(
        fs::read(destination.path().join("state_0.png")).unwrap(),
        b"lobby pixels"
    );
}

#[test]
fn test_custom_config() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let config = ExportConfig {
        manifest_name: "config.json".to_string(),
        id_prefix: "pano_".to_string(),
        pretty_json: true,
        ..Default::default()
    };
    let tour = TourExporter::new(config)
        .export(&states, &states[0], destination.path())
        .unwrap();

    assert_eq!(tour.first_state_id, "pano_0");
    assert_eq!(tour.states[0].links[0].id, "pano_1");
    let text = fs::read_to_string(destination.path().join("config.json")).unwrap();
    assert!(text.contains('\n'));
    assert_eq!(
        file_names(destination.path()),
        vec!["config.json", "pano_0.png", "pano_1.png"]
    );
}

#[test]
fn test_invalid_config_is_rejected_before_io() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let states = lobby_and_hall(&assets);

    let config = ExportConfig {
        manifest_name: "../tour.json".to_string(),
        ..Default::default()
    };
    let result = TourExporter::new(config).export(&states, &states[0], destination.path());

    assert!(matches!(result, Err(ExportError::Config(_))));
    assert!(file_names(destination.path()).is_empty());
}

#[test]
fn test_id_prefix_cannot_escape_destination() {
    let assets = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let destination = root.path().join("package");
    fs::create_dir(&destination).unwrap();
    let states = lobby_and_hall(&assets);

    let config = ExportConfig {
        id_prefix: "../escaped_".to_string(),
        ..Default::default()
    };
    let result = TourExporter::new(config).export(&states, &states[0], &destination);

    assert!(matches!(
        result,
        Err(ExportError::Config(ConfigError::InvalidIdPrefix(_)))
    ));
    assert!(file_names(&destination).is_empty());
    assert_eq!(file_names(root.path()), vec!["package"]);
}

#[test]
fn test_panorama_already_in_destination_is_kept_intact() {
    let destination = TempDir::new().unwrap();
    let source = panorama(&destination, "state_0.png", b"pixels");
    let states = vec![SceneState::new("Lobby", source)];

    let tour = export_tour(&states, &states[0], destination.path()).unwrap();
    assert_eq!(tour.states[0].url, "state_0.png");
    assert_eq!(
        fs::read(destination.path().join("state_0.png")).unwrap(),
        b"pixels"
    );

    let config = ExportConfig {
        overwrite_assets: false,
        ..Default::default()
    };
    TourExporter::new(config)
        .export(&states, &states[0], destination.path())
        .unwrap();
    assert_eq!(
        fs::read(destination.path().join("state_0.png")).unwrap(),
        b"pixels"
    );
}

#[test]
fn test_export_scene_end_to_end() {
    let assets = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();

    let mut scene = TourScene::new();
    let lobby = scene.spawn_state("Lobby", Vec3::ZERO, panorama(&assets, "lobby.jpg", b"l"));
    let hall = scene.spawn_state(
        "Hall",
        Vec3::new(0.0, 0.0, 10.0),
        panorama(&assets, "hall.jpg", b"h"),
    );
    let garden = scene.spawn_state(
        "Garden",
        Vec3::new(0.0, 4.0, 0.0),
        panorama(&assets, "garden.jpg", b"g"),
    );
    scene.toggle_connection(lobby, hall).unwrap();
    scene.toggle_connection(lobby, garden).unwrap();
    scene.remove_state(garden).unwrap();

    let tour = TourExporter::default()
        .export_scene(&scene, hall, destination.path())
        .unwrap();

    assert_eq!(tour.first_state_id, "state_1");
    assert_eq!(tour.states.len(), 2);

    // Lobby -> Hall points along +Z, the link to the removed garden is gone
    let lobby_links = &tour.states[0].links;
    assert_eq!(lobby_links.len(), 1);
    assert_eq!(lobby_links[0].id, "state_1");
    assert!(lobby_links[0].o.abs() < EPS);

    // Hall -> Lobby points along -Z
    let hall_links = &tour.states[1].links;
    assert_eq!(hall_links.len(), 1);
    assert!((hall_links[0].o - std::f32::consts::PI).abs() < EPS);

    assert!(validate_tour(&tour).is_valid);
}
