/// Integration tests for IPC communication
/// These tests verify that control commands and responses keep their wire
/// shape across the client/daemon boundary
use common::{AssetInfo, BackdropError, Command, Response};

#[test]
fn test_control_commands_roundtrip() {
    let commands = vec![
        Command::Play {
            name: "ocean.mp4".to_string(),
        },
        Command::PlayRandom,
        Command::ToggleMute,
        Command::SetVolume { value: 0.3 },
        Command::SetOpacity { value: 0.8 },
        Command::SetRotation { enabled: true },
    ];

    for cmd in commands {
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(!json.contains('\n'), "commands must fit on one line");
        let _deserialized: Command = serde_json::from_str(&json).unwrap();
    }
}

#[test]
fn test_slider_command_values_survive() {
    let json = serde_json::to_string(&Command::SetVolume { value: 0.05 }).unwrap();
    match serde_json::from_str::<Command>(&json).unwrap() {
        Command::SetVolume { value } => assert_eq!(value, 0.05),
        _ => panic!("Wrong command type"),
    }
}

#[test]
fn test_query_commands() {
    let commands = vec![
        Command::Query,
        Command::Ping,
        Command::ListAssets,
        Command::Kill,
    ];

    for cmd in commands {
        let json = serde_json::to_string(&cmd).unwrap();
        let _deserialized: Command = serde_json::from_str(&json).unwrap();
    }
}

#[test]
fn test_asset_list_response() {
    let resp = Response::Assets(vec![AssetInfo {
        name: "forest.webm".to_string(),
        display_name: "forest".to_string(),
        path: "/videos/forest.webm".to_string(),
    }]);

    let json = serde_json::to_string(&resp).unwrap();
    match serde_json::from_str::<Response>(&json).unwrap() {
        Response::Assets(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].display_name, "forest");
        }
        _ => panic!("Wrong response type"),
    }
}

#[test]
fn test_error_response_keeps_message() {
    let resp = Response::Error(BackdropError::NotFound("Unknown video: x.mp4".to_string()));
    let json = serde_json::to_string(&resp).unwrap();

    match serde_json::from_str::<Response>(&json).unwrap() {
        Response::Error(e) => assert_eq!(e.to_string(), "Not found: Unknown video: x.mp4"),
        _ => panic!("Wrong response type"),
    }
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(serde_json::from_str::<Command>(r#""PlaylistNext""#).is_err());
    assert!(serde_json::from_str::<Command>(r#"{"SetVolume":{"value":"high"}}"#).is_err());
}
