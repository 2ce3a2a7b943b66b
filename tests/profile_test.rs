use ref_audio_gen::profile::{load_profiles, parse_texts, path_segment, Voice, VoiceProfile};
use ref_audio_gen::transcribe::manifest::ManifestEntry;
use std::fs;

#[test]
fn texts_skip_blank_lines_and_trim() {
    let texts = parse_texts("hello\n\n  world  \r\n\t\nlast");
    assert_eq!(texts, vec!["hello", "world", "last"]);
}

#[test]
fn profiles_load_both_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    fs::write(
        &path,
        r#"[
            {"emotion": "happy"},
            {"emotion_name": "angry-1", "emotion": "angry"},
            {"emotion_name": "calm", "ref_path": "/ref/calm.wav", "ref_text": "calm words"}
        ]"#,
    )
    .unwrap();

    let profiles = load_profiles(&path).unwrap();

    assert_eq!(profiles[0], VoiceProfile::emotion("happy"));
    assert_eq!(profiles[1].emotion_name, "angry-1");
    assert_eq!(
        profiles[1].voice,
        Voice::Emotion {
            emotion: "angry".to_string()
        }
    );
    assert_eq!(profiles[2], VoiceProfile::reference("calm", "/ref/calm.wav", "calm words"));
}

#[test]
fn profile_with_mixed_shape_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    fs::write(&path, r#"[{"emotion": "happy", "ref_path": "/ref.wav"}]"#).unwrap();

    let err = load_profiles(&path).unwrap_err();
    assert!(err.to_string().contains("profile 0"));
}

#[test]
fn reference_profile_requires_a_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    fs::write(&path, r#"[{"ref_path": "/ref.wav", "ref_text": "words"}]"#).unwrap();

    assert!(load_profiles(&path).is_err());
}

#[test]
fn profiles_survive_json_transport() {
    let profiles = vec![
        VoiceProfile::emotion("happy"),
        VoiceProfile::reference("calm", "/ref/calm.wav", "calm words"),
    ];
    let json = serde_json::to_string(&profiles).unwrap();
    let back: Vec<VoiceProfile> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, profiles);
}

#[test]
fn manifest_entry_becomes_reference_profile() {
    let entry = ManifestEntry {
        path: "/data/refs/开心/happy_01.wav".to_string(),
        label: "开心".to_string(),
        language: "ZH".to_string(),
        text: "今天天气很好".to_string(),
    };

    let profile = VoiceProfile::from(&entry);

    assert_eq!(
        profile,
        VoiceProfile::reference("开心_happy_01", "/data/refs/开心/happy_01.wav", "今天天气很好")
    );
}

#[test]
fn same_file_name_under_different_labels_gives_distinct_profiles() {
    let entry = |label: &str| ManifestEntry {
        path: format!("/data/{label}/001.wav"),
        label: label.to_string(),
        language: "ZH".to_string(),
        text: format!("{label} words"),
    };

    let happy = VoiceProfile::from(&entry("happy"));
    let sad = VoiceProfile::from(&entry("sad"));

    assert_eq!(happy.emotion_name, "happy_001");
    assert_eq!(sad.emotion_name, "sad_001");
}

#[test]
fn path_segments_are_filesystem_safe() {
    assert_eq!(path_segment("hello world"), "hello world");
    assert_eq!(path_segment("a/b\\c:d"), "a_b_c_d");
    assert_eq!(path_segment("what?*"), "what__");
    assert_eq!(path_segment("end. "), "end");
    assert_eq!(path_segment("..."), "_");
    assert_eq!(path_segment(""), "_");
    assert_eq!(path_segment("你好"), "你好");
}
