use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use spd_aio::{CommandRunner, JobWorkspace, ProcessOutput};
use spd_common::credentials::{BrowserSession, CredentialContext};
use spd_common::error::SpdError;
use spd_common::Settings;
use spd_core::{AcquisitionEngine, JobContext, JobRequest};

type Script = dyn Fn(usize, &str, &[String]) -> (i32, String) + Send + Sync;

/// Fake tool chain. The script sees the call index, label and command and may write
/// files into the output directory (found after `--output` / `-o`).
struct FakeTools {
    script: Box<Script>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeTools {
    fn new(script: impl Fn(usize, &str, &[String]) -> (i32, String) + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn labels(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(l, _)| l.clone()).collect()
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, label: &str, command: &[String]) -> ProcessOutput {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((label.to_string(), command.to_vec()));
            calls.len() - 1
        };
        let (exit_code, combined_output) = (self.script)(index, label, command);
        ProcessOutput {
            exit_code,
            combined_output,
        }
    }
}

/// Output directory a fetch-tool or direct-fetch command writes into.
fn out_dir_of(command: &[String]) -> PathBuf {
    if let Some(i) = command.iter().position(|t| t == "--output") {
        return PathBuf::from(&command[i + 1]);
    }
    let i = command.iter().position(|t| t == "-o").expect("output flag");
    Path::new(&command[i + 1]).parent().unwrap().to_path_buf()
}

fn write_track(command: &[String], name: &str) {
    fs::write(out_dir_of(command).join(name), b"ID3").unwrap();
}

fn settings(base: &Path) -> Settings {
    Settings::from_lookup(base, |key| match key {
        "SPD_BROWSER_PROFILE" => Some("/nonexistent/browser/profile".to_string()),
        _ => None,
    })
    .unwrap()
}

fn all_credentials() -> CredentialContext {
    CredentialContext {
        browser_session: Some(BrowserSession {
            browser: "opera".into(),
            profile: PathBuf::from("/profiles/gx"),
        }),
        cookie_file: Some(PathBuf::from("/cookies/yt.txt")),
    }
}

fn targets() -> Vec<String> {
    vec!["https://open.spotify.com/track/1?si=9".to_string()]
}

#[test]
fn scenario_a_first_attempt_success_skips_direct_fetch() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let tools = FakeTools::new(|_, _, cmd| {
        write_track(cmd, "Track One.mp3");
        (0, "Downloaded \"Track One\"".into())
    });
    let creds = CredentialContext::none();
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let files = engine.acquire(&targets(), &out).unwrap();

    assert_eq!(files, vec![out.join("Track One.mp3")]);
    assert_eq!(tools.labels(), vec!["youtube no cookies (mp3 256k, android)"]);
    let calls = tools.calls.lock().unwrap();
    assert_eq!(calls[0].1.last().unwrap(), "https://open.spotify.com/track/1");
}

#[test]
fn scenario_b_silent_success_recovers_through_direct_fetch() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let tools = FakeTools::new(|index, label, cmd| match index {
        0 => (
            0,
            "Processing query: https://open.spotify.com/track/1\n\
             Skipping https://music.youtube.com/watch?v=dQw4w9WgXcQ (no audio)\n"
                .into(),
        ),
        _ => {
            assert_eq!(label, "yt-dlp (no cookies)");
            assert_eq!(cmd.last().unwrap(), "https://music.youtube.com/watch?v=dQw4w9WgXcQ");
            write_track(cmd, "Never Gonna.mp3");
            (0, String::new())
        }
    });
    let creds = CredentialContext::none();
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let files = engine.acquire(&targets(), &out).unwrap();

    assert_eq!(files, vec![out.join("Never Gonna.mp3")]);
    assert_eq!(
        tools.labels(),
        vec!["youtube no cookies (mp3 256k, android)", "yt-dlp (no cookies)"]
    );
}

#[test]
fn scenario_c_total_failure_aggregates_every_label() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let tools = FakeTools::new(|_, label, _| (1, format!("HTTP Error 429 in {label}")));
    let creds = all_credentials();
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let err = engine.acquire(&targets(), &out).unwrap_err();

    let SpdError::Acquisition(message) = err else {
        panic!("expected an acquisition error");
    };
    assert!(message.starts_with("All attempts failed."));
    for label in [
        "ytmusic + browser-live (mp3 256k)",
        "youtube + browser-live (mp3 256k, android)",
        "ytmusic + cookie-file (mp3 256k fast)",
        "ytmusic + cookie-file (mp3 256k slow)",
        "youtube + cookie-file (mp3 256k, android)",
        "youtube no cookies (mp3 256k, android)",
    ] {
        assert!(message.contains(&format!("[{label}]")), "missing {label}");
    }
    // no URL ever printed, so the direct fetcher never ran
    assert_eq!(tools.labels().len(), 6);
}

#[test]
fn failed_direct_fetch_falls_through_to_next_attempt() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let tools = FakeTools::new(|_, label, cmd| {
        if label.starts_with("yt-dlp") {
            return (1, "Sign in to confirm you're not a bot".into());
        }
        if label == "ytmusic + cookie-file (mp3 256k slow)" {
            write_track(cmd, "Song.mp3");
            return (0, String::new());
        }
        (0, "https://www.youtube.com/watch?v=abc123&list=xyz".into())
    });
    let creds = CredentialContext {
        browser_session: None,
        cookie_file: Some(PathBuf::from("/cookies/yt.txt")),
    };
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let files = engine.acquire(&targets(), &out).unwrap();

    assert_eq!(files, vec![out.join("Song.mp3")]);
    assert_eq!(
        tools.labels(),
        vec![
            "ytmusic + cookie-file (mp3 256k fast)",
            "yt-dlp (cookie file)",
            "yt-dlp (no cookies)",
            "ytmusic + cookie-file (mp3 256k slow)",
        ]
    );
}

#[test]
fn final_direct_fetch_uses_first_collected_reference() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    // Silent success everywhere; the per-attempt direct fetch fails, the final one works.
    let tools = FakeTools::new(|index, label, cmd| {
        if label == "yt-dlp (no cookies)" && index >= 2 {
            assert_eq!(cmd.last().unwrap(), "https://www.youtube.com/watch?v=first");
            write_track(cmd, "Late.mp3");
            return (0, String::new());
        }
        if label.starts_with("yt-dlp") {
            return (1, "HTTP Error 403".into());
        }
        (0, "match https://www.youtube.com/watch?v=first".into())
    });
    let creds = CredentialContext::none();
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let files = engine.acquire(&targets(), &out).unwrap();

    assert_eq!(files, vec![out.join("Late.mp3")]);
    assert_eq!(
        tools.labels(),
        vec![
            "youtube no cookies (mp3 256k, android)",
            "yt-dlp (no cookies)",
            "yt-dlp (no cookies)"
        ]
    );
}

#[test]
fn blank_targets_are_invalid_input_and_run_nothing() {
    let base = tempfile::tempdir().unwrap();
    let tools = FakeTools::new(|_, _, _| (0, String::new()));
    let creds = CredentialContext::none();
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let err = engine
        .acquire(&["  ?si=1 ".to_string()], base.path())
        .unwrap_err();
    assert!(matches!(err, SpdError::InvalidInput(_)));
    assert!(tools.labels().is_empty());
}

#[test]
fn rerun_in_fresh_workspace_is_equivalent() {
    let base = tempfile::tempdir().unwrap();
    let tools = FakeTools::new(|_, _, cmd| {
        write_track(cmd, "A.mp3");
        write_track(cmd, "B.mp3");
        (0, String::new())
    });
    let creds = CredentialContext::none();
    let settings = settings(base.path());
    let engine = AcquisitionEngine::new(&settings, &creds, &tools);

    let summarize = |files: Vec<PathBuf>| -> Vec<String> {
        files
            .iter()
            .map(|f| f.extension().unwrap().to_string_lossy().into_owned())
            .collect()
    };

    let first = JobWorkspace::create(&settings.tmp_root).unwrap();
    let second = JobWorkspace::create(&settings.tmp_root).unwrap();
    let a = engine.acquire(&targets(), first.output_dir()).unwrap();
    let b = engine.acquire(&targets(), second.output_dir()).unwrap();
    assert_eq!(summarize(a), summarize(b));
}

#[test]
fn multi_file_job_is_packed_into_a_zip() {
    let base = tempfile::tempdir().unwrap();
    let settings = Arc::new(settings(base.path()));
    let tools = Arc::new(FakeTools::new(|_, label, cmd| {
        if label.starts_with("youtube") {
            write_track(cmd, "One.mp3");
            write_track(cmd, "Two.mp3");
        }
        (0, String::new())
    }));
    let ctx = JobContext::new(
        Arc::clone(&settings),
        Arc::new(CredentialContext::none()),
        tools.clone(),
    );
    let workspace = JobWorkspace::create(&settings.tmp_root).unwrap();
    let request = JobRequest::from_form("https://open.spotify.com/playlist/9?si=x", None).unwrap();

    let deliverable = ctx.run(&request, &workspace).unwrap();

    assert_eq!(deliverable.file_name, "playlist_mp3.zip");
    assert_eq!(deliverable.mime_type, "application/zip");
    assert_eq!(deliverable.path, workspace.root_dir().join("playlist_mp3.zip"));
    assert!(deliverable.path.is_file());
}

#[test]
fn single_file_job_is_served_directly() {
    let base = tempfile::tempdir().unwrap();
    let settings = Arc::new(settings(base.path()));
    let tools = Arc::new(FakeTools::new(|_, label, cmd| {
        if label.starts_with("youtube") {
            write_track(cmd, "Solo.mp3");
        }
        (0, String::new())
    }));
    let ctx = JobContext::new(
        Arc::clone(&settings),
        Arc::new(CredentialContext::none()),
        tools,
    );
    let workspace = JobWorkspace::create(&settings.tmp_root).unwrap();
    let request = JobRequest::from_form("https://open.spotify.com/track/1", Some("mp3")).unwrap();

    let deliverable = ctx.run(&request, &workspace).unwrap();

    assert_eq!(deliverable.file_name, "Solo.mp3");
    assert_eq!(deliverable.mime_type, "audio/mpeg");
}

#[test]
fn failed_final_direct_fetch_is_appended_to_the_aggregate_error() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let tools = FakeTools::new(|_, label, _| {
        if label.starts_with("yt-dlp") {
            return (1, "ERROR: HTTP Error 403: Forbidden".into());
        }
        (0, "Found https://www.youtube.com/watch?v=gone".into())
    });
    let creds = CredentialContext::none();
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let err = engine.acquire(&targets(), &out).unwrap_err();

    let SpdError::Acquisition(message) = err else {
        panic!("expected an acquisition error");
    };
    assert!(message.starts_with("All attempts failed.\n\n"));
    assert!(message.contains(
        "[youtube no cookies (mp3 256k, android)] success exit code but no files.\n\
         Found https://www.youtube.com/watch?v=gone"
    ));
    assert!(message.contains(
        "[final yt-dlp fallback] failed\n\
         yt-dlp direct fallback failed.\n\
         ERROR: HTTP Error 403: Forbidden"
    ));
    assert_eq!(
        tools.labels(),
        vec![
            "youtube no cookies (mp3 256k, android)",
            "yt-dlp (no cookies)",
            "yt-dlp (no cookies)"
        ]
    );
}

#[test]
fn silent_success_without_url_moves_on_to_the_next_attempt() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let tools = FakeTools::new(|index, _, cmd| {
        if index == 0 {
            return (0, "Downloaded 0 songs".into());
        }
        write_track(cmd, "Second Try.mp3");
        (0, String::new())
    });
    let creds = CredentialContext {
        browser_session: None,
        cookie_file: Some(PathBuf::from("/cookies/yt.txt")),
    };
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let files = engine.acquire(&targets(), &out).unwrap();

    assert_eq!(files, vec![out.join("Second Try.mp3")]);
    assert_eq!(
        tools.labels(),
        vec![
            "ytmusic + cookie-file (mp3 256k fast)",
            "ytmusic + cookie-file (mp3 256k slow)",
        ]
    );
}

#[test]
fn silent_success_without_url_is_reported_when_nothing_works() {
    let base = tempfile::tempdir().unwrap();
    let out = base.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let tools = FakeTools::new(|_, _, _| (0, "Downloaded 0 songs".into()));
    let creds = CredentialContext::none();
    let engine = AcquisitionEngine::new(&settings(base.path()), &creds, &tools);

    let err = engine.acquire(&targets(), &out).unwrap_err();

    let SpdError::Acquisition(message) = err else {
        panic!("expected an acquisition error");
    };
    assert!(message.contains(
        "[youtube no cookies (mp3 256k, android)] success exit code but no files.\nDownloaded 0 songs"
    ));
    assert!(!message.contains("[final yt-dlp fallback]"));
    assert_eq!(tools.labels().len(), 1);
}

#[test]
fn tracking_only_targets_never_reach_a_tool() {
    let base = tempfile::tempdir().unwrap();
    let settings = Arc::new(settings(base.path()));
    let tools = Arc::new(FakeTools::new(|_, _, _| (0, String::new())));
    let ctx = JobContext::new(
        Arc::clone(&settings),
        Arc::new(CredentialContext::none()),
        tools.clone(),
    );
    let workspace = JobWorkspace::create(&settings.tmp_root).unwrap();
    let request = JobRequest {
        targets: vec![" ?si=1".to_string()],
        format: Default::default(),
    };

    let err = ctx.run(&request, &workspace).unwrap_err();

    assert!(matches!(err, SpdError::InvalidInput(_)));
    assert!(tools.labels().is_empty());
}
