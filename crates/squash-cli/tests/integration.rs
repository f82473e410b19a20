//! Integration tests for the `squash` binary.

use std::path::Path;
use std::process::{Command, Output};

use squash_io::{HEADER_LEN, WavHeader, encode_wav};
use tempfile::TempDir;

/// The `squash` binary with settings isolated to `dir`.
fn squash_bin(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_squash"));
    cmd.env("SQUASH_CONFIG", dir.join("settings.toml"))
        .env("RUST_LOG", "warn");
    cmd
}

fn write_tone(path: &Path, seconds: f32, sample_rate: u32) {
    let frames = (seconds * sample_rate as f32) as usize;
    let samples: Vec<f32> = (0..frames)
        .flat_map(|i| {
            let s = 0.8 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate as f32).sin();
            [s, s]
        })
        .collect();
    std::fs::write(path, encode_wav(&samples, 2, sample_rate)).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let output = squash_bin(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    for cmd in ["render", "monitor", "settings"] {
        assert!(text.contains(cmd), "help should mention {cmd}:\n{text}");
    }
}

// ---------------------------------------------------------------------------
// settings
// ---------------------------------------------------------------------------

#[test]
fn settings_path_honours_env() {
    let dir = TempDir::new().unwrap();
    let output = squash_bin(dir.path())
        .args(["settings", "--path"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        dir.path().join("settings.toml").display().to_string()
    );
}

#[test]
fn settings_init_then_print() {
    let dir = TempDir::new().unwrap();
    let init = squash_bin(dir.path())
        .args(["settings", "--init"])
        .output()
        .unwrap();
    assert!(init.status.success());
    assert!(dir.path().join("settings.toml").exists());

    let again = squash_bin(dir.path())
        .args(["settings", "--init"])
        .output()
        .unwrap();
    assert!(!again.status.success(), "second --init must refuse");

    let show = squash_bin(dir.path()).arg("settings").output().unwrap();
    assert!(show.status.success());
    let text = stdout(&show);
    assert!(text.contains("[compressor]"), "{text}");
    assert!(text.contains("threshold = -24"), "{text}");
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_writes_float_wav_named_after_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("tone.input.wav");
    write_tone(&input, 0.5, 22050);
    let out_dir = dir.path().join("out");

    let output = squash_bin(dir.path())
        .arg("render")
        .arg(&input)
        .arg("-o")
        .arg(&out_dir)
        .args(["--threshold", "-30", "--ratio", "4"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let bytes = std::fs::read(out_dir.join("tone.input.wav")).unwrap();
    let header = WavHeader::from_bytes(&bytes).unwrap();
    assert_eq!(header.format_tag, 3);
    assert_eq!(header.channels, 2);
    assert_eq!(header.sample_rate, 22050);
    assert_eq!(bytes.len(), HEADER_LEN + 11025 * 2 * 4);
    assert!(stdout(&output).contains("Wrote"));
}

#[test]
fn render_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = squash_bin(dir.path())
        .args(["render", "does-not-exist.wav", "-o"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn render_reads_output_dir_from_settings() {
    let dir = TempDir::new().unwrap();
    let renders = dir.path().join("renders");
    std::fs::write(
        dir.path().join("settings.toml"),
        format!("[render]\noutput_dir = {:?}\n", renders.display().to_string()),
    )
    .unwrap();
    let input = dir.path().join("a.wav");
    write_tone(&input, 0.1, 8000);

    let output = squash_bin(dir.path())
        .arg("render")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(renders.join("a.wav").exists());
}

// ---------------------------------------------------------------------------
// monitor
// ---------------------------------------------------------------------------

#[test]
fn monitor_fast_runs_to_end_and_toggles() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("loop.wav");
    write_tone(&input, 1.0, 44100);

    let output = squash_bin(dir.path())
        .arg("monitor")
        .arg(&input)
        .args(["--fast", "--toggle-every", "0.4"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "monitor failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("Monitored 0:00:01"), "{text}");
    assert!(text.contains("2 toggles"), "{text}");
    assert!(text.contains("compression on"), "{text}");
}

#[test]
fn monitor_without_compression() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("quiet.wav");
    write_tone(&input, 0.2, 8000);

    let output = squash_bin(dir.path())
        .arg("monitor")
        .arg(&input)
        .args(["--fast", "--no-compression"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("compression off"));
}
