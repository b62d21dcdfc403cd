use keysolve::geometry::Geometry;
use keysolve::layout::Layout;
use keysolve::layouts::KnownLayout;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TEXT: &str = "\
the quick brown fox jumps over the lazy dog
sphinx of black quartz judge my vow
pack my box with five dozen liquor jugs";

const SMALL_LAYOUT: &str = "\
# home row only
~ ~ ~ ~ ~ ~  ~ ~ ~ ~ ~ ~
~ a s d f g  h j k l ; ~
~ ~ ~ ~ ~ ~  ~ ~ ~ ~ ~ ~
~ ~ _  ~ ~ ~
";

struct TestContext {
    dir: TempDir,
    corpus_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let corpus_path = dir.path().join("pangrams.txt");
        fs::write(&corpus_path, TEXT).unwrap();
        Self { dir, corpus_path }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_keysolve"))
            .arg("--corpus")
            .arg(&self.corpus_path)
            .args(args)
            .output()
            .expect("Failed to execute binary")
    }
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).to_string()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).to_string()
}

fn metric_cell(out: &str, layout: &str) -> f64 {
    let re = Regex::new(&format!(r"\|\s*{}\s*\|\s*([0-9.]+)%", regex::escape(layout))).unwrap();
    let caps = re
        .captures(out)
        .unwrap_or_else(|| panic!("no metric row for {} in:\n{}", layout, out));
    caps[1].parse().unwrap()
}

fn p(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_corpus_cache() {
    let ctx = TestContext::new();
    let out_path = ctx.path("pangrams.tsv");
    let text = ctx.corpus_path.clone();

    let output = ctx.run(&["corpus", "--text", p(&text), "--out", p(&out_path), "--top", "3"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Characters"));

    let cache = fs::read_to_string(&out_path).unwrap();
    assert!(cache.lines().any(|l| l == "th\t3"), "{}", cache);

    // the cache can stand in for the text
    let analysed = Command::new(env!("CARGO_BIN_EXE_keysolve"))
        .args(["--corpus", p(&out_path), "analyse", "qwerty"])
        .output()
        .unwrap();
    assert!(analysed.status.success(), "{}", stderr(&analysed));
}

#[test]
fn test_cli_analyse_table_and_json() {
    let ctx = TestContext::new();

    let output = ctx.run(&["analyse", "qwerty", "colemak", "--metrics", "bigrams"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    let qwerty_sfb = metric_cell(&out, "qwerty");
    let colemak_sfb = metric_cell(&out, "colemak");
    assert!((0.0..=100.0).contains(&qwerty_sfb));
    assert!((0.0..=100.0).contains(&colemak_sfb));
    assert!(!out.contains("ALT"));

    let json = ctx.run(&["analyse", "qwerty", "--json"]);
    assert!(json.status.success(), "{}", stderr(&json));
    let value: serde_json::Value = serde_json::from_str(&stdout(&json)).unwrap();
    assert_eq!(value[0]["layout_name"], "qwerty");
    let sfb = value[0]["metrics"]["SFB"].as_f64().unwrap();
    assert!((sfb - qwerty_sfb).abs() < 1e-3);
}

#[test]
fn test_cli_rank_skips_broken_files() {
    let ctx = TestContext::new();
    let dir = ctx.path("layouts");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("homerow.kb"), SMALL_LAYOUT).unwrap();
    let qwerty = KnownLayout::Qwerty.to_layout(Geometry::RowStag).unwrap();
    qwerty.save_to_file(dir.join("qwerty.kb")).unwrap();
    fs::write(dir.join("broken.kb"), "a b c\n").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let output = ctx.run(&["rank", p(&dir), "--weights", "sfb=2,alt=-1"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("homerow"));
    assert!(out.contains("qwerty"));
    assert!(!out.contains("broken"));
    assert!(stderr(&output).contains("broken.kb"));
}

#[test]
fn test_cli_rank_builtin_names_stay_unique() {
    let ctx = TestContext::new();
    let dir = ctx.path("layouts");
    fs::create_dir(&dir).unwrap();
    let qwerty = KnownLayout::Qwerty.to_layout(Geometry::RowStag).unwrap();
    qwerty.save_to_file(dir.join("qwerty.kb")).unwrap();

    let output = ctx.run(&["rank", p(&dir), "--builtin", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.iter().filter(|&&n| n == "qwerty").count(), 1);
    assert!(names.len() > 1);
    assert!(stderr(&output).contains("Skipping built-in 'qwerty'"));
}

#[test]
fn test_cli_rank_rejects_bad_weights() {
    let ctx = TestContext::new();
    let output = ctx.run(&["rank", "--weights", "sfb:2"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Parse Error"));
}

#[test]
fn test_cli_optimise_writes_layout() {
    let ctx = TestContext::new();
    let out_path = ctx.path("best.kb");

    let output = ctx.run(&[
        "optimise",
        "qwerty",
        "--generations",
        "300",
        "--accept",
        "drop-slow",
        "--seed",
        "4",
        "--pin-rows",
        "3",
        "--out",
        p(&out_path),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let re = Regex::new(r"SFB ([0-9.]+)% -> ([0-9.]+)%").unwrap();
    let out = stdout(&output);
    let caps = re.captures(&out).expect("summary line");
    let before: f64 = caps[1].parse().unwrap();
    let after: f64 = caps[2].parse().unwrap();
    assert!(after <= before);

    let layout = Layout::load_from_file(&out_path, Geometry::RowStag).unwrap();
    assert_eq!(layout.name, "best");
    assert_eq!(layout.chars().count(), 31);
    // the thumb row was pinned, so space stays put
    assert!(layout.key_info(' ').unwrap().pos.is_thumb());
}

#[test]
fn test_cli_optimise_rejects_unknown_schedule() {
    let ctx = TestContext::new();
    let output = ctx.run(&["optimise", "qwerty", "--accept", "lukewarm"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Configuration Error"));
}
