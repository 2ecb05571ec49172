//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PRACTICE_TEST: &str = r#"{
  "subject": "Physics",
  "topic": "Electrostatics",
  "questions": [
    {"id": 1, "type": "MCQ", "questionText": "Unit of charge?", "options": ["Volt", "Coulomb", "Ohm", "Tesla"], "correctAnswer": "(b)", "solution": "Charge is measured in coulombs."},
    {"id": 2, "type": "NUMERICAL", "questionText": "1 + 2 = ?", "correctAnswer": " 3 ", "solution": "Add."}
  ]
}"#;

const ARCHIVE_QUIZ: &str = r#"{
  "subject": "Physics",
  "topic": "Optics",
  "questions": [
    {"id": 1, "type": "MCQ", "questionText": "Focal length of a plane mirror?", "options": ["Zero", "Infinite", "f", "2f"], "correctAnswer": "B", "solution": "Parallel rays stay parallel.", "difficultyLevel": "Easy"},
    {"id": 2, "type": "MCQ", "questionText": "Colour with the least deviation?", "options": ["Violet", "Blue", "Green", "Red"], "correctAnswer": "D", "solution": "Red has the lowest refractive index.", "difficultyLevel": "Medium"}
  ]
}"#;

const FORMULA_CARD: &str = r#"{"title": "Optics at a glance", "formulas": ["1/f = 1/v - 1/u"], "concepts": ["Sign convention"], "proTip": "Draw the ray diagram first."}"#;

const TIME_TABLE: &str = r#"{"title": "Balanced day", "description": "Eight focused hours", "schedule": [{"time": "06:00 - 08:00", "activity": "Theory", "subject": "Physics", "topic": "Optics", "type": "Theory"}], "tips": ["Sleep well"]}"#;

const SOLUTION: &str = r#"{"underlyingConcept": "Conservation of energy", "mathematicalDerivation": "mgh = mv^2/2", "proTip": "Skip the mass."}"#;

fn aceprep(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("aceprep").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("ACEPREP_GEMINI_KEY")
        .env_remove("ACEPREP_ANTHROPIC_KEY")
        .env_remove("ACEPREP_OPENAI_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a config routing every tool's prompt to a canned response.
fn mock_config(dir: &Path) -> PathBuf {
    let config = format!(
        r#"default_provider = "mock"
default_model = "mock-model"
data_dir = "data"

[providers.mock]
type = "mock"
response = '''{PRACTICE_TEST}'''

[[providers.mock.routes]]
contains = "Solve the following"
response = '''{SOLUTION}'''

[[providers.mock.routes]]
contains = "Previous Year Questions (PYQs)"
response = '''{ARCHIVE_QUIZ}'''

[[providers.mock.routes]]
contains = "Summarize the key formulas"
response = '''{FORMULA_CARD}'''

[[providers.mock.routes]]
contains = "study time table"
response = '''{TIME_TABLE}'''

[providers.offline]
type = "mock"
fail = "connection refused"
"#
    );
    let path = dir.join("aceprep.toml");
    std::fs::write(&path, config).unwrap();
    path
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("archive"))
        .stdout(predicate::str::contains("timetable"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aceprep"));
}

#[test]
fn init_creates_config_once() {
    let dir = TempDir::new().unwrap();

    aceprep(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created aceprep.toml"));
    assert!(dir.path().join("aceprep.toml").exists());

    aceprep(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn catalog_lists_subjects() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("Physics"))
        .stdout(predicate::str::contains("Hydrocarbons"));
}

#[test]
fn catalog_unknown_subject_fails() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .args(["catalog", "--subject", "Astrology"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown subject 'Astrology'"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .args(["--config", "nonexistent.toml", "best"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn personal_best_starts_at_zero() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .arg("best")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive personal best: 0"));
}

#[test]
fn template_lifecycle() {
    let dir = TempDir::new().unwrap();

    aceprep(dir.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved templates."));

    let output = aceprep(dir.path())
        .args([
            "templates",
            "save",
            "--subjects",
            "Physics",
            "--topics",
            "Electrostatics",
            "--count",
            "30",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert!(!id.is_empty());

    aceprep(dir.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()))
        .stdout(predicate::str::contains("1 of 10 slots used"));

    aceprep(dir.path())
        .args(["templates", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Electrostatics"))
        .stdout(predicate::str::contains("\"count\": 30"));

    aceprep(dir.path())
        .args(["templates", "remove", &id])
        .assert()
        .success();

    aceprep(dir.path())
        .args(["templates", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved template"));
}

#[test]
fn template_rejects_unknown_count() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .args(["templates", "save", "--count", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("question count must be one of"));
}

#[test]
fn practice_test_prints_questions_and_key() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["test", "--subjects", "Physics", "--topics", "Electrostatics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unit of charge?"))
        .stdout(predicate::str::contains("(B) Coulomb"))
        .stdout(predicate::str::contains("Answer key:"));
}

#[test]
fn practice_test_scores_answers() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    let output = aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args([
            "test",
            "--subjects",
            "Physics",
            "--topics",
            "Electrostatics",
            "--answers",
            "1=Coulomb,2=3",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["score"]["total"], 8);
    assert_eq!(value["questions"]["questions"][0]["correctAnswer"], "B");
}

#[test]
fn practice_test_without_topics_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["test", "--subjects", "Biology"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pick at least one topic"));
}

#[test]
fn archive_quiz_updates_personal_best() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args([
            "archive",
            "--subject",
            "Physics",
            "--topic",
            "Optics",
            "--answers",
            "1=B,2=A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 3 / 8"))
        .stdout(predicate::str::contains("New personal best: 3"));

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("best")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive personal best: 3"));

    // A worse score leaves the best alone.
    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args([
            "archive",
            "--subject",
            "Physics",
            "--topic",
            "Optics",
            "--answers",
            "1=A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Personal best: 3"));
}

#[test]
fn archive_rejects_unknown_year() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args([
            "archive", "--subject", "Physics", "--topic", "Optics", "--year", "1999",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no JEE Main papers for 1999"));
}

#[test]
fn formula_card_renders() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["cards", "--topic", "Optics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Optics at a glance"))
        .stdout(predicate::str::contains("Pro tip: Draw the ray diagram first."));
}

#[test]
fn time_table_renders() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args([
            "timetable",
            "--subjects",
            "Physics,Chemistry",
            "--chapters",
            "Optics",
            "--hours",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balanced day"))
        .stdout(predicate::str::contains("Sleep well"));
}

#[test]
fn time_table_rejects_odd_hours() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["timetable", "--hours", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("study hours must be one of"));
}

#[test]
fn time_table_rejects_unknown_subject() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["timetable", "--subjects", "Physics,Astrology"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown subject 'Astrology'"));
}

#[test]
fn time_table_rejects_unknown_chapter() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["timetable", "--subjects", "Physics", "--chapters", "Horoscopes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown chapter 'Horoscopes'"));
}

#[test]
fn solve_prints_solution() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["solve", "--question", "A ball falls 5 m. Find its speed."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Conservation of energy"));
}

#[test]
fn generation_failure_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--provider", "offline", "cards", "--topic", "Optics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not generate Formula Cards"))
        .stderr(predicate::str::contains("connection refused"));
}

#[test]
fn unconfigured_provider_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(dir.path());

    aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--provider", "gemini", "cards", "--topic", "Optics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider 'gemini' is not configured"));
}

#[test]
fn models_filtered_by_provider() {
    let dir = TempDir::new().unwrap();
    aceprep(dir.path())
        .args(["--provider", "gemini", "models"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.5-pro"))
        .stdout(predicate::str::contains("gpt-4.1").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn gemini_round_trip_through_cli() {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": FORMULA_CARD}]}}],
            "usageMetadata": {"promptTokenCount": 30, "candidatesTokenCount": 40, "totalTokenCount": 70}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("aceprep.toml");
    std::fs::write(
        &config,
        format!(
            "[providers.gemini]\ntype = \"gemini\"\napi_key = \"test-key\"\nbase_url = \"{}\"\n",
            server.uri()
        ),
    )
    .unwrap();

    let output = aceprep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--model", "gemini-2.5-flash", "cards", "--topic", "Optics", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let card: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(card["title"], "Optics at a glance");
    assert_eq!(card["proTip"], "Draw the ray diagram first.");
}
