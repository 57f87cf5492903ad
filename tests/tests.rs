// ../tests/tests.rs
use narikiri::app::{Action, App};
use narikiri::app_state::Focus;
use narikiri::*;
use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, mpsc};

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<String, OracleError>>,
    prompts: Vec<String>,
}

// Replays canned completions in order and records every prompt it was given.
// Clones share the script, so a test keeps a handle after moving one into the pipeline.
#[derive(Clone, Default)]
struct ScriptedOracle {
    script: Arc<Mutex<Script>>,
}

impl ScriptedOracle {
    fn new() -> Self {
        Self::default()
    }

    fn reply(self, text: &str) -> Self {
        self.push(Ok(text.to_string()));
        self
    }

    fn fail(self, reason: &str) -> Self {
        self.push(Err(OracleError::Unavailable(reason.to_string())));
        self
    }

    fn push(&self, response: Result<String, OracleError>) {
        self.script.lock().unwrap().responses.push_back(response);
    }

    fn call_count(&self) -> usize {
        self.script.lock().unwrap().prompts.len()
    }

    fn prompt(&self, index: usize) -> String {
        self.script.lock().unwrap().prompts[index].clone()
    }
}

impl Oracle for ScriptedOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let mut script = self.script.lock().unwrap();
        script.prompts.push(prompt.to_string());
        script
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Unavailable("script exhausted".to_string())))
    }
}

// Holds each completion until the test hands out a permit, so a flow stays in flight.
#[derive(Clone)]
struct GatedOracle {
    oracle: ScriptedOracle,
    gate: Arc<Semaphore>,
}

impl GatedOracle {
    fn new(oracle: ScriptedOracle) -> Self {
        Self {
            oracle,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }
}

impl Oracle for GatedOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.gate
            .acquire()
            .await
            .expect("Gate closed")
            .forget();
        self.oracle.complete(prompt).await
    }
}

// Runs queued actions until a flow hands the pipeline back.
async fn settle<O: Oracle + Send + Sync + 'static>(app: &mut App<O>) {
    loop {
        match app.next_action().await.expect("Action channel closed") {
            action @ Action::Settled(_) => {
                app.handle_action(action);
                return;
            }
            other => app.handle_action(other),
        }
    }
}

fn analysis_fixture() -> String {
    fs::read_to_string("tests/dummy_analysis_response.json")
        .expect("Failed to read dummy analysis JSON file")
}

fn test_profile() -> CharacterProfile {
    CharacterProfile::new(
        "Cheerful baker",
        "Ends every sentence with 'dough-n't you think?'",
    )
    .with_memory("shop", "Runs the bakery on Elm Street")
}

// An oracle whose first completion is the analysis of `test_profile()`.
fn oracle_with_profile() -> ScriptedOracle {
    let profile_json = test_profile()
        .to_json()
        .expect("Failed to serialize profile");
    ScriptedOracle::new().reply(&profile_json)
}

async fn analyzed(oracle: &ScriptedOracle) -> Pipeline<ScriptedOracle> {
    let mut pipeline = Pipeline::new(oracle.clone());
    pipeline
        .analyze("Good morning! Fresh rolls, dough-n't you think?")
        .await
        .expect("Analysis should succeed");
    pipeline
}

#[tokio::test]
async fn test_analyze_builds_profile_from_json() {
    let mut pipeline = Pipeline::new(ScriptedOracle::new().reply(&analysis_fixture()));

    let profile = pipeline
        .analyze("Reef your topsails, lads!")
        .await
        .expect("Analysis should succeed");

    assert!(profile.personality.starts_with("Bold, reckless"));
    assert!(profile.language_style.contains("lads"));
    assert_eq!(profile.long_term_memory.len(), 4);
    assert_eq!(
        profile.long_term_memory.get("ship").map(String::as_str),
        Some("Captain of the Gull's Wager")
    );
    assert_eq!(pipeline.profile(), Some(&profile));
    assert_eq!(pipeline.status(), GenerationStatus::Idle);
    assert!(pipeline.session().error.is_none());

    // Exactly the three wire fields come back out.
    let value: serde_json::Value =
        serde_json::from_str(&profile.to_json().unwrap()).expect("Failed to parse JSON");
    let mut keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort();
    assert_eq!(keys, ["languageStyle", "longTermMemory", "personality"]);
}

#[tokio::test]
async fn test_analyze_keeps_memory_order() {
    let mut pipeline = Pipeline::new(ScriptedOracle::new().reply(&analysis_fixture()));
    let profile = pipeline.analyze("Sample").await.unwrap();

    let keys: Vec<&str> = profile.memory_facts().map(|(key, _)| key).collect();
    assert_eq!(keys, ["ship", "brother", "heirloom", "favorite drink"]);
}

#[tokio::test]
async fn test_analyze_clears_prior_transcript() {
    let oracle = oracle_with_profile()
        .reply("CONTENT")
        .reply("STYLED")
        .reply(&analysis_fixture());
    let mut pipeline = analyzed(&oracle).await;

    pipeline.send_message("hello").await.unwrap();
    assert_eq!(pipeline.transcript().len(), 2);

    pipeline.analyze("A different character").await.unwrap();
    assert!(pipeline.transcript().is_empty());
    assert!(pipeline.profile().unwrap().personality.starts_with("Bold"));
}

#[tokio::test]
async fn test_analyze_missing_field_is_malformed() {
    let incomplete = fs::read_to_string("tests/dummy_analysis_missing_style.json")
        .expect("Failed to read dummy analysis JSON file");
    let oracle = oracle_with_profile()
        .reply("CONTENT")
        .reply("STYLED")
        .reply(&incomplete);
    let mut pipeline = analyzed(&oracle).await;
    pipeline.send_message("hello").await.unwrap();

    let profile_before = pipeline.profile().cloned();
    let transcript_before = pipeline.transcript().to_vec();

    let result = pipeline.analyze("The archivist sighed.").await;

    match result {
        Err(PipelineError::MalformedAnalysisResult(reason)) => {
            assert!(
                reason.contains("languageStyle"),
                "unexpected reason: {reason}"
            )
        }
        other => panic!("Expected MalformedAnalysisResult, got {:?}", other),
    }
    assert_eq!(pipeline.profile().cloned(), profile_before);
    assert_eq!(pipeline.transcript(), transcript_before.as_slice());
    assert_eq!(pipeline.status(), GenerationStatus::Error);
    assert!(pipeline.session().error.is_some());
}

#[tokio::test]
async fn test_analyze_non_json_is_malformed() {
    let mut pipeline =
        Pipeline::new(ScriptedOracle::new().reply("Sorry, I cannot analyze that."));

    let result = pipeline.analyze("Some text").await;

    assert!(matches!(
        result,
        Err(PipelineError::MalformedAnalysisResult(_))
    ));
    assert!(pipeline.profile().is_none());
}

#[tokio::test]
async fn test_analyze_fenced_json_matches_plain_json() {
    let json = analysis_fixture();
    let fenced = format!("```json\n{}\n```\n", json);

    let mut plain = Pipeline::new(ScriptedOracle::new().reply(&json));
    let mut wrapped = Pipeline::new(ScriptedOracle::new().reply(&fenced));

    let from_plain = plain.analyze("Sample").await.unwrap();
    let from_wrapped = wrapped.analyze("Sample").await.unwrap();

    assert_eq!(from_plain, from_wrapped);
    assert_eq!(extract_json(&fenced), json.trim());
}

#[test]
fn test_extract_json_variants() {
    let json = r#"{"personality":"p","languageStyle":"s","longTermMemory":{}}"#;

    assert_eq!(extract_json(json), json);
    assert_eq!(extract_json(&format!("  {}\n", json)), json);
    assert_eq!(extract_json(&format!("```\n{}\n```", json)), json);
    assert_eq!(extract_json(&format!("```JSON\n{}\n```", json)), json);
    assert_eq!(
        extract_json(&format!("Here you go:\n```json\n{}\n```\nEnjoy!", json)),
        json
    );
    // An unclosed fence is not a code block.
    let unclosed = format!("```json\n{}", json);
    assert_eq!(extract_json(&unclosed), unclosed);
    // Prose around an untagged block is left alone.
    let prose = "See ```this``` for details";
    assert_eq!(extract_json(prose), prose);
}

#[test]
fn test_extract_json_keeps_fences_inside_strings() {
    let json = "{\n \"personality\": \"A hacker\",\n \"languageStyle\": \"Quotes code inline like ```ls -la``` mid-sentence\",\n \"longTermMemory\": {}\n}";

    assert_eq!(extract_json(json), json);
    let profile = CharacterProfile::from_json(extract_json(json)).expect("Failed to parse JSON");
    assert_eq!(
        profile.language_style,
        "Quotes code inline like ```ls -la``` mid-sentence"
    );
}

#[tokio::test]
async fn test_analyze_fenced_reply_with_inner_fence() {
    let json = r#"{"personality":"A hacker","languageStyle":"Types ```sudo``` a lot","longTermMemory":{}}"#;
    let fenced = format!("```json\n{}\n```", json);
    let mut pipeline = Pipeline::new(ScriptedOracle::new().reply(json).reply(&fenced));

    let plain = pipeline.analyze("Sample").await.unwrap();
    assert_eq!(plain.language_style, "Types ```sudo``` a lot");

    let wrapped = pipeline.analyze("Sample").await.unwrap();
    assert_eq!(wrapped, plain);
}

#[tokio::test]
async fn test_analyze_blank_input_is_rejected() {
    let oracle = ScriptedOracle::new();
    let mut pipeline = Pipeline::new(oracle.clone());

    let result = pipeline.analyze("  \n\t ").await;

    assert!(matches!(result, Err(PipelineError::EmptyInput)));
    assert_eq!(oracle.call_count(), 0);
    assert_eq!(pipeline.status(), GenerationStatus::Idle);
    assert!(pipeline.profile().is_none());
}

#[tokio::test]
async fn test_analyze_oracle_failure_sets_banner() {
    let mut pipeline = Pipeline::new(ScriptedOracle::new().fail("connection refused"));

    let result = pipeline.analyze("Sample").await;

    match result {
        Err(PipelineError::OracleFailure { stage, .. }) => assert_eq!(stage, Stage::Analysis),
        other => panic!("Expected OracleFailure, got {:?}", other),
    }
    assert_eq!(pipeline.status(), GenerationStatus::Error);
    let banner = pipeline.session().error.clone().unwrap();
    assert!(banner.contains("connection refused"));
}

#[tokio::test]
async fn test_send_message_two_stage_turn() {
    let oracle = oracle_with_profile().reply("CONTENT").reply("STYLED");
    let mut pipeline = analyzed(&oracle).await;

    let reply = pipeline.send_message("hello").await.unwrap();

    let transcript = pipeline.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], ChatMessage::user("hello"));
    assert_eq!(transcript[1], reply);
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "STYLED");
    assert_eq!(reply.styleless_response.as_deref(), Some("CONTENT"));
    assert_eq!(reply.final_response.as_deref(), Some("STYLED"));
    assert_eq!(reply.step, Some(GenerationStatus::Done));
    assert_eq!(pipeline.status(), GenerationStatus::Idle);
    assert_eq!(oracle.call_count(), 3);
}

#[tokio::test]
async fn test_send_message_prompts_carry_profile() {
    let oracle = oracle_with_profile().reply("CONTENT").reply("STYLED");
    let mut pipeline = analyzed(&oracle).await;

    pipeline.send_message("Any rye today?").await.unwrap();

    // Call 0 was the analysis.
    let content_prompt = oracle.prompt(1);
    assert!(content_prompt.contains("Cheerful baker"));
    assert!(content_prompt.contains("- shop: Runs the bakery on Elm Street"));
    assert!(content_prompt.contains("user: Any rye today?"));
    assert!(!content_prompt.contains("dough-n't you think?"));

    let style_prompt = oracle.prompt(2);
    assert!(style_prompt.contains("dough-n't you think?"));
    assert!(style_prompt.contains("CONTENT"));
}

#[tokio::test]
async fn test_style_failure_records_system_message() {
    let oracle = oracle_with_profile().reply("CONTENT").fail("rate limited");
    let mut pipeline = analyzed(&oracle).await;

    let result = pipeline.send_message("hello").await;

    match result {
        Err(PipelineError::OracleFailure { stage, .. }) => assert_eq!(stage, Stage::Style),
        other => panic!("Expected OracleFailure, got {:?}", other),
    }
    let transcript = pipeline.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], ChatMessage::user("hello"));
    assert_eq!(transcript[1].role, Role::System);
    assert!(transcript[1].content.starts_with("Error: "));
    assert!(transcript[1].content.contains("rate limited"));
    assert!(transcript.iter().all(|m| m.role != Role::Assistant));
    assert_eq!(pipeline.status(), GenerationStatus::Error);
    assert!(pipeline.session().error.is_some());
}

#[tokio::test]
async fn test_content_failure_skips_style_stage() {
    let oracle = oracle_with_profile().fail("timeout");
    let mut pipeline = analyzed(&oracle).await;

    let result = pipeline.send_message("hello").await;

    assert!(matches!(
        result,
        Err(PipelineError::OracleFailure {
            stage: Stage::Content,
            ..
        })
    ));
    assert_eq!(oracle.call_count(), 2);
    assert_eq!(pipeline.transcript().len(), 2);
    assert_eq!(pipeline.transcript()[1].role, Role::System);
}

#[tokio::test]
async fn test_history_excludes_system_messages() {
    let oracle = oracle_with_profile()
        .reply("CONTENT")
        .fail("boom")
        .reply("SECOND CONTENT")
        .reply("SECOND STYLED");
    let mut pipeline = analyzed(&oracle).await;

    pipeline.send_message("first").await.unwrap_err();
    pipeline.send_message("second").await.unwrap();

    // Calls: analysis, content, failed style, content, style.
    let content_prompt = oracle.prompt(3);
    assert!(content_prompt.contains("user: first\nuser: second"));
    assert!(!content_prompt.contains("system:"));
    assert!(!content_prompt.contains("boom"));

    let history = pipeline.session().history_text();
    assert_eq!(
        history,
        "user: first\nuser: second\nassistant: SECOND STYLED"
    );
    assert_eq!(pipeline.session().history().count(), 3);
}

#[test]
fn test_render_history_mixed_roles() {
    let messages = vec![
        ChatMessage::system("Error: something broke"),
        ChatMessage::user("hi"),
        ChatMessage::assistant("hello".to_string(), "Ahoy!".to_string()),
        ChatMessage::system("Error: again"),
        ChatMessage::user("bye"),
    ];

    let history = prompts::render_history(&messages);

    assert_eq!(history, "user: hi\nassistant: Ahoy!\nuser: bye");
}

#[tokio::test]
async fn test_send_message_blank_or_without_profile() {
    let oracle = ScriptedOracle::new();
    let mut pipeline = Pipeline::new(oracle.clone());

    let result = pipeline.send_message("hello").await;
    assert!(matches!(result, Err(PipelineError::NoProfile)));
    assert_eq!(oracle.call_count(), 0);
    assert!(pipeline.transcript().is_empty());
    assert_eq!(pipeline.status(), GenerationStatus::Idle);
    assert!(pipeline.session().error.is_none());

    let oracle = oracle_with_profile();
    let mut pipeline = analyzed(&oracle).await;
    let result = pipeline.send_message("   ").await;
    assert!(matches!(result, Err(PipelineError::EmptyInput)));

    assert_eq!(oracle.call_count(), 1);
    assert!(pipeline.transcript().is_empty());
    assert_eq!(pipeline.status(), GenerationStatus::Idle);
}

#[tokio::test]
async fn test_analysis_after_failed_turn_resets_session() {
    let oracle = oracle_with_profile()
        .fail("offline")
        .reply(&analysis_fixture());
    let mut pipeline = analyzed(&oracle).await;

    pipeline.send_message("hello").await.unwrap_err();
    assert_eq!(pipeline.status(), GenerationStatus::Error);

    pipeline.analyze("Reef your topsails!").await.unwrap();

    assert!(pipeline.transcript().is_empty());
    assert!(pipeline.session().error.is_none());
    assert_eq!(pipeline.status(), GenerationStatus::Idle);
}

#[tokio::test]
async fn test_dismiss_error_clears_banner_only() {
    let oracle = oracle_with_profile().fail("offline");
    let mut pipeline = analyzed(&oracle).await;
    pipeline.send_message("hello").await.unwrap_err();

    pipeline.dismiss_error();

    assert!(pipeline.session().error.is_none());
    assert_eq!(pipeline.transcript().len(), 2);
}

#[tokio::test]
async fn test_pipeline_events_follow_status() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let oracle = oracle_with_profile().reply("CONTENT").reply("STYLED");
    let mut pipeline = Pipeline::new(oracle).with_events(sender);

    pipeline.analyze("Sample").await.unwrap();
    pipeline.send_message("hello").await.unwrap();

    let mut statuses = Vec::new();
    let mut mirror = Session::new();
    while let Ok(event) = receiver.try_recv() {
        match event {
            PipelineEvent::Status(status) => {
                statuses.push(status);
                mirror.status = status;
            }
            PipelineEvent::Appended(message) => mirror.transcript.push(message),
            PipelineEvent::ProfileReplaced(profile) => mirror.profile = Some(profile),
            PipelineEvent::TranscriptCleared => mirror.transcript.clear(),
            PipelineEvent::Banner(banner) => mirror.error = banner,
        }
    }

    assert_eq!(
        statuses,
        [
            GenerationStatus::Analyzing,
            GenerationStatus::Idle,
            GenerationStatus::GeneratingContent,
            GenerationStatus::ApplyingStyle,
            GenerationStatus::Idle,
        ]
    );
    assert_eq!(mirror.profile.as_ref(), pipeline.profile());
    assert_eq!(mirror.transcript, pipeline.transcript());
    assert_eq!(mirror.status, pipeline.status());
}

#[test]
fn test_profile_edits_keep_memory_order() {
    let mut profile = CharacterProfile::new("p", "s")
        .with_memory("first", "1")
        .with_memory("second", "2")
        .with_memory("third", "3");

    profile.set_memory("second", "two");
    profile.set_personality("new personality");
    profile.set_language_style("new style");

    let facts: Vec<(&str, &str)> = profile.memory_facts().collect();
    assert_eq!(facts, [("first", "1"), ("second", "two"), ("third", "3")]);
    assert_eq!(profile.personality, "new personality");
    assert_eq!(profile.language_style, "new style");
}

#[test]
fn test_chat_message_serialization() {
    let reply = ChatMessage::assistant("CONTENT".to_string(), "STYLED".to_string());
    let value = serde_json::to_value(&reply).unwrap();

    assert_eq!(value["role"], "assistant");
    assert_eq!(value["content"], "STYLED");
    assert_eq!(value["step"], "DONE");
    assert_eq!(value["stylelessResponse"], "CONTENT");
    assert_eq!(value["finalResponse"], "STYLED");

    let user = serde_json::to_value(ChatMessage::user("hi")).unwrap();
    assert!(user.get("step").is_none());
    assert!(!ChatMessage::user("hi").has_generation_details());
    assert!(reply.has_generation_details());
}

#[test]
fn test_settings_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("settings.json");
    let settings = Settings {
        model: "gpt-4o".to_string(),
        api_base: Some("http://localhost:8080/v1".to_string()),
        debug_mode: true,
    };

    settings.save_to_file(&path).unwrap();
    let loaded = Settings::load_settings_from_file(&path).unwrap();

    assert_eq!(loaded, settings);
}

#[test]
fn test_settings_missing_fields_use_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"debug_mode": true}"#).unwrap();

    let loaded = Settings::load_settings_from_file(&path).unwrap();

    assert!(loaded.debug_mode);
    assert_eq!(loaded.model, Settings::default().model);
    assert!(loaded.api_base.is_none());
}

#[test]
fn test_status_labels() {
    assert!(GenerationStatus::Analyzing.is_busy());
    assert!(GenerationStatus::ApplyingStyle.is_chatting());
    assert!(!GenerationStatus::Error.is_busy());
    assert!(!GenerationStatus::Done.is_busy());
    assert!(
        GenerationStatus::GeneratingContent
            .step_label()
            .unwrap()
            .starts_with("Step 1")
    );
    assert!(
        GenerationStatus::ApplyingStyle
            .step_label()
            .unwrap()
            .starts_with("Step 2")
    );
    assert_eq!(GenerationStatus::Idle.step_label(), None);
}

#[tokio::test]
async fn test_analyze_accepts_scalar_fact_values() {
    let json = r#"{
        "personality": "Eager apprentice",
        "languageStyle": "Short, breathless sentences",
        "longTermMemory": {"age": 17, "knighted": false, "mentor": "Sir Aldous", "rank": null}
    }"#;
    let mut pipeline = Pipeline::new(ScriptedOracle::new().reply(json));

    let profile = pipeline.analyze("Sample").await.unwrap();

    let facts: Vec<(&str, &str)> = profile.memory_facts().collect();
    assert_eq!(
        facts,
        [
            ("age", "17"),
            ("knighted", "false"),
            ("mentor", "Sir Aldous"),
            ("rank", "null")
        ]
    );
}

#[test]
fn test_profile_missing_memory_is_rejected() {
    let json = r#"{"personality": "p", "languageStyle": "s"}"#;

    let err = CharacterProfile::from_json(json).unwrap_err();

    assert!(err.to_string().contains("longTermMemory"));
}

#[test]
fn test_settings_load_or_create() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("data").join("settings.json");

    let created = Settings::load_or_create(&path).unwrap();
    assert_eq!(created, Settings::default());
    assert!(path.exists());

    fs::write(&path, r#"{"model": "gpt-4o", "debug_mode": true}"#).unwrap();
    let loaded = Settings::load_or_create(&path).unwrap();
    assert_eq!(loaded.model, "gpt-4o");
    assert!(loaded.debug_mode);

    // A broken file is reported, not overwritten.
    fs::write(&path, "{ not json").unwrap();
    assert!(Settings::load_or_create(&path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_app_ignores_requests_while_flow_in_flight() {
    let scripted = oracle_with_profile().reply("CONTENT").reply("STYLED");
    let oracle = GatedOracle::new(scripted.clone());
    let mut app = App::new(Settings::default(), oracle.clone());

    app.handle_action(Action::Analyze("Good morning!".to_string()));
    assert!(!app.is_ready());
    assert!(app.pipeline_session().is_none());
    app.handle_action(Action::Analyze("A second character".to_string()));

    oracle.release(1);
    settle(&mut app).await;
    assert!(app.is_ready());
    assert!(app.has_profile());
    assert_eq!(scripted.call_count(), 1);

    app.handle_action(Action::SendMessage("first".to_string()));
    assert!(!app.is_ready());
    assert!(!app.focus_enabled(Focus::Personality));
    assert!(!app.focus_enabled(Focus::Memory));
    assert!(!app.focus_enabled(Focus::ChatInput));
    app.handle_action(Action::SendMessage("second".to_string()));
    app.handle_action(Action::Analyze("Another character".to_string()));

    oracle.release(2);
    settle(&mut app).await;

    assert_eq!(scripted.call_count(), 3);
    assert!(scripted.prompt(1).contains("user: first"));
    assert!((0..3).all(|i| !scripted.prompt(i).contains("second")));
    assert!((0..3).all(|i| !scripted.prompt(i).contains("Another character")));
    let transcript = &app.session.transcript;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], ChatMessage::user("first"));
    assert_eq!(transcript[1].content, "STYLED");
    assert!(app.is_ready());
}

#[tokio::test]
async fn test_app_mirror_matches_pipeline_after_settle() {
    let scripted = oracle_with_profile().reply("CONTENT").reply("STYLED");
    let oracle = GatedOracle::new(scripted.clone());
    let mut app = App::new(Settings::default(), oracle.clone());

    app.handle_action(Action::Analyze("Good morning!".to_string()));
    oracle.release(1);
    settle(&mut app).await;
    assert_eq!(Some(&app.session), app.pipeline_session());

    app.handle_action(Action::SendMessage("hello".to_string()));
    // Let the flow run up to its first oracle call, then mirror what it reported.
    tokio::task::yield_now().await;
    app.apply_pending_events();
    assert_eq!(app.session.status, GenerationStatus::GeneratingContent);
    assert_eq!(app.session.transcript.last(), Some(&ChatMessage::user("hello")));

    oracle.release(2);
    settle(&mut app).await;

    let pipeline_session = app.pipeline_session().cloned().expect("Pipeline is back");
    assert_eq!(app.session, pipeline_session);
    assert_eq!(app.session.status, GenerationStatus::Idle);

    // Nothing from the finished flow is left to replay into the mirror.
    app.apply_pending_events();
    assert_eq!(app.session, pipeline_session);
    assert_eq!(app.session.transcript.len(), 2);
}

#[tokio::test]
async fn test_app_mirror_keeps_failed_turn() {
    let scripted = oracle_with_profile().fail("offline");
    let oracle = GatedOracle::new(scripted.clone());
    let mut app = App::new(Settings::default(), oracle.clone());

    app.handle_action(Action::Analyze("Good morning!".to_string()));
    oracle.release(2);
    settle(&mut app).await;
    app.handle_action(Action::SendMessage("hello".to_string()));
    settle(&mut app).await;

    assert_eq!(Some(&app.session), app.pipeline_session());
    assert_eq!(app.session.status, GenerationStatus::Error);
    assert_eq!(app.session.transcript.len(), 2);
    assert_eq!(app.session.transcript[1].role, Role::System);
    assert!(app.session.error.is_some());

    app.handle_action(Action::DismissError);
    assert!(app.session.error.is_none());
    assert_eq!(Some(&app.session), app.pipeline_session());
}

#[test]
fn test_api_key_required_from_env() {
    // The only test touching this variable; the steps run in order.
    unsafe { std::env::remove_var(settings::API_KEY_VAR) };
    let err = Settings::api_key_from_env().unwrap_err();
    assert!(matches!(err, AppError::MissingApiKey));
    let report = color_eyre::eyre::Report::from(err);
    assert!(report.to_string().contains("OPENAI_API_KEY"));

    unsafe { std::env::set_var(settings::API_KEY_VAR, "   ") };
    assert!(matches!(
        Settings::api_key_from_env(),
        Err(AppError::MissingApiKey)
    ));

    unsafe { std::env::set_var(settings::API_KEY_VAR, "sk-test") };
    assert_eq!(Settings::api_key_from_env().unwrap(), "sk-test");
    unsafe { std::env::remove_var(settings::API_KEY_VAR) };
}
